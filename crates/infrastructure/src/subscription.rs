use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// プッシュ型のライブ購読
///
/// 購読直後に現在の状態を1回配信し、以降は状態が変わるたびに完全なスナップショットを配信する。
/// 同じ値が連続する場合は配信しない。ドロップすると配信タスクを停止する。
pub struct Subscription<T> {
    id: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<T>,
    task: JoinHandle<()>,
}

impl<T> Subscription<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    /// `watch` チャネルの状態を射影して配信する購読を作成
    ///
    /// tokio ランタイム上で呼び出すこと。
    pub fn from_watch<S, F>(mut source: watch::Receiver<S>, mut project: F) -> Self
    where
        S: Send + Sync + 'static,
        F: FnMut(&S) -> T + Send + 'static,
    {
        let id = SubscriptionId(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            let mut last: Option<T> = None;
            loop {
                let value = {
                    let current = source.borrow_and_update();
                    project(&*current)
                };
                if last.as_ref() != Some(&value) {
                    if sender.send(value.clone()).is_err() {
                        break;
                    }
                    last = Some(value);
                }

                tokio::select! {
                    changed = source.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = sender.closed() => break,
                }
            }
            debug!(subscription = %id, "購読の配信タスク終了");
        });

        Self { id, receiver, task }
    }
}

impl<T> Subscription<T> {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// 次のスナップショットを待つ。配信元が閉じると `None`。
    pub async fn next(&mut self) -> Option<T> {
        self.receiver.recv().await
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_initial_value_is_delivered() {
        let (_tx, rx) = watch::channel(1u32);
        let mut sub = Subscription::from_watch(rx, |v| *v);
        let first = timeout(Duration::from_secs(1), sub.next()).await.unwrap();
        assert_eq!(first, Some(1));
    }

    #[tokio::test]
    async fn test_changes_are_delivered_and_duplicates_skipped() {
        let (tx, rx) = watch::channel(1u32);
        let mut sub = Subscription::from_watch(rx, |v| *v / 10);
        assert_eq!(sub.next().await, Some(0));

        tx.send_replace(5); // 射影結果は 0 のまま
        tx.send_replace(12);
        let next = timeout(Duration::from_secs(1), sub.next()).await.unwrap();
        assert_eq!(next, Some(1));
    }

    #[tokio::test]
    async fn test_closed_source_ends_subscription() {
        let (tx, rx) = watch::channel(1u32);
        let mut sub = Subscription::from_watch(rx, |v| *v);
        assert_eq!(sub.next().await, Some(1));
        drop(tx);
        let end = timeout(Duration::from_secs(1), sub.next()).await.unwrap();
        assert_eq!(end, None);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let (_tx, rx) = watch::channel(0u8);
        let a = Subscription::from_watch(rx.clone(), |v| *v);
        let b = Subscription::from_watch(rx, |v| *v);
        assert_ne!(a.id(), b.id());
    }
}
