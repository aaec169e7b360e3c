use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// ビューの状態ストア
///
/// `update` は作業中の状態を変更するだけで通知しない。`publish` を呼んだ時点の状態が
/// 購読者（描画側）に配信される。
pub struct ViewStore<S> {
    working: Mutex<S>,
    published: watch::Sender<S>,
}

impl<S: Clone> ViewStore<S> {
    pub fn new(initial: S) -> Self {
        let (published, _) = watch::channel(initial.clone());
        Self {
            working: Mutex::new(initial),
            published,
        }
    }

    /// 現在の状態のコピー
    pub fn snapshot(&self) -> S {
        self.lock().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&*self.lock())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut *self.lock())
    }

    /// 描画を要求する
    pub fn publish(&self) {
        let state = self.snapshot();
        self.published.send_replace(state);
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.published.subscribe()
    }

    // 更新中にパニックしても状態はそのまま使い続ける
    fn lock(&self) -> MutexGuard<'_, S> {
        self.working.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_update_does_not_notify_until_publish() {
        let store = ViewStore::new(0u32);
        let mut receiver = store.subscribe();

        let doubled = store.update(|n| {
            *n += 21;
            *n * 2
        });
        assert_eq!(doubled, 42);
        assert_eq!(store.snapshot(), 21);
        assert!(!receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow(), 0);

        store.publish();
        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), 21);
    }

    #[test]
    fn test_read() {
        let store = ViewStore::new(vec![1, 2, 3]);
        assert_eq!(store.read(|v| v.len()), 3);
    }

    #[test]
    fn test_store_survives_panicking_update() {
        let store = ViewStore::new(String::from("draft"));
        let result = catch_unwind(AssertUnwindSafe(|| {
            store.update(|s| {
                s.push('!');
                panic!("handler failed");
            })
        }));
        assert!(result.is_err());

        assert_eq!(store.update(|s| s.len()), 6);
        store.publish();
        assert_eq!(*store.subscribe().borrow(), "draft!");
    }
}
