use crate::context::AppContext;
use crate::navigator::Route;
use domain::{Todo, User};
use infrastructure::Subscription;
use tracing::{debug, info};

/// セッションリスナーが発行するイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(User),
    SignedOut,
    /// 現在のユーザーのToDo全件
    Snapshot(Vec<Todo>),
}

/// 認証状態を購読し、ユーザーごとのライブクエリを管理する
///
/// ライブクエリは常に高々1つ。ユーザーが変わるたびに置き換える。
pub struct SessionListener {
    ctx: AppContext,
    auth: Option<Subscription<Option<User>>>,
    todos: Option<Subscription<Vec<Todo>>>,
    user: Option<User>,
}

impl SessionListener {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            auth: None,
            todos: None,
            user: None,
        }
    }

    /// 認証状態のコールバックを登録する
    pub fn mount(&mut self) {
        let subscription = self.ctx.identity().observe_auth_state();
        debug!(subscription = %subscription.id(), "認証状態の購読開始");
        self.auth = Some(subscription);
    }

    /// 購読を全て解除する
    pub fn teardown(&mut self) {
        self.auth = None;
        self.todos = None;
        self.user = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.auth.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn has_data_subscription(&self) -> bool {
        self.todos.is_some()
    }

    /// 次のイベントを待つ。未マウント、または認証状態の購読が終了した場合は `None`。
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            let auth = self.auth.as_mut()?;
            tokio::select! {
                change = auth.next() => {
                    return match change {
                        Some(user) => Some(self.handle_auth_change(user)),
                        None => {
                            self.teardown();
                            None
                        }
                    };
                }
                snapshot = next_or_pending(self.todos.as_mut()) => {
                    match snapshot {
                        Some(todos) => return Some(SessionEvent::Snapshot(todos)),
                        None => self.todos = None,
                    }
                }
            }
        }
    }

    fn handle_auth_change(&mut self, user: Option<User>) -> SessionEvent {
        match user {
            Some(user) => {
                let subscription = self.ctx.todos().watch_by_owner(&user.uid);
                if let Some(previous) = self.todos.replace(subscription) {
                    debug!(subscription = %previous.id(), "ライブクエリを置き換え");
                }
                info!(user_id = %user.uid, "サインイン状態を検出");
                self.user = Some(user.clone());
                SessionEvent::SignedIn(user)
            }
            None => {
                self.todos = None;
                self.user = None;
                info!("未サインインのためサインイン画面へ遷移");
                self.ctx.navigator().navigate(Route::SignIn);
                SessionEvent::SignedOut
            }
        }
    }
}

async fn next_or_pending<T>(subscription: Option<&mut Subscription<T>>) -> Option<T> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => std::future::pending().await,
    }
}
