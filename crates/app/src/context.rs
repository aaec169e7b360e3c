use crate::navigator::{Navigator, Route};
use domain::User;
use infrastructure::{IdentityService, InMemoryBackend, TodoStore};
use shared::Config;
use std::sync::Arc;

/// 各ビューに渡される実行コンテキスト
///
/// 認証サービス・データストア・ナビゲーターへのハンドルをまとめたもの。
/// グローバル状態は持たず、ビューの生成時に明示的に渡す。
#[derive(Clone)]
pub struct AppContext {
    identity: Arc<dyn IdentityService>,
    todos: Arc<dyn TodoStore>,
    navigator: Navigator,
    config: Arc<Config>,
}

impl AppContext {
    pub fn new(
        identity: Arc<dyn IdentityService>,
        todos: Arc<dyn TodoStore>,
        navigator: Navigator,
        config: Config,
    ) -> Self {
        Self {
            identity,
            todos,
            navigator,
            config: Arc::new(config),
        }
    }

    /// プロセス内バックエンドを認証・データの両方に使うコンテキスト
    pub fn in_memory(backend: InMemoryBackend, config: Config) -> Self {
        let backend = Arc::new(backend);
        Self::new(
            backend.clone(),
            backend,
            Navigator::new(Route::SignIn),
            config,
        )
    }

    pub fn identity(&self) -> &dyn IdentityService {
        self.identity.as_ref()
    }

    pub fn todos(&self) -> &dyn TodoStore {
        self.todos.as_ref()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn current_user(&self) -> Option<User> {
        self.identity.current_user()
    }

    /// 表示名が未設定の場合の既定ラベルを適用した表示名
    pub fn display_label(&self, user: &User) -> String {
        user.display_label(&self.config.default_display_name)
    }
}
