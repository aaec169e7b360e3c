use crate::context::AppContext;
use crate::navigator::{guard, Route};
use crate::store::ViewStore;
use domain::{AuthProvider, EmailCredential, User};
use infrastructure::Subscription;
use shared::trace_backend_operation;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password, please try again.";

const SERVICE: &str = "auth";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn route(&self) -> Route {
        match self {
            AuthMode::SignIn => Route::SignIn,
            AuthMode::SignUp => Route::SignUp,
        }
    }

    pub fn other(&self) -> AuthMode {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign in to your account",
            AuthMode::SignUp => "Create an account",
        }
    }

    /// 画面下部の切り替えリンクの文言
    pub fn link_prompt(&self) -> &'static str {
        match self {
            AuthMode::SignIn => "Don't have an account yet? Sign up",
            AuthMode::SignUp => "Already have an account? Sign in",
        }
    }
}

/// 認証状態の確認状況。確認中はローディング表示になる。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthStatus {
    #[default]
    CheckingAuth,
    Unauthenticated,
    Authenticated,
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialFormState {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
    pub status: AuthStatus,
}

impl CredentialFormState {
    pub fn is_loading(&self) -> bool {
        self.status == AuthStatus::CheckingAuth
    }
}

impl std::fmt::Debug for CredentialFormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialFormState")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("error", &self.error)
            .field("status", &self.status)
            .finish()
    }
}

/// サインイン／サインアップ画面
pub struct AuthView {
    ctx: AppContext,
    mode: AuthMode,
    listener: Option<Subscription<Option<User>>>,
    store: ViewStore<CredentialFormState>,
}

impl AuthView {
    pub fn new(ctx: AppContext, mode: AuthMode) -> Self {
        Self {
            ctx,
            mode,
            listener: None,
            store: ViewStore::new(CredentialFormState::default()),
        }
    }

    pub fn sign_in(ctx: AppContext) -> Self {
        Self::new(ctx, AuthMode::SignIn)
    }

    pub fn sign_up(ctx: AppContext) -> Self {
        Self::new(ctx, AuthMode::SignUp)
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// 既存セッションの確認を開始する
    pub fn mount(&mut self) {
        self.store
            .update(|state| state.status = AuthStatus::CheckingAuth);
        self.store.publish();
        self.listener = Some(self.ctx.identity().observe_auth_state());
    }

    pub fn unmount(&mut self) {
        self.listener = None;
    }

    pub fn state(&self) -> CredentialFormState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CredentialFormState> {
        self.store.subscribe()
    }

    /// 認証状態の変化を待って反映する
    ///
    /// セッションがあれば一覧へ遷移する。未マウントなら `None`。
    pub async fn next_event(&mut self) -> Option<AuthStatus> {
        let user = self.listener.as_mut()?.next().await?;
        let status = match user {
            Some(user) => {
                debug!(user_id = %user.uid, "既存のセッションを検出");
                self.ctx
                    .navigator()
                    .navigate(guard(self.mode.route(), true));
                AuthStatus::Authenticated
            }
            None => AuthStatus::Unauthenticated,
        };
        self.store.update(|state| state.status = status);
        self.store.publish();
        Some(status)
    }

    pub fn set_email(&self, email: impl Into<String>) {
        let email = email.into();
        self.store.update(|state| state.email = email);
        self.store.publish();
    }

    /// パスワード入力時はエラー表示を消す
    pub fn set_password(&self, password: impl Into<String>) {
        let password = password.into();
        self.store.update(|state| {
            state.password = password;
            state.error = None;
        });
        self.store.publish();
    }

    /// メールアドレスとパスワードで認証する
    pub async fn submit(&self) -> bool {
        let credential = self.store.update(|state| {
            state.status = AuthStatus::CheckingAuth;
            EmailCredential::new(state.email.trim(), state.password.clone())
        });
        self.store.publish();

        let result = match self.mode {
            AuthMode::SignIn => {
                trace_backend_operation(
                    SERVICE,
                    "sign_in",
                    self.ctx.identity().sign_in_with_password(&credential),
                )
                .await
            }
            AuthMode::SignUp => {
                trace_backend_operation(
                    SERVICE,
                    "sign_up",
                    self.ctx.identity().sign_up_with_password(&credential),
                )
                .await
            }
        };

        match result {
            Ok(user) => {
                info!(user_id = %user.uid, mode = ?self.mode, "認証に成功しました");
                self.authenticated();
                true
            }
            Err(e) => {
                warn!(code = e.code(), mode = ?self.mode, "認証に失敗しました");
                self.failed(INVALID_CREDENTIALS_MESSAGE.to_string());
                false
            }
        }
    }

    /// 外部プロバイダーで認証する。失敗時はエラー文言をそのまま表示する。
    pub async fn sign_in_with_provider(&self, provider: AuthProvider) -> bool {
        self.store
            .update(|state| state.status = AuthStatus::CheckingAuth);
        self.store.publish();

        match trace_backend_operation(
            SERVICE,
            "federated_sign_in",
            self.ctx.identity().sign_in_with_provider(provider),
        )
        .await
        {
            Ok(user) => {
                info!(user_id = %user.uid, provider = provider.provider_id(), "認証に成功しました");
                self.authenticated();
                true
            }
            Err(e) => {
                self.failed(e.to_string());
                false
            }
        }
    }

    /// サインイン／サインアップ画面の切り替え
    pub fn go_to_other_mode(&self) {
        self.ctx.navigator().navigate(self.mode.other().route());
    }

    fn authenticated(&self) {
        self.store.update(|state| {
            state.status = AuthStatus::Authenticated;
            state.error = None;
        });
        self.store.publish();
        self.ctx.navigator().navigate(Route::Todos);
    }

    fn failed(&self, message: String) {
        self.store.update(|state| {
            state.status = AuthStatus::Unauthenticated;
            state.error = Some(message);
        });
        self.store.publish();
    }
}
