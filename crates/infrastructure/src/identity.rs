use crate::subscription::Subscription;
use async_trait::async_trait;
use domain::{AuthProvider, EmailCredential, User};
use shared::AppError;

/// 認証サービスのクライアントAPI
///
/// セッションはプロセス全体で共有される。失敗はプロバイダのエラーコードを持つ `AppError` で返る。
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// アカウントを作成し、そのままサインインする
    async fn sign_up_with_password(&self, credential: &EmailCredential) -> Result<User, AppError>;

    async fn sign_in_with_password(&self, credential: &EmailCredential) -> Result<User, AppError>;

    /// フェデレーション認証。初回はアカウントが作成される。
    async fn sign_in_with_provider(&self, provider: AuthProvider) -> Result<User, AppError>;

    async fn sign_out(&self) -> Result<(), AppError>;

    fn current_user(&self) -> Option<User>;

    /// 認証状態の購読。サインイン・サインアウト時にのみ配信される。
    fn observe_auth_state(&self) -> Subscription<Option<User>>;

    /// 機密操作の直前に現在の資格情報を再確認する
    async fn reauthenticate(&self, user: &User, credential: &EmailCredential)
        -> Result<(), AppError>;

    async fn update_display_name(&self, user: &User, display_name: &str)
        -> Result<User, AppError>;

    async fn update_password(&self, user: &User, new_password: &str) -> Result<(), AppError>;
}
