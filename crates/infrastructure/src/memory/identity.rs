use super::password::{check_strength, hash_password, verify_password};
use super::{Account, BackendOperation, InMemoryBackend};
use crate::identity::IdentityService;
use crate::subscription::Subscription;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use domain::{AuthProvider, Email, EmailCredential, User, UserId};
use shared::AppError;
use tracing::{debug, info};

impl InMemoryBackend {
    fn start_session(&self, user: &User) {
        self.inner.session.send_replace(Some(user.clone()));
        info!(user_id = %user.uid, provider = %user.provider, "セッション開始");
    }

    /// セッション中のユーザーと操作対象のユーザーが一致することを確認
    fn require_same_user(&self, user: &User) -> Result<User, AppError> {
        let session = self.require_session()?;
        if session.uid != user.uid {
            return Err(AppError::InvalidCredentials(
                "the supplied user does not match the signed-in user".to_string(),
            ));
        }
        Ok(session)
    }

    /// 通知なしでアカウントとセッションのユーザー情報を更新する
    ///
    /// プロフィールの変更は認証状態の購読者には配信されない。
    fn update_account<F>(&self, uid: &UserId, update: F) -> Result<User, AppError>
    where
        F: FnOnce(&mut Account) -> Result<(), AppError>,
    {
        let mut account = self
            .inner
            .accounts
            .get_mut(uid)
            .ok_or_else(|| AppError::NotFound(format!("user {uid}")))?;
        update(&mut *account)?;
        let user = account.user.clone();
        drop(account);

        self.inner.session.send_if_modified(|session| {
            if let Some(current) = session.as_mut().filter(|current| current.uid == user.uid) {
                *current = user.clone();
            }
            false
        });
        Ok(user)
    }

    fn create_account(
        &self,
        email: &Email,
        display_name: Option<String>,
        provider: AuthProvider,
        password_hash: Option<String>,
    ) -> Result<User, AppError> {
        match self.inner.emails.entry(email.as_str().to_string()) {
            Entry::Occupied(_) => Err(AppError::EmailAlreadyInUse(email.to_string())),
            Entry::Vacant(vacant) => {
                let user = User {
                    uid: UserId::new(),
                    email: Some(email.as_str().to_string()),
                    display_name,
                    provider,
                    created_at: Utc::now(),
                };
                self.inner.accounts.insert(
                    user.uid.clone(),
                    Account {
                        user: user.clone(),
                        password_hash,
                    },
                );
                vacant.insert(user.uid.clone());
                debug!(user_id = %user.uid, "アカウント作成");
                Ok(user)
            }
        }
    }

    fn account_by_email(&self, email: &Email) -> Option<Account> {
        let uid = self.inner.emails.get(email.as_str())?.clone();
        self.inner.accounts.get(&uid).map(|account| account.clone())
    }
}

#[async_trait]
impl IdentityService for InMemoryBackend {
    async fn sign_up_with_password(&self, credential: &EmailCredential) -> Result<User, AppError> {
        self.enter(BackendOperation::SignUp).await?;
        let email = Email::parse(&credential.email)
            .map_err(|_| AppError::InvalidEmail(credential.email.clone()))?;
        check_strength(&credential.password)?;

        let password_hash = hash_password(&credential.password)?;
        let user = self.create_account(&email, None, AuthProvider::Password, Some(password_hash))?;
        self.start_session(&user);
        Ok(user)
    }

    async fn sign_in_with_password(&self, credential: &EmailCredential) -> Result<User, AppError> {
        self.enter(BackendOperation::SignIn).await?;
        let email = Email::parse(&credential.email)
            .map_err(|_| AppError::InvalidEmail(credential.email.clone()))?;

        let invalid = || AppError::InvalidCredentials("email or password is incorrect".to_string());
        let account = self.account_by_email(&email).ok_or_else(invalid)?;
        let hash = account.password_hash.as_deref().ok_or_else(invalid)?;
        if !verify_password(&credential.password, hash)? {
            return Err(invalid());
        }

        self.start_session(&account.user);
        Ok(account.user)
    }

    async fn sign_in_with_provider(&self, provider: AuthProvider) -> Result<User, AppError> {
        self.enter(BackendOperation::FederatedSignIn).await?;
        if !provider.is_federated() || !self.inner.enabled_providers.contains(&provider) {
            return Err(AppError::OperationNotAllowed(format!(
                "{provider} sign-in is not enabled for this project"
            )));
        }

        let identity = self
            .inner
            .provider_identities
            .get(&provider)
            .map(|identity| identity.clone())
            .ok_or(AppError::PopupClosed)?;
        let email = Email::parse(&identity.email)
            .map_err(|_| AppError::InvalidEmail(identity.email.clone()))?;

        let user = match self.account_by_email(&email) {
            Some(account) => account.user,
            None => self.create_account(&email, identity.display_name, provider, None)?,
        };
        self.start_session(&user);
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        self.enter(BackendOperation::SignOut).await?;
        let previous = self.inner.session.send_replace(None);
        if let Some(user) = previous {
            info!(user_id = %user.uid, "セッション終了");
        }
        Ok(())
    }

    fn current_user(&self) -> Option<User> {
        self.inner.session.borrow().clone()
    }

    fn observe_auth_state(&self) -> Subscription<Option<User>> {
        // プロフィール変更は通知なしで反映されるため、配信はサインイン・サインアウト時のみ
        Subscription::from_watch(self.inner.session.subscribe(), |session: &Option<User>| {
            session.clone()
        })
    }

    async fn reauthenticate(
        &self,
        user: &User,
        credential: &EmailCredential,
    ) -> Result<(), AppError> {
        self.enter(BackendOperation::Reauthenticate).await?;
        let session = self.require_same_user(user)?;

        let same_email = session
            .email
            .as_deref()
            .is_some_and(|email| email.eq_ignore_ascii_case(credential.email.trim()));
        if !same_email {
            return Err(AppError::InvalidCredentials(
                "credential does not belong to the signed-in user".to_string(),
            ));
        }

        let account = self
            .inner
            .accounts
            .get(&session.uid)
            .map(|account| account.clone())
            .ok_or_else(|| AppError::NotFound(format!("user {}", session.uid)))?;
        let hash = account
            .password_hash
            .as_deref()
            .ok_or(AppError::WrongPassword)?;
        if !verify_password(&credential.password, hash)? {
            return Err(AppError::WrongPassword);
        }
        Ok(())
    }

    async fn update_display_name(
        &self,
        user: &User,
        display_name: &str,
    ) -> Result<User, AppError> {
        self.enter(BackendOperation::UpdateProfile).await?;
        let session = self.require_same_user(user)?;
        let display_name = display_name.to_string();
        self.update_account(&session.uid, move |account| {
            account.user.display_name = Some(display_name);
            Ok(())
        })
    }

    async fn update_password(&self, user: &User, new_password: &str) -> Result<(), AppError> {
        self.enter(BackendOperation::UpdatePassword).await?;
        let session = self.require_same_user(user)?;
        check_strength(new_password)?;
        let password_hash = hash_password(new_password)?;
        self.update_account(&session.uid, move |account| {
            account.password_hash = Some(password_hash);
            Ok(())
        })?;
        Ok(())
    }
}
