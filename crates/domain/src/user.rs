use crate::errors::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ユーザーID（認証サービスが払い出す）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// 新しいユーザーIDを生成
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// 文字列からユーザーIDを作成
    pub fn from_string(id: String) -> Result<Self, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidUserId(
                "User ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// サインイン方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthProvider {
    Password,
    Google,
}

impl AuthProvider {
    pub fn provider_id(&self) -> &'static str {
        match self {
            AuthProvider::Password => "password",
            AuthProvider::Google => "google.com",
        }
    }

    pub fn from_provider_id(provider_id: &str) -> Option<Self> {
        match provider_id.trim() {
            "password" => Some(AuthProvider::Password),
            "google.com" | "google" => Some(AuthProvider::Google),
            _ => None,
        }
    }

    pub fn is_federated(&self) -> bool {
        !matches!(self, AuthProvider::Password)
    }
}

impl std::fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.provider_id())
    }
}

/// メールアドレス（小文字に正規化）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn parse(email: &str) -> Result<Self, DomainError> {
        let email = email.trim();
        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !email.contains(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            return Err(DomainError::InvalidEmail(email.to_string()));
        }
        Ok(Self(email.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 認証済みユーザーの情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub provider: AuthProvider,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// 表示名。未設定（または空）の場合は既定のラベルを返す。
    pub fn display_label(&self, default_label: &str) -> String {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default_label.to_string(),
        }
    }
}

/// メールアドレスとパスワードの組
#[derive(Clone, PartialEq, Eq)]
pub struct EmailCredential {
    pub email: String,
    pub password: String,
}

impl EmailCredential {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

// パスワードをログに出さない
impl std::fmt::Debug for EmailCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailCredential")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
