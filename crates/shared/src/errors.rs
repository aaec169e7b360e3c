use thiserror::Error;

/// アプリケーション全体で使用される包括的なエラー型
///
/// バックエンド由来のエラーはプロバイダのエラーコード（`code()`）を持つ。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    // ドメインエラー（ローカル検証、バックエンドには到達しない）
    #[error("Domain error: {0}")]
    Domain(#[from] domain::DomainError),

    // 認証エラー
    #[error("Wrong password")]
    WrongPassword,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Email already in use: {0}")]
    EmailAlreadyInUse(String),

    #[error("Weak password: {0}")]
    WeakPassword(String),

    #[error("Operation not allowed: {0}")]
    OperationNotAllowed(String),

    #[error("The sign-in popup was closed before completing the sign-in.")]
    PopupClosed,

    #[error("No user is currently signed in")]
    NotAuthenticated,

    #[error("Recent sign-in required: {0}")]
    RequiresRecentLogin(String),

    // データベースエラー
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // システムエラー
    #[error("Network error: {0}")]
    Network(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// エラーの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 入力・認証の問題
    Client,
    /// バックエンド側の問題
    Server,
    /// 一時的なエラー（ユーザーの再送信で回復しうる）
    Transient,
    /// 永続的なエラー
    Permanent,
}

/// エラーの重要度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// エラーメタデータ
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    /// プロバイダ形式のエラーコード
    pub code: &'static str,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
}

impl AppError {
    /// プロバイダ形式のエラーコードを取得
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Domain(_) => "invalid-argument",
            AppError::WrongPassword => "auth/wrong-password",
            AppError::InvalidCredentials(_) => "auth/invalid-credential",
            AppError::InvalidEmail(_) => "auth/invalid-email",
            AppError::EmailAlreadyInUse(_) => "auth/email-already-in-use",
            AppError::WeakPassword(_) => "auth/weak-password",
            AppError::OperationNotAllowed(_) => "auth/operation-not-allowed",
            AppError::PopupClosed => "auth/popup-closed-by-user",
            AppError::NotAuthenticated => "auth/no-current-user",
            AppError::RequiresRecentLogin(_) => "auth/requires-recent-login",
            AppError::PermissionDenied(_) => "permission-denied",
            AppError::NotFound(_) => "not-found",
            AppError::Serialization(_) => "data-loss",
            AppError::Network(_) => "auth/network-request-failed",
            AppError::ServiceUnavailable(_) => "unavailable",
            AppError::Configuration(_) => "failed-precondition",
            AppError::Internal(_) => "internal",
        }
    }

    /// エラーメタデータを取得
    pub fn metadata(&self) -> ErrorMetadata {
        let code = self.code();
        match self {
            AppError::Domain(_) => ErrorMetadata {
                code,
                category: ErrorCategory::Client,
                severity: ErrorSeverity::Info,
            },

            AppError::WrongPassword | AppError::InvalidCredentials(_) => ErrorMetadata {
                code,
                category: ErrorCategory::Client,
                severity: ErrorSeverity::Warning,
            },

            AppError::InvalidEmail(_)
            | AppError::EmailAlreadyInUse(_)
            | AppError::WeakPassword(_)
            | AppError::PopupClosed => ErrorMetadata {
                code,
                category: ErrorCategory::Client,
                severity: ErrorSeverity::Info,
            },

            AppError::OperationNotAllowed(_)
            | AppError::NotAuthenticated
            | AppError::RequiresRecentLogin(_)
            | AppError::PermissionDenied(_) => ErrorMetadata {
                code,
                category: ErrorCategory::Client,
                severity: ErrorSeverity::Warning,
            },

            AppError::NotFound(_) => ErrorMetadata {
                code,
                category: ErrorCategory::Client,
                severity: ErrorSeverity::Info,
            },

            AppError::Network(_) | AppError::ServiceUnavailable(_) => ErrorMetadata {
                code,
                category: ErrorCategory::Transient,
                severity: ErrorSeverity::Error,
            },

            AppError::Serialization(_) | AppError::Configuration(_) => ErrorMetadata {
                code,
                category: ErrorCategory::Permanent,
                severity: ErrorSeverity::Error,
            },

            AppError::Internal(_) => ErrorMetadata {
                code,
                category: ErrorCategory::Server,
                severity: ErrorSeverity::Critical,
            },
        }
    }

    /// 現在のパスワードが誤っていることを示すエラーか
    pub fn is_wrong_password(&self) -> bool {
        matches!(
            self,
            AppError::WrongPassword | AppError::InvalidCredentials(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::DomainError;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::WrongPassword.code(), "auth/wrong-password");
        assert_eq!(
            AppError::Network("offline".to_string()).code(),
            "auth/network-request-failed"
        );
        assert_eq!(
            AppError::PermissionDenied("x".to_string()).code(),
            "permission-denied"
        );
    }

    #[test]
    fn test_wrong_password_classification() {
        let metadata = AppError::WrongPassword.metadata();
        assert_eq!(metadata.category, ErrorCategory::Client);
        assert_eq!(metadata.severity, ErrorSeverity::Warning);
        assert!(AppError::WrongPassword.is_wrong_password());
        assert!(!AppError::Network("x".to_string()).is_wrong_password());
    }

    #[test]
    fn test_network_errors_are_transient() {
        let metadata = AppError::Network("timeout".to_string()).metadata();
        assert_eq!(metadata.category, ErrorCategory::Transient);
        assert_eq!(metadata.severity, ErrorSeverity::Error);
    }

    #[test]
    fn test_domain_error_conversion() {
        let error: AppError = DomainError::EmptyTodoText.into();
        assert_eq!(error.code(), "invalid-argument");
        assert_eq!(error.to_string(), "Domain error: Todo text cannot be empty");
    }
}
