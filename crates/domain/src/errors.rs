use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid TodoId: {0}")]
    InvalidTodoId(String),

    #[error("Invalid UserId: {0}")]
    InvalidUserId(String),

    #[error("Todo text cannot be empty")]
    EmptyTodoText,

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid display name: {0}")]
    InvalidDisplayName(String),

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    // プロフィール更新のバリデーション
    #[error("New password and confirm new password must match.")]
    PasswordConfirmationMismatch,

    #[error("Current password is required to change the password.")]
    CurrentPasswordRequired,

    #[error("Validation error: {0}")]
    Validation(String),
}
