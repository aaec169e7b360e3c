use crate::errors::DomainError;
use crate::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ToDo ID（ULID、生成順にソート可能）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// 文字列からToDo IDを作成
    pub fn from_string(id: String) -> Result<Self, DomainError> {
        if id.trim().is_empty() {
            return Err(DomainError::InvalidTodoId(
                "Todo ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ULIDに埋め込まれた生成時刻（ミリ秒）
    pub fn timestamp_ms(&self) -> Option<u64> {
        ulid::Ulid::from_string(&self.0)
            .ok()
            .map(|ulid| ulid.timestamp_ms())
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 空白のみではないことが保証されたToDo本文
///
/// 入力された文字列はトリムせずにそのまま保持する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TodoText(String);

impl TodoText {
    pub fn parse(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::EmptyTodoText);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for TodoText {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TodoText> for String {
    fn from(text: TodoText) -> Self {
        text.0
    }
}

/// ユーザーが所有するToDo項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub user_id: UserId,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// 新規作成リクエスト。作成時刻はバックエンド側で付与される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub user_id: UserId,
    pub text: TodoText,
    pub completed: bool,
}

impl NewTodo {
    pub fn new(user_id: UserId, text: TodoText) -> Self {
        Self {
            user_id,
            text,
            completed: false,
        }
    }
}

/// 部分更新。`None` のフィールドは変更しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub text: Option<TodoText>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn text(text: TodoText) -> Self {
        Self {
            text: Some(text),
            completed: None,
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            text: None,
            completed: Some(completed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_id_new_generates_26_char_string() {
        let todo_id = TodoId::new();
        let id_str = todo_id.as_str();

        assert_eq!(id_str.len(), 26);
        let valid_chars = "0123456789ABCDEFGHJKMNPQRSTVWXYZ";
        for c in id_str.chars() {
            assert!(valid_chars.contains(c), "Invalid character: {c}");
        }
        assert!(todo_id.timestamp_ms().is_some());
    }

    #[test]
    fn test_todo_id_from_string() {
        assert!(TodoId::from_string("1".to_string()).is_ok());
        assert_eq!(
            TodoId::from_string("  ".to_string()),
            Err(DomainError::InvalidTodoId(
                "Todo ID cannot be empty".to_string()
            ))
        );
    }

    #[test]
    fn test_todo_text_rejects_whitespace() {
        for input in ["", " ", "\t", "\n  \r\n", "\u{3000}"] {
            assert_eq!(TodoText::parse(input), Err(DomainError::EmptyTodoText));
        }
    }

    #[test]
    fn test_todo_text_keeps_untrimmed_text() {
        let text = TodoText::parse("  buy milk ").unwrap();
        assert_eq!(text.as_str(), "  buy milk ");
    }

    #[test]
    fn test_todo_text_deserialize_validates() {
        let ok: Result<TodoText, _> = serde_json::from_str("\"pay bills\"");
        assert!(ok.is_ok());

        let empty: Result<TodoText, _> = serde_json::from_str("\"   \"");
        assert!(empty.is_err());
    }

    #[test]
    fn test_new_todo_defaults_to_incomplete() {
        let user_id = UserId::from_string("alice".to_string()).unwrap();
        let todo = NewTodo::new(user_id, TodoText::parse("buy milk").unwrap());
        assert!(!todo.completed);
    }

    #[test]
    fn test_todo_patch_constructors() {
        assert_eq!(TodoPatch::default(), TodoPatch { text: None, completed: None });
        assert_eq!(TodoPatch::completed(true).completed, Some(true));
        assert!(TodoPatch::text(TodoText::parse("x").unwrap()).completed.is_none());
    }
}
