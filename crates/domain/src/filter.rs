use crate::errors::DomainError;
use crate::todo::Todo;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 一覧表示の絞り込み条件（クライアントローカル、永続化しない）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoFilter {
    #[default]
    All,
    Ongoing,
    Completed,
}

impl TodoFilter {
    pub const ALL: [TodoFilter; 3] = [TodoFilter::All, TodoFilter::Ongoing, TodoFilter::Completed];

    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            TodoFilter::All => true,
            TodoFilter::Ongoing => !todo.completed,
            TodoFilter::Completed => todo.completed,
        }
    }

    /// スナップショットに絞り込みを適用する。順序は維持される。
    pub fn apply<'a>(&self, todos: &'a [Todo]) -> Vec<&'a Todo> {
        todos.iter().filter(|todo| self.matches(todo)).collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TodoFilter::All => "all",
            TodoFilter::Ongoing => "ongoing",
            TodoFilter::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TodoFilter::All => "All",
            TodoFilter::Ongoing => "Ongoing",
            TodoFilter::Completed => "Completed",
        }
    }
}

impl FromStr for TodoFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TodoFilter::All),
            "ongoing" => Ok(TodoFilter::Ongoing),
            "completed" => Ok(TodoFilter::Completed),
            other => Err(DomainError::UnknownFilter(other.to_string())),
        }
    }
}

impl std::fmt::Display for TodoFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
