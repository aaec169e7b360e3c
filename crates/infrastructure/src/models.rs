use chrono::{DateTime, Utc};
use domain::{NewTodo, Todo, TodoId, TodoPatch, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared::AppError;

/// ToDoコレクション名
pub const TODOS_COLLECTION: &str = "todos";

/// コレクションに保存されるドキュメントの形
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoDocument {
    pub text: String,
    pub completed: bool,
    /// サーバー側で付与される作成時刻
    pub time: DateTime<Utc>,
    pub user_id: String,
}

impl TodoDocument {
    pub fn from_new(todo: &NewTodo, time: DateTime<Utc>) -> Self {
        Self {
            text: todo.text.as_str().to_string(),
            completed: todo.completed,
            time,
            user_id: todo.user_id.as_str().to_string(),
        }
    }

    pub fn to_value(&self) -> Result<Value, AppError> {
        serde_json::to_value(self).map_err(|e| AppError::Serialization(e.to_string()))
    }

    pub fn from_value(value: &Value) -> Result<Self, AppError> {
        Self::deserialize(value).map_err(|e| AppError::Serialization(e.to_string()))
    }

    pub fn into_todo(self, id: TodoId) -> Result<Todo, AppError> {
        Ok(Todo {
            id,
            user_id: UserId::from_string(self.user_id)?,
            text: self.text,
            completed: self.completed,
            created_at: self.time,
        })
    }
}

/// 部分更新のフィールド集合（指定されたフィールドのみ）
pub fn patch_fields(patch: &TodoPatch) -> Map<String, Value> {
    let mut fields = Map::new();
    if let Some(text) = &patch.text {
        fields.insert("text".to_string(), Value::String(text.as_str().to_string()));
    }
    if let Some(completed) = patch.completed {
        fields.insert("completed".to_string(), Value::Bool(completed));
    }
    fields
}

/// ドキュメントにフィールドをマージする。指定外のフィールドは保持される。
pub fn merge_fields(document: &mut Value, fields: Map<String, Value>) -> Result<(), AppError> {
    let object = document
        .as_object_mut()
        .ok_or_else(|| AppError::Serialization("document is not an object".to_string()))?;
    object.extend(fields);
    Ok(())
}

/// ドキュメントの所有者IDを読む
pub fn document_owner(document: &Value) -> Option<&str> {
    document.get("userId").and_then(Value::as_str)
}
