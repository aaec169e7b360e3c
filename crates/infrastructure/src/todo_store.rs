use crate::subscription::Subscription;
use async_trait::async_trait;
use domain::{NewTodo, Todo, TodoId, TodoPatch, UserId};
use shared::AppError;

/// ToDoコレクションに対するドキュメント操作
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// 作成時刻はバックエンドが付与する
    async fn insert(&self, todo: NewTodo) -> Result<TodoId, AppError>;

    /// 存在しないドキュメントの更新は `NotFound`
    async fn update(&self, id: &TodoId, patch: TodoPatch) -> Result<(), AppError>;

    /// 存在しないドキュメントの削除は成功扱い
    async fn delete(&self, id: &TodoId) -> Result<(), AppError>;

    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, AppError>;

    /// 所有者IDで絞り込んだライブクエリ。変更のたびに全件スナップショットを配信する。
    fn watch_by_owner(&self, owner: &UserId) -> Subscription<Vec<Todo>>;
}
