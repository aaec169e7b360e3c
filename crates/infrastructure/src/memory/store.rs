use super::{BackendOperation, InMemoryBackend};
use crate::models::{document_owner, merge_fields, patch_fields, TodoDocument};
use crate::subscription::Subscription;
use crate::todo_store::TodoStore;
use async_trait::async_trait;
use domain::{NewTodo, Todo, TodoId, TodoPatch, UserId};
use serde_json::Value;
use shared::AppError;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// 所有者で絞り込んだスナップショットを作る（ID順）
pub(super) fn project_owner(documents: &BTreeMap<TodoId, Value>, owner: &UserId) -> Vec<Todo> {
    documents
        .iter()
        .filter(|(_, document)| document_owner(document) == Some(owner.as_str()))
        .filter_map(|(id, document)| {
            match TodoDocument::from_value(document).and_then(|doc| doc.into_todo(id.clone())) {
                Ok(todo) => Some(todo),
                Err(e) => {
                    warn!(todo_id = %id, error = %e, "不正なドキュメントをスキップ");
                    None
                }
            }
        })
        .collect()
}

impl InMemoryBackend {
    /// 既存ドキュメントに対するルール判定（所有者のみ）
    fn check_owner(&self, id: &TodoId, document: &Value, session: &UserId) -> Result<(), AppError> {
        if document_owner(document) == Some(session.as_str()) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(format!(
                "todos/{id} is not owned by the current user"
            )))
        }
    }
}

#[async_trait]
impl TodoStore for InMemoryBackend {
    async fn insert(&self, todo: NewTodo) -> Result<TodoId, AppError> {
        self.enter(BackendOperation::Insert).await?;
        let session = self.require_session()?;
        if todo.user_id != session.uid {
            return Err(AppError::PermissionDenied(
                "todos can only be created for the current user".to_string(),
            ));
        }

        let id = TodoId::new();
        let document = TodoDocument::from_new(&todo, chrono::Utc::now()).to_value()?;
        self.inner.documents.send_modify(|docs| {
            docs.insert(id.clone(), document);
        });
        debug!(todo_id = %id, user_id = %todo.user_id, "ドキュメント作成");
        Ok(id)
    }

    async fn update(&self, id: &TodoId, patch: TodoPatch) -> Result<(), AppError> {
        self.enter(BackendOperation::Update).await?;
        let session = self.require_session()?;
        let fields = patch_fields(&patch);

        let mut outcome = Ok(());
        self.inner.documents.send_if_modified(|docs| {
            let Some(document) = docs.get_mut(id) else {
                outcome = Err(AppError::NotFound(format!("todos/{id}")));
                return false;
            };
            if let Err(e) = self.check_owner(id, document, &session.uid) {
                outcome = Err(e);
                return false;
            }
            if fields.is_empty() {
                return false;
            }
            match merge_fields(document, fields.clone()) {
                Ok(()) => true,
                Err(e) => {
                    outcome = Err(e);
                    false
                }
            }
        });
        outcome
    }

    async fn delete(&self, id: &TodoId) -> Result<(), AppError> {
        self.enter(BackendOperation::Delete).await?;
        let session = self.require_session()?;

        let mut outcome = Ok(());
        self.inner.documents.send_if_modified(|docs| {
            let Some(document) = docs.get(id) else {
                return false;
            };
            if let Err(e) = self.check_owner(id, document, &session.uid) {
                outcome = Err(e);
                return false;
            }
            docs.remove(id);
            true
        });
        outcome
    }

    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, AppError> {
        self.enter(BackendOperation::Get).await?;
        let session = self.require_session()?;

        let document = self.inner.documents.borrow().get(id).cloned();
        match document {
            Some(document) => {
                self.check_owner(id, &document, &session.uid)?;
                let todo = TodoDocument::from_value(&document)?.into_todo(id.clone())?;
                Ok(Some(todo))
            }
            None => Ok(None),
        }
    }

    fn watch_by_owner(&self, owner: &UserId) -> Subscription<Vec<Todo>> {
        let owner = owner.clone();
        Subscription::from_watch(self.inner.documents.subscribe(), move |documents| {
            project_owner(documents, &owner)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{AuthProvider, EmailCredential, TodoText};
    use crate::identity::IdentityService;

    async fn signed_in_backend() -> (InMemoryBackend, UserId) {
        let backend = InMemoryBackend::with_providers(vec![AuthProvider::Google]);
        let user = backend
            .sign_up_with_password(&EmailCredential::new("alice@example.com", "password1"))
            .await
            .unwrap();
        (backend, user.uid)
    }

    #[tokio::test]
    async fn test_insert_requires_session() {
        let backend = InMemoryBackend::default();
        let owner = UserId::new();
        let result = backend
            .insert(NewTodo::new(owner, TodoText::parse("x").unwrap()))
            .await;
        assert_eq!(result, Err(AppError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_insert_for_other_user_is_denied() {
        let (backend, _) = signed_in_backend().await;
        let result = backend
            .insert(NewTodo::new(UserId::new(), TodoText::parse("x").unwrap()))
            .await;
        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
        assert_eq!(backend.document_count(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let (backend, _) = signed_in_backend().await;
        let id = TodoId::new();
        let result = backend.update(&id, TodoPatch::completed(true)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_document_succeeds() {
        let (backend, _) = signed_in_backend().await;
        assert!(backend.delete(&TodoId::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_other_users_document_is_protected() {
        let (backend, _) = signed_in_backend().await;
        let bob = UserId::new();
        let id = backend.seed_todo(&bob, "bob's item", false).unwrap();

        assert!(matches!(backend.get(&id).await, Err(AppError::PermissionDenied(_))));
        assert!(matches!(
            backend.update(&id, TodoPatch::completed(true)).await,
            Err(AppError::PermissionDenied(_))
        ));
        assert!(matches!(backend.delete(&id).await, Err(AppError::PermissionDenied(_))));
        assert_eq!(backend.document_count(), 1);
    }

    #[test]
    fn test_project_owner_skips_malformed_documents() {
        let owner = UserId::from_string("alice".to_string()).unwrap();
        let mut docs = BTreeMap::new();
        docs.insert(
            TodoId::from_string("1".to_string()).unwrap(),
            serde_json::json!({ "userId": "alice", "text": "no flags" }),
        );
        docs.insert(
            TodoId::from_string("2".to_string()).unwrap(),
            serde_json::json!({
                "userId": "alice",
                "text": "ok",
                "completed": false,
                "time": "2024-01-01T00:00:00Z",
            }),
        );
        let todos = project_owner(&docs, &owner);
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].id.as_str(), "2");
    }
}
