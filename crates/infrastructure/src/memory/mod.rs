//! プロセス内で動作するバックエンド実装
//!
//! 認証サービスとドキュメントデータベースを1つのハンドルで提供する。
//! ローカル実行とテストで使用し、セキュリティルール（所有者のみ書き込み可）も再現する。

mod faults;
mod identity;
mod password;
mod store;

pub use faults::BackendOperation;

use dashmap::DashMap;
use domain::{AuthProvider, Todo, TodoId, User, UserId};
use crate::models::TodoDocument;
use faults::FaultInjector;
use serde_json::Value;
use shared::{AppError, Config};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

/// 認証アカウント
#[derive(Debug, Clone)]
struct Account {
    user: User,
    password_hash: Option<String>,
}

/// フェデレーション認証のポップアップで選択されるID
#[derive(Debug, Clone)]
struct ProviderIdentity {
    email: String,
    display_name: Option<String>,
}

struct Inner {
    accounts: DashMap<UserId, Account>,
    emails: DashMap<String, UserId>,
    provider_identities: DashMap<AuthProvider, ProviderIdentity>,
    enabled_providers: Vec<AuthProvider>,
    session: watch::Sender<Option<User>>,
    documents: watch::Sender<BTreeMap<TodoId, Value>>,
    faults: FaultInjector,
}

#[derive(Clone)]
pub struct InMemoryBackend {
    inner: Arc<Inner>,
}

impl InMemoryBackend {
    pub fn new(config: &Config) -> Self {
        Self::with_providers(config.federated_providers.clone())
    }

    pub fn with_providers(enabled_providers: Vec<AuthProvider>) -> Self {
        let (session, _) = watch::channel(None);
        let (documents, _) = watch::channel(BTreeMap::new());
        Self {
            inner: Arc::new(Inner {
                accounts: DashMap::new(),
                emails: DashMap::new(),
                provider_identities: DashMap::new(),
                enabled_providers,
                session,
                documents,
                faults: FaultInjector::default(),
            }),
        }
    }

    /// 次回のフェデレーション認証で返すIDを登録する
    pub fn stage_provider_identity(
        &self,
        provider: AuthProvider,
        email: &str,
        display_name: Option<&str>,
    ) {
        self.inner.provider_identities.insert(
            provider,
            ProviderIdentity {
                email: email.to_string(),
                display_name: display_name.map(str::to_string),
            },
        );
    }

    /// 指定した操作の次回呼び出しを失敗させる
    pub fn inject_failure(&self, operation: BackendOperation, error: AppError) {
        self.inner.faults.inject(operation, error);
    }

    /// 操作の呼び出し回数（失敗を含む）
    pub fn call_count(&self, operation: BackendOperation) -> usize {
        self.inner.faults.call_count(operation)
    }

    /// セキュリティルールを経由せずにドキュメントを投入する
    pub fn seed_todo(&self, owner: &UserId, text: &str, completed: bool) -> Result<TodoId, AppError> {
        let id = TodoId::new();
        let document = TodoDocument {
            text: text.to_string(),
            completed,
            time: chrono::Utc::now(),
            user_id: owner.as_str().to_string(),
        }
        .to_value()?;
        self.inner.documents.send_modify(|docs| {
            docs.insert(id.clone(), document);
        });
        Ok(id)
    }

    /// 保存されている生ドキュメントを取得する
    pub fn raw_document(&self, id: &TodoId) -> Option<Value> {
        self.inner.documents.borrow().get(id).cloned()
    }

    pub fn document_count(&self) -> usize {
        self.inner.documents.borrow().len()
    }

    /// 所有者の全ToDoをID順で取得する（ルールを経由しない）
    pub fn todos_of(&self, owner: &UserId) -> Vec<Todo> {
        store::project_owner(&self.inner.documents.borrow(), owner)
    }

    async fn enter(&self, operation: BackendOperation) -> Result<(), AppError> {
        // ネットワーク越しの呼び出しと同様に一度制御を返す
        tokio::task::yield_now().await;
        self.inner.faults.enter(operation)
    }

    /// 現在のセッションのユーザーを要求する
    fn require_session(&self) -> Result<User, AppError> {
        self.inner
            .session
            .borrow()
            .clone()
            .ok_or(AppError::NotAuthenticated)
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
