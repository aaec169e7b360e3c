#![allow(dead_code)]

use app::{AppContext, TodoListState, TodoListView};
use domain::{EmailCredential, User};
use infrastructure::{IdentityService, InMemoryBackend};
use shared::Config;
use std::time::Duration;
use tokio::time::timeout;

pub const WAIT: Duration = Duration::from_secs(1);
pub const PASSWORD: &str = "password1";

/// テスト用のバックエンドとコンテキスト
pub fn setup() -> (InMemoryBackend, AppContext) {
    let config = Config::default();
    let backend = InMemoryBackend::new(&config);
    let ctx = AppContext::in_memory(backend.clone(), config);
    (backend, ctx)
}

pub async fn sign_up(backend: &InMemoryBackend, email: &str) -> User {
    backend
        .sign_up_with_password(&EmailCredential::new(email, PASSWORD))
        .await
        .expect("サインアップに失敗")
}

/// サインイン済みで一覧画面を表示した状態
pub async fn signed_in_view(email: &str) -> (InMemoryBackend, AppContext, User, TodoListView) {
    let (backend, ctx) = setup();
    let user = sign_up(&backend, email).await;
    let mut view = TodoListView::new(ctx.clone());
    view.mount();
    let uid = user.uid.clone();
    settle(&mut view, |state| {
        state.user.as_ref().map(|u| &u.uid) == Some(&uid)
    })
    .await;
    (backend, ctx, user, view)
}

/// 条件を満たすまでセッションイベントを処理する
pub async fn settle<F>(view: &mut TodoListView, done: F) -> TodoListState
where
    F: Fn(&TodoListState) -> bool,
{
    timeout(WAIT, async {
        loop {
            let state = view.state();
            if done(&state) {
                return state;
            }
            view.next_update()
                .await
                .expect("セッションリスナーが終了した");
        }
    })
    .await
    .expect("状態が更新されない")
}
