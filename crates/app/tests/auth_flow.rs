mod common;

use app::{
    render_auth, AppContext, AuthMode, AuthStatus, AuthView, Route, TodoListView,
    INVALID_CREDENTIALS_MESSAGE,
};
use common::{settle, setup, sign_up, PASSWORD, WAIT};
use domain::AuthProvider;
use infrastructure::{BackendOperation, IdentityService, InMemoryBackend};
use shared::{AppError, Config};
use tokio::time::timeout;

async fn next_status(view: &mut AuthView) -> AuthStatus {
    timeout(WAIT, view.next_event())
        .await
        .expect("認証状態が届かない")
        .expect("未マウント")
}

/// セッションがあればサインイン画面から一覧へ遷移する
#[tokio::test]
async fn test_existing_session_redirects_to_list() {
    let (backend, ctx) = setup();
    sign_up(&backend, "alice@example.com").await;
    ctx.navigator().navigate(Route::SignIn);

    let mut view = AuthView::sign_in(ctx.clone());
    view.mount();
    assert!(view.state().is_loading());

    assert_eq!(next_status(&mut view).await, AuthStatus::Authenticated);
    assert_eq!(ctx.navigator().current(), Route::Todos);
}

#[tokio::test]
async fn test_no_session_shows_form() {
    let (_backend, ctx) = setup();
    let mut view = AuthView::sign_in(ctx.clone());
    view.mount();
    assert_eq!(render_auth(AuthMode::SignIn, &view.state()), "Loading...");

    assert_eq!(next_status(&mut view).await, AuthStatus::Unauthenticated);
    assert_eq!(ctx.navigator().current(), Route::SignIn);
    assert!(render_auth(AuthMode::SignIn, &view.state()).contains("Sign in to your account"));
}

#[tokio::test]
async fn test_sign_in_with_wrong_password() {
    let (backend, ctx) = setup();
    sign_up(&backend, "alice@example.com").await;
    backend.sign_out().await.unwrap();

    let view = AuthView::sign_in(ctx.clone());
    view.set_email("alice@example.com");
    view.set_password("wrong-password");
    assert!(!view.submit().await);

    let state = view.state();
    assert_eq!(state.status, AuthStatus::Unauthenticated);
    assert_eq!(state.error.as_deref(), Some(INVALID_CREDENTIALS_MESSAGE));
    assert_eq!(ctx.navigator().current(), Route::SignIn);

    view.set_password(PASSWORD);
    assert!(view.state().error.is_none());
}

/// サインイン後に一覧画面を開くと自分の項目が表示される
#[tokio::test]
async fn test_sign_in_then_list() {
    let (backend, ctx) = setup();
    let alice = sign_up(&backend, "alice@example.com").await;
    backend.seed_todo(&alice.uid, "buy milk", false).unwrap();
    backend.sign_out().await.unwrap();

    let view = AuthView::sign_in(ctx.clone());
    view.set_email("  alice@example.com ");
    view.set_password(PASSWORD);
    assert!(view.submit().await);
    assert_eq!(view.state().status, AuthStatus::Authenticated);
    assert_eq!(ctx.navigator().current(), Route::Todos);

    let mut list = TodoListView::new(ctx.clone());
    list.mount();
    let state = settle(&mut list, |state| state.todos.len() == 1).await;
    assert_eq!(state.todos[0].text, "buy milk");
    assert_eq!(ctx.navigator().current(), Route::Todos);
}

#[tokio::test]
async fn test_sign_up_and_duplicate_email() {
    let (backend, ctx) = setup();
    let view = AuthView::sign_up(ctx.clone());
    view.set_email("alice@example.com");
    view.set_password(PASSWORD);
    assert!(view.submit().await);
    assert!(ctx.current_user().is_some());

    backend.sign_out().await.unwrap();
    let again = AuthView::sign_up(ctx.clone());
    again.set_email("alice@example.com");
    again.set_password(PASSWORD);
    assert!(!again.submit().await);
    assert_eq!(
        again.state().error.as_deref(),
        Some(INVALID_CREDENTIALS_MESSAGE)
    );
    assert_eq!(backend.call_count(BackendOperation::SignUp), 2);
}

#[tokio::test]
async fn test_sign_up_weak_password() {
    let (backend, ctx) = setup();
    let view = AuthView::sign_up(ctx);
    view.set_email("alice@example.com");
    view.set_password("12345");
    assert!(!view.submit().await);
    assert!(backend.current_user().is_none());
}

#[tokio::test]
async fn test_federated_sign_in() {
    let (backend, ctx) = setup();
    backend.stage_provider_identity(AuthProvider::Google, "carol@example.com", Some("Carol"));

    let view = AuthView::sign_in(ctx.clone());
    assert!(view.sign_in_with_provider(AuthProvider::Google).await);
    assert_eq!(ctx.navigator().current(), Route::Todos);

    let user = ctx.current_user().unwrap();
    assert_eq!(user.provider, AuthProvider::Google);
    assert_eq!(ctx.display_label(&user), "Carol");
}

/// 外部プロバイダーの失敗はエラー文言をそのまま表示する
#[tokio::test]
async fn test_federated_failure_shows_raw_message() {
    let (_backend, ctx) = setup();
    let view = AuthView::sign_in(ctx);
    assert!(!view.sign_in_with_provider(AuthProvider::Google).await);
    assert_eq!(
        view.state().error,
        Some(AppError::PopupClosed.to_string())
    );
}

#[tokio::test]
async fn test_disabled_provider() {
    let backend = InMemoryBackend::with_providers(Vec::new());
    let ctx = AppContext::in_memory(backend, Config::default());
    let view = AuthView::sign_in(ctx);

    assert!(!view.sign_in_with_provider(AuthProvider::Google).await);
    let error = view.state().error.unwrap();
    assert!(error.starts_with("Operation not allowed"));
}

#[tokio::test]
async fn test_navigation_links() {
    let (_backend, ctx) = setup();
    AuthView::sign_in(ctx.clone()).go_to_other_mode();
    assert_eq!(ctx.navigator().current(), Route::SignUp);

    AuthView::sign_up(ctx.clone()).go_to_other_mode();
    assert_eq!(ctx.navigator().current(), Route::SignIn);
}

#[tokio::test]
async fn test_unmounted_view_has_no_events() {
    let (_backend, ctx) = setup();
    let mut view = AuthView::sign_in(ctx);
    assert_eq!(view.next_event().await, None);
    view.mount();
    view.unmount();
    assert_eq!(view.next_event().await, None);
}
