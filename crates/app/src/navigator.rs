use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    SignIn,
    SignUp,
    Todos,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::SignIn => "/signin",
            Route::SignUp => "/signup",
            Route::Todos => "/",
        }
    }

    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Todos)
    }
}

/// セッションの有無による遷移先の決定
///
/// セッションなしで一覧を要求するとサインインへ、セッションありで認証画面を要求すると一覧へ。
pub fn guard(requested: Route, has_session: bool) -> Route {
    match (requested.requires_session(), has_session) {
        (true, false) => Route::SignIn,
        (false, true) => Route::Todos,
        _ => requested,
    }
}

/// クライアント側のナビゲーター
#[derive(Clone)]
pub struct Navigator {
    current: Arc<watch::Sender<Route>>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (current, _) = watch::channel(initial);
        Self {
            current: Arc::new(current),
        }
    }

    pub fn navigate(&self, route: Route) {
        let previous = self.current.send_replace(route);
        if previous != route {
            info!(from = previous.path(), to = route.path(), "画面遷移");
        }
    }

    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard() {
        assert_eq!(guard(Route::Todos, false), Route::SignIn);
        assert_eq!(guard(Route::Todos, true), Route::Todos);
        assert_eq!(guard(Route::SignIn, true), Route::Todos);
        assert_eq!(guard(Route::SignUp, true), Route::Todos);
        assert_eq!(guard(Route::SignIn, false), Route::SignIn);
        assert_eq!(guard(Route::SignUp, false), Route::SignUp);
    }

    #[test]
    fn test_navigator_shares_state_between_clones() {
        let navigator = Navigator::new(Route::SignIn);
        let other = navigator.clone();
        let receiver = navigator.subscribe();

        other.navigate(Route::Todos);
        assert_eq!(navigator.current(), Route::Todos);
        assert_eq!(*receiver.borrow(), Route::Todos);
    }
}
