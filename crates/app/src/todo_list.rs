use crate::context::AppContext;
use crate::item_editor::{EditTarget, ItemEditorModal};
use crate::navigator::{guard, Route};
use crate::profile_editor::{ProfileEditorModal, ProfileField};
use crate::session::{SessionEvent, SessionListener};
use crate::store::ViewStore;
use domain::{
    DomainError, EmailCredential, NewTodo, ProfileChangePlan, Todo, TodoFilter, TodoId, TodoPatch,
    TodoText, User,
};
use shared::{trace_backend_operation, AppError};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

const SERVICE: &str = "todo-list";

/// 一覧画面の状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListState {
    /// 見出しに表示するユーザー名
    pub username: String,
    pub user: Option<User>,
    /// 最新のスナップショット。ローカルでは変更しない。
    pub todos: Vec<Todo>,
    pub filter: TodoFilter,
    pub draft: String,
    pub show_emoji_picker: bool,
    pub item_editor: ItemEditorModal,
    pub profile_editor: ProfileEditorModal,
}

impl TodoListState {
    pub fn visible_todos(&self) -> Vec<&Todo> {
        self.filter.apply(&self.todos)
    }

    pub fn heading(&self) -> String {
        format!("{}'s ToDo List", self.username)
    }

    pub fn find(&self, id: &TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| &todo.id == id)
    }
}

/// プロフィール更新の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSubmitOutcome {
    Saved,
    /// ローカル検証エラー。バックエンドには問い合わせていない。
    Invalid(DomainError),
    WrongPassword,
    Failed(AppError),
    NoSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileUpdateError {
    #[error("re-authentication failed: {0}")]
    Reauthentication(AppError),

    #[error("profile update failed: {0}")]
    Backend(AppError),
}

/// 再認証、パスワード更新、表示名更新の順に実行する
///
/// 再認証に失敗した場合は表示名も更新しない。表示名を更新した場合は更新後のユーザーを返す。
pub async fn apply_profile_change(
    ctx: &AppContext,
    user: &User,
    plan: &ProfileChangePlan,
) -> Result<Option<User>, ProfileUpdateError> {
    if let Some(change) = &plan.password_change {
        let credential = EmailCredential::new(
            user.email.clone().unwrap_or_default(),
            change.current_password.clone(),
        );
        trace_backend_operation(
            SERVICE,
            "reauthenticate",
            ctx.identity().reauthenticate(user, &credential),
        )
        .await
        .map_err(ProfileUpdateError::Reauthentication)?;

        trace_backend_operation(
            SERVICE,
            "update_password",
            ctx.identity().update_password(user, &change.new_password),
        )
        .await
        .map_err(ProfileUpdateError::Backend)?;
        info!(user_id = %user.uid, "パスワードを更新しました");
    }

    match plan.display_name_change(user.display_name.as_deref()) {
        Some(name) => {
            let updated = trace_backend_operation(
                SERVICE,
                "update_display_name",
                ctx.identity().update_display_name(user, name),
            )
            .await
            .map_err(ProfileUpdateError::Backend)?;
            info!(user_id = %user.uid, "表示名を更新しました");
            Ok(Some(updated))
        }
        None => Ok(None),
    }
}

/// ToDo一覧画面
pub struct TodoListView {
    ctx: AppContext,
    session: SessionListener,
    store: ViewStore<TodoListState>,
}

impl TodoListView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            session: SessionListener::new(ctx.clone()),
            store: ViewStore::new(TodoListState::default()),
            ctx,
        }
    }

    /// 画面表示時の処理。セッションがなければサインインへ遷移する。
    pub fn mount(&mut self) {
        let has_session = self.ctx.current_user().is_some();
        let route = guard(Route::Todos, has_session);
        if route != Route::Todos {
            self.ctx.navigator().navigate(route);
        }
        self.session.mount();
    }

    pub fn unmount(&mut self) {
        self.session.teardown();
        self.store.update(|state| *state = TodoListState::default());
        self.store.publish();
    }

    pub fn state(&self) -> TodoListState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<TodoListState> {
        self.store.subscribe()
    }

    pub fn has_data_subscription(&self) -> bool {
        self.session.has_data_subscription()
    }

    /// セッションリスナーからの次のイベントを状態に反映する
    pub async fn next_update(&mut self) -> Option<SessionEvent> {
        let event = self.session.next_event().await?;
        match &event {
            SessionEvent::SignedIn(user) => {
                let username = self.ctx.display_label(user);
                self.store.update(|state| {
                    if state.user.as_ref().map(|u| &u.uid) != Some(&user.uid) {
                        state.todos.clear();
                    }
                    state.username = username;
                    state.user = Some(user.clone());
                });
            }
            SessionEvent::SignedOut => {
                self.store.update(|state| *state = TodoListState::default());
            }
            SessionEvent::Snapshot(todos) => {
                debug!(count = todos.len(), "スナップショットを受信");
                self.store.update(|state| state.todos = todos.clone());
            }
        }
        self.store.publish();
        Some(event)
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        let text = text.into();
        self.store.update(|state| state.draft = text);
        self.store.publish();
    }

    pub fn toggle_emoji_picker(&self) {
        self.store
            .update(|state| state.show_emoji_picker = !state.show_emoji_picker);
        self.store.publish();
    }

    /// 選択した絵文字を入力中のテキストに追加する
    pub fn insert_emoji(&self, emoji: &str) {
        self.store.update(|state| state.draft.push_str(emoji));
        self.store.publish();
    }

    /// 入力中のテキストで項目を追加する。空白のみの場合は何もしない。
    pub async fn add_todo(&self) -> Option<TodoId> {
        let draft = self.store.read(|state| state.draft.clone());
        let text = match TodoText::parse(draft) {
            Ok(text) => text,
            Err(_) => {
                debug!("空のToDoは追加しません");
                return None;
            }
        };
        let Some(user) = self.ctx.current_user() else {
            warn!("サインインしていないため追加できません");
            return None;
        };

        let new_todo = NewTodo::new(user.uid.clone(), text);
        match trace_backend_operation(SERVICE, "add_todo", self.ctx.todos().insert(new_todo)).await
        {
            Ok(id) => {
                info!(user_id = %user.uid, todo_id = %id, "ToDoを追加しました");
                self.store.update(|state| {
                    state.draft.clear();
                    state.show_emoji_picker = false;
                });
                self.store.publish();
                Some(id)
            }
            Err(e) => {
                error!(error = %e, "ToDoの追加に失敗しました");
                None
            }
        }
    }

    /// 確認なしで削除する
    pub async fn delete_todo(&self, id: &TodoId) -> bool {
        match trace_backend_operation(SERVICE, "delete_todo", self.ctx.todos().delete(id)).await {
            Ok(()) => {
                info!(todo_id = %id, "ToDoを削除しました");
                true
            }
            Err(e) => {
                error!(todo_id = %id, error = %e, "ToDoの削除に失敗しました");
                false
            }
        }
    }

    /// 完了状態を反転する
    ///
    /// 読み取りと書き込みは別の呼び出しで、同時に反転すると後勝ちになる。
    pub async fn toggle_completion(&self, id: &TodoId) -> bool {
        let current = match trace_backend_operation(SERVICE, "get_todo", self.ctx.todos().get(id))
            .await
        {
            Ok(Some(todo)) => todo,
            Ok(None) => {
                warn!(todo_id = %id, "対象のToDoが存在しません");
                return false;
            }
            Err(e) => {
                error!(todo_id = %id, error = %e, "ToDoの取得に失敗しました");
                return false;
            }
        };

        let patch = TodoPatch::completed(!current.completed);
        match trace_backend_operation(SERVICE, "toggle_todo", self.ctx.todos().update(id, patch))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!(todo_id = %id, error = %e, "完了状態の更新に失敗しました");
                false
            }
        }
    }

    /// 最新のスナップショットにある項目で編集モーダルを開く
    pub fn open_item_editor(&self, id: &TodoId) -> bool {
        let opened = self.store.update(|state| {
            let target = state.find(id).map(EditTarget::from);
            match target {
                Some(target) => {
                    state.item_editor.open(target);
                    true
                }
                None => false,
            }
        });
        if opened {
            self.store.publish();
        } else {
            warn!(todo_id = %id, "編集対象のToDoが見つかりません");
        }
        opened
    }

    pub fn set_item_editor_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.store.update(|state| state.item_editor.set_text(text));
        self.store.publish();
    }

    pub fn close_item_editor(&self) {
        self.store.update(|state| state.item_editor.close());
        self.store.publish();
    }

    /// 編集内容を保存してモーダルを閉じる。テキストのみ更新する。
    pub async fn save_item_edit(&self) -> bool {
        let saved = match self.store.read(|state| state.item_editor.save_request()) {
            Ok((id, text)) => {
                match trace_backend_operation(
                    SERVICE,
                    "edit_todo",
                    self.ctx.todos().update(&id, TodoPatch::text(text)),
                )
                .await
                {
                    Ok(()) => {
                        info!(todo_id = %id, "ToDoを編集しました");
                        true
                    }
                    Err(e) => {
                        error!(todo_id = %id, error = %e, "ToDoの編集に失敗しました");
                        false
                    }
                }
            }
            Err(e) => {
                debug!(error = %e, "編集内容が不正なため保存しません");
                false
            }
        };
        self.close_item_editor();
        saved
    }

    pub fn set_filter(&self, filter: TodoFilter) {
        self.store.update(|state| state.filter = filter);
        self.store.publish();
    }

    /// サインアウトしてサインイン画面へ遷移する。失敗はログのみ。
    pub async fn sign_out(&self) -> bool {
        match trace_backend_operation(SERVICE, "sign_out", self.ctx.identity().sign_out()).await {
            Ok(()) => {
                self.ctx.navigator().navigate(Route::SignIn);
                true
            }
            Err(e) => {
                error!(error = %e, "サインアウトに失敗しました");
                false
            }
        }
    }

    pub fn open_profile_editor(&self) {
        self.store.update(|state| state.profile_editor.open());
        self.store.publish();
    }

    pub fn set_profile_field(&self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        self.store
            .update(|state| state.profile_editor.set_field(field, value));
        self.store.publish();
    }

    pub fn close_profile_editor(&self) {
        self.store.update(|state| state.profile_editor.close());
        self.store.publish();
    }

    /// プロフィール編集の送信
    ///
    /// 全ての更新が成功した場合のみモーダルを閉じる。
    pub async fn submit_profile(&self) -> ProfileSubmitOutcome {
        let Some(user) = self.ctx.current_user() else {
            warn!("サインインしていないためプロフィールを更新できません");
            return ProfileSubmitOutcome::NoSession;
        };

        let plan = match self.store.update(|state| state.profile_editor.validate()) {
            Ok(plan) => plan,
            Err(e) => {
                debug!(error = %e, "プロフィール入力の検証エラー");
                self.store.publish();
                return ProfileSubmitOutcome::Invalid(e);
            }
        };

        let outcome = match apply_profile_change(&self.ctx, &user, &plan).await {
            Ok(updated) => {
                let username = updated.as_ref().map(|u| self.ctx.display_label(u));
                self.store.update(|state| {
                    if let (Some(username), Some(updated)) = (username, updated) {
                        state.username = username;
                        state.user = Some(updated);
                    }
                    state.profile_editor.close();
                });
                ProfileSubmitOutcome::Saved
            }
            Err(ProfileUpdateError::Reauthentication(e)) if e.is_wrong_password() => {
                warn!(user_id = %user.uid, "現在のパスワードが一致しません");
                self.store
                    .update(|state| state.profile_editor.show_wrong_password());
                ProfileSubmitOutcome::WrongPassword
            }
            Err(ProfileUpdateError::Reauthentication(e)) | Err(ProfileUpdateError::Backend(e)) => {
                error!(user_id = %user.uid, error = %e, "プロフィールの更新に失敗しました");
                ProfileSubmitOutcome::Failed(e)
            }
        };
        self.store.publish();
        outcome
    }
}
