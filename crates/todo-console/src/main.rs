mod command;

use anyhow::Context;
use app::{render_auth, render_todo_list, AppContext, AuthMode, AuthView, Route, TodoListView};
use command::{Command, HELP};
use domain::{AuthProvider, TodoId};
use infrastructure::InMemoryBackend;
use shared::{init_tracing, Config};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// 表示中の画面
enum Screen {
    Auth(AuthView),
    List(TodoListView),
}

impl Screen {
    fn open(ctx: &AppContext, route: Route) -> Self {
        match route {
            Route::SignIn | Route::SignUp => {
                let mode = if route == Route::SignIn {
                    AuthMode::SignIn
                } else {
                    AuthMode::SignUp
                };
                let mut view = AuthView::new(ctx.clone(), mode);
                view.mount();
                Screen::Auth(view)
            }
            Route::Todos => {
                let mut view = TodoListView::new(ctx.clone());
                view.mount();
                Screen::List(view)
            }
        }
    }

    fn route(&self) -> Route {
        match self {
            Screen::Auth(view) => view.mode().route(),
            Screen::List(_) => Route::Todos,
        }
    }

    fn unmount(&mut self) {
        match self {
            Screen::Auth(view) => view.unmount(),
            Screen::List(view) => view.unmount(),
        }
    }

    /// 購読からの更新を待つ。購読が終了していれば待ち続ける。
    async fn next_update(&mut self) {
        let updated = match self {
            Screen::Auth(view) => view.next_event().await.is_some(),
            Screen::List(view) => view.next_update().await.is_some(),
        };
        if !updated {
            std::future::pending::<()>().await;
        }
    }

    fn render(&self) -> String {
        match self {
            Screen::Auth(view) => render_auth(view.mode(), &view.state()),
            Screen::List(view) => render_todo_list(&view.state()),
        }
    }

    /// 表示中の n 番目の項目
    fn visible_item(&self, n: usize) -> Option<TodoId> {
        match self {
            Screen::List(view) => view
                .state()
                .visible_todos()
                .get(n - 1)
                .map(|todo| todo.id.clone()),
            Screen::Auth(_) => None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("設定の読み込みに失敗")?;
    if let Err(e) = init_tracing(&config) {
        eprintln!("トレーシング初期化エラー: {e}");
    }
    info!(
        environment = %config.environment,
        project_id = %config.project_id,
        "todo-console を起動"
    );

    let backend = InMemoryBackend::new(&config);
    let ctx = AppContext::in_memory(backend.clone(), config);
    let mut routes = ctx.navigator().subscribe();
    let mut screen = Screen::open(&ctx, ctx.navigator().current());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    loop {
        tokio::select! {
            changed = routes.changed() => {
                if changed.is_err() {
                    break;
                }
                let route = *routes.borrow_and_update();
                if route != screen.route() {
                    screen.unmount();
                    screen = Screen::open(&ctx, route);
                    println!("{}", screen.render());
                }
            }
            () = screen.next_update() => {
                println!("{}", screen.render());
            }
            line = lines.next_line() => {
                let Some(line) = line.context("標準入力の読み込みに失敗")? else {
                    break;
                };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        run(&screen, &backend, command).await;
                        println!("{}", screen.render());
                    }
                    Err(command::ParseError::Empty) => {}
                    Err(e) => println!("{e}"),
                }
            }
        }
    }

    screen.unmount();
    info!("todo-console を終了");
    Ok(())
}

async fn run(screen: &Screen, backend: &InMemoryBackend, command: Command) {
    match (screen, command) {
        (_, Command::Help) => println!("{HELP}"),
        (_, Command::RegisterGoogle { email, name }) => {
            backend.stage_provider_identity(AuthProvider::Google, &email, name.as_deref());
        }
        (Screen::Auth(view), Command::SignIn { email, password })
        | (Screen::Auth(view), Command::SignUp { email, password }) => {
            view.set_email(email);
            view.set_password(password);
            view.submit().await;
        }
        (Screen::Auth(view), Command::Google) => {
            view.sign_in_with_provider(AuthProvider::Google).await;
        }
        (Screen::Auth(view), Command::SwitchMode) => view.go_to_other_mode(),
        (Screen::List(view), Command::Add(text)) => {
            if !text.is_empty() {
                view.set_draft(text);
            }
            view.add_todo().await;
        }
        (Screen::List(view), Command::Draft(text)) => view.set_draft(text),
        (Screen::List(view), Command::Emoji(emoji)) => view.insert_emoji(&emoji),
        (Screen::List(view), Command::Picker) => view.toggle_emoji_picker(),
        (Screen::List(view), Command::Toggle(n)) => {
            if let Some(id) = screen.visible_item(n) {
                view.toggle_completion(&id).await;
            }
        }
        (Screen::List(view), Command::Delete(n)) => {
            if let Some(id) = screen.visible_item(n) {
                view.delete_todo(&id).await;
            }
        }
        (Screen::List(view), Command::Edit(n)) => {
            if let Some(id) = screen.visible_item(n) {
                view.open_item_editor(&id);
            }
        }
        (Screen::List(view), Command::EditText(text)) => view.set_item_editor_text(text),
        (Screen::List(view), Command::Save) => {
            view.save_item_edit().await;
        }
        (Screen::List(view), Command::Cancel) => view.close_item_editor(),
        (Screen::List(view), Command::Filter(filter)) => view.set_filter(filter),
        (Screen::List(view), Command::Profile) => view.open_profile_editor(),
        (Screen::List(view), Command::ProfileInput(field, value)) => {
            view.set_profile_field(field, value)
        }
        (Screen::List(view), Command::Update) => {
            view.submit_profile().await;
        }
        (Screen::List(view), Command::Close) => view.close_profile_editor(),
        (Screen::List(view), Command::SignOut) => {
            view.sign_out().await;
        }
        (_, command) => warn!(?command, route = screen.route().path(), "この画面では使えないコマンド"),
    }
}
