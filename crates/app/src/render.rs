//! 端末向けのテキスト描画

use crate::auth_view::{AuthMode, CredentialFormState};
use crate::todo_list::TodoListState;
use domain::TodoFilter;
use std::fmt::Write;

const LOADING: &str = "Loading...";

pub fn render_auth(mode: AuthMode, state: &CredentialFormState) -> String {
    if state.is_loading() {
        return LOADING.to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", mode.title());
    let _ = writeln!(out, "Your email: {}", state.email);
    let _ = writeln!(out, "Password:   {}", mask(&state.password));
    if let Some(error) = &state.error {
        let _ = writeln!(out, "! {error}");
    }
    let _ = writeln!(out, "{}", mode.link_prompt());
    out
}

pub fn render_todo_list(state: &TodoListState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", state.heading());

    let filters: Vec<String> = TodoFilter::ALL
        .iter()
        .map(|filter| {
            if *filter == state.filter {
                format!("[{}]", filter.label())
            } else {
                filter.label().to_string()
            }
        })
        .collect();
    let _ = writeln!(out, "Filter: {}", filters.join(" "));

    let visible = state.visible_todos();
    if visible.is_empty() {
        let _ = writeln!(out, "  (no items)");
    }
    for (index, todo) in visible.iter().enumerate() {
        let mark = if todo.completed { "x" } else { " " };
        let _ = writeln!(out, "  {:>2}. [{mark}] {}", index + 1, todo.text);
    }

    let _ = writeln!(out, "> {}", state.draft);
    if state.show_emoji_picker {
        let _ = writeln!(out, "  (emoji picker open)");
    }

    if state.item_editor.is_open {
        let _ = writeln!(out, "-- Edit ToDo --");
        let _ = writeln!(out, "  {}", state.item_editor.buffer);
    }

    let profile = &state.profile_editor;
    if profile.is_open {
        let _ = writeln!(out, "-- Edit Profile --");
        let _ = writeln!(out, "  Display name: {}", profile.form.new_display_name);
        let _ = writeln!(
            out,
            "  Current password: {}",
            mask(&profile.form.current_password)
        );
        if let Some(error) = &profile.password_error {
            let _ = writeln!(out, "  ! {error}");
        }
        let _ = writeln!(out, "  New password: {}", mask(&profile.form.new_password));
        let _ = writeln!(
            out,
            "  Confirm new password: {}",
            mask(&profile.form.confirm_new_password)
        );
        if let Some(error) = &profile.confirm_password_error {
            let _ = writeln!(out, "  ! {error}");
        }
    }
    out
}

fn mask(secret: &str) -> String {
    "•".repeat(secret.chars().count())
}
