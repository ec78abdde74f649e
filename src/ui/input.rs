//! Input handling for the TUI.
//!
//! Overlays capture input first (alert, confirmation, help), then the
//! add-feed form, then the keybinding registry for the focused panel.

use crate::app::{App, Focus};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use super::Action;

fn focus_to_context(focus: Focus) -> KbContext {
    match focus {
        Focus::Sidebar => KbContext::Sidebar,
        Focus::Articles => KbContext::Articles,
    }
}

/// Dispatch one key press.
pub(super) fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    // Raw mode swallows SIGINT
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    if app.alert.is_some() {
        app.dismiss_alert();
        return Action::Continue;
    }

    if app.pending_confirm.is_some() {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_pending(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_pending(),
            _ => {}
        }
        return Action::Continue;
    }

    if app.show_help {
        if matches!(
            code,
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')
        ) {
            app.show_help = false;
        }
        return Action::Continue;
    }

    if app.sidebar.adding {
        handle_form_input(app, code, modifiers);
        return Action::Continue;
    }

    let context = focus_to_context(app.focus);
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return Action::Continue;
    };

    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::NavDown => app.nav_down(),
        KbAction::NavUp => app.nav_up(),
        KbAction::CycleFocus => app.cycle_focus(),
        KbAction::Back => app.focus = Focus::Sidebar,
        KbAction::Select => app.activate(),
        KbAction::OpenInBrowser => app.open_article(app.article_cursor),
        KbAction::NextPage => app.next_page(),
        KbAction::PrevPage => app.prev_page(),
        KbAction::ToggleView => app.toggle_view_mode(),
        KbAction::ToggleTheme => app.toggle_theme(),
        KbAction::AddFeed => {
            app.focus = Focus::Sidebar;
            app.sidebar.toggle_form();
        }
        KbAction::DeleteFeed => match app.view.selected_feed_id {
            Some(feed_id) => app.request_delete(feed_id),
            None => app.set_status("Select a feed to delete it"),
        },
        KbAction::Refresh => app.refresh(),
        KbAction::ShowHelp => app.show_help = true,
    }
    Action::Continue
}

/// Typing into the add-feed URL field.
fn handle_form_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Enter => app.submit_add_feed(),
        KeyCode::Esc => app.sidebar.cancel(),
        KeyCode::Backspace => app.sidebar.pop_char(),
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.sidebar.url_input.clear();
        }
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            app.sidebar.push_char(c);
        }
        _ => {}
    }
}

/// Dispatch one mouse event. Left clicks bubble through the hit regions
/// recorded by the last render.
pub(super) fn handle_mouse(app: &mut App, mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.needs_redraw = true;
            if app.alert.is_some() {
                app.dismiss_alert();
            } else if app.show_help {
                app.show_help = false;
            } else if app.pending_confirm.is_none() {
                let path = app.click_path_at(mouse.column, mouse.row);
                app.click(&path);
            }
        }
        MouseEventKind::ScrollDown if !has_overlay(app) => {
            app.nav_down();
            app.needs_redraw = true;
        }
        MouseEventKind::ScrollUp if !has_overlay(app) => {
            app.nav_up();
            app.needs_redraw = true;
        }
        _ => {}
    }
    Action::Continue
}

fn has_overlay(app: &App) -> bool {
    app.alert.is_some() || app.pending_confirm.is_some() || app.show_help
}
