use crate::app::{App, Focus};
use crate::keybindings::Action;
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar: the current message, or key hints.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.sidebar.adding {
        Cow::Borrowed("Type a feed URL | Enter add | Esc cancel")
    } else {
        Cow::Owned(hints(app))
    };

    let paragraph = Paragraph::new(text).style(app.style("status_bar"));
    f.render_widget(paragraph, area);
}

/// Key hints built from the live bindings, so overrides show up.
fn hints(app: &App) -> String {
    let mut actions = vec![
        (Action::Select, "select"),
        (Action::NextPage, "next"),
        (Action::PrevPage, "prev"),
        (Action::ToggleView, "view"),
        (Action::ToggleTheme, "theme"),
        (Action::AddFeed, "add"),
    ];
    match app.focus {
        Focus::Sidebar => actions.push((Action::DeleteFeed, "delete")),
        Focus::Articles => actions.push((Action::OpenInBrowser, "open")),
    }
    actions.extend([(Action::ShowHelp, "help"), (Action::Quit, "quit")]);

    actions
        .into_iter()
        .filter_map(|(action, label)| {
            let keys = app.keybindings.keys_for(action);
            let first = keys.split(", ").next()?.to_string();
            (!first.is_empty()).then(|| format!("[{}]{}", first, label))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
