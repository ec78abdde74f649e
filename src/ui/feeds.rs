use crate::app::{App, ClickTarget, Focus};
use crate::sidebar::SidebarRow;
use crate::util::{display_width, fit_width};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::render::add_region;

const ADD_LABEL: &str = "[+] Add Feed";
const DELETE_LABEL: &str = "[x]";

/// Render the sidebar: add-feed control or form, then the feed rows.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    let is_focused = app.focus == Focus::Sidebar;
    let border_style = if is_focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" Feeds ({}) ", app.feeds.len()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }
    let width = usize::from(inner.width);

    // Form or button, then a blank spacer line
    let form_height: u16 = if app.sidebar.adding { 3 } else { 1 };
    let form_area = Rect::new(inner.x, inner.y, inner.width, form_height.min(inner.height));
    if app.sidebar.adding {
        render_form(f, app, form_area, width);
    } else {
        let button = Rect::new(
            inner.x,
            inner.y,
            (display_width(ADD_LABEL) as u16).min(inner.width),
            1,
        );
        f.render_widget(
            Paragraph::new(Span::styled(ADD_LABEL, app.style("sidebar_heading"))),
            button,
        );
        add_region(app, button, ClickTarget::AddFeedButton);
    }

    let list_top = inner.y + (form_height + 1).min(inner.height);
    let list_height = (inner.y + inner.height).saturating_sub(list_top);
    if list_height == 0 {
        return;
    }

    let rows = app.sidebar_rows();
    let visible = usize::from(list_height);
    let offset = (app.sidebar_cursor + 1).saturating_sub(visible);

    for (i, row) in rows.iter().enumerate().skip(offset).take(visible) {
        let y = list_top + (i - offset) as u16;
        let row_area = Rect::new(inner.x, y, inner.width, 1);
        let highlighted = is_focused && i == app.sidebar_cursor;
        render_row(f, app, row, row_area, highlighted);
    }
}

fn render_form(f: &mut Frame, app: &App, area: Rect, width: usize) {
    let input_room = width.saturating_sub(2);
    // Show the tail of long input so the cursor stays visible
    let input: String = {
        let chars: Vec<char> = app.sidebar.url_input.chars().collect();
        let start = chars.len().saturating_sub(input_room.saturating_sub(1));
        chars[start..].iter().collect()
    };
    let lines = vec![
        Line::from(Span::styled("Feed URL:", app.style("sidebar_heading"))),
        Line::from(vec![
            Span::raw("> "),
            Span::styled(format!("{}_", input), app.style("sidebar_input")),
        ]),
        Line::from(Span::styled(
            "Enter add  Esc cancel",
            app.style("header_meta"),
        )),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_row(f: &mut Frame, app: &mut App, row: &SidebarRow, area: Rect, highlighted: bool) {
    let style = if highlighted {
        app.style("sidebar_cursor")
    } else if row.selected {
        app.style("sidebar_selected")
    } else {
        app.style("sidebar_item")
    };

    add_region(app, area, ClickTarget::SidebarRow(row.target));

    let width = usize::from(area.width);
    let delete_width = display_width(DELETE_LABEL);
    let show_delete = row.deletable && width > delete_width + 4;

    let label_room = if show_delete {
        width - delete_width - 1
    } else {
        width
    };
    let label = fit_width(&row.label, label_room);

    let mut spans = vec![Span::styled(label, style)];
    if show_delete {
        spans.push(Span::styled(" ", style));
        spans.push(Span::styled(DELETE_LABEL, app.style("sidebar_delete")));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);

    if show_delete {
        if let Some(feed_id) = row.target {
            let x = area.x + area.width - delete_width as u16;
            add_region(
                app,
                Rect::new(x, area.y, delete_width as u16, 1),
                ClickTarget::SidebarDelete(feed_id),
            );
        }
    }
}
