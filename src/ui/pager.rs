//! Pager row: previous, page numbers around the current page, next.

use crate::app::{App, ClickTarget};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::render::add_region;

const PREV_LABEL: &str = "‹ Prev";
const NEXT_LABEL: &str = "Next ›";

/// One button of the pager row.
struct Button {
    label: String,
    style: Style,
    target: Option<ClickTarget>,
}

fn buttons(app: &App) -> Vec<Button> {
    let view = &app.view;
    let mut out = Vec::new();

    out.push(Button {
        label: PREV_LABEL.to_string(),
        style: app.style(if view.has_prev() { "pager_button" } else { "pager_disabled" }),
        target: view.has_prev().then_some(ClickTarget::PrevPage),
    });

    for page in view.page_window() {
        let current = page == view.current_page;
        out.push(Button {
            label: format!(" {} ", page),
            style: app.style(if current { "pager_current" } else { "pager_button" }),
            target: (!current).then_some(ClickTarget::Page(page)),
        });
    }

    out.push(Button {
        label: NEXT_LABEL.to_string(),
        style: app.style(if view.has_next() { "pager_button" } else { "pager_disabled" }),
        target: view.has_next().then_some(ClickTarget::NextPage),
    });

    out
}

/// Render the pager centred in `area`.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let buttons = buttons(app);
    let total_width: usize = buttons.iter().map(|b| b.label.chars().count() + 1).sum::<usize>() - 1;
    let summary = format!(
        "  Page {} of {}",
        app.view.current_page,
        app.view.total_pages()
    );

    let total_width = total_width.min(usize::from(area.width));
    let mut x = area.x + (area.width - total_width as u16) / 2;
    let right = area.x + area.width;

    let mut spans = Vec::with_capacity(buttons.len() * 2 + 1);
    spans.push(Span::raw(" ".repeat(usize::from(x - area.x))));
    for button in buttons {
        let width = button.label.chars().count() as u16;
        if x + width > right {
            break;
        }
        if let Some(target) = button.target {
            add_region(app, Rect::new(x, area.y, width, 1), target);
        }
        spans.push(Span::styled(button.label, button.style));
        spans.push(Span::raw(" "));
        x += width + 1;
    }
    if usize::from(right.saturating_sub(x)) > summary.len() {
        spans.push(Span::styled(summary, app.style("header_meta")));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
