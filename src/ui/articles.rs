use crate::app::{App, ClickTarget, Focus, SPINNER_FRAMES};
use crate::model::Item;
use crate::presentation::{ArticleLayout, ArticlePart, CardLayout, LayoutContext, ListLayout};
use crate::view_state::ViewMode;
use ratatui::{
    layout::{Alignment, Rect},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::sync::Arc;

use super::render::add_region;

const SPINNER: [&str; SPINNER_FRAMES] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Narrowest card the grid will lay out.
const MIN_CARD_WIDTH: u16 = 32;
const MAX_GRID_COLUMNS: u16 = 3;

/// Render the article panel as a card grid or a compact list.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    let is_focused = app.focus == Focus::Articles;
    let border_style = if is_focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };

    let spinner = SPINNER[app.spinner_frame % SPINNER_FRAMES];
    let title = if app.loading {
        format!(" Articles {} ", spinner)
    } else {
        " Articles ".to_string()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let items = Arc::clone(&app.items);
    if items.is_empty() {
        let text = if app.loading {
            format!("{} Loading articles...", spinner)
        } else {
            "No articles found".to_string()
        };
        let style = if app.loading {
            app.style("spinner")
        } else {
            app.style("header_meta")
        };
        let y = inner.y + inner.height / 2;
        f.render_widget(
            Paragraph::new(text).style(style).alignment(Alignment::Center),
            Rect::new(inner.x, y, inner.width, 1),
        );
        if !app.loading && app.feeds.is_empty() && y + 1 < inner.bottom() {
            f.render_widget(
                Paragraph::new("Add a new RSS feed from the sidebar to get started.")
                    .style(app.style("article_footer"))
                    .alignment(Alignment::Center),
                Rect::new(inner.x, y + 1, inner.width, 1),
            );
        }
        return;
    }

    let layout: Box<dyn ArticleLayout> = match app.view.view_mode {
        ViewMode::Grid => Box::new(CardLayout::new()),
        ViewMode::List => Box::new(ListLayout::new()),
    };
    let columns = match app.view.view_mode {
        ViewMode::Grid => (inner.width / MIN_CARD_WIDTH).clamp(1, MAX_GRID_COLUMNS),
        ViewMode::List => 1,
    };
    let slot_height = layout.height() + if layout.bordered() { 2 } else { 0 };
    let slot_width = inner.width / columns;
    let rows_fit = usize::from((inner.height / slot_height).max(1));

    // Scroll so the cursor row stays visible
    let columns_usize = usize::from(columns);
    let cursor_row = app.article_cursor / columns_usize;
    let first_row = (cursor_row + 1).saturating_sub(rows_fit);

    for (index, item) in items.iter().enumerate() {
        let row = index / columns_usize;
        if row < first_row || row >= first_row + rows_fit {
            continue;
        }
        let column = (index % columns_usize) as u16;
        let slot = Rect::new(
            inner.x + column * slot_width,
            inner.y + (row - first_row) as u16 * slot_height,
            slot_width,
            slot_height,
        )
        .intersection(inner);

        let highlighted = is_focused && index == app.article_cursor;
        render_article(f, app, layout.as_ref(), item, index, slot, highlighted);
    }
}

fn render_article(
    f: &mut Frame,
    app: &mut App,
    layout: &dyn ArticleLayout,
    item: &Item,
    index: usize,
    slot: Rect,
    highlighted: bool,
) {
    if slot.width == 0 || slot.height == 0 {
        return;
    }
    add_region(app, slot, ClickTarget::Article(index));

    let content = if layout.bordered() {
        let border = if highlighted {
            app.style("card_border_cursor")
        } else {
            app.style("card_border")
        };
        let card = Block::default().borders(Borders::ALL).border_style(border);
        let content = card.inner(slot);
        f.render_widget(card, slot);
        content
    } else {
        slot
    };
    if content.width == 0 || content.height == 0 {
        return;
    }

    let rendered = {
        let ctx = LayoutContext {
            width: content.width,
            styles: &app.theme,
            highlighted,
        };
        layout.render(item, &ctx)
    };

    let lines: Vec<Line<'static>> = rendered.lines;
    f.render_widget(Paragraph::new(lines), content);

    for hotspot in rendered.hotspots {
        if hotspot.row >= content.height || hotspot.col >= content.width {
            continue;
        }
        let width = hotspot.width.min(content.width - hotspot.col);
        let target = match hotspot.part {
            ArticlePart::Title => ClickTarget::ArticleTitle(index),
            ArticlePart::Open => ClickTarget::ArticleOpen(index),
        };
        add_region(
            app,
            Rect::new(content.x + hotspot.col, content.y + hotspot.row, width, 1),
            target,
        );
    }
}
