//! Render functions for the TUI.
//!
//! Lays out the sidebar, header, article area, pager and status bar, then
//! draws any overlay on top. Clickable regions are recorded into
//! `app.hit_regions` outermost first as each piece is drawn.

use crate::app::{Alert, App, ClickTarget, ConfirmAction, Focus, HitRegion};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::{articles, feeds, help, pager, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 12;

/// Sidebar width in columns.
const SIDEBAR_WIDTH: u16 = 30;

pub(super) fn render(f: &mut Frame, app: &mut App) {
    app.hit_regions.clear();
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(rows[0]);

    add_region(app, columns[0], ClickTarget::Panel(Focus::Sidebar));
    add_region(app, columns[1], ClickTarget::Panel(Focus::Articles));

    feeds::render(f, app, columns[0]);
    render_main(f, app, columns[1]);
    status::render(f, app, rows[1]);

    if app.show_help {
        help::render(f, app);
    }

    // Overlays block clicks on whatever is underneath
    if let Some(confirm) = app.pending_confirm.clone() {
        app.hit_regions.clear();
        render_confirm_overlay(f, app, &confirm);
    }

    if let Some(alert) = app.alert.clone() {
        app.hit_regions.clear();
        render_alert_overlay(f, app, &alert);
    }
}

pub(super) fn add_region(app: &mut App, area: Rect, target: ClickTarget) {
    if area.width > 0 && area.height > 0 {
        app.hit_regions.push(HitRegion { area, target });
    }
}

/// Header, article area and pager.
fn render_main(f: &mut Frame, app: &mut App, area: Rect) {
    let show_pager = app.view.total_pages() > 1;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(u16::from(show_pager)),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    articles::render(f, app, chunks[1]);
    if show_pager {
        pager::render(f, app, chunks[2]);
    }
}

/// One-line header: current selection and count, view and theme toggles.
fn render_header(f: &mut Frame, app: &mut App, area: Rect) {
    let heading = match app.view.selected_feed_id {
        None => crate::sidebar::ALL_ARTICLES_LABEL.to_string(),
        Some(id) => app
            .feeds
            .iter()
            .find(|feed| feed.id == id)
            .map(|feed| crate::util::strip_control_chars(feed.display_title()).into_owned())
            .unwrap_or_else(|| format!("Feed {}", id)),
    };
    let meta = format!("  {} articles", app.view.total_count);

    let view_label = format!("[ {} ]", app.view.view_mode.toggled().name());
    let theme_label = format!("[ {} ]", app.view.theme.toggled().name());
    let controls_width = (view_label.len() + 1 + theme_label.len()) as u16;

    let left_width = area.width.saturating_sub(controls_width + 1);
    let heading = crate::util::truncate_to_width(&heading, usize::from(left_width)).into_owned();
    let left = Line::from(vec![
        Span::styled(heading, app.style("header_title")),
        Span::styled(meta, app.style("header_meta")),
    ]);
    f.render_widget(
        Paragraph::new(left),
        Rect::new(area.x, area.y, left_width, 1),
    );

    if area.width <= controls_width {
        return;
    }
    let view_area = Rect::new(
        area.x + area.width - controls_width,
        area.y,
        view_label.len() as u16,
        1,
    );
    let theme_area = Rect::new(
        view_area.x + view_area.width + 1,
        area.y,
        theme_label.len() as u16,
        1,
    );
    f.render_widget(
        Paragraph::new(Span::styled(view_label, app.style("pager_button"))),
        view_area,
    );
    f.render_widget(
        Paragraph::new(Span::styled(theme_label, app.style("pager_button"))),
        theme_area,
    );
    add_region(app, view_area, ClickTarget::ViewToggle);
    add_region(app, theme_area, ClickTarget::ThemeToggle);
}

/// Rectangle of at most `width` x `height` centred in `area`.
pub(super) fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_confirm_overlay(f: &mut Frame, app: &App, confirm: &ConfirmAction) {
    let overlay = centered(54, 8, f.area());
    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let text = format!("{}\n\n(y) Confirm  (n/Esc) Cancel", confirm.prompt());
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(" Confirm "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(app.style("overlay_body"));

    f.render_widget(paragraph, overlay);
}

fn render_alert_overlay(f: &mut Frame, app: &App, alert: &Alert) {
    let overlay = centered(60, 8, f.area());
    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let text = format!("{}\n\nPress any key to dismiss", alert.detail);
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("alert_border"))
                .title(format!(" {} ", alert.title)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(app.style("overlay_body"));

    f.render_widget(paragraph, overlay);
}
