//! Help overlay listing every action and the keys bound to it, including
//! overrides from config.

use crate::app::App;
use ratatui::{
    layout::Constraint,
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

use super::render::centered;

pub fn render(f: &mut Frame, app: &App) {
    let rows: Vec<Row> = app
        .keybindings
        .help_rows()
        .into_iter()
        .map(|(keys, description)| Row::new(vec![format!("  {}", keys), description.to_string()]))
        .collect();

    // Borders, header and its margin
    let height = rows.len() as u16 + 4;
    let overlay = centered(64, height, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let widths = [Constraint::Length(20), Constraint::Min(20)];
    let table = Table::new(rows, widths)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(" Help (? to close) "),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::UNDERLINED),
                )
                .bottom_margin(1),
        )
        .style(app.style("overlay_body"));

    f.render_widget(table, overlay);
}
