//! Theme system for the TUI.
//!
//! Semantic color roles map to ratatui `Style` values. `ThemeVariant` picks
//! the Dark or Light palette, and `StyleMap` resolves role names to styles.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// The other variant.
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    /// Lowercase key used in the preference file.
    pub fn as_key(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Sidebar --
    pub sidebar_item: Style,
    pub sidebar_selected: Style,
    pub sidebar_cursor: Style,
    pub sidebar_heading: Style,
    pub sidebar_delete: Style,
    pub sidebar_input: Style,

    // -- Articles --
    pub card_border: Style,
    pub card_border_cursor: Style,
    pub article_date: Style,
    pub article_title: Style,
    pub article_body: Style,
    pub article_footer: Style,
    pub article_open: Style,
    pub list_cursor: Style,

    // -- Pager --
    pub pager_button: Style,
    pub pager_current: Style,
    pub pager_disabled: Style,

    // -- Chrome --
    pub header_title: Style,
    pub header_meta: Style,
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub spinner: Style,
    pub alert_border: Style,
    pub overlay_body: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            sidebar_item: Style::default().fg(Color::Gray),
            sidebar_selected: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
            sidebar_cursor: Style::default().bg(Color::DarkGray).fg(Color::White),
            sidebar_heading: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            sidebar_delete: Style::default().fg(Color::Red),
            sidebar_input: Style::default().fg(Color::White).bg(Color::Black),

            card_border: Style::default().fg(Color::DarkGray),
            card_border_cursor: Style::default().fg(Color::Cyan),
            article_date: Style::default().fg(Color::DarkGray),
            article_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            article_body: Style::default().fg(Color::Gray),
            article_footer: Style::default().fg(Color::DarkGray),
            article_open: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
            list_cursor: Style::default().bg(Color::DarkGray).fg(Color::White),

            pager_button: Style::default().fg(Color::Gray),
            pager_current: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            pager_disabled: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),

            header_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            header_meta: Style::default().fg(Color::DarkGray),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            spinner: Style::default().fg(Color::Cyan),
            alert_border: Style::default().fg(Color::Red),
            overlay_body: Style::default(),
        }
    }

    fn light() -> Self {
        Self {
            sidebar_item: Style::default().fg(Color::Black),
            sidebar_selected: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            sidebar_cursor: Style::default().bg(Color::Blue).fg(Color::White),
            sidebar_heading: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            sidebar_delete: Style::default().fg(Color::Red),
            sidebar_input: Style::default().fg(Color::Black).bg(Color::White),

            card_border: Style::default().fg(Color::Gray),
            card_border_cursor: Style::default().fg(Color::Blue),
            article_date: Style::default().fg(Color::DarkGray),
            article_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            article_body: Style::default().fg(Color::DarkGray),
            article_footer: Style::default().fg(Color::Gray),
            article_open: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            list_cursor: Style::default().bg(Color::Blue).fg(Color::White),

            pager_button: Style::default().fg(Color::Black),
            pager_current: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            pager_disabled: Style::default().fg(Color::Gray),

            header_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            header_meta: Style::default().fg(Color::DarkGray),
            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            spinner: Style::default().fg(Color::Blue),
            alert_border: Style::default().fg(Color::Red),
            overlay_body: Style::default().fg(Color::Black),
        }
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// String-keyed style lookup built from a `ColorPalette`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 25] = [
    "sidebar_item",
    "sidebar_selected",
    "sidebar_cursor",
    "sidebar_heading",
    "sidebar_delete",
    "sidebar_input",
    "card_border",
    "card_border_cursor",
    "article_date",
    "article_title",
    "article_body",
    "article_footer",
    "article_open",
    "list_cursor",
    "pager_button",
    "pager_current",
    "pager_disabled",
    "header_title",
    "header_meta",
    "status_bar",
    "panel_border",
    "panel_border_focused",
    "spinner",
    "alert_border",
    "overlay_body",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 25] = [
            p.sidebar_item,
            p.sidebar_selected,
            p.sidebar_cursor,
            p.sidebar_heading,
            p.sidebar_delete,
            p.sidebar_input,
            p.card_border,
            p.card_border_cursor,
            p.article_date,
            p.article_title,
            p.article_body,
            p.article_footer,
            p.article_open,
            p.list_cursor,
            p.pager_button,
            p.pager_current,
            p.pager_disabled,
            p.header_title,
            p.header_meta,
            p.status_bar,
            p.panel_border,
            p.panel_border_focused,
            p.spinner,
            p.alert_border,
            p.overlay_body,
        ];

        let map = ROLE_NAMES
            .iter()
            .copied()
            .zip(styles.iter().copied())
            .collect();
        Self { map }
    }

    pub fn for_variant(variant: ThemeVariant) -> Self {
        Self::from_palette(&variant.palette())
    }

    /// Resolve a role name. Unknown roles get `Style::default()`.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_from_str_name() {
        assert_eq!(
            ThemeVariant::from_str_name("dark"),
            Some(ThemeVariant::Dark)
        );
        assert_eq!(
            ThemeVariant::from_str_name(" Light "),
            Some(ThemeVariant::Light)
        );
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
    }

    #[test]
    fn toggled_flips_and_returns() {
        assert_eq!(ThemeVariant::Dark.toggled(), ThemeVariant::Light);
        assert_eq!(ThemeVariant::Dark.toggled().toggled(), ThemeVariant::Dark);
    }

    #[test]
    fn variant_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ThemeVariant::Light).unwrap(),
            "\"light\""
        );
        let v: ThemeVariant = serde_json::from_str("\"dark\"").unwrap();
        assert_eq!(v, ThemeVariant::Dark);
    }

    #[test]
    fn light_palette_differs_from_dark() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.sidebar_cursor, light.sidebar_cursor);
        assert_ne!(dark.status_bar, light.status_bar);
    }

    #[test]
    fn style_map_resolves_known_roles() {
        let palette = ThemeVariant::Dark.palette();
        let sm = StyleMap::from_palette(&palette);
        assert_eq!(sm.resolve("pager_current"), palette.pager_current);
        assert_eq!(sm.resolve("status_bar"), palette.status_bar);
        assert_eq!(sm.resolve("nonexistent_role"), Style::default());
    }

    #[test]
    fn role_names_count_matches_palette_fields() {
        let sm = StyleMap::for_variant(ThemeVariant::Light);
        assert_eq!(sm.map.len(), ROLE_NAMES.len());
        for name in ROLE_NAMES {
            assert!(sm.map.contains_key(name), "Role '{}' missing", name);
        }
    }
}
