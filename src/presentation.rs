//! How a single article is drawn.
//!
//! Everything here is a pure function of one `Item`: no I/O, no app state.
//! The two layouts produce ratatui lines plus the positions of their clickable
//! parts, and the UI layer turns those into hit regions.

use crate::model::Item;
use crate::theme::StyleMap;
use crate::util::{display_width, fit_width, strip_control_chars, truncate_to_width, validate_link};
use chrono::{DateTime, Local, TimeZone, Utc};
use ratatui::text::{Line, Span};
use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;

/// Gists longer than this many characters are cut and get "...".
pub const GIST_MAX_CHARS: usize = 120;
/// Rows a card spends on its title.
pub const CARD_TITLE_LINES: usize = 2;
/// Rows a card spends on its description.
pub const CARD_DESCRIPTION_LINES: usize = 3;

const OPEN_LABEL: &str = "[ Open ]";
const DATE_FORMAT: &str = "%b %-d, %Y";
const TIME_FORMAT: &str = "%H:%M";

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

// ============================================================================
// Dates
// ============================================================================

/// `"Mar 4, 2024"` in the given zone.
pub fn format_date<Tz>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format(DATE_FORMAT).to_string()
}

/// `"09:05"` in the given zone.
pub fn format_time<Tz>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format(TIME_FORMAT).to_string()
}

// ============================================================================
// Text extraction
// ============================================================================

/// Strip markup with a plain tag regex and collapse whitespace.
///
/// Every `<...>` becomes a space; entities are left as-is.
pub fn strip_markup(html: &str) -> String {
    let spaced = MARKUP_TAG.replace_all(html, " ");
    let collapsed = WHITESPACE_RUN.replace_all(&spaced, " ");
    strip_control_chars(collapsed.trim()).into_owned()
}

/// One-line summary for the list layout.
///
/// Prefers `content` over `description`. At most `GIST_MAX_CHARS` characters
/// plus a trailing "..." when cut.
pub fn gist(item: &Item) -> String {
    let source = match item.content.as_deref() {
        Some(c) if !c.is_empty() => c,
        _ => item.description.as_str(),
    };
    let plain = strip_markup(source);
    if plain.chars().count() > GIST_MAX_CHARS {
        let cut: String = plain.chars().take(GIST_MAX_CHARS).collect();
        format!("{cut}...")
    } else {
        plain
    }
}

/// Description rendered from HTML to wrapped plain text.
///
/// Only the display is clamped: the returned lines are the first `max_lines`
/// of the full text, the last one ending in "..." when more follows.
pub fn description_lines(html: &str, width: usize, max_lines: usize) -> Vec<String> {
    if html.trim().is_empty() || max_lines == 0 {
        return Vec::new();
    }

    // html2text wants room for at least a word and its indentation
    let wrap = width.max(8);
    let text = html2text::from_read(html.as_bytes(), wrap);
    let text = strip_control_chars(&text);

    let all: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect();
    clamp_lines(all.into_iter().map(str::to_string).collect(), width, max_lines)
}

/// Greedy word wrap to `width` columns, clamped to `max_lines`.
pub fn wrap_words(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate_width = if current.is_empty() {
            display_width(word)
        } else {
            display_width(&current) + 1 + display_width(word)
        };
        if candidate_width <= width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if display_width(word) > width {
            lines.push(truncate_to_width(word, width).into_owned());
        } else {
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    clamp_lines(lines, width, max_lines)
}

fn clamp_lines(mut lines: Vec<String>, width: usize, max_lines: usize) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        let room = width.saturating_sub(3);
        *last = format!("{}...", truncate_to_width(last, room).trim_end_matches("..."));
    }
    lines
}

fn title_initial(title: &str) -> String {
    title
        .chars()
        .find(|c| !c.is_whitespace())
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "#".to_string())
}

// ============================================================================
// Layouts
// ============================================================================

/// Clickable part of a rendered article, relative to its content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotspot {
    pub row: u16,
    pub col: u16,
    pub width: u16,
    pub part: ArticlePart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticlePart {
    /// The title link.
    Title,
    /// The `[ Open ]` control.
    Open,
}

/// Whether a click handler lets the click continue to enclosing regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

#[derive(Debug, Clone)]
pub struct RenderedArticle {
    pub lines: Vec<Line<'static>>,
    pub hotspots: Vec<Hotspot>,
}

pub struct LayoutContext<'a> {
    /// Content width in columns, borders excluded.
    pub width: u16,
    pub styles: &'a StyleMap,
    /// Under the keyboard cursor.
    pub highlighted: bool,
}

/// A way of drawing one article. Card and list layouts are interchangeable.
pub trait ArticleLayout: Send + Sync {
    /// Content rows per article, borders excluded.
    fn height(&self) -> u16;

    /// Whether the UI draws a border around each article.
    fn bordered(&self) -> bool;

    fn render(&self, item: &Item, ctx: &LayoutContext<'_>) -> RenderedArticle;
}

/// Grid card: date and time, title, clamped description, footer.
#[derive(Debug, Clone)]
pub struct CardLayout<Tz = Local> {
    tz: Tz,
}

impl CardLayout<Local> {
    pub fn new() -> Self {
        Self { tz: Local }
    }
}

impl Default for CardLayout<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tz: TimeZone> CardLayout<Tz> {
    pub fn with_zone(tz: Tz) -> Self {
        Self { tz }
    }
}

impl<Tz> ArticleLayout for CardLayout<Tz>
where
    Tz: TimeZone + Send + Sync,
    Tz::Offset: Display,
{
    fn height(&self) -> u16 {
        // date, title, description, rule, footer
        (1 + CARD_TITLE_LINES + CARD_DESCRIPTION_LINES + 2) as u16
    }

    fn bordered(&self) -> bool {
        true
    }

    fn render(&self, item: &Item, ctx: &LayoutContext<'_>) -> RenderedArticle {
        let width = usize::from(ctx.width);
        let mut lines = Vec::with_capacity(usize::from(self.height()));
        let mut hotspots = Vec::new();

        let date = format_date(&item.published_at, &self.tz);
        let time = format_time(&item.published_at, &self.tz);
        let gap = width.saturating_sub(display_width(&date) + display_width(&time));
        lines.push(Line::from(vec![
            Span::styled(date, ctx.styles.resolve("article_date")),
            Span::raw(" ".repeat(gap)),
            Span::styled(time, ctx.styles.resolve("article_date")),
        ]));

        let title = strip_control_chars(&item.title);
        let mut title_lines = wrap_words(&title, width, CARD_TITLE_LINES);
        for (i, text) in title_lines.iter().enumerate() {
            hotspots.push(Hotspot {
                row: (1 + i) as u16,
                col: 0,
                width: display_width(text) as u16,
                part: ArticlePart::Title,
            });
        }
        title_lines.resize(CARD_TITLE_LINES, String::new());
        lines.extend(
            title_lines
                .into_iter()
                .map(|t| Line::from(Span::styled(t, ctx.styles.resolve("article_title")))),
        );

        let mut body = description_lines(&item.description, width, CARD_DESCRIPTION_LINES);
        body.resize(CARD_DESCRIPTION_LINES, String::new());
        lines.extend(
            body.into_iter()
                .map(|t| Line::from(Span::styled(t, ctx.styles.resolve("article_body")))),
        );

        lines.push(Line::from(Span::styled(
            "─".repeat(width),
            ctx.styles.resolve("card_border"),
        )));

        let footer_row = lines.len() as u16;
        let left = format!("({}) Read Article", title_initial(&title));
        let open_width = display_width(OPEN_LABEL);
        let left = fit_width(&left, width.saturating_sub(open_width));
        let open_col = display_width(&left) as u16;
        lines.push(Line::from(vec![
            Span::styled(left, ctx.styles.resolve("article_footer")),
            Span::styled(OPEN_LABEL, ctx.styles.resolve("article_open")),
        ]));
        hotspots.push(Hotspot {
            row: footer_row,
            col: open_col,
            width: open_width.min(width) as u16,
            part: ArticlePart::Open,
        });

        RenderedArticle { lines, hotspots }
    }
}

/// Compact row: date, title, time and open control, then a gist line.
#[derive(Debug, Clone)]
pub struct ListLayout<Tz = Local> {
    tz: Tz,
}

impl ListLayout<Local> {
    pub fn new() -> Self {
        Self { tz: Local }
    }
}

impl Default for ListLayout<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tz: TimeZone> ListLayout<Tz> {
    pub fn with_zone(tz: Tz) -> Self {
        Self { tz }
    }
}

/// Column width of the date in list rows ("Sep 30, 2024").
const LIST_DATE_WIDTH: usize = 12;

impl<Tz> ArticleLayout for ListLayout<Tz>
where
    Tz: TimeZone + Send + Sync,
    Tz::Offset: Display,
{
    fn height(&self) -> u16 {
        2
    }

    fn bordered(&self) -> bool {
        false
    }

    fn render(&self, item: &Item, ctx: &LayoutContext<'_>) -> RenderedArticle {
        let width = usize::from(ctx.width);
        let date = fit_width(&format_date(&item.published_at, &self.tz), LIST_DATE_WIDTH);
        let time = format_time(&item.published_at, &self.tz);
        let time_width = display_width(&time);

        let fixed = LIST_DATE_WIDTH + 2 + 2 + time_width + 2 + display_width(OPEN_LABEL);
        let title_room = width.saturating_sub(fixed);
        let title = truncate_to_width(&strip_control_chars(&item.title), title_room).into_owned();
        let title_width = display_width(&title);
        let title_col = LIST_DATE_WIDTH + 2;
        let padded_title = fit_width(&title, title_room);

        let row_style = if ctx.highlighted {
            ctx.styles.resolve("list_cursor")
        } else {
            ratatui::style::Style::default()
        };

        let header = Line::from(vec![
            Span::styled(date, ctx.styles.resolve("article_date")),
            Span::raw("  "),
            Span::styled(padded_title, ctx.styles.resolve("article_title")),
            Span::raw("  "),
            Span::styled(time, ctx.styles.resolve("article_date")),
            Span::raw("  "),
            Span::styled(OPEN_LABEL, ctx.styles.resolve("article_open")),
        ])
        .style(row_style);

        let open_col = title_col + title_room + 2 + time_width + 2;
        let mut hotspots = vec![Hotspot {
            row: 0,
            col: title_col as u16,
            width: title_width as u16,
            part: ArticlePart::Title,
        }];
        if open_col < width {
            hotspots.push(Hotspot {
                row: 0,
                col: open_col as u16,
                width: display_width(OPEN_LABEL).min(width - open_col) as u16,
                part: ArticlePart::Open,
            });
        }

        let summary = gist(item);
        let gist_line = if summary.is_empty() {
            Line::default()
        } else {
            let indent = title_col.min(width);
            let text = truncate_to_width(&summary, width.saturating_sub(indent)).into_owned();
            Line::from(vec![
                Span::raw(" ".repeat(indent)),
                Span::styled(text, ctx.styles.resolve("article_body")),
            ])
        };

        RenderedArticle {
            lines: vec![header, gist_line],
            hotspots,
        }
    }
}

// ============================================================================
// Opening links
// ============================================================================

/// Hands an article link to something outside the terminal.
pub trait Opener: Send + Sync {
    fn open(&self, link: &str) -> anyhow::Result<()>;
}

/// Opens links with the desktop's default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, link: &str) -> anyhow::Result<()> {
        // Validate before handing anything to the platform opener
        let url = validate_link(link)?;
        open::that_detached(url.as_str())?;
        tracing::debug!(url = %url, "Opened link in browser");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeVariant;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;

    fn item(title: &str, description: &str, content: Option<&str>) -> Item {
        Item {
            id: 1,
            feed_id: 1,
            title: title.to_string(),
            link: "https://example.com/a".to_string(),
            description: description.to_string(),
            content: content.map(str::to_string),
            published_at: Utc.with_ymd_and_hms(2024, 3, 4, 9, 5, 0).unwrap(),
            guid: None,
        }
    }

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_date_and_time_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 4, 9, 5, 0).unwrap();
        assert_eq!(format_date(&at, &Utc), "Mar 4, 2024");
        assert_eq!(format_time(&at, &Utc), "09:05");
    }

    #[test]
    fn test_dates_follow_zone() {
        let at = Utc.with_ymd_and_hms(2024, 3, 4, 23, 30, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(format_date(&at, &plus_two), "Mar 5, 2024");
        assert_eq!(format_time(&at, &plus_two), "01:30");
    }

    #[test]
    fn test_gist_strips_and_truncates() {
        let body = format!("<p>Hello <b>world</b></p>{}", "x".repeat(200));
        let g = gist(&item("t", "", Some(&body)));
        assert!(g.starts_with("Hello world "));
        assert!(!g.contains('<'));
        assert!(g.ends_with("..."));
        assert!(g.chars().count() <= GIST_MAX_CHARS + 3);
        assert_eq!(g.chars().count(), GIST_MAX_CHARS + 3);
    }

    #[test]
    fn test_gist_prefers_content_then_description() {
        assert_eq!(gist(&item("t", "<i>desc</i>", Some("<p>body</p>"))), "body");
        assert_eq!(gist(&item("t", "<i>desc</i>", None)), "desc");
        assert_eq!(gist(&item("t", "<i>desc</i>", Some(""))), "desc");
    }

    #[test]
    fn test_gist_short_and_empty() {
        assert_eq!(gist(&item("t", "  a \n\n  b  ", None)), "a b");
        assert_eq!(gist(&item("t", "", None)), "");
        let exact = "y".repeat(GIST_MAX_CHARS);
        assert_eq!(gist(&item("t", &exact, None)), exact);
    }

    #[test]
    fn test_gist_strips_terminal_escapes() {
        assert_eq!(gist(&item("t", "<b>\x1b[31mred</b>", None)), "red");
    }

    #[test]
    fn test_wrap_words_clamps_with_ellipsis() {
        let lines = wrap_words("one two three four five six", 9, 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "one two");
        assert!(lines[1].ends_with("..."));
        assert!(display_width(&lines[1]) <= 9);
    }

    #[test]
    fn test_wrap_words_fits() {
        assert_eq!(wrap_words("short title", 40, 2), vec!["short title"]);
        assert!(wrap_words("", 40, 2).is_empty());
    }

    #[test]
    fn test_description_is_clamped_to_three_lines() {
        let html = "<p>alpha</p><p>beta</p><p>gamma</p><p>delta</p>";
        let lines = description_lines(html, 30, CARD_DESCRIPTION_LINES);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("alpha"));
        assert!(lines[2].ends_with("..."));
        assert!(lines.iter().all(|l| !l.contains('<')));
    }

    #[test]
    fn test_card_layout_shape_and_hotspots() {
        let styles = StyleMap::for_variant(ThemeVariant::Dark);
        let layout = CardLayout::with_zone(Utc);
        let ctx = LayoutContext {
            width: 40,
            styles: &styles,
            highlighted: false,
        };
        let out = layout.render(&item("rust news", "<p>body</p>", None), &ctx);

        assert_eq!(out.lines.len(), usize::from(layout.height()));
        let header = text_of(&out.lines[0]);
        assert!(header.starts_with("Mar 4, 2024"));
        assert!(header.ends_with("09:05"));
        assert_eq!(display_width(&header), 40);
        assert_eq!(text_of(&out.lines[1]), "rust news");

        let footer = text_of(out.lines.last().unwrap());
        assert!(footer.starts_with("(R) Read Article"));
        assert!(footer.ends_with(OPEN_LABEL));

        let open = out
            .hotspots
            .iter()
            .find(|h| h.part == ArticlePart::Open)
            .unwrap();
        assert_eq!(usize::from(open.row), out.lines.len() - 1);
        assert_eq!(usize::from(open.col), 40 - OPEN_LABEL.len());
        let title = out
            .hotspots
            .iter()
            .find(|h| h.part == ArticlePart::Title)
            .unwrap();
        assert_eq!((title.row, title.col, title.width), (1, 0, 9));
    }

    #[test]
    fn test_list_layout_header_and_gist() {
        let styles = StyleMap::for_variant(ThemeVariant::Light);
        let layout = ListLayout::with_zone(Utc);
        let ctx = LayoutContext {
            width: 80,
            styles: &styles,
            highlighted: true,
        };
        let out = layout.render(&item("A title", "<p>Some gist</p>", None), &ctx);

        assert_eq!(out.lines.len(), 2);
        let header = text_of(&out.lines[0]);
        assert!(header.starts_with("Mar 4, 2024"));
        assert!(header.contains("A title"));
        assert!(header.ends_with("09:05  [ Open ]"));
        assert_eq!(display_width(&header), 80);
        assert_eq!(text_of(&out.lines[1]).trim(), "Some gist");

        let open = out
            .hotspots
            .iter()
            .find(|h| h.part == ArticlePart::Open)
            .unwrap();
        assert_eq!(usize::from(open.col), 80 - OPEN_LABEL.len());
    }

    #[test]
    fn test_list_layout_without_gist_has_blank_line() {
        let styles = StyleMap::for_variant(ThemeVariant::Dark);
        let ctx = LayoutContext {
            width: 60,
            styles: &styles,
            highlighted: false,
        };
        let out = ListLayout::with_zone(Utc).render(&item("t", "", None), &ctx);
        assert_eq!(text_of(&out.lines[1]), "");
    }

    #[test]
    fn test_system_opener_refuses_non_web_links() {
        assert!(SystemOpener.open("file:///etc/passwd").is_err());
        assert!(SystemOpener.open("").is_err());
    }
}
