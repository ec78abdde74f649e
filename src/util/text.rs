use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Width of `s` in terminal columns (CJK and emoji count double).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Fit `s` into `max_width` columns, ending in "..." when cut.
///
/// Widths of 3 or less have no room for an ellipsis, so the text is simply
/// cut. Borrowed when `s` already fits.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let budget = if max_width <= ELLIPSIS_WIDTH {
        max_width
    } else {
        max_width - ELLIPSIS_WIDTH
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    if max_width <= ELLIPSIS_WIDTH {
        Cow::Owned(s[..end].to_string())
    } else {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    }
}

/// Pad or cut `s` to exactly `width` columns.
pub fn fit_width(s: &str, width: usize) -> String {
    let cut = truncate_to_width(s, width);
    let pad = width.saturating_sub(display_width(&cut));
    format!("{}{}", cut, " ".repeat(pad))
}

/// Remove terminal control characters and ANSI escape sequences.
///
/// Server-supplied text (feed titles, article bodies) goes through this
/// before it reaches the terminal. Tab, newline and carriage return survive.
/// CSI sequences are dropped through their final byte, OSC sequences through
/// BEL or ST, and a lone ESC on its own.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_unwanted_control) {
        return Cow::Borrowed(s);
    }

    enum Mode {
        Text,
        Escape,
        Csi,
        Osc,
        OscEscape,
    }

    let mut out = String::with_capacity(s.len());
    let mut mode = Mode::Text;
    for c in s.chars() {
        mode = match mode {
            Mode::Text if c == '\x1b' => Mode::Escape,
            Mode::Text => {
                if !is_unwanted_control(c) {
                    out.push(c);
                }
                Mode::Text
            }
            Mode::Escape => match c {
                '[' => Mode::Csi,
                ']' => Mode::Osc,
                '\x1b' => Mode::Escape,
                _ => {
                    if !is_unwanted_control(c) {
                        out.push(c);
                    }
                    Mode::Text
                }
            },
            Mode::Csi if ('\x40'..='\x7e').contains(&c) => Mode::Text,
            Mode::Csi => Mode::Csi,
            Mode::Osc if c == '\x07' => Mode::Text,
            Mode::Osc if c == '\x1b' => Mode::OscEscape,
            Mode::Osc => Mode::Osc,
            Mode::OscEscape if c == '\\' => Mode::Text,
            Mode::OscEscape => Mode::Osc,
        };
    }
    Cow::Owned(out)
}

fn is_unwanted_control(c: char) -> bool {
    matches!(c, '\x00'..='\x08' | '\x0b' | '\x0c' | '\x0e'..='\x1f' | '\x7f')
}
