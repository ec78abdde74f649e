//! Keybinding registry: maps key events to actions, with config overrides.
//!
//! Bindings are looked up per context (the focused panel) with a fallback to
//! `Global`, so the same key can mean different things in the sidebar and in
//! the article pane.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    CycleFocus,
    Back,
    Select,
    OpenInBrowser,
    NextPage,
    PrevPage,
    ToggleView,
    ToggleTheme,
    AddFeed,
    DeleteFeed,
    Refresh,
    ShowHelp,
}

impl Action {
    /// Every action, in help-screen order.
    pub const ALL: [Action; 15] = [
        Action::NavDown,
        Action::NavUp,
        Action::CycleFocus,
        Action::Select,
        Action::OpenInBrowser,
        Action::NextPage,
        Action::PrevPage,
        Action::ToggleView,
        Action::ToggleTheme,
        Action::AddFeed,
        Action::DeleteFeed,
        Action::Refresh,
        Action::ShowHelp,
        Action::Back,
        Action::Quit,
    ];

    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::NavDown => "Move down",
            Self::NavUp => "Move up",
            Self::CycleFocus => "Switch between feeds and articles",
            Self::Back => "Close form / dialog, back to feeds",
            Self::Select => "Show feed / open article",
            Self::OpenInBrowser => "Open article in browser",
            Self::NextPage => "Next page",
            Self::PrevPage => "Previous page",
            Self::ToggleView => "Toggle grid / list view",
            Self::ToggleTheme => "Toggle dark / light theme",
            Self::AddFeed => "Add a feed",
            Self::DeleteFeed => "Delete the selected feed",
            Self::Refresh => "Reload feeds and articles",
            Self::ShowHelp => "Show this help",
        }
    }

    /// Config name, as accepted under `[keybindings]`.
    pub fn config_name(self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::NavDown => "nav_down",
            Self::NavUp => "nav_up",
            Self::CycleFocus => "cycle_focus",
            Self::Back => "back",
            Self::Select => "select",
            Self::OpenInBrowser => "open_in_browser",
            Self::NextPage => "next_page",
            Self::PrevPage => "prev_page",
            Self::ToggleView => "toggle_view",
            Self::ToggleTheme => "toggle_theme",
            Self::AddFeed => "add_feed",
            Self::DeleteFeed => "delete_feed",
            Self::Refresh => "refresh",
            Self::ShowHelp => "show_help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: which panel has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Sidebar,
    Articles,
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Terminals disagree on whether `T` arrives with SHIFT set; the case of
    /// the character already carries it.
    fn normalized(self) -> Self {
        match self.code {
            KeyCode::Char(_) => Self::new(self.code, self.modifiers - KeyModifiers::SHIFT),
            _ => self,
        }
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", arrows, "PageUp", "PageDown", "Space"
/// - Control combos: "Ctrl+d"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+").or_else(|| s.strip_prefix("ctrl+")) {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    let named = match s.to_ascii_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|digits| digits.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::char(c)),
        _ => None,
    }
}

/// Format a KeySpec for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::PageUp => "PgUp".to_string(),
        KeyCode::PageDown => "PgDn".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

/// Default bindings: (context, key, action).
const DEFAULT_BINDINGS: &[(Context, KeySpec, Action)] = &[
    (Context::Global, KeySpec::char('q'), Action::Quit),
    (Context::Global, KeySpec::char('j'), Action::NavDown),
    (Context::Global, KeySpec::plain(KeyCode::Down), Action::NavDown),
    (Context::Global, KeySpec::char('k'), Action::NavUp),
    (Context::Global, KeySpec::plain(KeyCode::Up), Action::NavUp),
    (Context::Global, KeySpec::plain(KeyCode::Tab), Action::CycleFocus),
    (Context::Global, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Global, KeySpec::plain(KeyCode::Enter), Action::Select),
    (Context::Global, KeySpec::char('n'), Action::NextPage),
    (Context::Global, KeySpec::plain(KeyCode::Right), Action::NextPage),
    (Context::Global, KeySpec::char('p'), Action::PrevPage),
    (Context::Global, KeySpec::plain(KeyCode::Left), Action::PrevPage),
    (Context::Global, KeySpec::char('v'), Action::ToggleView),
    (Context::Global, KeySpec::char('T'), Action::ToggleTheme),
    (Context::Global, KeySpec::char('a'), Action::AddFeed),
    (Context::Global, KeySpec::char('r'), Action::Refresh),
    (Context::Global, KeySpec::char('?'), Action::ShowHelp),
    (Context::Sidebar, KeySpec::char('d'), Action::DeleteFeed),
    (Context::Articles, KeySpec::char('o'), Action::OpenInBrowser),
];

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
#[derive(Debug, Clone)]
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// Kept in registration order for the help screen.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::with_capacity(DEFAULT_BINDINGS.len()),
        };
        for &(context, key, action) in DEFAULT_BINDINGS {
            registry.bind(context, key, action);
        }
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        let key = key.normalized();
        if let Some(previous) = self.lookup.insert((context, key), action) {
            // The key moved to another action; drop the stale help entry
            self.bindings
                .retain(|&(c, k, a)| !(c == context && k == key && a == previous));
        }
        self.bindings.push((context, key, action));
    }

    /// Apply user overrides from the config `[keybindings]` table.
    ///
    /// Keys in the map are action names (`"quit"`, `"next_page"`), values are
    /// key strings (`"q"`, `"Ctrl+n"`, `"F5"`). An override replaces every
    /// default key of that action, in the contexts it was bound in.
    ///
    /// Returns warnings for unknown action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        // Sorted so that conflicting overrides resolve the same way every run
        let mut entries: Vec<_> = overrides.iter().collect();
        entries.sort();

        for (action_name, key_str) in entries {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };
            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for &(c, _, a) in &self.bindings {
                if a == action && !contexts.contains(&c) {
                    contexts.push(c);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);
            for context in contexts {
                self.bind(context, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Action for a key in `context`, falling back to `Global`.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers).normalized();
        self.lookup
            .get(&(context, key))
            .or_else(|| self.lookup.get(&(Context::Global, key)))
            .copied()
    }

    /// Comma-joined keys bound to `action`, for the status bar and help.
    pub fn keys_for(&self, action: Action) -> String {
        self.bindings
            .iter()
            .filter(|(_, _, a)| *a == action)
            .map(|(_, k, _)| format_key(k))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// (keys, description) rows for the help overlay, one per action.
    pub fn help_rows(&self) -> Vec<(String, &'static str)> {
        Action::ALL
            .iter()
            .map(|&action| (self.keys_for(action), action.describe()))
            .filter(|(keys, _)| !keys.is_empty())
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name from config.
fn parse_action_name(name: &str) -> Option<Action> {
    let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
    Action::ALL
        .into_iter()
        .find(|a| a.config_name() == normalized || a.config_name().replace('_', "") == normalized)
        .or(match normalized.as_str() {
            "open" => Some(Action::OpenInBrowser),
            "theme" => Some(Action::ToggleTheme),
            "view" => Some(Action::ToggleView),
            "help" => Some(Action::ShowHelp),
            "delete" => Some(Action::DeleteFeed),
            "add" | "subscribe" => Some(Action::AddFeed),
            _ => None,
        })
}

// ============================================================================
// Tests
// ============================================================================
