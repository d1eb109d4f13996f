//! Keyboard to action mapping
//!
//! Bindings come from the settings file as strings ("Left", "Space", "q") and
//! are parsed once into crossterm key codes.

use crate::game::{Action, Phase};
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Parsed key bindings - supports multiple keys per action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub hard_drop: Vec<KeyCode>,
    pub rotate: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
    pub retry: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyMap {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let lower = s.to_lowercase();
        let code = match lower.as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "esc" | "escape" => KeyCode::Esc,
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }

    /// Parse a list of key strings, skipping unknown names
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter()
            .filter_map(|s| {
                let code = Self::parse_key(s);
                if code.is_none() {
                    tracing::warn!("Ignoring unknown key binding {:?}", s);
                }
                code
            })
            .collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let keys = &settings.keys;
        Self {
            move_left: Self::parse_keys(&keys.move_left),
            move_right: Self::parse_keys(&keys.move_right),
            soft_drop: Self::parse_keys(&keys.soft_drop),
            hard_drop: Self::parse_keys(&keys.hard_drop),
            rotate: Self::parse_keys(&keys.rotate),
            pause: Self::parse_keys(&keys.pause),
            retry: Self::parse_keys(&keys.retry),
            quit: Self::parse_keys(&keys.quit),
        }
    }

    /// Action for a key press in the given phase
    ///
    /// The pause key toggles, so it maps to `Resume` while paused.
    pub fn action_for(&self, key: KeyEvent, phase: Phase) -> Option<Action> {
        // Handle Ctrl+C for quit
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        let code = normalize_key(key.code);
        let action = if self.move_left.contains(&code) {
            Action::MoveLeft
        } else if self.move_right.contains(&code) {
            Action::MoveRight
        } else if self.soft_drop.contains(&code) {
            Action::SoftDrop
        } else if self.hard_drop.contains(&code) {
            Action::HardDrop
        } else if self.rotate.contains(&code) {
            Action::Rotate
        } else if self.pause.contains(&code) {
            match phase {
                Phase::Paused => Action::Resume,
                _ => Action::Pause,
            }
        } else if self.retry.contains(&code) {
            Action::Retry
        } else if self.quit.contains(&code) {
            Action::Quit
        } else {
            return None;
        };
        Some(action)
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
