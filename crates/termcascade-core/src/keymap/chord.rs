//! Key chord parsing.
//!
//! A chord is written as `+`-separated tokens: any number of modifiers
//! followed by exactly one key, case-insensitive, in any order:
//!
//! ```text
//! ctrl+shift+t     alt+enter     ctrl+f11     shift+pgdn     ctrl+plus
//! ```
//!
//! The `+` key itself is spelled `plus` since `+` is the separator.

use std::fmt;

use thiserror::Error;

/// Why a chord string could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyChordError {
    #[error("key chord is empty")]
    Empty,
    #[error("key chord has an empty token")]
    EmptyToken,
    #[error("unknown key `{0}`")]
    UnknownKey(String),
    #[error("modifier `{0}` is repeated")]
    DuplicateModifier(String),
    #[error("key chord names more than one key")]
    MultipleKeys,
    #[error("key chord has modifiers but no key")]
    MissingKey,
}

/// Non-printable keys addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NamedKey {
    Backspace,
    Tab,
    Enter,
    Escape,
    Space,
    PageUp,
    PageDown,
    End,
    Home,
    Left,
    Up,
    Right,
    Down,
    Insert,
    Delete,
    Plus,
}

impl NamedKey {
    fn parse(token: &str) -> Option<Self> {
        let key = match token {
            "backspace" => Self::Backspace,
            "tab" => Self::Tab,
            "enter" => Self::Enter,
            "esc" | "escape" => Self::Escape,
            "space" => Self::Space,
            "pgup" | "pageup" => Self::PageUp,
            "pgdn" | "pagedown" => Self::PageDown,
            "end" => Self::End,
            "home" => Self::Home,
            "left" => Self::Left,
            "up" => Self::Up,
            "right" => Self::Right,
            "down" => Self::Down,
            "ins" | "insert" => Self::Insert,
            "del" | "delete" => Self::Delete,
            "plus" => Self::Plus,
            _ => return None,
        };
        Some(key)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Backspace => "backspace",
            Self::Tab => "tab",
            Self::Enter => "enter",
            Self::Escape => "esc",
            Self::Space => "space",
            Self::PageUp => "pgup",
            Self::PageDown => "pgdn",
            Self::End => "end",
            Self::Home => "home",
            Self::Left => "left",
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::Plus => "plus",
        }
    }
}

/// The non-modifier key of a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// A printable ASCII character, stored lowercase.
    Char(char),
    /// `F1` through `F24`.
    Function(u8),
    /// A named key such as `enter` or `pgup`.
    Named(NamedKey),
}

impl Key {
    fn parse(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_graphic() {
                return Some(Key::Char(c.to_ascii_lowercase()));
            }
            return None;
        }
        if let Some(number) = token.strip_prefix('f') {
            if let Ok(n) = number.parse::<u8>() {
                return (1..=24).contains(&n).then_some(Key::Function(n));
            }
        }
        NamedKey::parse(token).map(Key::Named)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{c}"),
            Key::Function(n) => write!(f, "f{n}"),
            Key::Named(named) => f.write_str(named.as_str()),
        }
    }
}

/// A modifier set plus one key.
///
/// Field order gives the canonical ordering used by `Ord`, so chords sort
/// predictably inside a [`super::KeyMapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyChord {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub win: bool,
    pub key: Key,
}

impl KeyChord {
    /// Parses a chord such as `"ctrl+shift+t"`.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyChordError`] describing the first problem found.
    pub fn parse(text: &str) -> Result<Self, KeyChordError> {
        let text = text.trim().to_ascii_lowercase();
        if text.is_empty() {
            return Err(KeyChordError::Empty);
        }

        let (mut ctrl, mut alt, mut shift, mut win) = (false, false, false, false);
        let mut key = None;
        for token in text.split('+').map(str::trim) {
            if token.is_empty() {
                return Err(KeyChordError::EmptyToken);
            }
            let slot = match token {
                "ctrl" => &mut ctrl,
                "alt" => &mut alt,
                "shift" => &mut shift,
                "win" => &mut win,
                _ => {
                    let parsed =
                        Key::parse(token).ok_or_else(|| KeyChordError::UnknownKey(token.into()))?;
                    if key.replace(parsed).is_some() {
                        return Err(KeyChordError::MultipleKeys);
                    }
                    continue;
                }
            };
            if std::mem::replace(slot, true) {
                return Err(KeyChordError::DuplicateModifier(token.into()));
            }
        }

        Ok(Self {
            ctrl,
            alt,
            shift,
            win,
            key: key.ok_or(KeyChordError::MissingKey)?,
        })
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = [
            (self.ctrl, "ctrl+"),
            (self.alt, "alt+"),
            (self.shift, "shift+"),
            (self.win, "win+"),
        ];
        for (on, text) in modifiers {
            if on {
                f.write_str(text)?;
            }
        }
        write!(f, "{}", self.key)
    }
}
