//! Key chords for the console client.
//!
//! Chords are written as dash-separated strings such as `ctrl-enter` and
//! come from the console section of the configuration. The three bound
//! actions (submit, history-previous, history-next) consume their chord
//! entirely so the input pane never sees it as an ordinary keystroke.

use std::fmt;

use smol_str::SmolStr;
use thiserror::Error;

/// Error produced when a chord string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid chord `{chord}`: {reason}")]
pub struct InvalidChord {
    /// The rejected chord string.
    pub chord: SmolStr,
    /// What was wrong with it.
    pub reason: &'static str,
}

/// A key that can anchor a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordKey {
    /// The enter / return key.
    Enter,
    /// Cursor up.
    Up,
    /// Cursor down.
    Down,
    /// The tab key.
    Tab,
    /// The escape key.
    Escape,
    /// A printable character.
    Char(char),
}

/// A parsed key combination such as `ctrl-enter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chord {
    /// Control held.
    pub ctrl: bool,
    /// Alt held.
    pub alt: bool,
    /// Shift held.
    pub shift: bool,
    /// The anchoring key.
    pub key: ChordKey,
}

impl Chord {
    /// Parses a chord string.
    ///
    /// Modifiers (`ctrl`, `alt`, `shift`) come first, the key last, joined
    /// by `-` or `+`. Parsing is case-insensitive.
    pub fn parse(text: &str) -> Result<Self, InvalidChord> {
        let invalid = |reason| InvalidChord {
            chord: SmolStr::new(text),
            reason,
        };

        let normalized = text.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(invalid("empty chord"));
        }

        let parts: Vec<&str> = normalized.split(['-', '+']).collect();
        let Some((key_part, modifiers)) = parts.split_last() else {
            return Err(invalid("empty chord"));
        };

        let mut ctrl = false;
        let mut alt = false;
        let mut shift = false;
        for modifier in modifiers {
            match *modifier {
                "ctrl" | "control" => ctrl = true,
                "alt" => alt = true,
                "shift" => shift = true,
                _ => return Err(invalid("unknown modifier")),
            }
        }

        let key = match *key_part {
            "enter" | "return" => ChordKey::Enter,
            "up" => ChordKey::Up,
            "down" => ChordKey::Down,
            "tab" => ChordKey::Tab,
            "esc" | "escape" => ChordKey::Escape,
            "space" => ChordKey::Char(' '),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => ChordKey::Char(ch),
                    _ => return Err(invalid("unknown key")),
                }
            }
        };

        Ok(Self {
            ctrl,
            alt,
            shift,
            key,
        })
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "ctrl-")?;
        }
        if self.alt {
            write!(f, "alt-")?;
        }
        if self.shift {
            write!(f, "shift-")?;
        }
        match self.key {
            ChordKey::Enter => write!(f, "enter"),
            ChordKey::Up => write!(f, "up"),
            ChordKey::Down => write!(f, "down"),
            ChordKey::Tab => write!(f, "tab"),
            ChordKey::Escape => write!(f, "esc"),
            ChordKey::Char(' ') => write!(f, "space"),
            ChordKey::Char(ch) => write!(f, "{ch}"),
        }
    }
}

/// The chord bindings for the console client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keymap {
    /// Submits the input pane's content.
    pub submit: Chord,
    /// Recalls the previous (older) command.
    pub history_prev: Chord,
    /// Recalls the next (newer) command, clearing at fresh input.
    pub history_next: Chord,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            submit: Chord {
                ctrl: true,
                alt: false,
                shift: false,
                key: ChordKey::Enter,
            },
            history_prev: Chord {
                ctrl: true,
                alt: false,
                shift: false,
                key: ChordKey::Up,
            },
            history_next: Chord {
                ctrl: true,
                alt: false,
                shift: false,
                key: ChordKey::Down,
            },
        }
    }
}

impl Keymap {
    /// Builds a keymap from three chord strings.
    pub fn from_bindings(
        submit: &str,
        history_prev: &str,
        history_next: &str,
    ) -> Result<Self, InvalidChord> {
        Ok(Self {
            submit: Chord::parse(submit)?,
            history_prev: Chord::parse(history_prev)?,
            history_next: Chord::parse(history_next)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_default_chords() {
        assert_eq!(Chord::parse("ctrl-enter").unwrap(), Keymap::default().submit);
        assert_eq!(
            Chord::parse("ctrl-up").unwrap(),
            Keymap::default().history_prev
        );
        assert_eq!(
            Chord::parse("ctrl-down").unwrap(),
            Keymap::default().history_next
        );
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(
            Chord::parse("Ctrl-Enter").unwrap(),
            Chord::parse("ctrl-enter").unwrap()
        );
    }

    #[test]
    fn accepts_plus_separators_and_aliases() {
        let chord = Chord::parse("control+return").unwrap();
        assert!(chord.ctrl);
        assert_eq!(chord.key, ChordKey::Enter);
    }

    #[test]
    fn parses_character_keys() {
        let chord = Chord::parse("ctrl-alt-x").unwrap();
        assert!(chord.ctrl);
        assert!(chord.alt);
        assert_eq!(chord.key, ChordKey::Char('x'));
    }

    #[test]
    fn rejects_unknown_modifiers_and_keys() {
        assert!(Chord::parse("hyper-enter").is_err());
        assert!(Chord::parse("ctrl-banana").is_err());
        assert!(Chord::parse("").is_err());
    }

    #[test]
    fn displays_in_parseable_form() {
        let chord = Chord::parse("ctrl-shift-p").unwrap();
        assert_eq!(chord.to_string(), "ctrl-shift-p");
        assert_eq!(Chord::parse(&chord.to_string()).unwrap(), chord);
    }
}
