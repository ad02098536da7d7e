//! Keyboard input vocabulary for grid and form interaction.

use serde::{Deserialize, Serialize};

/// Named keys used by the interaction layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Enter / Return (commits a cell edit)
    Enter,
    /// Escape (cancels an edit, clears a selection)
    Escape,
    /// Tab (moves to the next cell)
    Tab,
    /// Backspace (clears the current cell content)
    Backspace,
    /// Delete
    Delete,
    /// Arrow up
    ArrowUp,
    /// Arrow down
    ArrowDown,
    /// Arrow left
    ArrowLeft,
    /// Arrow right
    ArrowRight,
    /// Home
    Home,
    /// End
    End,
}

impl Key {
    /// Wire name as dispatched to the driver
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "Enter",
            Self::Escape => "Escape",
            Self::Tab => "Tab",
            Self::Backspace => "Backspace",
            Self::Delete => "Delete",
            Self::ArrowUp => "ArrowUp",
            Self::ArrowDown => "ArrowDown",
            Self::ArrowLeft => "ArrowLeft",
            Self::ArrowRight => "ArrowRight",
            Self::Home => "Home",
            Self::End => "End",
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Modifier held during a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    /// Control (Command on macOS drivers)
    Ctrl,
    /// Shift
    Shift,
    /// Alt
    Alt,
}

impl Modifier {
    /// Wire name as dispatched to the driver
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ctrl => "Control",
            Self::Shift => "Shift",
            Self::Alt => "Alt",
        }
    }
}

/// A key press with optional modifiers (e.g., Shift+ArrowDown for
/// keyboard range selection)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChord {
    /// The key pressed
    pub key: Key,
    /// Modifiers held during the press
    pub modifiers: Vec<Modifier>,
}

impl KeyChord {
    /// A bare key press
    #[must_use]
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Vec::new(),
        }
    }

    /// A key press with Shift held
    #[must_use]
    pub fn shift(key: Key) -> Self {
        Self {
            key,
            modifiers: vec![Modifier::Shift],
        }
    }

    /// A key press with Ctrl held
    #[must_use]
    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: vec![Modifier::Ctrl],
        }
    }

    /// Render as `Modifier+Modifier+Key` for logging and mock history
    #[must_use]
    pub fn to_chord_string(&self) -> String {
        let mut parts: Vec<&str> = self.modifiers.iter().map(Modifier::as_str).collect();
        parts.push(self.key.as_str());
        parts.join("+")
    }
}

impl From<Key> for KeyChord {
    fn from(key: Key) -> Self {
        Self::plain(key)
    }
}

impl std::fmt::Display for KeyChord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_chord_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_wire_names() {
        assert_eq!(Key::Enter.as_str(), "Enter");
        assert_eq!(Key::Backspace.as_str(), "Backspace");
        assert_eq!(Key::ArrowDown.as_str(), "ArrowDown");
    }

    #[test]
    fn test_plain_chord() {
        assert_eq!(KeyChord::plain(Key::Escape).to_chord_string(), "Escape");
    }

    #[test]
    fn test_shift_chord() {
        assert_eq!(
            KeyChord::shift(Key::ArrowDown).to_chord_string(),
            "Shift+ArrowDown"
        );
    }

    #[test]
    fn test_ctrl_chord() {
        assert_eq!(KeyChord::ctrl(Key::Home).to_chord_string(), "Control+Home");
    }

    #[test]
    fn test_from_key() {
        let chord: KeyChord = Key::Tab.into();
        assert!(chord.modifiers.is_empty());
    }
}
