//! Keyboard input types delivered by the windowing layer.

use serde::{Deserialize, Serialize};

/// Discrete key press reported by the window.
///
/// Only keys with a fixed terminal encoding get their own variant; printable
/// input arrives separately as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Escape key
    Escape,
    /// Backspace key
    Backspace,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Main Enter/Return key
    Enter,
    /// Secondary Enter (keypad)
    KeypadEnter,
    /// Any other key, identified by a platform scan code
    Other(u32),
}

/// Byte layout used for the horizontal arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowLayout {
    /// Right sends `ESC [ C`, Left sends `ESC [ D`
    #[default]
    Standard,
    /// Left and Right transposed, as the historical front-end shipped them
    Legacy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_layout_default() {
        assert_eq!(ArrowLayout::default(), ArrowLayout::Standard);
    }

    #[test]
    fn test_arrow_layout_deserialize() {
        let layout: ArrowLayout = serde_yaml::from_str("legacy").unwrap();
        assert_eq!(layout, ArrowLayout::Legacy);
        let layout: ArrowLayout = serde_yaml::from_str("standard").unwrap();
        assert_eq!(layout, ArrowLayout::Standard);
    }
}
