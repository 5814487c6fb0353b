use crate::game::zscii;

/// A key press as reported by the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCode {
    Character(char),
    Newline,
    Delete,
    Escape,
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
}

impl InputCode {
    /// The ZSCII code a story sees for this key. Characters with no ZSCII
    /// equivalent read as `?`.
    pub fn to_zscii(self) -> u16 {
        match self {
            InputCode::Character(c) => zscii::from_char(c).unwrap_or(b'?' as u16),
            InputCode::Newline => zscii::NEWLINE,
            InputCode::Delete => zscii::DELETE,
            InputCode::Escape => zscii::ESCAPE,
            InputCode::CursorUp => 129,
            InputCode::CursorDown => 130,
            InputCode::CursorLeft => 131,
            InputCode::CursorRight => 132,
        }
    }
}
