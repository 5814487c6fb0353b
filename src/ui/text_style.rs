#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub bold: bool,
    pub emphasis: bool,
    pub fixed_width: bool,
    pub reverse_video: bool,
}

impl TextStyle {
    /// Apply a `set_text_style` mask. Zero returns to roman, anything else
    /// adds to the current style.
    pub fn apply(&mut self, mask: u16) {
        if mask == 0 {
            *self = TextStyle::default();
            return;
        }
        self.reverse_video |= mask & 1 != 0;
        self.bold |= mask & 2 != 0;
        self.emphasis |= mask & 4 != 0;
        self.fixed_width |= mask & 8 != 0;
    }
}
