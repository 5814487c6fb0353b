mod echo;
mod replay;

pub use echo::EchoInterface;
pub use replay::{ReplayInterface, TIMEOUT_LINE};

use std::io;
use std::time::Duration;

use crate::game::InputCode;
use crate::ui::{Screen, TextStyle};

/// What the interface can do, queried once at load and again on restart so
/// the story header can be filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub lines: u16,
    pub columns: u16,
    pub bold: bool,
    pub italic: bool,
    pub fixed_font: bool,
    pub timed_input: bool,
    pub colours: bool,
    pub graphics_font: bool,
    pub font_width: u8,
    pub font_height: u8,
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities {
            lines: 25,
            columns: 80,
            bold: false,
            italic: false,
            fixed_font: false,
            timed_input: false,
            colours: false,
            graphics_font: false,
            font_width: 1,
            font_height: 1,
        }
    }
}

/// The result of reading a line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineInput {
    /// A finished line and the key that ended it.
    Done(String, InputCode),
    /// The timeout expired. Carries what had been typed so far.
    Timeout(String),
    /// No more input will ever arrive.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharInput {
    Key(InputCode),
    Timeout,
    End,
}

/// The user interface. Responsible for both rendering the game and receiving input.
pub trait Interface {
    fn capabilities(&self) -> Capabilities;

    /// Print text to the active window
    fn print(&mut self, text: &str) -> io::Result<()>;

    /// Print a single character to the active window
    fn print_char(&mut self, c: char) -> io::Result<()> {
        self.print(c.encode_utf8(&mut [0; 4]))
    }

    /// Read a line of at most `max_chars` characters. `initial` has already
    /// been typed and may be edited.
    fn read_line(
        &mut self,
        initial: &str,
        max_chars: usize,
        timeout: Option<Duration>,
    ) -> io::Result<LineInput>;

    fn read_char(&mut self, timeout: Option<Duration>) -> io::Result<CharInput>;

    /// Show the version 1-3 status line.
    fn show_status(&mut self, _location: &str, _progress: &str) -> io::Result<()> {
        Ok(())
    }

    fn split_window(&mut self, _lines: u16) -> io::Result<()> {
        Ok(())
    }

    fn set_window(&mut self, _screen: Screen) -> io::Result<()> {
        Ok(())
    }

    /// Erase a window; -1 also unsplits the screen and -2 clears everything.
    fn erase_window(&mut self, _window: i16) -> io::Result<()> {
        Ok(())
    }

    fn erase_line(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn set_cursor(&mut self, _line: u16, _column: u16) -> io::Result<()> {
        Ok(())
    }

    /// The cursor position as (line, column), both 1-based.
    fn cursor(&self) -> (u16, u16) {
        (1, 1)
    }

    fn set_text_style(&mut self, _style: TextStyle) -> io::Result<()> {
        Ok(())
    }

    fn buffer_mode(&mut self, _enable: bool) {}

    fn set_colour(&mut self, _foreground: u16, _background: u16) -> io::Result<()> {
        Ok(())
    }

    /// Select a font, returning the previous one, or 0 if it is unavailable.
    fn set_font(&mut self, font: u16) -> u16 {
        match font {
            0 | 1 => 1,
            _ => 0,
        }
    }

    /// Show a fatal error to the player.
    fn report_error(&mut self, message: &str) -> io::Result<()>;

    /// The game exited, show a message then close.
    fn done(&mut self) -> io::Result<()> {
        Ok(())
    }
}
