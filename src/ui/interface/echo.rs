use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor::MoveLeft,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    queue,
    style::{Attribute, Print, ResetColor, SetAttribute},
    terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType},
};

use crate::game::InputCode;
use crate::ui::interface::{Capabilities, CharInput, Interface, LineInput};
use crate::ui::{Screen, TextStyle};

/// A plain terminal interface that echoes the lower window line by line.
/// Text sent to the upper window is dropped, apart from the status line.
pub struct EchoInterface {
    stdout: Stdout,
    text_style: TextStyle,
    active_screen: Screen,
}

enum Key {
    Code(KeyCode),
    Interrupt,
}

impl EchoInterface {
    pub fn new() -> io::Result<EchoInterface> {
        enable_raw_mode()?;
        Ok(EchoInterface {
            stdout: io::stdout(),
            text_style: TextStyle::default(),
            active_screen: Screen::Lower,
        })
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        // Raw mode needs explicit carriage returns.
        let text = text.replace('\n', "\r\n");
        if self.text_style.bold {
            queue!(self.stdout, SetAttribute(Attribute::Bold))?;
        }
        if self.text_style.emphasis {
            queue!(self.stdout, SetAttribute(Attribute::Underlined))?;
        }
        if self.text_style.reverse_video {
            queue!(self.stdout, SetAttribute(Attribute::Reverse))?;
        }
        queue!(self.stdout, Print(text), SetAttribute(Attribute::Reset))?;
        self.stdout.flush()
    }

    /// Wait for a key until `deadline`. `None` means the deadline passed.
    fn next_key(&mut self, deadline: Option<Instant>) -> io::Result<Option<Key>> {
        loop {
            if let Some(deadline) = deadline {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() || !event::poll(remaining)? {
                    return Ok(None);
                }
            }
            if let Event::Key(KeyEvent {
                code, modifiers, ..
            }) = event::read()?
            {
                if modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(code, KeyCode::Char('c') | KeyCode::Char('d'))
                {
                    return Ok(Some(Key::Interrupt));
                }
                return Ok(Some(Key::Code(code)));
            }
        }
    }
}

impl Drop for EchoInterface {
    fn drop(&mut self) {
        let _ = queue!(self.stdout, ResetColor, SetAttribute(Attribute::Reset));
        let _ = self.stdout.flush();
        let _ = disable_raw_mode();
    }
}

impl Interface for EchoInterface {
    fn capabilities(&self) -> Capabilities {
        let (columns, lines) = terminal::size().unwrap_or((80, 25));
        Capabilities {
            lines,
            columns,
            bold: true,
            italic: true,
            fixed_font: true,
            timed_input: true,
            ..Capabilities::default()
        }
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        if self.active_screen == Screen::Upper {
            return Ok(());
        }
        self.write(text)
    }

    fn read_line(
        &mut self,
        initial: &str,
        max_chars: usize,
        timeout: Option<Duration>,
    ) -> io::Result<LineInput> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut line = initial.to_string();
        loop {
            match self.next_key(deadline)? {
                None => return Ok(LineInput::Timeout(line)),
                Some(Key::Interrupt) => return Ok(LineInput::End),
                Some(Key::Code(KeyCode::Enter)) => {
                    self.write("\n")?;
                    return Ok(LineInput::Done(line, InputCode::Newline));
                }
                Some(Key::Code(KeyCode::Char(c))) => {
                    if line.chars().count() < max_chars {
                        self.write(c.encode_utf8(&mut [0; 4]))?;
                        line.push(c);
                    }
                }
                Some(Key::Code(KeyCode::Backspace)) => {
                    if line.pop().is_some() {
                        queue!(self.stdout, MoveLeft(1), Print(" "), MoveLeft(1))?;
                        self.stdout.flush()?;
                    }
                }
                Some(Key::Code(_)) => {}
            }
        }
    }

    fn read_char(&mut self, timeout: Option<Duration>) -> io::Result<CharInput> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let code = match self.next_key(deadline)? {
                None => return Ok(CharInput::Timeout),
                Some(Key::Interrupt) => return Ok(CharInput::End),
                Some(Key::Code(code)) => code,
            };
            let input = match code {
                KeyCode::Enter => InputCode::Newline,
                KeyCode::Char(c) => InputCode::Character(c),
                KeyCode::Up => InputCode::CursorUp,
                KeyCode::Down => InputCode::CursorDown,
                KeyCode::Left => InputCode::CursorLeft,
                KeyCode::Right => InputCode::CursorRight,
                KeyCode::Backspace | KeyCode::Delete => InputCode::Delete,
                KeyCode::Esc => InputCode::Escape,
                _ => continue,
            };
            return Ok(CharInput::Key(input));
        }
    }

    fn show_status(&mut self, location: &str, progress: &str) -> io::Result<()> {
        let columns = self.capabilities().columns as usize;
        let padding = columns
            .saturating_sub(location.chars().count() + progress.chars().count() + 2)
            .max(1);
        let line = format!(" {}{}{} ", location, " ".repeat(padding), progress);
        queue!(
            self.stdout,
            SetAttribute(Attribute::Reverse),
            Print(line),
            SetAttribute(Attribute::Reset),
            Print("\r\n")
        )?;
        self.stdout.flush()
    }

    fn set_window(&mut self, screen: Screen) -> io::Result<()> {
        self.active_screen = screen;
        Ok(())
    }

    fn erase_window(&mut self, window: i16) -> io::Result<()> {
        if window < 0 {
            queue!(self.stdout, Clear(ClearType::All))?;
            self.stdout.flush()?;
        }
        Ok(())
    }

    fn set_text_style(&mut self, style: TextStyle) -> io::Result<()> {
        self.text_style = style;
        Ok(())
    }

    fn report_error(&mut self, message: &str) -> io::Result<()> {
        self.text_style = TextStyle::default();
        queue!(
            self.stdout,
            Print("\r\n"),
            SetAttribute(Attribute::Bold),
            Print(format!("Fatal error: {}", message)),
            SetAttribute(Attribute::Reset),
            Print("\r\n")
        )?;
        self.stdout.flush()
    }

    fn done(&mut self) -> io::Result<()> {
        self.text_style = TextStyle::default();
        self.write("\n[Press any key to exit]")?;
        self.next_key(None)?;
        self.write("\n")
    }
}
