use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use crate::game::InputCode;
use crate::ui::interface::{Capabilities, CharInput, Interface, LineInput};
use crate::ui::Screen;

/// A script line that makes a timed read time out instead of supplying input.
/// Reads without a timeout skip it.
pub const TIMEOUT_LINE: &str = "<timeout>";

enum ScriptLine {
    Input(String),
    Timeout,
}

/// Plays a fixed script of commands, one per line, and captures everything the
/// game prints to the lower window. Input is echoed into the capture so it
/// reads like a session transcript.
pub struct ReplayInterface {
    input: VecDeque<String>,
    output: Rc<RefCell<String>>,
    echo: bool,
    active_screen: Screen,
}

impl ReplayInterface {
    pub fn new(script: &str) -> ReplayInterface {
        ReplayInterface {
            input: script.lines().map(|l| l.trim_end().to_string()).collect(),
            output: Rc::new(RefCell::new(String::new())),
            echo: false,
            active_screen: Screen::Lower,
        }
    }

    /// Also copy everything to stdout as it is captured.
    pub fn with_echo(mut self, echo: bool) -> ReplayInterface {
        self.echo = echo;
        self
    }

    /// A shared handle on the captured output, usable after the interface has
    /// been handed to the engine.
    pub fn output(&self) -> Rc<RefCell<String>> {
        Rc::clone(&self.output)
    }

    fn capture(&mut self, text: &str) -> io::Result<()> {
        self.output.borrow_mut().push_str(text);
        if self.echo {
            let mut stdout = io::stdout();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
        Ok(())
    }

    fn next_line(&mut self, timed: bool) -> Option<ScriptLine> {
        loop {
            let next = self.input.pop_front()?;
            if next != TIMEOUT_LINE {
                return Some(ScriptLine::Input(next));
            }
            if timed {
                return Some(ScriptLine::Timeout);
            }
        }
    }
}

impl Interface for ReplayInterface {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            timed_input: true,
            ..Capabilities::default()
        }
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        if self.active_screen == Screen::Upper {
            return Ok(());
        }
        self.capture(text)
    }

    fn read_line(
        &mut self,
        initial: &str,
        max_chars: usize,
        timeout: Option<Duration>,
    ) -> io::Result<LineInput> {
        let next = match self.next_line(timeout.is_some()) {
            Some(ScriptLine::Input(next)) => next,
            Some(ScriptLine::Timeout) => return Ok(LineInput::Timeout(initial.to_string())),
            None => return Ok(LineInput::End),
        };
        let line: String = initial
            .chars()
            .chain(next.chars())
            .take(max_chars)
            .collect();
        self.capture(&next)?;
        self.capture("\n")?;
        Ok(LineInput::Done(line, InputCode::Newline))
    }

    fn read_char(&mut self, timeout: Option<Duration>) -> io::Result<CharInput> {
        let next = match self.next_line(timeout.is_some()) {
            Some(ScriptLine::Input(next)) => next,
            Some(ScriptLine::Timeout) => return Ok(CharInput::Timeout),
            None => return Ok(CharInput::End),
        };
        Ok(CharInput::Key(match next.chars().next() {
            Some(c) => InputCode::Character(c),
            None => InputCode::Newline,
        }))
    }

    fn set_window(&mut self, screen: Screen) -> io::Result<()> {
        self.active_screen = screen;
        Ok(())
    }

    fn report_error(&mut self, message: &str) -> io::Result<()> {
        self.capture(&format!("\nFatal error: {}\n", message))
    }
}
