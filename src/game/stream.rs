use std::io::Write;

use tracing::{debug, warn};

use crate::game::error::GameError;
use crate::game::header::flags2;
use crate::game::memory::Memory;
use crate::game::zscii;
use crate::game::Result;
use crate::ui::Interface;

const MAX_MEMORY_STREAMS: usize = 16;

/// The four output streams. Stream 1 is the screen, 2 the transcript, 3 a
/// stack of tables in memory and 4 a record of the player's commands. While
/// stream 3 is selected, output goes to the innermost table and nowhere else.
pub struct OutputStreams {
    screen: bool,
    transcript: Option<Box<dyn Write>>,
    record: Option<Box<dyn Write>>,
    recording: bool,
    tables: Vec<usize>,
}

impl OutputStreams {
    pub fn new(transcript: Option<Box<dyn Write>>, record: Option<Box<dyn Write>>) -> OutputStreams {
        OutputStreams {
            screen: true,
            transcript,
            record,
            recording: false,
            tables: Vec::new(),
        }
    }

    /// Drop any memory streams and return to the screen. Used on restart.
    pub fn reset(&mut self) {
        self.screen = true;
        self.tables.clear();
    }

    /// Select (positive) or deselect (negative) a stream. `table` is required
    /// when selecting stream 3.
    pub fn select(&mut self, memory: &mut Memory, stream: i16, table: Option<usize>) -> Result<()> {
        debug!("output_stream {} {:?}", stream, table);
        match stream {
            0 => {}
            1 => self.screen = true,
            -1 => self.screen = false,
            2 => memory.set_flags2(memory.flags2() | flags2::TRANSCRIPT),
            -2 => memory.set_flags2(memory.flags2() & !flags2::TRANSCRIPT),
            3 => {
                let table = table.ok_or_else(|| {
                    GameError::invalid_operation("Output stream 3 selected without a table")
                })?;
                if self.tables.len() >= MAX_MEMORY_STREAMS {
                    return Err(GameError::invalid_operation(
                        "Output stream 3 nested too deeply",
                    ));
                }
                memory.write_word(table, 0)?;
                self.tables.push(table);
            }
            -3 => {
                self.tables.pop();
            }
            4 => self.recording = true,
            -4 => self.recording = false,
            _ => warn!("Ignoring unknown output stream {}", stream),
        }
        Ok(())
    }

    fn transcribing(&self, memory: &Memory) -> bool {
        memory.flags2() & flags2::TRANSCRIPT != 0
    }

    pub fn print(
        &mut self,
        memory: &mut Memory,
        interface: &mut dyn Interface,
        text: &[u16],
    ) -> Result<()> {
        if let Some(&table) = self.tables.last() {
            let mut count = memory.read_word(table)? as usize;
            for c in text {
                memory.write_byte(table + 2 + count, *c as u8)?;
                count += 1;
            }
            return memory.write_word(table, count as u16);
        }

        let text = zscii::to_string(text);
        if self.screen {
            interface.print(&text)?;
        }
        if self.transcribing(memory) {
            if let Some(transcript) = self.transcript.as_mut() {
                transcript.write_all(text.as_bytes())?;
            }
        }
        Ok(())
    }

    /// Copy a line the player typed to the transcript and command record. The
    /// screen has already echoed it.
    pub fn echo_input(&mut self, memory: &Memory, line: &str) -> Result<()> {
        if self.transcribing(memory) {
            if let Some(transcript) = self.transcript.as_mut() {
                writeln!(transcript, "{}", line)?;
            }
        }
        if self.recording {
            if let Some(record) = self.record.as_mut() {
                writeln!(record, "{}", line)?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(transcript) = self.transcript.as_mut() {
            transcript.flush()?;
        }
        if let Some(record) = self.record.as_mut() {
            record.flush()?;
        }
        Ok(())
    }
}
