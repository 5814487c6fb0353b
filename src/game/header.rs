//! The locations of important information in the header section of the story
//! file, and accessors that read them out of the memory image.

use crate::game::config::Config;
use crate::game::memory::Memory;
use crate::ui::Capabilities;

pub const HEADER_SIZE: usize = 0x40;

// Common to all versions
pub const VERSION: usize = 0x0;
pub const FLAGS_1: usize = 0x1;
pub const RELEASE: usize = 0x2;
pub const HIGH_MEMORY_BASE: usize = 0x4;
pub const PROGRAM_COUNTER_STARTS: usize = 0x6;
pub const DICTIONARY_LOCATION: usize = 0x8;
pub const OBJECT_TABLE_LOCATION: usize = 0xA;
pub const GLOBAL_VARIABLE_TABLE_LOCATION: usize = 0xC;
pub const STATIC_MEMORY_BASE: usize = 0xE;
pub const FLAGS_2: usize = 0x10;
pub const SERIAL: usize = 0x12;

// Version 2+
pub const ABBREVIATION_TABLE_LOCATION: usize = 0x18;

// Version 3+
pub const FILE_LENGTH: usize = 0x1A; // Not present in some early version 3 files
pub const CHECKSUM: usize = 0x1C; // ditto

// Version 4+
pub const INTERPRETER_NUMBER: usize = 0x1E;
pub const INTERPRETER_VERSION: usize = 0x1F;
pub const SCREEN_LINES: usize = 0x20;
pub const SCREEN_COLUMNS: usize = 0x21;

// Version 5+
pub const SCREEN_WIDTH_UNITS: usize = 0x22;
pub const SCREEN_HEIGHT_UNITS: usize = 0x24;
pub const FONT_WIDTH: usize = 0x26; // Swapped with height in version 6
pub const FONT_HEIGHT: usize = 0x27;
pub const ROUTINES_OFFSET: usize = 0x28;
pub const STRINGS_OFFSET: usize = 0x2A;
pub const TERMINATING_CHARACTER_TABLE_LOCATION: usize = 0x2E;
pub const STANDARD_REVISION_NUMBER: usize = 0x32;
pub const ALPHABET_TABLE_LOCATION: usize = 0x34;

pub mod flags1 {
    // Versions 1-3
    pub const STATUS_TIME: u8 = 1 << 1;
    pub const STATUS_UNAVAILABLE: u8 = 1 << 4;
    pub const SCREEN_SPLIT: u8 = 1 << 5;
    pub const VARIABLE_PITCH: u8 = 1 << 6;
    // Versions 4+
    pub const COLOURS: u8 = 1 << 0;
    pub const PICTURES: u8 = 1 << 1;
    pub const BOLD: u8 = 1 << 2;
    pub const ITALIC: u8 = 1 << 3;
    pub const FIXED: u8 = 1 << 4;
    pub const SOUNDS: u8 = 1 << 5;
    pub const TIMED_INPUT: u8 = 1 << 7;
}

pub mod flags2 {
    pub const TRANSCRIPT: u16 = 1 << 0;
    pub const FORCE_FIXED: u16 = 1 << 1;
    pub const PICTURES: u16 = 1 << 3;
}

fn word_at(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

/// The story length in bytes as declared by the header of a raw story file.
/// The caller must ensure the slice holds at least a full header.
pub fn story_length(story: &[u8]) -> usize {
    let factor = match story[VERSION] {
        1..=3 => 2,
        4..=5 => 4,
        _ => 8,
    };
    word_at(story, FILE_LENGTH) as usize * factor
}

impl Memory {
    // The memory image is always at least a header long, so these cannot fault.
    fn header_byte(&self, offset: usize) -> u8 {
        self.raw()[offset]
    }

    fn header_word(&self, offset: usize) -> u16 {
        word_at(self.raw(), offset)
    }

    fn set_header_byte(&mut self, offset: usize, value: u8) {
        self.raw_mut()[offset] = value;
    }

    fn set_header_word(&mut self, offset: usize, value: u16) {
        self.raw_mut()[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }

    pub fn version(&self) -> u8 {
        self.header_byte(VERSION)
    }

    pub fn flags1(&self) -> u8 {
        self.header_byte(FLAGS_1)
    }

    pub fn release(&self) -> u16 {
        self.header_word(RELEASE)
    }

    pub fn serial(&self) -> String {
        self.raw()[SERIAL..SERIAL + 6]
            .iter()
            .map(|b| *b as char)
            .collect()
    }

    pub fn high_memory_base(&self) -> usize {
        self.header_word(HIGH_MEMORY_BASE).into()
    }

    pub fn program_counter_starts(&self) -> u16 {
        self.header_word(PROGRAM_COUNTER_STARTS)
    }

    pub fn dictionary_location(&self) -> usize {
        self.header_word(DICTIONARY_LOCATION).into()
    }

    pub fn object_table_location(&self) -> usize {
        self.header_word(OBJECT_TABLE_LOCATION).into()
    }

    pub fn global_base(&self) -> usize {
        self.header_word(GLOBAL_VARIABLE_TABLE_LOCATION).into()
    }

    pub fn static_base(&self) -> usize {
        self.header_word(STATIC_MEMORY_BASE).into()
    }

    pub fn flags2(&self) -> u16 {
        self.header_word(FLAGS_2)
    }

    pub fn set_flags2(&mut self, value: u16) {
        self.set_header_word(FLAGS_2, value)
    }

    pub fn abbreviation_table(&self) -> usize {
        self.header_word(ABBREVIATION_TABLE_LOCATION).into()
    }

    /// Declared story length in bytes.
    pub fn story_length(&self) -> usize {
        story_length(self.raw())
    }

    pub fn header_checksum(&self) -> u16 {
        self.header_word(CHECKSUM)
    }

    pub fn routines_offset(&self) -> u16 {
        self.header_word(ROUTINES_OFFSET)
    }

    pub fn strings_offset(&self) -> u16 {
        self.header_word(STRINGS_OFFSET)
    }

    pub fn alphabet_table(&self) -> usize {
        if self.version() >= 5 {
            self.header_word(ALPHABET_TABLE_LOCATION).into()
        } else {
            0
        }
    }

    /// Write the interpreter's capabilities and screen geometry into the
    /// header. Called at load and again after a restart.
    pub fn configure_header(&mut self, capabilities: &Capabilities, config: &Config) {
        use flags1::*;

        let version = self.version();
        let mut flags = self.flags1();

        if version <= 3 {
            flags &= !(STATUS_UNAVAILABLE | SCREEN_SPLIT | VARIABLE_PITCH);
            if !config.status_line {
                flags |= STATUS_UNAVAILABLE;
            }
            if config.screen_splitting {
                flags |= SCREEN_SPLIT;
            }
            if config.variable_pitch_font {
                flags |= VARIABLE_PITCH;
            }
        } else {
            flags &= !(COLOURS | PICTURES | BOLD | ITALIC | FIXED | SOUNDS | TIMED_INPUT);
            if capabilities.bold {
                flags |= BOLD;
            }
            if capabilities.italic {
                flags |= ITALIC;
            }
            if capabilities.fixed_font {
                flags |= FIXED;
            }
            if capabilities.timed_input {
                flags |= TIMED_INPUT;
            }
            if version >= 5 && capabilities.colours {
                flags |= COLOURS;
            }
        }
        self.set_header_byte(FLAGS_1, flags);

        if version == 5 && !capabilities.graphics_font {
            let flags = self.flags2() & !flags2::PICTURES;
            self.set_flags2(flags);
        }

        self.set_header_word(
            STANDARD_REVISION_NUMBER,
            u16::from(config.standard_major) << 8 | u16::from(config.standard_minor),
        );

        if version >= 4 {
            self.set_header_byte(INTERPRETER_NUMBER, config.interpreter_number);
            self.set_header_byte(INTERPRETER_VERSION, config.interpreter_version);
            self.set_header_byte(SCREEN_LINES, capabilities.lines.min(255) as u8);
            self.set_header_byte(SCREEN_COLUMNS, capabilities.columns.min(255) as u8);
        }

        if version >= 5 {
            self.set_header_word(
                SCREEN_WIDTH_UNITS,
                capabilities.columns * u16::from(capabilities.font_width),
            );
            self.set_header_word(
                SCREEN_HEIGHT_UNITS,
                capabilities.lines * u16::from(capabilities.font_height),
            );
            let (first, second) = if version == 6 {
                (capabilities.font_width, capabilities.font_height)
            } else {
                (capabilities.font_height, capabilities.font_width)
            };
            self.set_header_byte(FONT_WIDTH, first);
            self.set_header_byte(FONT_HEIGHT, second);
        }
    }
}
