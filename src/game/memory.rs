use tracing::{info, warn};

use crate::game::error::GameError;
use crate::game::header;
use crate::game::Result;

/// The story's memory image. Every other part of the machine reads and
/// writes through here, so all bounds checks live in this one place.
#[derive(Clone)]
pub struct Memory {
    data: Vec<u8>,
    limit: usize,
}

/// The addressable ceiling for each story version.
pub fn version_limit(version: u8) -> Option<usize> {
    match version {
        1..=3 => Some(128 * 1024),
        4..=5 => Some(256 * 1024),
        7 => Some(320 * 1024),
        6 | 8 => Some(512 * 1024),
        _ => None,
    }
}

impl Memory {
    /// Load a story file, validating the header and declared length.
    pub fn new(story: &[u8]) -> Result<Memory> {
        if story.len() < header::HEADER_SIZE {
            return Err(GameError::invalid_file("File too small to hold a header"));
        }

        let version = story[header::VERSION];
        let limit = version_limit(version).ok_or(GameError::UnsupportedVersion(version))?;

        let mut length = header::story_length(story);
        if length == 0 {
            // Some early files leave the length field empty.
            length = story.len();
        }
        if length >= limit {
            return Err(GameError::invalid_file(format!(
                "Story length {:#x} exceeds the version {} limit of {:#x}",
                length, version, limit
            )));
        }
        if length > story.len() {
            return Err(GameError::invalid_file(format!(
                "Story is truncated: header declares {:#x} bytes, file has {:#x}",
                length,
                story.len()
            )));
        }
        if length < header::HEADER_SIZE {
            return Err(GameError::invalid_file("Declared story length is inside the header"));
        }

        let mut data = vec![0u8; limit];
        data[..length].copy_from_slice(&story[..length]);

        info!(
            "Loaded version {} story, {:#x} bytes (limit {:#x})",
            version, length, limit
        );
        Ok(Memory { data, limit })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn check(&self, address: usize) -> Result<()> {
        if address < self.limit {
            Ok(())
        } else {
            Err(GameError::OutOfRange(address))
        }
    }

    pub fn read_byte(&self, address: usize) -> Result<u8> {
        self.check(address)?;
        Ok(self.data[address])
    }

    pub fn read_word(&self, address: usize) -> Result<u16> {
        let high = self.read_byte(address)?;
        let low = self.read_byte(address + 1)?;
        Ok(u16::from_be_bytes([high, low]))
    }

    pub fn write_byte(&mut self, address: usize, value: u8) -> Result<()> {
        self.check(address)?;
        self.data[address] = value;
        Ok(())
    }

    pub fn write_word(&mut self, address: usize, value: u16) -> Result<()> {
        let [high, low] = value.to_be_bytes();
        self.write_byte(address, high)?;
        self.write_byte(address + 1, low)
    }

    /// Read a byte and advance the cursor past it.
    pub fn fetch_byte(&self, cursor: &mut usize) -> Result<u8> {
        let value = self.read_byte(*cursor)?;
        *cursor += 1;
        Ok(value)
    }

    /// Read a word and advance the cursor past it.
    pub fn fetch_word(&self, cursor: &mut usize) -> Result<u16> {
        let value = self.read_word(*cursor)?;
        *cursor += 2;
        Ok(value)
    }

    pub fn read_global(&self, index: u8) -> Result<u16> {
        self.read_word(self.global_base() + 2 * index as usize)
    }

    pub fn write_global(&mut self, index: u8, value: u16) -> Result<()> {
        self.write_word(self.global_base() + 2 * index as usize, value)
    }

    /// Convert a packed address into a byte address.
    pub fn unpack_address(&self, packed: u16, is_routine: bool) -> usize {
        let offset = if is_routine {
            self.routines_offset()
        } else {
            self.strings_offset()
        };
        unpack(self.version(), packed, offset)
    }

    /// Sum of every byte from the end of the header to the declared story
    /// length, modulo 0x10000.
    pub fn checksum(&self) -> u16 {
        let mut length = self.story_length();
        if length == 0 || length > self.limit {
            length = self.limit;
        }
        self.data[header::HEADER_SIZE..length]
            .iter()
            .fold(0u16, |acc, x| acc.wrapping_add(u16::from(*x)))
    }

    /// Compare the computed checksum with the header. A mismatch is not fatal.
    pub fn verify(&self) -> bool {
        let expected = self.header_checksum();
        let result = self.checksum();
        if expected == result {
            info!("Checksum OKAY: {:#06x}", result);
        } else {
            warn!(
                "Checksum ERROR: expected {:#06x}, found {:#06x}",
                expected, result
            );
        }
        expected == result
    }

    fn check_range(&self, address: usize, size: usize) -> Result<()> {
        if size > 0 {
            self.check(address + size - 1)?;
        }
        Ok(())
    }

    pub fn clear(&mut self, address: usize, size: usize) -> Result<()> {
        self.check_range(address, size)?;
        self.data[address..address + size].fill(0);
        Ok(())
    }

    /// Copy ascending from the first byte. Only safe when `to` does not
    /// overlap the unread tail of the source.
    pub fn copy_forward(&mut self, from: usize, to: usize, size: usize) -> Result<()> {
        self.check_range(from, size)?;
        self.check_range(to, size)?;
        for i in 0..size {
            self.data[to + i] = self.data[from + i];
        }
        Ok(())
    }

    /// Copy descending from the last byte, so `to > from` overlaps are safe.
    pub fn copy_backward(&mut self, from: usize, to: usize, size: usize) -> Result<()> {
        self.check_range(from, size)?;
        self.check_range(to, size)?;
        for i in (0..size).rev() {
            self.data[to + i] = self.data[from + i];
        }
        Ok(())
    }

    /// The dynamic portion of memory, used for undo and restart.
    pub fn dynamic(&self) -> &[u8] {
        &self.data[..self.static_base().min(self.limit)]
    }

    pub fn restore_dynamic(&mut self, snapshot: &[u8]) -> Result<()> {
        self.check_range(0, snapshot.len())?;
        self.data[..snapshot.len()].copy_from_slice(snapshot);
        Ok(())
    }

    pub(crate) fn raw(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// The version rules for unpacking addresses. `offset` is the v6/7 routine or
/// string segment offset from the header and is ignored by other versions.
pub fn unpack(version: u8, packed: u16, offset: u16) -> usize {
    let packed = packed as usize;
    match version {
        1..=3 => packed * 2,
        4..=5 => packed * 4,
        6..=7 => packed * 4 + offset as usize * 8,
        _ => packed * 8,
    }
}
