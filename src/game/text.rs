//! Decoding of packed Z-character strings into ZSCII.

use tracing::warn;

use crate::game::alphabet::Alphabet;
use crate::game::memory::Memory;
use crate::game::zscii;
use crate::game::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    None,
    Abbreviation(u8),
    EscapeHigh,
    EscapeLow(u8),
}

/// Decodes Z-characters into a ZSCII buffer. The state is reset at the start
/// of every string, and abbreviations are expanded in place.
pub struct Decoder<'a> {
    memory: &'a Memory,
    alphabet: &'a Alphabet,
    version: u8,
    current: usize,
    locked: usize,
    pending: Pending,
    in_abbreviation: bool,
    output: Vec<u16>,
}

impl<'a> Decoder<'a> {
    pub fn new(memory: &'a Memory, alphabet: &'a Alphabet) -> Decoder<'a> {
        Decoder {
            memory,
            alphabet,
            version: memory.version(),
            current: 0,
            locked: 0,
            pending: Pending::None,
            in_abbreviation: false,
            output: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.current = 0;
        self.locked = 0;
        self.pending = Pending::None;
    }

    fn emit(&mut self, zscii: u16) {
        self.output.push(zscii);
        self.current = self.locked;
    }

    /// Feed the three Z-characters of a word. Returns true for the last word of
    /// a string.
    pub fn decode_word(&mut self, word: u16) -> Result<bool> {
        for shift in [10, 5, 0] {
            self.decode_char(((word >> shift) & 0x1f) as u8)?;
        }
        Ok(word & 0x8000 != 0)
    }

    pub fn decode_char(&mut self, z: u8) -> Result<()> {
        match self.pending {
            Pending::Abbreviation(bank) => {
                self.pending = Pending::None;
                return self.abbreviation(bank, z);
            }
            Pending::EscapeHigh => {
                self.pending = Pending::EscapeLow(z);
                return Ok(());
            }
            Pending::EscapeLow(high) => {
                self.pending = Pending::None;
                self.emit(u16::from(high) << 5 | u16::from(z));
                return Ok(());
            }
            Pending::None => {}
        }

        match (z, self.version) {
            (0, _) => self.emit(32),
            (1, 1) => self.emit(zscii::NEWLINE),
            (1, 2) | (1..=3, 3..=8) => self.pending = Pending::Abbreviation(z),
            (2..=5, 1..=2) => self.shift(z),
            (4, _) => self.current = 1,
            (5, _) => self.current = 2,
            (6, _) if self.current == 2 => self.pending = Pending::EscapeHigh,
            (7, v) if self.current == 2 && v != 1 => self.emit(zscii::NEWLINE),
            _ => {
                let c = self.alphabet.character(self.current, z);
                self.emit(u16::from(c));
            }
        }
        Ok(())
    }

    // Versions 1 and 2 shift relative to the locked alphabet; 4 and 5 lock.
    fn shift(&mut self, z: u8) {
        let step = if z % 2 == 0 { 1 } else { 2 };
        let target = (self.locked + step) % 3;
        if z >= 4 {
            self.locked = target;
        }
        self.current = target;
    }

    fn abbreviation(&mut self, bank: u8, z: u8) -> Result<()> {
        if self.in_abbreviation {
            warn!("Skipping abbreviation {}:{} inside an abbreviation", bank, z);
            return Ok(());
        }
        let index = 32 * (bank as usize - 1) + z as usize;
        let entry = self.memory.abbreviation_table() + index * 2;
        let address = self.memory.read_word(entry)? as usize * 2;

        let locked = self.locked;
        self.in_abbreviation = true;
        let result = self.print(address);
        self.in_abbreviation = false;
        self.locked = locked;
        self.current = locked;
        result.map(|_| ())
    }

    /// Decode the string at `address`, returning the address just past it.
    pub fn print(&mut self, address: usize) -> Result<usize> {
        self.reset();
        let mut cursor = address;
        loop {
            let word = self.memory.fetch_word(&mut cursor)?;
            if self.decode_word(word)? {
                return Ok(cursor);
            }
        }
    }

    pub fn output(&self) -> &[u16] {
        &self.output
    }

    pub fn into_output(self) -> Vec<u16> {
        self.output
    }
}

/// Decode the string at `address` into ZSCII, returning it with the address
/// of the next byte.
pub fn decode(memory: &Memory, alphabet: &Alphabet, address: usize) -> Result<(Vec<u16>, usize)> {
    let mut decoder = Decoder::new(memory, alphabet);
    let next = decoder.print(address)?;
    Ok((decoder.into_output(), next))
}

/// A block of raw ZSCII laid out in rows. Rows are `width` bytes long and
/// separated by `skip` further bytes; each row ends with a newline except the
/// last.
pub fn table(
    memory: &Memory,
    address: usize,
    width: usize,
    height: usize,
    skip: usize,
) -> Result<Vec<u16>> {
    let mut output = Vec::with_capacity((width + 1) * height);
    for row in 0..height {
        if row > 0 {
            output.push(zscii::NEWLINE);
        }
        let start = address + row * (width + skip);
        for column in 0..width {
            output.push(u16::from(memory.read_byte(start + column)?));
        }
    }
    Ok(output)
}
