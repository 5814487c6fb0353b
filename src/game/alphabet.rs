use crate::game::memory::Memory;
use crate::game::Result;

const ALPHABET_0: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";
const ALPHABET_1: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
// '@' marks Z-character 6, the ZSCII escape, which never indexes the table.
const ALPHABET_2: &[u8; 26] = b"@\n0123456789.,!?_#'\"/\\-:()";
const ALPHABET_2_V1: &[u8; 26] = b"@0123456789.,!?_#'\"/\\<-:()";

const ROW: usize = 26;

/// The three rows of characters addressed by Z-characters 6 to 31.
#[derive(Clone, Debug)]
pub struct Alphabet {
    version: u8,
    rows: [u8; ROW * 3],
}

impl Alphabet {
    pub fn new(version: u8) -> Alphabet {
        let mut rows = [0u8; ROW * 3];
        rows[..ROW].copy_from_slice(ALPHABET_0);
        rows[ROW..ROW * 2].copy_from_slice(ALPHABET_1);
        rows[ROW * 2..].copy_from_slice(match version {
            1 => ALPHABET_2_V1,
            _ => ALPHABET_2,
        });
        Alphabet { version, rows }
    }

    /// Build the alphabet for a loaded story, honouring a custom table in v5+.
    pub fn from_memory(memory: &Memory) -> Result<Alphabet> {
        let mut alphabet = Alphabet::new(memory.version());
        let table = memory.alphabet_table();
        if table != 0 {
            for (i, cell) in alphabet.rows.iter_mut().enumerate() {
                *cell = memory.read_byte(table + i)?;
            }
            tracing::info!("Using custom alphabet table at {:#x}", table);
        }
        Ok(alphabet)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// The ZSCII character for Z-character `z` (6 to 31) in row `row`.
    pub fn character(&self, row: usize, z: u8) -> u8 {
        self.rows[row * ROW + (z as usize - 6)]
    }

    /// Find the row and Z-character that print `c`. The escape slot and, outside
    /// version 1, the newline slot of the last row are never matched.
    pub fn find(&self, c: u8) -> Option<(usize, u8)> {
        let reserved = if self.version == 1 { 1 } else { 2 };
        self.rows
            .iter()
            .enumerate()
            .filter(|(i, _)| *i < ROW * 2 || *i >= ROW * 2 + reserved)
            .find(|(_, x)| **x == c)
            .map(|(i, _)| (i / ROW, (i % ROW) as u8 + 6))
    }
}
