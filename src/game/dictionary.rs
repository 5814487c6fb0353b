use tracing::trace;

use crate::game::alphabet::Alphabet;
use crate::game::memory::Memory;
use crate::game::Result;

/// The number of input characters that take part in a dictionary key.
pub fn max_word_length(version: u8) -> usize {
    if version <= 4 {
        6
    } else {
        9
    }
}

/// The number of 16-bit cells in a dictionary key.
pub fn key_cells(version: u8) -> usize {
    if version <= 3 {
        2
    } else {
        3
    }
}

/// Encode a word into a dictionary key. Abbreviations are never used; each
/// character is written with at most a single shift, and characters found in
/// no row are written as a ZSCII escape.
pub fn encode(alphabet: &Alphabet, text: &[u8]) -> Vec<u16> {
    let version = alphabet.version();
    let (shift_1, shift_2) = if version <= 2 { (2, 3) } else { (4, 5) };
    let length = key_cells(version) * 3;

    let mut zchars: Vec<u8> = Vec::with_capacity(length + 4);
    for c in text.iter().take(max_word_length(version)) {
        match alphabet.find(*c) {
            Some((0, z)) => zchars.push(z),
            Some((1, z)) => zchars.extend([shift_1, z]),
            Some((_, z)) => zchars.extend([shift_2, z]),
            None => zchars.extend([shift_2, 6, c >> 5, c & 0x1f]),
        }
    }
    zchars.resize(length, 5);

    let mut key: Vec<u16> = zchars
        .chunks(3)
        .map(|z| u16::from(z[0]) << 10 | u16::from(z[1]) << 5 | u16::from(z[2]))
        .collect();
    if let Some(last) = key.last_mut() {
        *last |= 0x8000;
    }
    key
}

/// A view over the story's dictionary table.
#[derive(Debug, Clone)]
pub struct Dictionary {
    separators: Vec<u8>,
    entry_length: usize,
    entry_count: usize,
    entries: usize,
}

impl Dictionary {
    pub fn new(memory: &Memory, address: usize) -> Result<Dictionary> {
        let mut cursor = address;
        let count = memory.fetch_byte(&mut cursor)? as usize;
        let separators = (0..count)
            .map(|_| memory.fetch_byte(&mut cursor))
            .collect::<Result<Vec<u8>>>()?;
        let entry_length = memory.fetch_byte(&mut cursor)? as usize;
        // A negative count marks an unsorted table; the scan is linear anyway.
        let entry_count = (memory.fetch_word(&mut cursor)? as i16).unsigned_abs() as usize;
        Ok(Dictionary {
            separators,
            entry_length,
            entry_count,
            entries: cursor,
        })
    }

    pub fn is_separator(&self, c: u8) -> bool {
        self.separators.contains(&c)
    }

    /// The address of the entry matching `key`, or 0.
    pub fn lookup(&self, memory: &Memory, key: &[u16]) -> Result<u16> {
        for i in 0..self.entry_count {
            let entry = self.entries + i * self.entry_length;
            let mut matched = true;
            for (j, cell) in key.iter().enumerate() {
                if memory.read_word(entry + j * 2)? != *cell {
                    matched = false;
                    break;
                }
            }
            if matched {
                return Ok(entry as u16);
            }
        }
        Ok(0)
    }
}

/// A word found in the input, with its position relative to the start of the
/// text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Word {
    start: usize,
    text: Vec<u8>,
}

fn split_words(dictionary: &Dictionary, text: &[u8], base: usize) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current: Option<Word> = None;
    for (i, c) in text.iter().enumerate() {
        if *c == b' ' || dictionary.is_separator(*c) {
            if let Some(word) = current.take() {
                words.push(word);
            }
            if *c != b' ' {
                words.push(Word {
                    start: base + i,
                    text: vec![*c],
                });
            }
        } else {
            current
                .get_or_insert_with(|| Word {
                    start: base + i,
                    text: Vec::new(),
                })
                .text
                .push(*c);
        }
    }
    if let Some(word) = current {
        words.push(word);
    }
    words
}

/// Split the text buffer at `text` into words, look each one up in the
/// dictionary at `dictionary`, and fill the parse buffer at `parse`.
///
/// With `allow_partial` set, words missing from the dictionary leave their
/// parse slot untouched.
pub fn tokenize(
    memory: &mut Memory,
    alphabet: &Alphabet,
    text: usize,
    parse: usize,
    dictionary: usize,
    allow_partial: bool,
) -> Result<()> {
    let version = memory.version();
    let dictionary = Dictionary::new(memory, dictionary)?;

    let (base, input) = if version <= 4 {
        let mut input = Vec::new();
        for i in 1..=256 {
            match memory.read_byte(text + i)? {
                0 => break,
                c => input.push(c),
            }
        }
        (1, input)
    } else {
        let length = memory.read_byte(text + 1)? as usize;
        let input = (0..length)
            .map(|i| memory.read_byte(text + 2 + i))
            .collect::<Result<Vec<u8>>>()?;
        (2, input)
    };

    let max_words = memory.read_byte(parse)? as usize;
    let words = split_words(&dictionary, &input, base);
    let mut count = 0;
    for word in words.iter().take(max_words) {
        let key = encode(alphabet, &word.text);
        let entry = dictionary.lookup(memory, &key)?;
        trace!(
            "Token '{}' at {} -> {:#06x}",
            String::from_utf8_lossy(&word.text),
            word.start,
            entry
        );
        let slot = parse + 2 + count * 4;
        if entry != 0 || !allow_partial {
            memory.write_word(slot, entry)?;
            memory.write_byte(slot + 2, word.text.len() as u8)?;
            memory.write_byte(slot + 3, word.start as u8)?;
        }
        count += 1;
    }
    memory.write_byte(parse + 1, count as u8)
}
