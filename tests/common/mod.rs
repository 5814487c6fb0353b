//! Assembles small story files in memory for the engine tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use zaffre::game::alphabet::Alphabet;
use zaffre::game::config::Config;
use zaffre::game::dictionary;
use zaffre::game::error::GameError;
use zaffre::game::state::GameState;
use zaffre::ui::interface::ReplayInterface;

pub const ABBREVIATIONS: usize = 0x40;
pub const GLOBALS: usize = 0x100;
pub const OBJECTS: usize = 0x300;
/// Free dynamic memory for text buffers and tables.
pub const SCRATCH: usize = 0x500;
pub const DICTIONARY: usize = 0x600;
pub const CODE: usize = 0x800;
/// Routines and strings can be placed from here on.
pub const HIGH: usize = 0xA00;
const SIZE: usize = 0x1000;

/// Encode `text` as a Z-machine string, setting the end bit on the last word.
pub fn zstring(version: u8, text: &str) -> Vec<u8> {
    let alphabet = Alphabet::new(version);
    let (shift_1, shift_2) = if version <= 2 { (2, 3) } else { (4, 5) };
    let mut zchars: Vec<u8> = Vec::new();
    for c in text.bytes() {
        match c {
            b' ' => zchars.push(0),
            b'\n' if version > 1 => zchars.extend([shift_2, 7]),
            b'\n' => zchars.push(1),
            _ => match alphabet.find(c) {
                Some((0, z)) => zchars.push(z),
                Some((1, z)) => zchars.extend([shift_1, z]),
                Some((_, z)) => zchars.extend([shift_2, z]),
                None => zchars.extend([shift_2, 6, c >> 5, c & 0x1f]),
            },
        }
    }
    while zchars.is_empty() || zchars.len() % 3 != 0 {
        zchars.push(5);
    }
    let mut bytes = Vec::new();
    let words = zchars.len() / 3;
    for (i, z) in zchars.chunks(3).enumerate() {
        let mut word = u16::from(z[0]) << 10 | u16::from(z[1]) << 5 | u16::from(z[2]);
        if i == words - 1 {
            word |= 0x8000;
        }
        bytes.extend(word.to_be_bytes());
    }
    bytes
}

struct Object {
    name: String,
    parent: u16,
    sibling: u16,
    child: u16,
    attributes: Vec<u16>,
    properties: Vec<(u8, Vec<u8>)>,
}

/// Builds a story image. The header, abbreviation table, globals, object
/// table and dictionary sit at fixed addresses; execution starts at `CODE`.
pub struct StoryBuilder {
    version: u8,
    data: Vec<u8>,
    objects: Vec<Object>,
    defaults: Vec<(u8, u16)>,
    separators: Vec<u8>,
    words: Vec<String>,
    routines_offset: u16,
    strings_offset: u16,
}

impl StoryBuilder {
    pub fn new(version: u8) -> StoryBuilder {
        StoryBuilder {
            version,
            data: vec![0; SIZE],
            objects: Vec::new(),
            defaults: Vec::new(),
            separators: Vec::new(),
            words: Vec::new(),
            routines_offset: 0,
            strings_offset: 0,
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// The main routine's instructions. Version 6 starts with a real routine
    /// header, so a zero local count is written first.
    pub fn code(self, code: &[u8]) -> StoryBuilder {
        if self.version == 6 {
            let mut routine = vec![0];
            routine.extend(code);
            self.bytes(CODE, &routine)
        } else {
            self.bytes(CODE, code)
        }
    }

    /// Version 6 and 7 routine and string offsets, in units of 8 bytes.
    pub fn offsets(mut self, routines: u16, strings: u16) -> StoryBuilder {
        self.routines_offset = routines;
        self.strings_offset = strings;
        self
    }

    pub fn bytes(mut self, address: usize, bytes: &[u8]) -> StoryBuilder {
        self.data[address..address + bytes.len()].copy_from_slice(bytes);
        self
    }

    /// A routine at `address` with the given local defaults (ignored from
    /// version 5) followed by its code.
    pub fn routine(self, address: usize, locals: &[u16], code: &[u8]) -> StoryBuilder {
        let mut bytes = vec![locals.len() as u8];
        if self.version <= 4 {
            for local in locals {
                bytes.extend(local.to_be_bytes());
            }
        }
        bytes.extend(code);
        self.bytes(address, &bytes)
    }

    /// An encoded string at `address`.
    pub fn string(self, address: usize, text: &str) -> StoryBuilder {
        let bytes = zstring(self.version, text);
        self.bytes(address, &bytes)
    }

    pub fn global(self, index: u8, value: u16) -> StoryBuilder {
        self.bytes(GLOBALS + 2 * index as usize, &value.to_be_bytes())
    }

    /// Add the next object, numbered from 1.
    pub fn object(mut self, name: &str, parent: u16, sibling: u16, child: u16) -> StoryBuilder {
        self.objects.push(Object {
            name: name.to_string(),
            parent,
            sibling,
            child,
            attributes: Vec::new(),
            properties: Vec::new(),
        });
        self
    }

    pub fn attribute(mut self, object: u16, attribute: u16) -> StoryBuilder {
        self.objects[object as usize - 1].attributes.push(attribute);
        self
    }

    /// Properties must be added in descending order.
    pub fn property(mut self, object: u16, number: u8, data: &[u8]) -> StoryBuilder {
        self.objects[object as usize - 1]
            .properties
            .push((number, data.to_vec()));
        self
    }

    pub fn default_property(mut self, number: u8, value: u16) -> StoryBuilder {
        self.defaults.push((number, value));
        self
    }

    pub fn separators(mut self, separators: &[u8]) -> StoryBuilder {
        self.separators = separators.to_vec();
        self
    }

    /// Dictionary words, in the order they are stored.
    pub fn words(mut self, words: &[&str]) -> StoryBuilder {
        self.words = words.iter().map(|w| w.to_string()).collect();
        self
    }

    fn key_cells(&self) -> usize {
        dictionary::key_cells(self.version)
    }

    fn entry_length(&self) -> usize {
        self.key_cells() * 2 + 3
    }

    /// The address the dictionary entry for `word` will have.
    pub fn entry(&self, word: &str) -> u16 {
        let index = self
            .words
            .iter()
            .position(|w| w == word)
            .unwrap_or_else(|| panic!("{} is not in the dictionary", word));
        (DICTIONARY + 1 + self.separators.len() + 3 + index * self.entry_length()) as u16
    }

    fn write_word(&mut self, address: usize, value: u16) {
        self.data[address..address + 2].copy_from_slice(&value.to_be_bytes());
    }

    fn write_objects(&mut self) {
        let small = self.version <= 3;
        let (defaults, entry_size, attribute_bytes) = if small { (31, 9, 4) } else { (63, 14, 6) };
        for (number, value) in self.defaults.clone() {
            self.write_word(OBJECTS + 2 * (number as usize - 1), value);
        }

        let first = OBJECTS + defaults * 2;
        let mut table = first + self.objects.len() * entry_size;
        let objects = std::mem::take(&mut self.objects);
        for (i, object) in objects.iter().enumerate() {
            let entry = first + i * entry_size;
            for attribute in &object.attributes {
                let byte = entry + *attribute as usize / 8;
                self.data[byte] |= 0x80 >> (attribute % 8);
            }
            let links = entry + attribute_bytes;
            if small {
                self.data[links] = object.parent as u8;
                self.data[links + 1] = object.sibling as u8;
                self.data[links + 2] = object.child as u8;
                self.write_word(links + 3, table as u16);
            } else {
                self.write_word(links, object.parent);
                self.write_word(links + 2, object.sibling);
                self.write_word(links + 4, object.child);
                self.write_word(links + 6, table as u16);
            }

            let name = if object.name.is_empty() {
                Vec::new()
            } else {
                zstring(self.version, &object.name)
            };
            self.data[table] = (name.len() / 2) as u8;
            table += 1;
            self.data[table..table + name.len()].copy_from_slice(&name);
            table += name.len();

            for (number, data) in &object.properties {
                let size = data.len();
                if small {
                    self.data[table] = ((size as u8 - 1) << 5) | number;
                    table += 1;
                } else if size <= 2 {
                    self.data[table] = ((size as u8 - 1) << 6) | number;
                    table += 1;
                } else {
                    self.data[table] = 0x80 | number;
                    self.data[table + 1] = 0x80 | (size as u8 & 0x3f);
                    table += 2;
                }
                self.data[table..table + size].copy_from_slice(data);
                table += size;
            }
            table += 1;
        }
        assert!(table <= SCRATCH, "object table overflows into scratch space");
    }

    fn write_dictionary(&mut self) {
        let alphabet = Alphabet::new(self.version);
        let mut d = DICTIONARY;
        self.data[d] = self.separators.len() as u8;
        d += 1;
        for separator in self.separators.clone() {
            self.data[d] = separator;
            d += 1;
        }
        self.data[d] = self.entry_length() as u8;
        let count = self.words.len() as u16;
        self.write_word(d + 1, count);
        d += 3;
        for word in self.words.clone() {
            for (i, cell) in dictionary::encode(&alphabet, word.as_bytes())
                .iter()
                .enumerate()
            {
                self.write_word(d + i * 2, *cell);
            }
            d += self.entry_length();
        }
    }

    pub fn build(mut self) -> Vec<u8> {
        let version = self.version;
        self.write_objects();
        self.write_dictionary();

        self.data[0x00] = version;
        self.write_word(0x04, HIGH as u16);
        let start = if version == 6 {
            ((CODE - 8 * self.routines_offset as usize) / 4) as u16
        } else {
            CODE as u16
        };
        self.write_word(0x06, start);
        self.write_word(0x08, DICTIONARY as u16);
        self.write_word(0x0A, OBJECTS as u16);
        self.write_word(0x0C, GLOBALS as u16);
        self.write_word(0x0E, DICTIONARY as u16);
        self.write_word(0x18, ABBREVIATIONS as u16);
        self.write_word(0x28, self.routines_offset);
        self.write_word(0x2A, self.strings_offset);
        let scale = match version {
            1..=3 => 2,
            4..=5 => 4,
            _ => 8,
        };
        self.write_word(0x1A, (SIZE / scale) as u16);
        let checksum = self.data[0x40..]
            .iter()
            .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)));
        self.write_word(0x1C, checksum);
        self.data
    }
}

/// The result of running a story against a replay script.
pub struct Run {
    pub output: String,
    pub result: Result<(), GameError>,
}

/// Load a story without running it, for tests that step the machine or look
/// at its stack.
pub fn load(story: &[u8], script: &str) -> (GameState, Rc<RefCell<String>>) {
    let interface = ReplayInterface::new(script);
    let output = interface.output();
    let config = Config {
        seed: Some(1),
        ..Config::default()
    };
    match GameState::new(story, Box::new(interface), config) {
        Ok(state) => (state, output),
        Err(e) => panic!("story failed to load: {}", e),
    }
}

pub fn run_with(story: &[u8], script: &str, config: Config) -> Run {
    let interface = ReplayInterface::new(script);
    let output = interface.output();
    let result = GameState::new(story, Box::new(interface), config).and_then(|mut state| state.run());
    let output = output.borrow().clone();
    Run { output, result }
}

pub fn run(story: &[u8], script: &str) -> Run {
    run_with(
        story,
        script,
        Config {
            seed: Some(1),
            ..Config::default()
        },
    )
}

/// Run a story that is expected to finish cleanly, returning its output.
pub fn output(story: &[u8], script: &str) -> String {
    let run = run(story, script);
    if let Err(e) = run.result {
        panic!("story failed: {}\noutput so far: {}", e, run.output);
    }
    run.output
}

/// Pack a routine or string address for the builder's version.
pub fn packed(version: u8, address: usize) -> u16 {
    let scale = match version {
        1..=3 => 2,
        4..=7 => 4,
        _ => 8,
    };
    (address / scale) as u16
}
