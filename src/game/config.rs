/// Interpreter settings that are negotiated with the story through the header.
#[derive(Debug, Clone)]
pub struct Config {
    pub status_line: bool,
    pub screen_splitting: bool,
    pub variable_pitch_font: bool,
    pub standard_major: u8,
    pub standard_minor: u8,
    pub interpreter_number: u8,
    pub interpreter_version: u8,
    /// Fixed seed for the random number generator. Seeded from entropy when unset.
    pub seed: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            status_line: true,
            screen_splitting: true,
            variable_pitch_font: false,
            standard_major: 1,
            standard_minor: 0,
            interpreter_number: 0,
            interpreter_version: b'A',
            seed: None,
        }
    }
}
