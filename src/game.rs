pub mod alphabet;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod header;
pub mod input_code;
pub mod instruction;
pub mod memory;
pub mod object;
pub mod random;
pub mod stack;
pub mod state;
pub mod stream;
pub mod text;
pub mod zscii;

pub use input_code::InputCode;

pub type Result<T> = std::result::Result<T, error::GameError>;
