use std::io;

use thiserror::Error;

use crate::game::instruction::OpCode;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("Version {0} story files are not supported")]
    UnsupportedVersion(u8),
    #[error("The file you have specified is not a valid Z-Code file: {0}")]
    InvalidFile(String),
    #[error("Memory access out of range at {0:#07x}")]
    OutOfRange(usize),
    #[error("Stack overflow")]
    StackOverflow,
    #[error("Stack underflow")]
    StackUnderflow,
    #[error("Illegal instruction {0}")]
    IllegalInstruction(OpCode),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Object {object} has no property {property}")]
    MissingProperty { object: u16, property: u16 },
    #[error("Object tree is corrupt around object {0}")]
    CorruptObjectTree(u16),
    #[error("Bad call type {0}")]
    BadCallType(u16),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Interface error")]
    Interface(#[from] io::Error),
}

impl GameError {
    pub fn invalid_file<S: Into<String>>(detail: S) -> GameError {
        GameError::InvalidFile(detail.into())
    }

    pub fn invalid_operation<S: Into<String>>(detail: S) -> GameError {
        GameError::InvalidOperation(detail.into())
    }
}
