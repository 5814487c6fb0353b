use std::fmt::{self, Debug, Display, Formatter};

/// A wrapper for op codes to associate them with their argument counts.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    ZeroOp(u8),
    OneOp(u8),
    TwoOp(u8),
    VarOp(u8),
    Extended(u8),
}

/// The number of slots in a dispatch table: 16 0OP, 16 1OP, 32 2OP, 32 VAR
/// and 256 EXT.
pub const TABLE_SIZE: usize = 16 + 16 + 32 + 32 + 256;

impl OpCode {
    /// The slot this opcode occupies in a dispatch table.
    pub fn index(self) -> usize {
        match self {
            OpCode::ZeroOp(v) => (v & 0x0f) as usize,
            OpCode::OneOp(v) => 16 + (v & 0x0f) as usize,
            OpCode::TwoOp(v) => 32 + (v & 0x1f) as usize,
            OpCode::VarOp(v) => 64 + (v & 0x1f) as usize,
            OpCode::Extended(v) => 96 + v as usize,
        }
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            OpCode::TwoOp(v) => write!(f, "2OP:{}", v),
            OpCode::OneOp(v) => write!(f, "1OP:{}", u16::from(*v) + 128),
            OpCode::ZeroOp(v) => write!(f, "0OP:{}", u16::from(*v) + 176),
            OpCode::VarOp(v) => write!(f, "VAR:{}", u16::from(*v) + 224),
            OpCode::Extended(v) => write!(f, "EXT:{}", v),
        }
    }
}

impl Debug for OpCode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&self, f)
    }
}
