use std::fmt::{self, Debug, Display, Formatter};

/// An operand as encoded in the instruction stream, before it is resolved.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    LargeConstant(u16),
    SmallConstant(u8),
    Variable(u8),
    Omitted,
}

impl Operand {
    /// Decode a 2-bit operand type. The value is filled in once read.
    pub fn from_type(kind: u8) -> Operand {
        match kind & 0b11 {
            0b00 => Operand::LargeConstant(0),
            0b01 => Operand::SmallConstant(0),
            0b10 => Operand::Variable(0),
            _ => Operand::Omitted,
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Operand::LargeConstant(v) => write!(f, "#{:04x}", v),
            Operand::SmallConstant(v) => write!(f, "#{:02x}", v),
            Operand::Variable(0) => write!(f, "sp"),
            Operand::Variable(v @ 1..=15) => write!(f, "L{:02x}", v - 1),
            Operand::Variable(v) => write!(f, "G{:02x}", v - 16),
            Operand::Omitted => write!(f, "Omitted"),
        }
    }
}

impl Debug for Operand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&self, f)
    }
}
