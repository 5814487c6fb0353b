mod decoder;
mod form;
mod instruction_set;
mod op_code;
mod operand;
mod operand_set;
mod result;

pub use decoder::{decode, read_branch, Decoded};
pub use form::Form;
pub use instruction_set::InstructionSet;
pub use op_code::OpCode;
pub use operand::Operand;
pub use operand_set::OperandSet;
pub use result::{CallType, InstructionResult};

use crate::game::state::GameState;
use crate::game::Result;

pub type NormalFn = fn(&mut GameState, OperandSet) -> Result<InstructionResult>;
pub type BranchFn = fn(&mut GameState, OperandSet, bool, i16) -> Result<InstructionResult>;
pub type StoreFn = fn(&mut GameState, OperandSet, u8) -> Result<InstructionResult>;
pub type BranchStoreFn =
    fn(&mut GameState, OperandSet, bool, i16, u8) -> Result<InstructionResult>;
pub type StringLiteralFn = fn(&mut GameState, Vec<u16>) -> Result<InstructionResult>;

/// A wrapper for instruction functions to associate them with their argument
/// types. The variant tells the dispatcher which trailing operands (store
/// variable, branch data, inline string) to decode before calling.
#[derive(Clone, Copy)]
pub enum Instruction {
    Normal(NormalFn, &'static str),
    Branch(BranchFn, &'static str),
    Store(StoreFn, &'static str),
    BranchStore(BranchStoreFn, &'static str),
    StringLiteral(StringLiteralFn, &'static str),
}

impl Instruction {
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::Normal(_, name)
            | Instruction::Branch(_, name)
            | Instruction::Store(_, name)
            | Instruction::BranchStore(_, name)
            | Instruction::StringLiteral(_, name) => name,
        }
    }
}
