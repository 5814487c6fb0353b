use tracing::warn;

use crate::game::instruction::instruction_set::common;
use crate::game::instruction::OpCode::{OneOp, VarOp, ZeroOp};
use crate::game::instruction::{Instruction, InstructionResult, OpCode, OperandSet};
use crate::game::state::GameState;
use crate::game::Result;

/// Instructions that were moved or removed in version 5.
pub fn instructions(version: u8) -> Vec<(OpCode, Instruction)> {
    let mut instructions = vec![
        (ZeroOp(0x9), Instruction::Normal(pop, "POP")),
        (OneOp(0xF), Instruction::Store(common::not, "NOT")),
        (VarOp(0x4), Instruction::Normal(sread, "SREAD")),
    ];
    if version <= 3 {
        instructions.extend([
            (ZeroOp(0x5), Instruction::Branch(save, "SAVE")),
            (ZeroOp(0x6), Instruction::Branch(restore, "RESTORE")),
        ]);
    } else {
        instructions.extend([
            (ZeroOp(0x5), Instruction::Store(save_v4, "SAVE")),
            (ZeroOp(0x6), Instruction::Store(restore_v4, "RESTORE")),
        ]);
    }
    instructions
}

/// 0OP:181 Saving to disk is not supported, so this always fails.
pub fn save(
    state: &mut GameState,
    _ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    warn!("save is not supported");
    state.conditional_branch(offset, false, expected)
}

/// 0OP:182
pub fn restore(
    state: &mut GameState,
    _ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    warn!("restore is not supported");
    state.conditional_branch(offset, false, expected)
}

/// 0OP:181 In version 4 the result is stored rather than branched on.
pub fn save_v4(state: &mut GameState, _ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    warn!("save is not supported");
    state.store(store_to, 0)
}

/// 0OP:182
pub fn restore_v4(
    state: &mut GameState,
    _ops: OperandSet,
    store_to: u8,
) -> Result<InstructionResult> {
    warn!("restore is not supported");
    state.store(store_to, 0)
}

/// 0OP:185 Discard the top of the stack
pub fn pop(state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    state.stack.pop()?;
    Ok(InstructionResult::Continue)
}

/// VAR:228 Read a command into the text buffer and parse it. Version 4 adds
/// an optional timeout and interrupt routine.
pub fn sread(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let text = ops.pull()?;
    let parse = ops.try_pull().unwrap_or(0);
    let time = ops.try_pull().unwrap_or(0);
    let routine = ops.try_pull().unwrap_or(0);
    state.read_command(text.into(), parse.into(), time, routine)?;
    Ok(InstructionResult::Continue)
}
