use num_traits::FromPrimitive;
use tracing::{debug, warn};

use crate::game::instruction::OpCode::{VarOp, ZeroOp};
use crate::game::instruction::{Instruction, InstructionResult, OpCode, OperandSet};
use crate::game::state::GameState;
use crate::game::Result;
use crate::ui::Screen;

pub fn instructions() -> Vec<(OpCode, Instruction)> {
    vec![
        (ZeroOp(0xC), Instruction::Normal(show_status, "SHOW_STATUS")),
        (ZeroOp(0xD), Instruction::Branch(verify, "VERIFY")),
        (VarOp(0xA), Instruction::Normal(split_window, "SPLIT_WINDOW")),
        (VarOp(0xB), Instruction::Normal(set_window, "SET_WINDOW")),
        (VarOp(0x13), Instruction::Normal(output_stream, "OUTPUT_STREAM")),
        (VarOp(0x14), Instruction::Normal(input_stream, "INPUT_STREAM")),
        (VarOp(0x15), Instruction::Normal(sound_effect, "SOUND_EFFECT")),
    ]
}

/// 0OP:188 Redraw the status line. Ignored after version 3.
pub fn show_status(state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    state.show_status()?;
    Ok(InstructionResult::Continue)
}

/// 0OP:189 Branch if the story file's checksum matches the header
pub fn verify(
    state: &mut GameState,
    _ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    let result = state.checksum_valid;
    state.conditional_branch(offset, result, expected)
}

/// VAR:234 Give the upper window the given number of lines
pub fn split_window(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let lines = ops.pull()?;
    state.interface.split_window(lines)?;
    Ok(InstructionResult::Continue)
}

/// VAR:235
pub fn set_window(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let window = ops.pull()?;
    match Screen::from_u16(window) {
        Some(screen) => state.interface.set_window(screen)?,
        None => warn!("set_window: no window {}", window),
    }
    Ok(InstructionResult::Continue)
}

/// VAR:243 Select or deselect an output stream
pub fn output_stream(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let stream = ops.pull_signed()?;
    let table = ops.try_pull().map(usize::from);
    state.streams.select(&mut state.memory, stream, table)?;
    Ok(InstructionResult::Continue)
}

/// VAR:244 Only the keyboard is available.
pub fn input_stream(_state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let stream = ops.pull()?;
    if stream != 0 {
        warn!("input_stream {} is not supported", stream);
    }
    Ok(InstructionResult::Continue)
}

/// VAR:245
pub fn sound_effect(_state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let number = ops.try_pull().unwrap_or(1);
    debug!("sound_effect {} ignored", number);
    Ok(InstructionResult::Continue)
}
