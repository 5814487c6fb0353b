use crate::game::instruction::instruction_set::common;
use crate::game::instruction::OpCode::{OneOp, TwoOp, VarOp};
use crate::game::instruction::{CallType, Instruction, InstructionResult, OpCode, OperandSet};
use crate::game::state::GameState;
use crate::game::Result;

pub fn instructions() -> Vec<(OpCode, Instruction)> {
    vec![
        (TwoOp(0x19), Instruction::Normal(call_2s, "CALL_2S")),
        (OneOp(0x8), Instruction::Normal(call_1s, "CALL_1S")),
        (VarOp(0xC), Instruction::Normal(call_vs2, "CALL_VS2")),
        (VarOp(0xD), Instruction::Normal(erase_window, "ERASE_WINDOW")),
        (VarOp(0xE), Instruction::Normal(erase_line, "ERASE_LINE")),
        (VarOp(0xF), Instruction::Normal(set_cursor, "SET_CURSOR")),
        (VarOp(0x10), Instruction::Normal(get_cursor, "GET_CURSOR")),
        (VarOp(0x11), Instruction::Normal(set_text_style, "SET_TEXT_STYLE")),
        (VarOp(0x12), Instruction::Normal(buffer_mode, "BUFFER_MODE")),
        (VarOp(0x16), Instruction::Store(read_char, "READ_CHAR")),
        (VarOp(0x17), Instruction::BranchStore(scan_table, "SCAN_TABLE")),
    ]
}

/// 2OP:25 Call a routine with 1 argument and store the result.
pub fn call_2s(state: &mut GameState, ops: OperandSet) -> Result<InstructionResult> {
    common::invoke(state, ops, CallType::Store)
}

/// 1OP:136 Call a routine with no arguments and store the result.
pub fn call_1s(state: &mut GameState, ops: OperandSet) -> Result<InstructionResult> {
    common::invoke(state, ops, CallType::Store)
}

/// VAR:236 Call a routine with up to 7 arguments and store the result.
pub fn call_vs2(state: &mut GameState, ops: OperandSet) -> Result<InstructionResult> {
    common::invoke(state, ops, CallType::Store)
}

/// VAR:237
pub fn erase_window(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let window = ops.pull_signed()?;
    state.interface.erase_window(window)?;
    Ok(InstructionResult::Continue)
}

/// VAR:238 Erase to the end of the line when the operand is 1
pub fn erase_line(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    if ops.pull()? == 1 {
        state.interface.erase_line()?;
    }
    Ok(InstructionResult::Continue)
}

/// VAR:239
pub fn set_cursor(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let line = ops.pull_signed()?;
    let column = ops.pull()?;
    // Negative lines hide or show the cursor.
    if line > 0 {
        state.interface.set_cursor(line as u16, column)?;
    }
    Ok(InstructionResult::Continue)
}

/// VAR:240 Write the cursor's line and column to the array
pub fn get_cursor(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let array = usize::from(ops.pull()?);
    let (line, column) = state.interface.cursor();
    state.memory.write_word(array, line)?;
    state.memory.write_word(array + 2, column)?;
    Ok(InstructionResult::Continue)
}

/// VAR:241
pub fn set_text_style(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let mask = ops.pull()?;
    state.style.apply(mask);
    let style = state.style;
    state.interface.set_text_style(style)?;
    Ok(InstructionResult::Continue)
}

/// VAR:242
pub fn buffer_mode(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let flag = ops.pull()?;
    state.interface.buffer_mode(flag != 0);
    Ok(InstructionResult::Continue)
}

/// VAR:246 Read a single key press. The first operand is always 1.
pub fn read_char(
    state: &mut GameState,
    mut ops: OperandSet,
    store_to: u8,
) -> Result<InstructionResult> {
    let _device = ops.try_pull();
    let time = ops.try_pull().unwrap_or(0);
    let routine = ops.try_pull().unwrap_or(0);
    match state.read_key(time, routine)? {
        Some(key) => state.store(store_to, key),
        None => Ok(InstructionResult::Continue),
    }
}

/// VAR:247 Search a table for a value. Store the address of the matching
/// field and branch, or store 0.
pub fn scan_table(
    state: &mut GameState,
    mut ops: OperandSet,
    expected: bool,
    offset: i16,
    store_to: u8,
) -> Result<InstructionResult> {
    let value = ops.pull()?;
    let table = usize::from(ops.pull()?);
    let length = usize::from(ops.pull()?);
    let form = ops.try_pull().unwrap_or(0x82);
    let field = usize::from(form & 0x7f);
    let words = form & 0x80 != 0;

    let mut found = 0;
    for i in 0..length {
        let address = table + i * field;
        let entry = if words {
            state.memory.read_word(address)?
        } else {
            u16::from(state.memory.read_byte(address)?)
        };
        if entry == value {
            found = address as u16;
            break;
        }
    }
    state.set_variable(store_to, found)?;
    state.conditional_branch(offset, found != 0, expected)
}
