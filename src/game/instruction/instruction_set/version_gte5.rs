use tracing::{debug, warn};

use crate::game::dictionary;
use crate::game::instruction::instruction_set::common;
use crate::game::instruction::OpCode::{Extended, OneOp, TwoOp, VarOp, ZeroOp};
use crate::game::instruction::{CallType, Instruction, InstructionResult, OpCode, OperandSet};
use crate::game::state::GameState;
use crate::game::text;
use crate::game::zscii;
use crate::game::Result;

pub fn instructions() -> Vec<(OpCode, Instruction)> {
    vec![
        (ZeroOp(0x9), Instruction::Store(catch, "CATCH")),
        (ZeroOp(0xF), Instruction::Branch(piracy, "PIRACY")),
        (OneOp(0xF), Instruction::Normal(call_1n, "CALL_1N")),
        (TwoOp(0x1A), Instruction::Normal(call_2n, "CALL_2N")),
        (TwoOp(0x1B), Instruction::Normal(set_colour, "SET_COLOUR")),
        (TwoOp(0x1C), Instruction::Normal(throw, "THROW")),
        (VarOp(0x4), Instruction::Store(aread, "AREAD")),
        (VarOp(0x18), Instruction::Store(common::not, "NOT")), // Moved from 1OP:143
        (VarOp(0x19), Instruction::Normal(call_vn, "CALL_VN")),
        (VarOp(0x1A), Instruction::Normal(call_vn2, "CALL_VN2")),
        (VarOp(0x1B), Instruction::Normal(tokenise, "TOKENISE")),
        (VarOp(0x1C), Instruction::Normal(encode_text, "ENCODE_TEXT")),
        (VarOp(0x1D), Instruction::Normal(copy_table, "COPY_TABLE")),
        (VarOp(0x1E), Instruction::Normal(print_table, "PRINT_TABLE")),
        (VarOp(0x1F), Instruction::Branch(check_arg_count, "CHECK_ARG_COUNT")),
        (Extended(0x0), Instruction::Store(save, "SAVE")),
        (Extended(0x1), Instruction::Store(restore, "RESTORE")),
        (Extended(0x2), Instruction::Store(log_shift, "LOG_SHIFT")),
        (Extended(0x3), Instruction::Store(art_shift, "ART_SHIFT")),
        (Extended(0x4), Instruction::Store(set_font, "SET_FONT")),
        (Extended(0x9), Instruction::Store(save_undo, "SAVE_UNDO")),
        (Extended(0xA), Instruction::Store(restore_undo, "RESTORE_UNDO")),
        (Extended(0xB), Instruction::Normal(print_unicode, "PRINT_UNICODE")),
        (Extended(0xC), Instruction::Store(check_unicode, "CHECK_UNICODE")),
        (Extended(0xD), Instruction::Normal(set_true_colour, "SET_TRUE_COLOUR")),
    ]
}

/// 0OP:185 Store an identifier for the current frame, for use with throw.
fn catch(state: &mut GameState, _ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    let frame = state.frame_id();
    state.store(store_to, frame)
}

/// 0OP:191 Branches if the game disc is genuine. Interpreters are asked to be gullible.
fn piracy(
    state: &mut GameState,
    _ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    state.conditional_branch(offset, true, expected)
}

/// 1OP:143 Call a routine with no arguments and throw away the result.
fn call_1n(state: &mut GameState, ops: OperandSet) -> Result<InstructionResult> {
    common::invoke(state, ops, CallType::Discard)
}

/// 2OP:26 Call a routine with 1 argument and throw away the result.
fn call_2n(state: &mut GameState, ops: OperandSet) -> Result<InstructionResult> {
    common::invoke(state, ops, CallType::Discard)
}

/// 2OP:27
fn set_colour(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let foreground = ops.pull()?;
    let background = ops.pull()?;
    state.interface.set_colour(foreground, background)?;
    Ok(InstructionResult::Continue)
}

/// 2OP:28 Return the value from the routine that executed the matching catch.
fn throw(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let value = ops.pull()?;
    let frame = ops.pull()?;
    state.throw(frame)?;
    Ok(InstructionResult::Return(value))
}

/// VAR:228 Read a command and store the key that terminated it.
fn aread(state: &mut GameState, mut ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    let text = ops.pull()?;
    let parse = ops.try_pull().unwrap_or(0);
    let time = ops.try_pull().unwrap_or(0);
    let routine = ops.try_pull().unwrap_or(0);
    match state.read_command(text.into(), parse.into(), time, routine)? {
        Some(terminator) => state.store(store_to, terminator),
        None => Ok(InstructionResult::Continue),
    }
}

/// VAR:249 Call a routine with up to 3 arguments and throw away the result.
fn call_vn(state: &mut GameState, ops: OperandSet) -> Result<InstructionResult> {
    common::invoke(state, ops, CallType::Discard)
}

/// VAR:250 Call a routine with up to 7 arguments and throw away the result.
fn call_vn2(state: &mut GameState, ops: OperandSet) -> Result<InstructionResult> {
    common::invoke(state, ops, CallType::Discard)
}

/// VAR:251 Tokenise the text buffer, optionally against a different
/// dictionary. With the flag set, unknown words are left alone.
fn tokenise(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let text = usize::from(ops.pull()?);
    let parse = usize::from(ops.pull()?);
    let dictionary = match ops.try_pull().unwrap_or(0) {
        0 => state.memory.dictionary_location(),
        address => usize::from(address),
    };
    let allow_partial = ops.try_pull().unwrap_or(0) != 0;
    dictionary::tokenize(
        &mut state.memory,
        &state.alphabet,
        text,
        parse,
        dictionary,
        allow_partial,
    )?;
    Ok(InstructionResult::Continue)
}

/// VAR:252 Encode a word from a text buffer as a dictionary key.
fn encode_text(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let text = usize::from(ops.pull()?);
    let length = usize::from(ops.pull()?);
    let from = usize::from(ops.pull()?);
    let coded = usize::from(ops.pull()?);

    let mut word = Vec::with_capacity(length);
    for i in 0..length {
        word.push(state.memory.read_byte(text + from + i)?);
    }
    let key = dictionary::encode(&state.alphabet, &word);
    for (i, cell) in key.iter().enumerate() {
        state.memory.write_word(coded + 2 * i, *cell)?;
    }
    Ok(InstructionResult::Continue)
}

/// VAR:253 Copy, or zero when the second table is 0. A negative size forces
/// a forward copy even if the tables overlap.
fn copy_table(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let first = usize::from(ops.pull()?);
    let second = usize::from(ops.pull()?);
    let size = ops.pull_signed()?;
    let length = usize::from(size.unsigned_abs());

    if second == 0 {
        state.memory.clear(first, length)?;
    } else if size > 0 && second > first {
        state.memory.copy_backward(first, second, length)?;
    } else {
        state.memory.copy_forward(first, second, length)?;
    }
    Ok(InstructionResult::Continue)
}

/// VAR:254 Print a rectangle of text from a table.
fn print_table(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let address = usize::from(ops.pull()?);
    let width = usize::from(ops.pull()?);
    let height = usize::from(ops.try_pull().unwrap_or(1));
    let skip = usize::from(ops.try_pull().unwrap_or(0));
    let output = text::table(&state.memory, address, width, height, skip)?;
    state.print_zscii(&output)?;
    Ok(InstructionResult::Continue)
}

/// VAR:255 Branches if the argument number (1-indexed) has been provided.
fn check_arg_count(
    state: &mut GameState,
    mut ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    let index = ops.pull()?;
    let condition = index <= state.stack.frame_args()?;
    state.conditional_branch(offset, condition, expected)
}

/// EXT:0 Saving to disk is not supported, so this always fails.
fn save(state: &mut GameState, _ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    warn!("save is not supported");
    state.store(store_to, 0)
}

/// EXT:1
fn restore(state: &mut GameState, _ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    warn!("restore is not supported");
    state.store(store_to, 0)
}

/// EXT:2 Logical shift
fn log_shift(
    state: &mut GameState,
    mut ops: OperandSet,
    store_to: u8,
) -> Result<InstructionResult> {
    let number = ops.pull()?;
    let places = ops.pull_signed()?;
    if places.unsigned_abs() > 15 {
        warn!("Attempted to bitshift more than 15 places. This is unspecified behaviour.");
        return state.store(store_to, 0);
    }

    let result = if places < 0 {
        number.wrapping_shr(places.unsigned_abs().into())
    } else {
        number.wrapping_shl(places as u32)
    };
    state.store(store_to, result)
}

/// EXT:3 Arithmetic shift
fn art_shift(
    state: &mut GameState,
    mut ops: OperandSet,
    store_to: u8,
) -> Result<InstructionResult> {
    let number = ops.pull_signed()?;
    let places = ops.pull_signed()?;
    if places.unsigned_abs() > 15 {
        warn!("Attempted to bitshift more than 15 places. This is unspecified behaviour.");
        return state.store(store_to, if number < 0 { -1i16 as u16 } else { 0 });
    }

    let result = if places < 0 {
        number.wrapping_shr(places.unsigned_abs().into())
    } else {
        number.wrapping_shl(places as u32)
    };
    state.store(store_to, result as u16)
}

/// EXT:4 Store the previous font, or 0 if the requested one is unavailable.
fn set_font(state: &mut GameState, mut ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    let font = ops.pull()?;
    let previous = state.interface.set_font(font);
    state.store(store_to, previous)
}

/// EXT:9 Save the current game state to the undo buffer.
fn save_undo(state: &mut GameState, _ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    state.save_undo(store_to);
    state.store(store_to, 1)
}

/// EXT:10 Load the most recent undo state.
fn restore_undo(
    state: &mut GameState,
    _ops: OperandSet,
    store_to: u8,
) -> Result<InstructionResult> {
    if state.restore_undo()? {
        Ok(InstructionResult::Continue)
    } else {
        state.store(store_to, 0)
    }
}

/// EXT:11
fn print_unicode(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let code = ops.pull()?;
    let c = char::from_u32(code.into())
        .and_then(zscii::from_char)
        .unwrap_or(b'?' as u16);
    state.print_zscii(&[c])?;
    Ok(InstructionResult::Continue)
}

/// EXT:12 Bit 0 is set if the character can be printed, bit 1 if it can be typed.
fn check_unicode(
    state: &mut GameState,
    mut ops: OperandSet,
    store_to: u8,
) -> Result<InstructionResult> {
    let code = ops.pull()?;
    let supported = char::from_u32(code.into())
        .and_then(zscii::from_char)
        .is_some();
    state.store(store_to, if supported { 3 } else { 0 })
}

/// EXT:13
fn set_true_colour(_state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let foreground = ops.pull()?;
    let background = ops.pull()?;
    debug!("set_true_colour {:#06x} {:#06x} ignored", foreground, background);
    Ok(InstructionResult::Continue)
}
