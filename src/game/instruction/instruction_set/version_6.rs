use tracing::warn;

use crate::game::instruction::OpCode::{Extended, VarOp};
use crate::game::instruction::{Instruction, InstructionResult, OpCode, OperandSet};
use crate::game::state::GameState;
use crate::game::Result;

pub fn instructions() -> Vec<(OpCode, Instruction)> {
    vec![
        (VarOp(0x9), Instruction::Store(pull, "PULL")),
        (Extended(0x5), Instruction::Normal(draw_picture, "DRAW_PICTURE")),
        (Extended(0x6), Instruction::Branch(picture_data, "PICTURE_DATA")),
        (Extended(0x7), Instruction::Normal(erase_picture, "ERASE_PICTURE")),
        (Extended(0x8), Instruction::Normal(set_margins, "SET_MARGINS")),
        (Extended(0x10), Instruction::Normal(move_window, "MOVE_WINDOW")),
        (Extended(0x11), Instruction::Normal(window_size, "WINDOW_SIZE")),
        (Extended(0x12), Instruction::Normal(window_style, "WINDOW_STYLE")),
        (Extended(0x13), Instruction::Store(get_wind_prop, "GET_WIND_PROP")),
        (Extended(0x14), Instruction::Normal(scroll_window, "SCROLL_WINDOW")),
        (Extended(0x15), Instruction::Normal(pop_stack, "POP_STACK")),
        (Extended(0x16), Instruction::Normal(read_mouse, "READ_MOUSE")),
        (Extended(0x17), Instruction::Normal(mouse_window, "MOUSE_WINDOW")),
        (Extended(0x18), Instruction::Branch(push_stack, "PUSH_STACK")),
        (Extended(0x19), Instruction::Normal(put_wind_prop, "PUT_WIND_PROP")),
        (Extended(0x1A), Instruction::Normal(print_form, "PRINT_FORM")),
        (Extended(0x1B), Instruction::Branch(make_menu, "MAKE_MENU")),
        (Extended(0x1C), Instruction::Normal(picture_table, "PICTURE_TABLE")),
        (Extended(0x1D), Instruction::Store(buffer_screen, "BUFFER_SCREEN")),
    ]
}

/// VAR:233 Pull from the game stack, or from a user stack when one is given.
/// The first word of a user stack counts its free slots.
fn pull(state: &mut GameState, mut ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    let value = match ops.try_pull() {
        Some(table) => {
            let table = usize::from(table);
            let free = state.memory.read_word(table)?.wrapping_add(1);
            state.memory.write_word(table, free)?;
            state.memory.read_word(table + 2 * usize::from(free))?
        }
        None => state.stack.pop()?,
    };
    state.store(store_to, value)
}

/// EXT:21 Throw away items from the game stack or a user stack.
fn pop_stack(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let items = ops.pull()?;
    match ops.try_pull() {
        Some(table) => {
            let table = usize::from(table);
            let free = state.memory.read_word(table)?.wrapping_add(items);
            state.memory.write_word(table, free)?;
        }
        None => {
            for _ in 0..items {
                state.stack.pop()?;
            }
        }
    }
    Ok(InstructionResult::Continue)
}

/// EXT:24 Push onto a user stack, branching unless it is full.
fn push_stack(
    state: &mut GameState,
    mut ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    let value = ops.pull()?;
    let table = usize::from(ops.pull()?);
    let free = state.memory.read_word(table)?;
    if free == 0 {
        return state.conditional_branch(offset, false, expected);
    }
    state.memory.write_word(table + 2 * usize::from(free), value)?;
    state.memory.write_word(table, free - 1)?;
    state.conditional_branch(offset, true, expected)
}

fn ignored(name: &str) -> Result<InstructionResult> {
    warn!("{} is not supported", name);
    Ok(InstructionResult::Continue)
}

/// EXT:5
fn draw_picture(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    ignored("draw_picture")
}

/// EXT:6 There are no pictures, so this never branches.
fn picture_data(
    state: &mut GameState,
    _ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    warn!("picture_data is not supported");
    state.conditional_branch(offset, false, expected)
}

/// EXT:7
fn erase_picture(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    ignored("erase_picture")
}

/// EXT:8
fn set_margins(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    ignored("set_margins")
}

/// EXT:16
fn move_window(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    ignored("move_window")
}

/// EXT:17
fn window_size(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    ignored("window_size")
}

/// EXT:18
fn window_style(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    ignored("window_style")
}

/// EXT:19
fn get_wind_prop(
    state: &mut GameState,
    _ops: OperandSet,
    store_to: u8,
) -> Result<InstructionResult> {
    warn!("get_wind_prop is not supported");
    state.store(store_to, 0)
}

/// EXT:20
fn scroll_window(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    ignored("scroll_window")
}

/// EXT:22
fn read_mouse(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    ignored("read_mouse")
}

/// EXT:23
fn mouse_window(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    ignored("mouse_window")
}

/// EXT:25
fn put_wind_prop(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    ignored("put_wind_prop")
}

/// EXT:26
fn print_form(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    ignored("print_form")
}

/// EXT:27 Menus are never created.
fn make_menu(
    state: &mut GameState,
    _ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    warn!("make_menu is not supported");
    state.conditional_branch(offset, false, expected)
}

/// EXT:28
fn picture_table(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    ignored("picture_table")
}

/// EXT:29
fn buffer_screen(
    state: &mut GameState,
    _ops: OperandSet,
    store_to: u8,
) -> Result<InstructionResult> {
    warn!("buffer_screen is not supported");
    state.store(store_to, 0)
}
