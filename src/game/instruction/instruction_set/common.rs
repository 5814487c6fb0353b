use crate::game::error::GameError;
use crate::game::instruction::OpCode::{OneOp, TwoOp, VarOp, ZeroOp};
use crate::game::instruction::{CallType, Instruction, InstructionResult, OpCode, OperandSet};
use crate::game::state::GameState;
use crate::game::zscii;
use crate::game::Result;

pub fn instructions() -> Vec<(OpCode, Instruction)> {
    vec![
        (TwoOp(0x1), Instruction::Branch(je, "JE")),
        (TwoOp(0x2), Instruction::Branch(jl, "JL")),
        (TwoOp(0x3), Instruction::Branch(jg, "JG")),
        (TwoOp(0x4), Instruction::Branch(dec_chk, "DEC_CHK")),
        (TwoOp(0x5), Instruction::Branch(inc_chk, "INC_CHK")),
        (TwoOp(0x6), Instruction::Branch(jin, "JIN")),
        (TwoOp(0x7), Instruction::Branch(test, "TEST")),
        (TwoOp(0x8), Instruction::Store(or, "OR")),
        (TwoOp(0x9), Instruction::Store(and, "AND")),
        (TwoOp(0xA), Instruction::Branch(test_attr, "TEST_ATTR")),
        (TwoOp(0xB), Instruction::Normal(set_attr, "SET_ATTR")),
        (TwoOp(0xC), Instruction::Normal(clear_attr, "CLEAR_ATTR")),
        (TwoOp(0xD), Instruction::Normal(store, "STORE")),
        (TwoOp(0xE), Instruction::Normal(insert_obj, "INSERT_OBJ")),
        (TwoOp(0xF), Instruction::Store(loadw, "LOADW")),
        (TwoOp(0x10), Instruction::Store(loadb, "LOADB")),
        (TwoOp(0x11), Instruction::Store(get_prop, "GET_PROP")),
        (TwoOp(0x12), Instruction::Store(get_prop_addr, "GET_PROP_ADDR")),
        (TwoOp(0x13), Instruction::Store(get_next_prop, "GET_NEXT_PROP")),
        (TwoOp(0x14), Instruction::Store(add, "ADD")),
        (TwoOp(0x15), Instruction::Store(sub, "SUB")),
        (TwoOp(0x16), Instruction::Store(mul, "MUL")),
        (TwoOp(0x17), Instruction::Store(div, "DIV")),
        (TwoOp(0x18), Instruction::Store(z_mod, "MOD")),
        (OneOp(0x0), Instruction::Branch(jz, "JZ")),
        (OneOp(0x1), Instruction::BranchStore(get_sibling, "GET_SIBLING")),
        (OneOp(0x2), Instruction::BranchStore(get_child, "GET_CHILD")),
        (OneOp(0x3), Instruction::Store(get_parent, "GET_PARENT")),
        (OneOp(0x4), Instruction::Store(get_prop_len, "GET_PROP_LEN")),
        (OneOp(0x5), Instruction::Normal(inc, "INC")),
        (OneOp(0x6), Instruction::Normal(dec, "DEC")),
        (OneOp(0x7), Instruction::Normal(print_addr, "PRINT_ADDR")),
        (OneOp(0x9), Instruction::Normal(remove_obj, "REMOVE_OBJ")),
        (OneOp(0xA), Instruction::Normal(print_obj, "PRINT_OBJ")),
        (OneOp(0xB), Instruction::Normal(ret, "RET")),
        (OneOp(0xC), Instruction::Normal(jump, "JUMP")),
        (OneOp(0xD), Instruction::Normal(print_paddr, "PRINT_PADDR")),
        (OneOp(0xE), Instruction::Store(load, "LOAD")),
        (ZeroOp(0x0), Instruction::Normal(rtrue, "RTRUE")),
        (ZeroOp(0x1), Instruction::Normal(rfalse, "RFALSE")),
        (ZeroOp(0x2), Instruction::StringLiteral(print, "PRINT")),
        (ZeroOp(0x3), Instruction::StringLiteral(print_ret, "PRINT_RET")),
        (ZeroOp(0x4), Instruction::Normal(nop, "NOP")),
        (ZeroOp(0x7), Instruction::Normal(restart, "RESTART")),
        (ZeroOp(0x8), Instruction::Normal(ret_popped, "RET_POPPED")),
        (ZeroOp(0xA), Instruction::Normal(quit, "QUIT")),
        (ZeroOp(0xB), Instruction::Normal(new_line, "NEW_LINE")),
        (VarOp(0x0), Instruction::Normal(call, "CALL")),
        (VarOp(0x1), Instruction::Normal(storew, "STOREW")),
        (VarOp(0x2), Instruction::Normal(storeb, "STOREB")),
        (VarOp(0x3), Instruction::Normal(put_prop, "PUT_PROP")),
        (VarOp(0x5), Instruction::Normal(print_char, "PRINT_CHAR")),
        (VarOp(0x6), Instruction::Normal(print_num, "PRINT_NUM")),
        (VarOp(0x7), Instruction::Store(random, "RANDOM")),
        (VarOp(0x8), Instruction::Normal(push, "PUSH")),
        (VarOp(0x9), Instruction::Normal(pull, "PULL")),
    ]
}

/// Call the packed routine address in the first operand with the rest as
/// arguments. Packed address 0 is a call to nothing that returns false.
pub fn invoke(
    state: &mut GameState,
    mut ops: OperandSet,
    call_type: CallType,
) -> Result<InstructionResult> {
    let packed = ops.pull()?;
    let address = match packed {
        0 => 0,
        _ => state.memory.unpack_address(packed, true),
    };
    Ok(InstructionResult::Invoke {
        address,
        arguments: ops.rest(),
        call_type,
    })
}

/// Address of element `index` in a table of `size`-byte entries. Indexes are
/// signed and the sum wraps at 16 bits.
fn table_address(array: u16, index: u16, size: u16) -> usize {
    array.wrapping_add(index.wrapping_mul(size)) as usize
}

/// 2OP:1 Branch if the first operand is equal to any subsequent operands
pub fn je(
    state: &mut GameState,
    mut ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    let first = ops.pull()?;
    let result = ops.any(|other| other == first);
    state.conditional_branch(offset, result, expected)
}

/// 2OP:2 Jump if a < b (signed).
pub fn jl(
    state: &mut GameState,
    mut ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    let a = ops.pull_signed()?;
    let b = ops.pull_signed()?;
    state.conditional_branch(offset, a < b, expected)
}

/// 2OP:3 Jump if a > b (signed).
pub fn jg(
    state: &mut GameState,
    mut ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    let a = ops.pull_signed()?;
    let b = ops.pull_signed()?;
    state.conditional_branch(offset, a > b, expected)
}

/// 2OP:4 Decrement variable, and branch if it is now less than the given value
pub fn dec_chk(
    state: &mut GameState,
    mut ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    let variable = ops.pull()? as u8;
    let value = ops.pull_signed()?;
    let result = (state.peek_variable(variable)? as i16).wrapping_sub(1);
    state.poke_variable(variable, result as u16)?;
    state.conditional_branch(offset, result < value, expected)
}

/// 2OP:5 Increment variable, and branch if it is now greater than the given value
pub fn inc_chk(
    state: &mut GameState,
    mut ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    let variable = ops.pull()? as u8;
    let value = ops.pull_signed()?;
    let result = (state.peek_variable(variable)? as i16).wrapping_add(1);
    state.poke_variable(variable, result as u16)?;
    state.conditional_branch(offset, result > value, expected)
}

/// 2OP:6 Jump if object a's parent is object b
pub fn jin(
    state: &mut GameState,
    mut ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    let a = ops.pull()?;
    let b = ops.pull()?;
    let parent = state.objects.parent(&state.memory, a)?;
    state.conditional_branch(offset, parent == b, expected)
}

/// 2OP:7 Jump if all of the flags in the bitmap are set
pub fn test(
    state: &mut GameState,
    mut ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    let bitmap = ops.pull()?;
    let flags = ops.pull()?;
    state.conditional_branch(offset, bitmap & flags == flags, expected)
}

/// 2OP:8 Bitwise OR
pub fn or(state: &mut GameState, mut ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    let x = ops.pull()?;
    let y = ops.pull()?;
    state.store(store_to, x | y)
}

/// 2OP:9 Bitwise AND
pub fn and(state: &mut GameState, mut ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    let x = ops.pull()?;
    let y = ops.pull()?;
    state.store(store_to, x & y)
}

/// 2OP:10 Jump if the object has the attribute
pub fn test_attr(
    state: &mut GameState,
    mut ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    let object = ops.pull()?;
    let attribute = ops.pull()?;
    let result = state.objects.attribute(&state.memory, object, attribute)?;
    state.conditional_branch(offset, result, expected)
}

/// 2OP:11
pub fn set_attr(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let object = ops.pull()?;
    let attribute = ops.pull()?;
    state
        .objects
        .set_attribute(&mut state.memory, object, attribute, true)?;
    Ok(InstructionResult::Continue)
}

/// 2OP:12
pub fn clear_attr(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let object = ops.pull()?;
    let attribute = ops.pull()?;
    state
        .objects
        .set_attribute(&mut state.memory, object, attribute, false)?;
    Ok(InstructionResult::Continue)
}

/// 2OP:13 Set the variable referenced by the operand to value
pub fn store(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let variable = ops.pull()? as u8;
    let value = ops.pull()?;
    state.poke_variable(variable, value)?;
    Ok(InstructionResult::Continue)
}

/// 2OP:14 Move object to be the first child of the destination object
pub fn insert_obj(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let object = ops.pull()?;
    let destination = ops.pull()?;
    state
        .objects
        .insert(&mut state.memory, object, destination)?;
    Ok(InstructionResult::Continue)
}

/// 2OP:15 Store a word found at the given array and word index.
pub fn loadw(state: &mut GameState, mut ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    let array = ops.pull()?;
    let index = ops.pull()?;
    let word = state.memory.read_word(table_address(array, index, 2))?;
    state.store(store_to, word)
}

/// 2OP:16 Store a byte found at the given array and byte index.
pub fn loadb(state: &mut GameState, mut ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    let array = ops.pull()?;
    let index = ops.pull()?;
    let byte = state.memory.read_byte(table_address(array, index, 1))?;
    state.store(store_to, byte.into())
}

/// 2OP:17 Return the data of the specified property
pub fn get_prop(
    state: &mut GameState,
    mut ops: OperandSet,
    store_to: u8,
) -> Result<InstructionResult> {
    let object = ops.pull()?;
    let property = ops.pull()?;
    let value = state.objects.property(&state.memory, object, property)?;
    state.store(store_to, value)
}

/// 2OP:18 Return the byte address of the specified property data
pub fn get_prop_addr(
    state: &mut GameState,
    mut ops: OperandSet,
    store_to: u8,
) -> Result<InstructionResult> {
    let object = ops.pull()?;
    let property = ops.pull()?;
    let address = state
        .objects
        .property_address(&state.memory, object, property)?;
    state.store(store_to, address)
}

/// 2OP:19 Return the number of the next property in the object's list
pub fn get_next_prop(
    state: &mut GameState,
    mut ops: OperandSet,
    store_to: u8,
) -> Result<InstructionResult> {
    let object = ops.pull()?;
    let property = ops.pull()?;
    let next = state
        .objects
        .next_property(&state.memory, object, property)?;
    state.store(store_to, next)
}

/// 2OP:20 Signed 16-bit addition
pub fn add(state: &mut GameState, mut ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    let a = ops.pull_signed()?;
    let b = ops.pull_signed()?;
    state.store(store_to, a.wrapping_add(b) as u16)
}

/// 2OP:21 Signed 16-bit subtraction
pub fn sub(state: &mut GameState, mut ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    let a = ops.pull_signed()?;
    let b = ops.pull_signed()?;
    state.store(store_to, a.wrapping_sub(b) as u16)
}

/// 2OP:22 Signed 16-bit multiplication
pub fn mul(state: &mut GameState, mut ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    let a = ops.pull_signed()?;
    let b = ops.pull_signed()?;
    state.store(store_to, a.wrapping_mul(b) as u16)
}

/// 2OP:23 Signed 16-bit division, rounding towards zero
pub fn div(state: &mut GameState, mut ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    let a = ops.pull_signed()?;
    let b = ops.pull_signed()?;
    if b == 0 {
        return Err(GameError::DivisionByZero);
    }
    state.store(store_to, a.wrapping_div(b) as u16)
}

/// 2OP:24 Signed 16-bit remainder
pub fn z_mod(state: &mut GameState, mut ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    let a = ops.pull_signed()?;
    let b = ops.pull_signed()?;
    if b == 0 {
        return Err(GameError::DivisionByZero);
    }
    state.store(store_to, a.wrapping_rem(b) as u16)
}

/// 1OP:128 Jump if the operand is zero
pub fn jz(
    state: &mut GameState,
    mut ops: OperandSet,
    expected: bool,
    offset: i16,
) -> Result<InstructionResult> {
    let value = ops.pull()?;
    state.conditional_branch(offset, value == 0, expected)
}

/// 1OP:129 Store the object's sibling, and branch if it has one
pub fn get_sibling(
    state: &mut GameState,
    mut ops: OperandSet,
    expected: bool,
    offset: i16,
    store_to: u8,
) -> Result<InstructionResult> {
    let object = ops.pull()?;
    let sibling = state.objects.sibling(&state.memory, object)?;
    state.set_variable(store_to, sibling)?;
    state.conditional_branch(offset, sibling != 0, expected)
}

/// 1OP:130 Store the object's first child, and branch if it has one
pub fn get_child(
    state: &mut GameState,
    mut ops: OperandSet,
    expected: bool,
    offset: i16,
    store_to: u8,
) -> Result<InstructionResult> {
    let object = ops.pull()?;
    let child = state.objects.child(&state.memory, object)?;
    state.set_variable(store_to, child)?;
    state.conditional_branch(offset, child != 0, expected)
}

/// 1OP:131
pub fn get_parent(
    state: &mut GameState,
    mut ops: OperandSet,
    store_to: u8,
) -> Result<InstructionResult> {
    let object = ops.pull()?;
    let parent = state.objects.parent(&state.memory, object)?;
    state.store(store_to, parent)
}

/// 1OP:132 Return the length of the property whose data starts at the address
pub fn get_prop_len(
    state: &mut GameState,
    mut ops: OperandSet,
    store_to: u8,
) -> Result<InstructionResult> {
    let address = ops.pull()?;
    let size = state
        .objects
        .property_size(&state.memory, address as usize)?;
    state.store(store_to, size)
}

/// 1OP:133 Increment a variable
pub fn inc(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let variable = ops.pull()? as u8;
    let value = state.peek_variable(variable)?.wrapping_add(1);
    state.poke_variable(variable, value)?;
    Ok(InstructionResult::Continue)
}

/// 1OP:134 Decrement a variable
pub fn dec(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let variable = ops.pull()? as u8;
    let value = state.peek_variable(variable)?.wrapping_sub(1);
    state.poke_variable(variable, value)?;
    Ok(InstructionResult::Continue)
}

/// 1OP:135 Print the string at the byte address
pub fn print_addr(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let address = ops.pull()?;
    state.print_string_at(address.into())?;
    Ok(InstructionResult::Continue)
}

/// 1OP:137 Detach an object from its parent
pub fn remove_obj(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let object = ops.pull()?;
    state.objects.remove(&mut state.memory, object)?;
    Ok(InstructionResult::Continue)
}

/// 1OP:138 Print the short name of the object
pub fn print_obj(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let object = ops.pull()?;
    let name = state.object_name(object)?;
    state.print_zscii(&name)?;
    Ok(InstructionResult::Continue)
}

/// 1OP:139 Return the operand from the current routine
pub fn ret(_state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    Ok(InstructionResult::Return(ops.pull()?))
}

/// 1OP:140 Unconditional relative jump
pub fn jump(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let offset = ops.pull_signed()?;
    state.jump(offset)?;
    Ok(InstructionResult::Continue)
}

/// 1OP:141 Print the string at the packed address
pub fn print_paddr(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let packed = ops.pull()?;
    let address = state.memory.unpack_address(packed, false);
    state.print_string_at(address)?;
    Ok(InstructionResult::Continue)
}

/// 1OP:142 Store the value of the referenced variable
pub fn load(state: &mut GameState, mut ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    let variable = ops.pull()? as u8;
    let value = state.peek_variable(variable)?;
    state.store(store_to, value)
}

/// 1OP:143 Bitwise NOT. Moved to VAR:248 in version 5.
pub fn not(state: &mut GameState, mut ops: OperandSet, store_to: u8) -> Result<InstructionResult> {
    let value = ops.pull()?;
    state.store(store_to, !value)
}

/// 0OP:176
pub fn rtrue(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    Ok(InstructionResult::Return(1))
}

/// 0OP:177
pub fn rfalse(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    Ok(InstructionResult::Return(0))
}

/// 0OP:178 Print the string literal that follows the instruction
pub fn print(state: &mut GameState, text: Vec<u16>) -> Result<InstructionResult> {
    state.print_zscii(&text)?;
    Ok(InstructionResult::Continue)
}

/// 0OP:179 Print the string literal, a newline, then return true
pub fn print_ret(state: &mut GameState, text: Vec<u16>) -> Result<InstructionResult> {
    state.print_zscii(&text)?;
    state.print_zscii(&[zscii::NEWLINE])?;
    Ok(InstructionResult::Return(1))
}

/// 0OP:180
pub fn nop(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    Ok(InstructionResult::Continue)
}

/// 0OP:183
pub fn restart(state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    state.restart()?;
    Ok(InstructionResult::Continue)
}

/// 0OP:184 Pop the stack and return the value
pub fn ret_popped(state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    Ok(InstructionResult::Return(state.stack.pop()?))
}

/// 0OP:186
pub fn quit(_state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    Ok(InstructionResult::Quit)
}

/// 0OP:187
pub fn new_line(state: &mut GameState, _ops: OperandSet) -> Result<InstructionResult> {
    state.print_zscii(&[zscii::NEWLINE])?;
    Ok(InstructionResult::Continue)
}

/// VAR:224 Call a routine and store the result. Known as call_vs from version 4.
pub fn call(state: &mut GameState, ops: OperandSet) -> Result<InstructionResult> {
    invoke(state, ops, CallType::Store)
}

/// VAR:225 Store a word in the given array at the given word index
pub fn storew(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let array = ops.pull()?;
    let index = ops.pull()?;
    let value = ops.pull()?;
    state
        .memory
        .write_word(table_address(array, index, 2), value)?;
    Ok(InstructionResult::Continue)
}

/// VAR:226 Store a byte in the given array at the given byte index
pub fn storeb(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let array = ops.pull()?;
    let index = ops.pull()?;
    let value = ops.pull()?;
    state
        .memory
        .write_byte(table_address(array, index, 1), value as u8)?;
    Ok(InstructionResult::Continue)
}

/// VAR:227 Overwrite an existing property of an object
pub fn put_prop(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let object = ops.pull()?;
    let property = ops.pull()?;
    let value = ops.pull()?;
    state
        .objects
        .set_property(&mut state.memory, object, property, value)?;
    Ok(InstructionResult::Continue)
}

/// VAR:229 Print a single ZSCII character
pub fn print_char(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let c = ops.pull()?;
    state.print_zscii(&[c])?;
    Ok(InstructionResult::Continue)
}

/// VAR:230 Print a signed number
pub fn print_num(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let value = ops.pull_signed()?;
    state.print_str(&value.to_string())?;
    Ok(InstructionResult::Continue)
}

/// VAR:231 A random number between 1 and n. Negative n reseeds the
/// generator and stores 0.
pub fn random(
    state: &mut GameState,
    mut ops: OperandSet,
    store_to: u8,
) -> Result<InstructionResult> {
    let range = ops.pull_signed()?;
    let value = match range {
        r if r > 0 => state.random.next(r as u16),
        r if r < 0 => {
            state.random.seed(u32::from(r.unsigned_abs()));
            0
        }
        _ => 0,
    };
    state.store(store_to, value)
}

/// VAR:232 Push a value onto the stack
pub fn push(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let value = ops.pull()?;
    state.stack.push(value)?;
    Ok(InstructionResult::Continue)
}

/// VAR:233 Pop the stack into the referenced variable
pub fn pull(state: &mut GameState, mut ops: OperandSet) -> Result<InstructionResult> {
    let variable = ops.pull()? as u8;
    let value = state.stack.pop()?;
    state.poke_variable(variable, value)?;
    Ok(InstructionResult::Continue)
}
