use crate::game::instruction::{Form, OpCode, Operand};
use crate::game::memory::Memory;
use crate::game::Result;

/// An instruction's opcode and raw operands, read from the instruction
/// stream. Store, branch and string data follow and are read by the caller
/// once it knows which of them the instruction takes.
#[derive(Debug, PartialEq, Eq)]
pub struct Decoded {
    pub opcode: OpCode,
    pub form: Form,
    pub operands: Vec<Operand>,
}

/// Read the operand types packed in `count` type bytes, stopping at the first
/// omitted operand.
fn read_types(memory: &Memory, pc: &mut usize, count: usize) -> Result<Vec<Operand>> {
    let mut bytes = Vec::with_capacity(count);
    for _ in 0..count {
        bytes.push(memory.fetch_byte(pc)?);
    }
    let mut operands = Vec::with_capacity(count * 4);
    'outer: for byte in bytes {
        for shift in [6, 4, 2, 0] {
            match Operand::from_type(byte >> shift) {
                Operand::Omitted => break 'outer,
                operand => operands.push(operand),
            }
        }
    }
    Ok(operands)
}

fn read_operand(memory: &Memory, pc: &mut usize, kind: Operand) -> Result<Operand> {
    Ok(match kind {
        Operand::LargeConstant(_) => Operand::LargeConstant(memory.fetch_word(pc)?),
        Operand::SmallConstant(_) => Operand::SmallConstant(memory.fetch_byte(pc)?),
        Operand::Variable(_) => Operand::Variable(memory.fetch_byte(pc)?),
        Operand::Omitted => Operand::Omitted,
    })
}

/// Decode the opcode and operands of the instruction at `pc`, advancing it.
pub fn decode(memory: &Memory, pc: &mut usize) -> Result<Decoded> {
    let byte = memory.fetch_byte(pc)?;

    let (opcode, form, kinds) = match byte {
        0xBE if memory.version() >= 5 => {
            let opcode = OpCode::Extended(memory.fetch_byte(pc)?);
            (opcode, Form::Extended, read_types(memory, pc, 1)?)
        }
        0x00..=0x7F => {
            let kind = |bit: u8| {
                if byte & bit != 0 {
                    Operand::Variable(0)
                } else {
                    Operand::SmallConstant(0)
                }
            };
            (
                OpCode::TwoOp(byte & 0x1f),
                Form::Long,
                vec![kind(0x40), kind(0x20)],
            )
        }
        0x80..=0xBF => match Operand::from_type(byte >> 4) {
            Operand::Omitted => (OpCode::ZeroOp(byte & 0x0f), Form::Short, vec![]),
            kind => (OpCode::OneOp(byte & 0x0f), Form::Short, vec![kind]),
        },
        0xC0..=0xDF => (
            OpCode::TwoOp(byte & 0x1f),
            Form::Variable,
            read_types(memory, pc, 1)?,
        ),
        0xE0..=0xFF => {
            // call_vs2 and call_vn2 take up to eight operands.
            let count = if byte == 0xEC || byte == 0xFA { 2 } else { 1 };
            (
                OpCode::VarOp(byte & 0x1f),
                Form::Variable,
                read_types(memory, pc, count)?,
            )
        }
    };

    let operands = kinds
        .into_iter()
        .map(|kind| read_operand(memory, pc, kind))
        .collect::<Result<Vec<Operand>>>()?;

    Ok(Decoded {
        opcode,
        form,
        operands,
    })
}

/// Read branch data: polarity, then a 6-bit unsigned or 14-bit signed offset.
pub fn read_branch(memory: &Memory, pc: &mut usize) -> Result<(bool, i16)> {
    let first = memory.fetch_byte(pc)?;
    let expected = first & 0x80 != 0;
    let offset = if first & 0x40 != 0 {
        i16::from(first & 0x3f)
    } else {
        let second = memory.fetch_byte(pc)?;
        let raw = u16::from(first & 0x3f) << 8 | u16::from(second);
        // Sign-extend from 14 bits.
        ((raw << 2) as i16) >> 2
    };
    Ok((expected, offset))
}
