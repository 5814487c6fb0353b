mod common;
mod version_6;
mod version_gte3;
mod version_gte4;
mod version_gte5;
mod version_lte4;

use tracing::debug;

use crate::game::instruction::op_code::TABLE_SIZE;
use crate::game::instruction::{Instruction, OpCode};

/// Represents all the instructions available to the Z-Machine version specified in the game file.
/// Slots left empty are illegal for that version.
pub struct InstructionSet {
    instructions: Vec<Option<Instruction>>,
}

impl InstructionSet {
    pub fn new(version: u8) -> InstructionSet {
        let mut set = InstructionSet {
            instructions: vec![None; TABLE_SIZE],
        };

        set.extend(common::instructions());
        if version <= 4 {
            set.extend(version_lte4::instructions(version));
        }
        if version >= 3 {
            set.extend(version_gte3::instructions());
        }
        if version >= 4 {
            set.extend(version_gte4::instructions());
        }
        if version >= 5 {
            set.extend(version_gte5::instructions());
        }
        if version == 6 {
            set.extend(version_6::instructions());
        }

        debug!(
            "Built version {} instruction set with {} instructions",
            version,
            set.instructions.iter().flatten().count()
        );
        set
    }

    fn extend(&mut self, instructions: Vec<(OpCode, Instruction)>) {
        for (opcode, instruction) in instructions {
            self.instructions[opcode.index()] = Some(instruction);
        }
    }

    pub fn get(&self, opcode: OpCode) -> Option<Instruction> {
        self.instructions.get(opcode.index()).copied().flatten()
    }
}
