use itertools::Itertools;
use std::fmt::{self, Debug, Display, Formatter};

use crate::game::error::GameError;
use crate::game::Result;

use super::Operand;

/// The resolved operands of one instruction. Variables are read (and the stack
/// popped) in operand order when the set is built, so handlers see plain
/// values.
pub struct OperandSet {
    index: usize,
    operands: Vec<Operand>,
    values: Vec<u16>,
}

impl OperandSet {
    pub fn new(operands: Vec<Operand>, values: Vec<u16>) -> OperandSet {
        OperandSet {
            index: 0,
            operands,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn pull(&mut self) -> Result<u16> {
        self.next()
            .ok_or_else(|| GameError::invalid_operation("Instruction has too few operands"))
    }

    pub fn pull_signed(&mut self) -> Result<i16> {
        self.pull().map(|v| v as i16)
    }

    /// The next operand if one was supplied.
    pub fn try_pull(&mut self) -> Option<u16> {
        self.next()
    }

    /// All operands not yet pulled.
    pub fn rest(&mut self) -> Vec<u16> {
        self.by_ref().collect()
    }
}

impl Iterator for OperandSet {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.values.get(self.index).copied();
        if result.is_some() {
            self.index += 1;
        }
        result
    }
}

impl Display for OperandSet {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            self.operands
                .iter()
                .zip(self.values.iter())
                .map(|(op, value)| match op {
                    Operand::Variable(_) => format!("{}={:#x}", op, value),
                    _ => op.to_string(),
                })
                .join(",")
        )
    }
}

impl Debug for OperandSet {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pull_in_order_then_fail() {
        let mut ops = OperandSet::new(
            vec![Operand::SmallConstant(1), Operand::LargeConstant(0xffff)],
            vec![1, 0xffff],
        );
        assert_eq!(ops.len(), 2);
        assert_eq!(ops.pull().unwrap(), 1);
        assert_eq!(ops.pull_signed().unwrap(), -1);
        assert!(ops.try_pull().is_none());
        assert!(ops.pull().is_err());
    }

    #[test]
    fn display_shows_resolved_variables() {
        let ops = OperandSet::new(
            vec![Operand::Variable(0), Operand::SmallConstant(3)],
            vec![0x2a, 3],
        );
        assert_eq!(ops.to_string(), "sp=0x2a,#03");
    }
}
