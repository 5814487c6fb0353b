use crate::game::error::GameError;
use crate::game::Result;

pub const STACK_SIZE: usize = 1024;
pub const MAX_LOCALS: usize = 15;

/// The call-stack of the machine: a bounded run of 16-bit cells holding both
/// evaluation values and routine frames. A frame is laid out as
/// `[saved frame pointer] [local count << 8 | argument count] [local 1..15]`,
/// and the frame pointer always indexes the count cell of the active frame.
/// Evaluation values pushed above a frame belong to it alone.
#[derive(Clone, Debug)]
pub struct CallStack {
    cells: Vec<u16>,
    frame_pointer: usize,
    depth: usize,
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}

impl CallStack {
    pub fn new() -> CallStack {
        CallStack {
            cells: Vec::with_capacity(STACK_SIZE),
            frame_pointer: 0,
            depth: 0,
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.frame_pointer = 0;
        self.depth = 0;
    }

    pub fn frame_pointer(&self) -> usize {
        self.frame_pointer
    }

    /// The number of frames pushed and not yet popped.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn push(&mut self, value: u16) -> Result<()> {
        if self.cells.len() >= STACK_SIZE {
            return Err(GameError::StackOverflow);
        }
        self.cells.push(value);
        Ok(())
    }

    /// True when the active frame has no evaluation values of its own. Locals
    /// and values belonging to the caller's frame are out of reach.
    fn frame_is_empty(&self) -> bool {
        if self.depth > 0 {
            self.cells.len() <= self.frame_pointer + 1 + self.locals()
        } else {
            self.cells.is_empty()
        }
    }

    pub fn pop(&mut self) -> Result<u16> {
        if self.frame_is_empty() {
            return Err(GameError::StackUnderflow);
        }
        self.cells.pop().ok_or(GameError::StackUnderflow)
    }

    /// Push a 32-bit value as two cells, low half first.
    pub fn push_u32(&mut self, value: u32) -> Result<()> {
        self.push(value as u16)?;
        self.push((value >> 16) as u16)
    }

    pub fn pop_u32(&mut self) -> Result<u32> {
        let high = u32::from(self.pop()?);
        let low = u32::from(self.pop()?);
        Ok(high << 16 | low)
    }

    pub fn peek(&self) -> Result<u16> {
        if self.frame_is_empty() {
            return Err(GameError::StackUnderflow);
        }
        self.cells.last().copied().ok_or(GameError::StackUnderflow)
    }

    pub fn peek_mut(&mut self) -> Result<&mut u16> {
        if self.frame_is_empty() {
            return Err(GameError::StackUnderflow);
        }
        self.cells.last_mut().ok_or(GameError::StackUnderflow)
    }

    /// Open a new frame holding `locals`. The frame cell records both the
    /// argument count (low byte) and the number of locals (high byte).
    pub fn push_frame(&mut self, arg_count: u16, locals: &[u16]) -> Result<()> {
        if locals.len() > MAX_LOCALS {
            return Err(GameError::invalid_operation(format!(
                "Routine declares {} locals",
                locals.len()
            )));
        }
        self.push(self.frame_pointer as u16)?;
        let frame_pointer = self.cells.len();
        self.push((locals.len() as u16) << 8 | (arg_count & 0xff))?;
        for local in locals {
            self.push(*local)?;
        }
        self.frame_pointer = frame_pointer;
        self.depth += 1;
        Ok(())
    }

    /// Discard the active frame and everything above it, restoring the
    /// caller's frame pointer.
    pub fn pop_frame(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Err(GameError::StackUnderflow);
        }
        self.cells.truncate(self.frame_pointer);
        self.depth -= 1;
        self.frame_pointer = self.cells.pop().ok_or(GameError::StackUnderflow)? as usize;
        Ok(())
    }

    fn frame_cell(&self) -> Option<u16> {
        if self.depth == 0 {
            None
        } else {
            self.cells.get(self.frame_pointer).copied()
        }
    }

    /// The number of arguments the active routine was called with.
    pub fn frame_args(&self) -> Result<u16> {
        self.frame_cell()
            .map(|cell| cell & 0xff)
            .ok_or(GameError::StackUnderflow)
    }

    fn locals(&self) -> usize {
        self.frame_cell().map_or(0, |cell| (cell >> 8) as usize)
    }

    fn local_index(&self, index: usize) -> Result<usize> {
        if index >= MAX_LOCALS {
            return Err(GameError::invalid_operation(format!(
                "Local variable {} is out of range",
                index + 1
            )));
        }
        if index >= self.locals() {
            return Err(GameError::invalid_operation(format!(
                "Routine has no local variable {}",
                index + 1
            )));
        }
        Ok(self.frame_pointer + 1 + index)
    }

    /// Read a local of the active frame (0-based).
    pub fn frame(&self, index: usize) -> Result<u16> {
        let cell = self.local_index(index)?;
        self.cells.get(cell).copied().ok_or(GameError::StackUnderflow)
    }

    pub fn frame_mut(&mut self, index: usize) -> Result<&mut u16> {
        let cell = self.local_index(index)?;
        self.cells.get_mut(cell).ok_or(GameError::StackUnderflow)
    }
}
