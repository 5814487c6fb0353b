use num_derive::FromPrimitive;

/// Where a routine's return value goes. Pushed onto the stack below the
/// return address when the routine is called.
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallType {
    /// Read a store variable from the byte at the return address.
    Store = 0,
    Discard = 1,
    Push = 2,
}

/// What the dispatcher should do after a handler runs.
#[derive(Debug, PartialEq, Eq)]
pub enum InstructionResult {
    Continue,
    Return(u16),
    Quit,
    Invoke {
        address: usize,
        arguments: Vec<u16>,
        call_type: CallType,
    },
}
