use std::time::Duration;

use num_traits::FromPrimitive;
use tracing::{debug, error, info, trace, warn};

use crate::game::alphabet::Alphabet;
use crate::game::config::Config;
use crate::game::dictionary;
use crate::game::error::GameError;
use crate::game::header::{flags1, flags2};
use crate::game::instruction::{
    self, CallType, Instruction, InstructionResult, InstructionSet, Operand, OperandSet,
};
use crate::game::memory::Memory;
use crate::game::object::ObjectTable;
use crate::game::random::ZRandom;
use crate::game::stack::{CallStack, MAX_LOCALS};
use crate::game::stream::OutputStreams;
use crate::game::text;
use crate::game::zscii;
use crate::game::Result;
use crate::ui::{CharInput, Interface, LineInput, TextStyle};

/// A single-slot in-memory snapshot for `save_undo`.
struct UndoState {
    dynamic: Vec<u8>,
    stack: CallStack,
    pc: usize,
    store_to: u8,
}

/// The running machine. Owns the memory image, the call stack and the
/// interface, and lends them to instruction handlers one instruction at a
/// time.
pub struct GameState {
    pub(crate) memory: Memory,
    pub(crate) objects: ObjectTable,
    pub(crate) alphabet: Alphabet,
    pub(crate) stack: CallStack,
    pub(crate) pc: usize,
    pub(crate) random: ZRandom,
    pub(crate) streams: OutputStreams,
    pub(crate) interface: Box<dyn Interface>,
    pub(crate) style: TextStyle,
    pub(crate) checksum_valid: bool,
    instruction_set: InstructionSet,
    config: Config,
    pristine: Vec<u8>,
    undo: Option<UndoState>,
    quit: bool,
}

impl GameState {
    pub fn new(story: &[u8], interface: Box<dyn Interface>, config: Config) -> Result<GameState> {
        let mut memory = Memory::new(story)?;
        let version = memory.version();
        let checksum_valid = memory.verify();
        memory.configure_header(&interface.capabilities(), &config);

        info!(
            "Release {} serial {}: dictionary {:#x}, objects {:#x}, globals {:#x}, static {:#x}, high {:#x}",
            memory.release(),
            memory.serial(),
            memory.dictionary_location(),
            memory.object_table_location(),
            memory.global_base(),
            memory.static_base(),
            memory.high_memory_base()
        );

        let mut state = GameState {
            objects: ObjectTable::new(memory.object_table_location(), version),
            alphabet: Alphabet::from_memory(&memory)?,
            stack: CallStack::new(),
            pc: 0,
            random: ZRandom::new(config.seed),
            streams: OutputStreams::new(None, None),
            interface,
            style: TextStyle::default(),
            checksum_valid,
            instruction_set: InstructionSet::new(version),
            config,
            pristine: story.to_vec(),
            undo: None,
            quit: false,
            memory,
        };
        state.start()?;
        Ok(state)
    }

    /// Replace the output streams, attaching transcript and record sinks.
    pub fn with_streams(mut self, streams: OutputStreams) -> GameState {
        self.streams = streams;
        self
    }

    pub fn version(&self) -> u8 {
        self.memory.version()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn is_finished(&self) -> bool {
        self.quit
    }

    /// Set up the main routine and the initial program counter.
    fn start(&mut self) -> Result<()> {
        self.stack.clear();
        self.quit = false;
        let start = self.memory.program_counter_starts();
        if self.version() == 6 {
            let address = self.memory.unpack_address(start, true);
            let locals = self.memory.read_byte(address)? as usize;
            self.stack.push_frame(0, &vec![0; locals])?;
            self.pc = address + 1;
        } else {
            self.stack.push_frame(0, &[])?;
            self.pc = start.into();
        }
        debug!("Starting execution at {:#x}", self.pc);
        Ok(())
    }

    /// Run until the story quits or a fault ends execution. A fault is
    /// reported through the interface before it is returned.
    pub fn run(&mut self) -> Result<()> {
        while !self.is_finished() {
            let pc = self.pc;
            if let Err(e) = self.step() {
                error!("Fatal error at {:#07x}: {}", pc, e);
                if let Err(report) = self.interface.report_error(&e.to_string()) {
                    warn!("Couldn't report error to the interface: {}", report);
                }
                return Err(e);
            }
        }
        self.streams.flush()?;
        info!("Story quit");
        Ok(())
    }

    /// Let the interface close down after the story has quit.
    pub fn finish(&mut self) -> Result<()> {
        self.interface.done()?;
        Ok(())
    }

    /// Execute a single instruction.
    pub fn step(&mut self) -> Result<()> {
        let start = self.pc;
        let mut pc = self.pc;
        let decoded = instruction::decode(&self.memory, &mut pc)?;
        self.pc = pc;

        let instruction = self
            .instruction_set
            .get(decoded.opcode)
            .ok_or(GameError::IllegalInstruction(decoded.opcode))?;

        let values = decoded
            .operands
            .iter()
            .map(|operand| self.resolve(*operand))
            .collect::<Result<Vec<u16>>>()?;
        let operands = OperandSet::new(decoded.operands, values);

        trace!(
            "{:#07x} {} {} {}",
            start,
            decoded.opcode,
            instruction.name(),
            operands
        );

        let result = match instruction {
            Instruction::Normal(f, _) => f(self, operands)?,
            Instruction::Branch(f, _) => {
                let (expected, offset) = self.read_branch()?;
                f(self, operands, expected, offset)?
            }
            Instruction::Store(f, _) => {
                let store_to = self.fetch_byte()?;
                f(self, operands, store_to)?
            }
            Instruction::BranchStore(f, _) => {
                let store_to = self.fetch_byte()?;
                let (expected, offset) = self.read_branch()?;
                f(self, operands, expected, offset, store_to)?
            }
            Instruction::StringLiteral(f, _) => {
                let (text, next) = text::decode(&self.memory, &self.alphabet, self.pc)?;
                self.pc = next;
                f(self, text)?
            }
        };
        self.apply(result)
    }

    fn apply(&mut self, result: InstructionResult) -> Result<()> {
        match result {
            InstructionResult::Continue => Ok(()),
            InstructionResult::Return(value) => self.return_from_routine(value),
            InstructionResult::Quit => {
                self.quit = true;
                Ok(())
            }
            InstructionResult::Invoke {
                address,
                arguments,
                call_type,
            } => self.call_routine(address, &arguments, call_type),
        }
    }

    fn fetch_byte(&mut self) -> Result<u8> {
        self.memory.fetch_byte(&mut self.pc)
    }

    fn read_branch(&mut self) -> Result<(bool, i16)> {
        instruction::read_branch(&self.memory, &mut self.pc)
    }

    fn resolve(&mut self, operand: Operand) -> Result<u16> {
        match operand {
            Operand::LargeConstant(v) => Ok(v),
            Operand::SmallConstant(v) => Ok(v.into()),
            Operand::Variable(v) => self.get_variable(v),
            Operand::Omitted => Err(GameError::invalid_operation("Omitted operand was read")),
        }
    }

    /// Read a variable. Variable 0 pops the stack.
    pub fn get_variable(&mut self, variable: u8) -> Result<u16> {
        match variable {
            0 => self.stack.pop(),
            1..=15 => self.stack.frame(variable as usize - 1),
            _ => self.memory.read_global(variable - 16),
        }
    }

    /// Write a variable. Variable 0 pushes onto the stack.
    pub fn set_variable(&mut self, variable: u8, value: u16) -> Result<()> {
        match variable {
            0 => self.stack.push(value),
            1..=15 => {
                *self.stack.frame_mut(variable as usize - 1)? = value;
                Ok(())
            }
            _ => self.memory.write_global(variable - 16, value),
        }
    }

    /// Read a variable named by reference. The stack is read in place.
    pub fn peek_variable(&mut self, variable: u8) -> Result<u16> {
        match variable {
            0 => self.stack.peek(),
            _ => self.get_variable(variable),
        }
    }

    /// Write a variable named by reference. The stack top is replaced in place.
    pub fn poke_variable(&mut self, variable: u8, value: u16) -> Result<()> {
        match variable {
            0 => {
                *self.stack.peek_mut()? = value;
                Ok(())
            }
            _ => self.set_variable(variable, value),
        }
    }

    /// Store a result and carry on.
    pub fn store(&mut self, store_to: u8, value: u16) -> Result<InstructionResult> {
        self.set_variable(store_to, value)?;
        Ok(InstructionResult::Continue)
    }

    /// Take a branch if `condition` matches the instruction's polarity. Offsets
    /// 0 and 1 return false and true from the current routine.
    pub fn conditional_branch(
        &mut self,
        offset: i16,
        condition: bool,
        expected: bool,
    ) -> Result<InstructionResult> {
        if condition != expected {
            return Ok(InstructionResult::Continue);
        }
        match offset {
            0 => Ok(InstructionResult::Return(0)),
            1 => Ok(InstructionResult::Return(1)),
            _ => {
                self.jump(offset)?;
                Ok(InstructionResult::Continue)
            }
        }
    }

    /// Move the program counter by `offset - 2`.
    pub fn jump(&mut self, offset: i16) -> Result<()> {
        let target = self.pc as i64 + i64::from(offset) - 2;
        self.pc = usize::try_from(target)
            .map_err(|_| GameError::invalid_operation(format!("Jump to {}", target)))?;
        Ok(())
    }

    /// Enter the routine at `address`. The caller's program counter is left on
    /// the stack together with what to do with the result.
    pub fn call_routine(
        &mut self,
        address: usize,
        arguments: &[u16],
        call_type: CallType,
    ) -> Result<()> {
        if address == 0 {
            return self.deliver(call_type, 0);
        }

        let mut cursor = address;
        let count = self.memory.fetch_byte(&mut cursor)? as usize;
        if count > MAX_LOCALS {
            return Err(GameError::invalid_operation(format!(
                "Routine at {:#x} declares {} locals",
                address, count
            )));
        }
        let mut locals = vec![0; count];
        if self.version() <= 4 {
            for local in locals.iter_mut() {
                *local = self.memory.fetch_word(&mut cursor)?;
            }
        }
        for (local, argument) in locals.iter_mut().zip(arguments) {
            *local = *argument;
        }

        self.stack.push(call_type as u16)?;
        self.stack.push_u32(self.pc as u32)?;
        self.stack.push_frame(arguments.len() as u16, &locals)?;
        self.pc = cursor;

        debug!(
            "Call {:#x} {:?} ({:?}), depth {}",
            address,
            arguments,
            call_type,
            self.stack.depth()
        );
        Ok(())
    }

    /// Leave the current routine, sending `value` where the call asked.
    pub fn return_from_routine(&mut self, value: u16) -> Result<()> {
        if self.stack.depth() <= 1 {
            return Err(GameError::invalid_operation(
                "Cannot return from the main routine",
            ));
        }
        self.stack.pop_frame()?;
        self.pc = self.stack.pop_u32()? as usize;
        let tag = self.stack.pop()?;
        let call_type = CallType::from_u16(tag).ok_or(GameError::BadCallType(tag))?;
        debug!("Return {:#x} ({:?}) to {:#x}", value, call_type, self.pc);
        self.deliver(call_type, value)
    }

    fn deliver(&mut self, call_type: CallType, value: u16) -> Result<()> {
        match call_type {
            CallType::Store => {
                let store_to = self.fetch_byte()?;
                self.set_variable(store_to, value)
            }
            CallType::Discard => Ok(()),
            CallType::Push => self.stack.push(value),
        }
    }

    /// Run an interrupt routine (for timed input) to completion and return
    /// its result.
    pub fn call_interrupt(&mut self, packed: u16, arguments: &[u16]) -> Result<u16> {
        let address = self.memory.unpack_address(packed, true);
        let depth = self.stack.depth();
        self.call_routine(address, arguments, CallType::Push)?;
        while self.stack.depth() > depth {
            if self.is_finished() {
                return Ok(1);
            }
            self.step()?;
        }
        self.stack.pop()
    }

    /// The identifier `catch` hands out for the current frame.
    pub fn frame_id(&self) -> u16 {
        self.stack.frame_pointer() as u16
    }

    /// Unwind frames until the one identified by `frame` is current.
    pub fn throw(&mut self, frame: u16) -> Result<()> {
        while self.stack.frame_pointer() != frame as usize {
            if self.stack.depth() <= 1 {
                return Err(GameError::invalid_operation(format!(
                    "Throw to frame {} which is not on the stack",
                    frame
                )));
            }
            self.stack.pop_frame()?;
            self.stack.pop_u32()?;
            self.stack.pop()?;
        }
        Ok(())
    }

    pub fn restart(&mut self) -> Result<()> {
        info!("Restarting");
        let kept = self.memory.flags2() & (flags2::TRANSCRIPT | flags2::FORCE_FIXED);
        let length = self.memory.static_base().min(self.pristine.len());
        self.memory.restore_dynamic(&self.pristine[..length])?;
        let flags = self.memory.flags2() & !(flags2::TRANSCRIPT | flags2::FORCE_FIXED);
        self.memory.set_flags2(flags | kept);
        self.memory
            .configure_header(&self.interface.capabilities(), &self.config);
        self.streams.reset();
        self.style = TextStyle::default();
        self.undo = None;
        self.start()
    }

    pub fn save_undo(&mut self, store_to: u8) {
        self.undo = Some(UndoState {
            dynamic: self.memory.dynamic().to_vec(),
            stack: self.stack.clone(),
            pc: self.pc,
            store_to,
        });
        debug!("Saved undo state at {:#x}", self.pc);
    }

    /// Restore the undo snapshot, storing 2 as the result of the `save_undo`
    /// that took it. Returns false when there is nothing to restore.
    pub fn restore_undo(&mut self) -> Result<bool> {
        let undo = match self.undo.take() {
            Some(undo) => undo,
            None => return Ok(false),
        };
        let kept = self.memory.flags2() & (flags2::TRANSCRIPT | flags2::FORCE_FIXED);
        self.memory.restore_dynamic(&undo.dynamic)?;
        let flags = self.memory.flags2() & !(flags2::TRANSCRIPT | flags2::FORCE_FIXED);
        self.memory.set_flags2(flags | kept);
        self.stack = undo.stack;
        self.pc = undo.pc;
        self.set_variable(undo.store_to, 2)?;
        debug!("Restored undo state at {:#x}", self.pc);
        Ok(true)
    }

    pub fn print_zscii(&mut self, text: &[u16]) -> Result<()> {
        self.streams
            .print(&mut self.memory, self.interface.as_mut(), text)
    }

    pub fn print_str(&mut self, text: &str) -> Result<()> {
        let text: Vec<u16> = text
            .chars()
            .map(|c| zscii::from_char(c).unwrap_or(b'?' as u16))
            .collect();
        self.print_zscii(&text)
    }

    /// Print the encoded string at `address`, returning the address after it.
    pub fn print_string_at(&mut self, address: usize) -> Result<usize> {
        let (text, next) = text::decode(&self.memory, &self.alphabet, address)?;
        self.print_zscii(&text)?;
        Ok(next)
    }

    pub fn object_name(&self, object: u16) -> Result<Vec<u16>> {
        let (address, words) = self.objects.name(&self.memory, object)?;
        if words == 0 {
            return Ok(Vec::new());
        }
        Ok(text::decode(&self.memory, &self.alphabet, address)?.0)
    }

    /// Draw the version 1-3 status line from globals 0 to 2.
    pub fn show_status(&mut self) -> Result<()> {
        if self.version() > 3 {
            return Ok(());
        }
        let object = self.memory.read_global(0)?;
        let location = if object == 0 {
            String::new()
        } else {
            zscii::to_string(&self.object_name(object)?)
        };
        let first = self.memory.read_global(1)? as i16;
        let second = self.memory.read_global(2)?;
        let progress = if self.memory.flags1() & flags1::STATUS_TIME != 0 {
            format!("{}:{:02}", first, second)
        } else {
            format!("Score: {}  Turns: {}", first, second)
        };
        self.interface.show_status(&location, &progress)?;
        Ok(())
    }

    fn timeout(&self, time: u16, routine: u16) -> Option<Duration> {
        if time > 0 && routine != 0 {
            Some(Duration::from_millis(u64::from(time) * 100))
        } else {
            None
        }
    }

    fn end_of_input(&mut self) {
        info!("End of input");
        self.quit = true;
    }

    /// Read a line from the player, calling `routine` every `time` tenths of
    /// a second. Returns the line with its terminating character (0 when the
    /// routine cut input short), or `None` if input has ended.
    fn read_line(
        &mut self,
        initial: String,
        max_chars: usize,
        time: u16,
        routine: u16,
    ) -> Result<Option<(String, u16)>> {
        let timeout = self.timeout(time, routine);
        let mut line = initial;
        loop {
            match self.interface.read_line(&line, max_chars, timeout)? {
                LineInput::Done(text, terminator) => {
                    return Ok(Some((text, terminator.to_zscii())))
                }
                LineInput::Timeout(partial) => {
                    line = partial;
                    let abort = self.call_interrupt(routine, &[])?;
                    if self.quit {
                        return Ok(None);
                    }
                    if abort != 0 {
                        return Ok(Some((line, 0)));
                    }
                }
                LineInput::End => {
                    self.end_of_input();
                    return Ok(None);
                }
            }
        }
    }

    /// The work of `sread` and `aread`: read a command into the text buffer at
    /// `text` and, when `parse` is non-zero, tokenise it into the parse buffer.
    pub fn read_command(
        &mut self,
        text: usize,
        parse: usize,
        time: u16,
        routine: u16,
    ) -> Result<Option<u16>> {
        let version = self.version();
        if version <= 3 {
            self.show_status()?;
        }

        let capacity = self.memory.read_byte(text)? as usize;
        let (max_chars, initial) = if version <= 4 {
            (capacity.saturating_sub(1), String::new())
        } else {
            let length = self.memory.read_byte(text + 1)? as usize;
            let mut initial = Vec::with_capacity(length);
            for i in 0..length {
                initial.push(u16::from(self.memory.read_byte(text + 2 + i)?));
            }
            (capacity, zscii::to_string(&initial))
        };

        let (line, terminator) = match self.read_line(initial, max_chars, time, routine)? {
            Some(read) => read,
            None => return Ok(None),
        };
        self.streams.echo_input(&self.memory, &line)?;

        let input: Vec<u8> = line
            .chars()
            .flat_map(char::to_lowercase)
            .map(|c| zscii::from_char(c).map_or(b'?', |z| z as u8))
            .take(max_chars)
            .collect();

        if version <= 4 {
            for (i, c) in input.iter().enumerate() {
                self.memory.write_byte(text + 1 + i, *c)?;
            }
            self.memory.write_byte(text + 1 + input.len(), 0)?;
        } else {
            self.memory.write_byte(text + 1, input.len() as u8)?;
            for (i, c) in input.iter().enumerate() {
                self.memory.write_byte(text + 2 + i, *c)?;
            }
        }

        if parse != 0 {
            let dictionary = self.memory.dictionary_location();
            dictionary::tokenize(
                &mut self.memory,
                &self.alphabet,
                text,
                parse,
                dictionary,
                false,
            )?;
        }
        Ok(Some(terminator))
    }

    /// The work of `read_char`. Returns the key's ZSCII code (0 when the
    /// routine cut input short), or `None` if input has ended.
    pub fn read_key(&mut self, time: u16, routine: u16) -> Result<Option<u16>> {
        let timeout = self.timeout(time, routine);
        loop {
            match self.interface.read_char(timeout)? {
                CharInput::Key(key) => return Ok(Some(key.to_zscii())),
                CharInput::Timeout => {
                    let abort = self.call_interrupt(routine, &[])?;
                    if self.quit {
                        return Ok(None);
                    }
                    if abort != 0 {
                        return Ok(Some(0));
                    }
                }
                CharInput::End => {
                    self.end_of_input();
                    return Ok(None);
                }
            }
        }
    }
}
