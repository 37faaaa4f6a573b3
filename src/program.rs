//! The execution engine. A `Program` owns its memory, instruction pointer, and relative
//! base, and drives the fetch-decode-execute loop against one input and one output channel.
//!
//! The engine is a state machine. `run` applies instructions until the engine either halts
//! or needs input that has not arrived yet. In the second case it returns
//! `State::Suspended` without having touched anything, so the same instruction is retried
//! from scratch when the caller pushes more input and calls `run` again.

use std::fmt::{Display, Formatter};

use log::debug;
use prettytable::Table;
use strum_macros::Display as StrumDisplay;

use crate::address::Address;
use crate::bytecode::{decode, DecodedInstruction, Mode, OutputKind, Value, MAX_PARAMETERS};
use crate::channel::Channel;
use crate::error::VmError;
use crate::memory::Memory;
use crate::TABLE_DISPLAY_FORMAT;

#[derive(StrumDisplay, Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum State {
  /// Ready to execute the instruction at the instruction pointer.
  Running,
  /// Blocked on a read from an empty input channel.
  Suspended,
  /// Executed a halt instruction. Terminal.
  Halted,
  /// Hit a fatal error. Terminal.
  Failed,
}

pub struct Program {
  // Memory Store
  memory: Memory,

  // Registers //
  ip           : Address, // Instruction Pointer
  relative_base: Value,
  state        : State,
  steps        : u64,     // Instructions executed so far

  // Channels
  input : Channel,
  output: Channel,
}

impl Program {

  // region Construction

  /// Loads a copy of `image` into a fresh engine reading from `input` and writing to
  /// `output`.
  pub fn new(image: &[Value], input: Channel, output: Channel) -> Program {
    debug!("loading a program of {} words", image.len());
    Program {
      memory       : Memory::new(image),
      ip           : Address::default(),
      relative_base: 0,
      state        : State::Running,
      steps        : 0,
      input,
      output,
    }
  }

  /// An engine with private input and output channels, for batch use.
  pub fn with_io(image: &[Value]) -> Program {
    Program::new(image, Channel::new(), Channel::new())
  }

  // endregion

  // region Accessors

  pub fn state(&self) -> State {
    self.state
  }

  pub fn halted(&self) -> bool {
    self.state == State::Halted
  }

  pub fn instruction_pointer(&self) -> Address {
    self.ip
  }

  pub fn relative_base(&self) -> Value {
    self.relative_base
  }

  /// Number of instructions executed so far. Suspending does not count.
  pub fn steps(&self) -> u64 {
    self.steps
  }

  pub fn memory(&self) -> &Memory {
    &self.memory
  }

  pub fn input(&self) -> &Channel {
    &self.input
  }

  pub fn output(&self) -> &Channel {
    &self.output
  }

  /// Overwrites a word of memory, e.g. to patch a program before it runs.
  pub fn poke(&mut self, address: Address, value: Value) {
    self.memory.write(address, value);
  }

  pub fn push_input(&self, value: Value) {
    self.input.push(value);
  }

  /// Removes and returns everything the engine has emitted and nobody has consumed yet.
  pub fn drain_output(&self) -> Vec<Value> {
    self.output.drain()
  }

  // endregion

  // region Execution

  /**
    Runs until the engine halts or suspends waiting for input. Resuming a halted engine
    is a no-op that reports `Halted` again. A failed engine cannot be resumed.
  */
  pub fn run(&mut self) -> Result<State, VmError> {
    loop {
      match self.step()? {
        State::Running => continue,
        state          => return Ok(state),
      }
    }
  }

  /// Executes a single instruction and returns the resulting state.
  pub fn step(&mut self) -> Result<State, VmError> {
    match self.state {
      State::Halted => return Ok(State::Halted),
      State::Failed => return Err(VmError::RunAfterFailure),
      _             => {}
    }

    match self.execute() {

      Ok(state) => {
        match state {
          State::Suspended => debug!("suspended at {} waiting for input", self.ip),
          State::Halted    => debug!("halted at {} after {} steps", self.ip, self.steps),
          _                => {}
        }
        self.state = state;
        Ok(state)
      }

      Err(error) => {
        debug!("failed at {}: {}", self.ip, error);
        self.state = State::Failed;
        Err(error)
      }

    }
  }

  /**
    Fetches, decodes, and executes the instruction at the instruction pointer. Every
    parameter is resolved before any effect happens, so an instruction that fails or
    suspends leaves memory, registers, and channels as they were.
  */
  fn execute(&mut self) -> Result<State, VmError> {
    let instruction = decode(self.ip, self.memory.read(self.ip))?;
    let operation   = instruction.operation;

    #[cfg(feature = "trace_computation")]
    log::trace!("{}: {} (relative base {})", self.ip, instruction, self.relative_base);

    let mut args = [0 as Value; MAX_PARAMETERS];
    for (i, arg) in args.iter_mut().enumerate().take(operation.inputs) {
      *arg = self.load(&instruction, i)?;
    }

    let destination = match operation.output {
      OutputKind::Write => Some(self.resolve(&instruction, operation.inputs)?),
      _                 => None
    };

    let mut arg_count = operation.inputs;
    if operation.reads_input {
      match self.input.pop() {
        Some(value) => {
          args[arg_count] = value;
          arg_count += 1;
        }
        None => return Ok(State::Suspended)
      }
    }

    let result = (operation.transform)(&args[..arg_count]);
    let next   = self.ip + operation.size();
    let overflow = VmError::ArithmeticOverflow{ address: self.ip, opcode: operation.opcode };

    match operation.output {

      OutputKind::Write => {
        let value = result.ok_or(overflow)?;
        // `destination` is always resolved for writing operations.
        if let Some(address) = destination {
          self.memory.write(address, value);
        }
        self.ip = next;
      }

      OutputKind::Jump => {
        self.ip = match result {
          Some(target) => Address::from_value(target)?,
          None         => next
        };
      }

      OutputKind::RelativeBase => {
        let offset = result.ok_or(overflow.clone())?;
        self.relative_base = self.relative_base.checked_add(offset).ok_or(overflow)?;
        self.ip = next;
      }

      OutputKind::Emit => {
        if let Some(value) = result {
          self.output.push(value);
        }
        self.ip = next;
      }

      OutputKind::Halt => {
        self.steps += 1;
        return Ok(State::Halted);
      }

    }

    self.steps += 1;
    Ok(State::Running)
  }

  /// The raw word of the `i`th parameter of `instruction`.
  fn parameter(&self, instruction: &DecodedInstruction, i: usize) -> Value {
    self.memory.read(instruction.address + (1 + i))
  }

  /// The value of the `i`th parameter, according to its mode.
  fn load(&self, instruction: &DecodedInstruction, i: usize) -> Result<Value, VmError> {
    let raw = self.parameter(instruction, i);
    match instruction.modes[i] {
      Mode::Immediate => Ok(raw),
      _               => Ok(self.memory.read(self.resolve(instruction, i)?))
    }
  }

  /// The address named by the `i`th parameter. Immediate parameters name no address.
  fn resolve(&self, instruction: &DecodedInstruction, i: usize) -> Result<Address, VmError> {
    let raw = self.parameter(instruction, i);
    match instruction.modes[i] {
      Mode::Position  => Address::from_value(raw),
      Mode::Relative  => Address::from_relative(self.relative_base, raw),
      Mode::Immediate => Err(VmError::ImmediateWriteTarget{
        address: instruction.address,
        word   : instruction.word
      }),
    }
  }

  // endregion

  // region Display methods

  fn make_register_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);
    table.add_row(row![r->"IP =",     self.ip]);
    table.add_row(row![r->"RB =",     self.relative_base]);
    table.add_row(row![r->"State =",  self.state]);
    table.add_row(row![r->"Steps =",  self.steps]);
    table.add_row(row![r->"Input =",  self.input]);
    table.add_row(row![r->"Output =", self.output]);
    table
  }

  // endregion

}

impl Display for Program {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let r_table = self.make_register_table();
    let m_table = self.memory.make_table(Some(self.ip));

    let mut combined_table = table!([r_table, m_table]);

    combined_table.set_titles(row![ub->"Registers", ub->"Memory"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(f, "{}", combined_table)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn run_to_halt(image: &[Value], inputs: &[Value]) -> Program {
    let mut program = Program::with_io(image);
    program.input().extend(inputs.iter().copied());
    assert_eq!(program.run(), Ok(State::Halted));
    program
  }

  #[test]
  fn halt_only(){
    let program = run_to_halt(&[99], &[]);
    assert_eq!(program.memory().as_slice(), &[99]);
    assert!(program.output().is_empty());
    assert_eq!(program.instruction_pointer(), Address::new(0));
  }

  #[test]
  fn add_position(){
    let program = run_to_halt(&[1, 0, 4, 5, 99, -1], &[]);
    assert_eq!(program.memory().as_slice(), &[1, 0, 4, 5, 99, 100]);
  }

  #[test]
  fn add_immediate(){
    let program = run_to_halt(&[1101, 50, 50, 5, 99, -1], &[]);
    assert_eq!(program.memory().as_slice(), &[1101, 50, 50, 5, 99, 100]);
  }

  #[test]
  fn add_relative(){
    // Sets the relative base to 2 first, then MEM[7] = MEM[4] + MEM[5].
    let program = run_to_halt(&[109, 2, 22201, 2, 3, 5, 99, -1], &[]);
    assert_eq!(program.memory().read(Address::new(7)), 3 + 5);
    assert_eq!(program.relative_base(), 2);
  }

  #[test]
  fn multiply_in_place(){
    let program = run_to_halt(&[1002, 4, 3, 4, 33], &[]);
    assert_eq!(program.memory().as_slice(), &[1002, 4, 3, 4, 99]);
  }

  #[test]
  fn read_input(){
    let program = run_to_halt(&[3, 3, 99, -1], &[5]);
    assert_eq!(program.memory().as_slice(), &[3, 3, 99, 5]);
  }

  #[test]
  fn write_output(){
    let program = run_to_halt(&[4, 2, 99], &[]);
    assert_eq!(program.drain_output(), vec![99]);
  }

  #[test]
  fn jumps(){
    // Taken jumps skip the -1, which would otherwise be an unknown opcode.
    run_to_halt(&[1105, 1, 4, -1, 99], &[]);
    run_to_halt(&[1105, -1, 4, -1, 99], &[]);
    run_to_halt(&[1106, 0, 4, -1, 99], &[]);
    // Untaken jumps fall through to the halt.
    run_to_halt(&[1105, 0, 4, 99, -1], &[]);
    run_to_halt(&[1106, 1, 4, 99, -1], &[]);
  }

  #[test]
  fn comparisons(){
    let program = run_to_halt(&[1107, -1, 3, 5, 99, -1], &[]);
    assert_eq!(program.memory().read(Address::new(5)), 1);
    let program = run_to_halt(&[1107, 1, -3, 5, 99, -1], &[]);
    assert_eq!(program.memory().read(Address::new(5)), 0);
    let program = run_to_halt(&[1108, 3, 3, 5, 99, -1], &[]);
    assert_eq!(program.memory().read(Address::new(5)), 1);
    let program = run_to_halt(&[1108, 2, 3, 5, 99, -1], &[]);
    assert_eq!(program.memory().read(Address::new(5)), 0);
  }

  #[test]
  fn relative_write_round_trip(){
    // rb += 10; read input into MEM[rb + 5]; output MEM[15]; halt
    let program = run_to_halt(&[109, 10, 203, 5, 4, 15, 99], &[-8]);
    assert_eq!(program.memory().read(Address::new(15)), -8);
    assert_eq!(program.drain_output(), vec![-8]);
  }

  #[test]
  fn position_agrees_with_immediate(){
    // MEM[9] = 0 + 77 via immediate add, then emit it by position and by immediate value.
    let program = run_to_halt(&[1101, 0, 77, 9, 4, 9, 104, 77, 99, 0], &[]);
    let output = program.drain_output();
    assert_eq!(output[0], output[1]);
  }

  #[test]
  fn memory_grows_on_write(){
    let program = run_to_halt(&[1101, 3, 4, 1000, 4, 1000, 4, 2000, 99], &[]);
    assert_eq!(program.drain_output(), vec![7, 0]);
    assert_eq!(program.memory().len(), 10);
    assert_eq!(program.memory().as_slice().len(), 9);
  }

  #[cfg(target_pointer_width = "64")]
  #[test]
  fn far_write_round_trip(){
    let far: Value = 1 << 61;
    let program = run_to_halt(&[1101, 1, 1, far, 4, far, 99], &[]);
    assert_eq!(program.drain_output(), vec![2]);
    assert_eq!(program.memory().read(Address::new(1 << 61)), 2);
    assert_eq!(program.memory().sparse_cells().count(), 1);
  }

  #[test]
  fn suspend_and_resume(){
    // Reads two values, emits their sum.
    let mut program = Program::with_io(&[3, 13, 3, 14, 1, 13, 14, 15, 4, 15, 99, 0, 0, 0, 0, 0]);
    assert_eq!(program.run(), Ok(State::Suspended));
    assert_eq!(program.instruction_pointer(), Address::new(0));
    assert_eq!(program.steps(), 0);

    program.push_input(20);
    assert_eq!(program.run(), Ok(State::Suspended));
    assert_eq!(program.instruction_pointer(), Address::new(2));
    assert_eq!(program.steps(), 1);

    program.push_input(22);
    assert_eq!(program.run(), Ok(State::Halted));
    assert_eq!(program.drain_output(), vec![42]);
  }

  #[test]
  fn halted_is_terminal(){
    let mut program = run_to_halt(&[104, 1, 99], &[]);
    assert_eq!(program.run(), Ok(State::Halted));
    assert_eq!(program.step(), Ok(State::Halted));
    assert_eq!(program.drain_output(), vec![1]);
  }

  #[test]
  fn negative_address_does_not_advance(){
    let mut program = Program::with_io(&[1, -1, 0, 0, 99]);
    assert_eq!(program.run(), Err(VmError::NegativeAddress(-1)));
    assert_eq!(program.state(), State::Failed);
    assert_eq!(program.instruction_pointer(), Address::new(0));
    assert_eq!(program.memory().as_slice(), &[1, -1, 0, 0, 99]);
    assert_eq!(program.run(), Err(VmError::RunAfterFailure));
  }

  #[test]
  fn negative_write_keeps_input(){
    let mut program = Program::with_io(&[3, -4, 99]);
    program.push_input(1);
    assert_eq!(program.run(), Err(VmError::NegativeAddress(-4)));
    assert_eq!(program.input().len(), 1);
  }

  #[test]
  fn negative_relative_read(){
    // rb = -5, then MEM[rb + 0] + MEM[rb + 0] -> MEM[rb + 0]
    let image = [109, -5, 22201, 0, 0, 0, 99];
    let mut program = Program::with_io(&image);
    assert_eq!(program.run(), Err(VmError::NegativeAddress(-5)));
    assert_eq!(program.state(), State::Failed);
    assert_eq!(program.instruction_pointer(), Address::new(2));
    assert_eq!(program.relative_base(), -5);
    assert_eq!(program.steps(), 1);
    assert_eq!(program.memory().as_slice(), &image);
    assert_eq!(program.memory().sparse_cells().count(), 0);
  }

  #[test]
  fn negative_relative_write_keeps_input(){
    // rb = -5, then read input into MEM[rb + 1]
    let image = [109, -5, 203, 1, 99];
    let mut program = Program::with_io(&image);
    program.push_input(7);
    assert_eq!(program.run(), Err(VmError::NegativeAddress(-4)));
    assert_eq!(program.instruction_pointer(), Address::new(2));
    assert_eq!(program.input().len(), 1);
    assert_eq!(program.input().pop(), Some(7));
    assert_eq!(program.memory().as_slice(), &image);
    assert_eq!(program.memory().sparse_cells().count(), 0);
  }

  #[test]
  fn negative_jump_target(){
    let mut program = Program::with_io(&[1105, 1, -2, 99]);
    assert_eq!(program.run(), Err(VmError::NegativeAddress(-2)));
  }

  #[test]
  fn fatal_decode_errors(){
    let mut program = Program::with_io(&[1, 0, 0, 0, 42]);
    assert_eq!(
      program.run(),
      Err(VmError::UnknownOpcode{ address: Address::new(4), word: 42 })
    );
    let mut program = Program::with_io(&[11101, 1, 1, 0, 99]);
    assert!(matches!(program.run(), Err(VmError::ImmediateWriteTarget{ .. })));
    let mut program = Program::with_io(&[304, 0, 99]);
    assert!(matches!(program.run(), Err(VmError::InvalidMode{ mode: 3, .. })));
  }

  #[test]
  fn running_off_the_end(){
    // Memory past the image reads as zero, which is not an opcode.
    let mut program = Program::with_io(&[1101, 1, 1, 5]);
    assert!(matches!(program.run(), Err(VmError::UnknownOpcode{ word: 0, .. })));
  }

  #[test]
  fn overflow(){
    let mut program = Program::with_io(&[1102, Value::MAX, 2, 0, 99]);
    assert!(matches!(
      program.run(),
      Err(VmError::ArithmeticOverflow{ opcode: crate::bytecode::Opcode::Multiply, .. })
    ));
  }

  #[test]
  fn display_dump(){
    let program = run_to_halt(&[104, 5, 99], &[]);
    let text = format!("{}", program);
    assert!(text.contains("Halted"));
    assert!(text.contains("* --> MEM[2] ="));
    assert!(text.contains("[5]"));
  }
}
