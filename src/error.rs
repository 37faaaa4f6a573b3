//! Fatal conditions raised by an engine. Running out of input is not among them; that is
//! reported as `State::Suspended` by `Program::run`.

use thiserror::Error;

use crate::address::Address;
use crate::bytecode::{Opcode, Value};

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum VmError {
  /// The low two digits of the word at `address` name no operation.
  #[error("unknown opcode in word {word} at {address}")]
  UnknownOpcode { address: Address, word: Value },

  /// A parameter mode digit outside of `{0, 1, 2}`.
  #[error("invalid parameter mode {mode} in word {word} at {address}")]
  InvalidMode { address: Address, word: Value, mode: Value },

  /// The destination parameter of a writing instruction is in immediate mode.
  #[error("immediate mode write target in word {word} at {address}")]
  ImmediateWriteTarget { address: Address, word: Value },

  /// A read, write, or jump resolved to a negative address.
  #[error("invalid memory address: {0}")]
  NegativeAddress(Value),

  /// A non-negative address too large for this platform's address width.
  #[error("memory address out of range: {0}")]
  AddressOutOfRange(Value),

  #[error("arithmetic overflow in {opcode} at {address}")]
  ArithmeticOverflow { address: Address, opcode: Opcode },

  /// The engine already failed and cannot be resumed.
  #[error("engine cannot be resumed after a fatal error")]
  RunAfterFailure,

  /// Every engine in the ring halted without leaving a value for the first engine.
  #[error("pipeline halted without producing a signal")]
  NoSignal,

  /// No engine in the ring made progress during a full round.
  #[error("pipeline deadlocked: every live engine is waiting for input")]
  Deadlock,

  #[error("could not parse program image at byte {offset}: {message}")]
  Parse { offset: usize, message: String },
}
