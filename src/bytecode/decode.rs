/*!
  Splits an opcode word into its operation and the addressing modes of its parameters.
  Decoding only looks at the opcode word itself; the parameter words are fetched by the
  engine, which knows the relative base.
*/
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use super::{Mode, Opcode, Operation, Value};
use crate::address::Address;
use crate::error::VmError;

/// No operation takes more than three parameters (two inputs and a destination).
pub const MAX_PARAMETERS: usize = 3;

#[derive(Copy, Clone, Debug)]
pub struct DecodedInstruction {
  /// Where the opcode word was read from.
  pub address  : Address,
  pub word     : Value,
  pub operation: &'static Operation,
  /// One mode per parameter in left-to-right order. Only the first
  /// `operation.parameter_count()` entries are meaningful.
  pub modes    : [Mode; MAX_PARAMETERS],
}

impl DecodedInstruction {
  pub fn opcode(&self) -> Opcode {
    self.operation.opcode
  }

  pub fn modes(&self) -> &[Mode] {
    &self.modes[..self.operation.parameter_count()]
  }

  /// Mode of the trailing destination parameter of a writing instruction.
  pub fn destination_mode(&self) -> Mode {
    self.modes[self.operation.inputs]
  }
}

impl Display for DecodedInstruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}({})",
      self.opcode(),
      self.modes()
          .iter()
          .map(Mode::to_string)
          .collect::<Vec<String>>()
          .join(", ")
    )
  }
}

/**
  Decodes the word found at `address`. The operation code is `word mod 100`; the remaining
  digits, least significant first, are the modes of the parameters. Missing digits mean
  position mode. Digits beyond the operation's last parameter are ignored.

  A destination in immediate mode is rejected here rather than when the write happens, so
  a bad instruction fails before any of its effects.
*/
pub fn decode(address: Address, word: Value) -> Result<DecodedInstruction, VmError> {
  if word < 0 {
    return Err(VmError::UnknownOpcode{ address, word });
  }

  let opcode = u8::try_from(word % 100)
    .ok()
    .and_then(|code| Opcode::try_from(code).ok())
    .ok_or(VmError::UnknownOpcode{ address, word })?;
  let operation = Operation::of(opcode);

  let mut modes = [Mode::default(); MAX_PARAMETERS];
  let mut rest = word / 100;
  for mode in modes.iter_mut().take(operation.parameter_count()) {
    let digit = rest % 10;
    *mode = Mode::try_from(digit as u8)
      .map_err(|_| VmError::InvalidMode{ address, word, mode: digit })?;
    rest /= 10;
  }

  let instruction = DecodedInstruction{ address, word, operation, modes };
  if operation.writes_memory() && instruction.destination_mode() == Mode::Immediate {
    return Err(VmError::ImmediateWriteTarget{ address, word });
  }

  Ok(instruction)
}
