//! The instruction set as a table. Each operation declares how many input parameters it
//! reads, whether it pops a value from the input channel, what it does with its result,
//! and the pure function computing that result. The engine switches on `OutputKind`; it
//! never needs to know which operation produced a result.

use std::fmt::{Debug, Formatter};

use super::{Opcode, Value};

/// What the engine does with the result of an operation's transform.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum OutputKind {
  /// Write the result to the address named by the trailing destination parameter.
  Write,
  /// Jump to the result, if there is one.
  Jump,
  /// Add the result to the relative base.
  RelativeBase,
  /// Push the result onto the output channel.
  Emit,
  /// Stop the engine.
  Halt,
}

/// The pure part of an operation. Receives the values of the input parameters followed by
/// the value popped from the input channel, if the operation takes one.
/// `None` means "no result": a jump that is not taken, or an overflow for arithmetic.
pub type Transform = fn(&[Value]) -> Option<Value>;

#[derive(Copy, Clone)]
pub struct Operation {
  pub opcode     : Opcode,
  /// Number of input parameters, not counting a destination.
  pub inputs     : usize,
  pub reads_input: bool,
  pub output     : OutputKind,
  pub transform  : Transform,
}

impl Operation {
  /// Looks up the table entry for an opcode.
  pub fn of(opcode: Opcode) -> &'static Operation {
    match opcode {
      Opcode::Add                => &OPERATIONS[0],
      Opcode::Multiply           => &OPERATIONS[1],
      Opcode::ReadInput          => &OPERATIONS[2],
      Opcode::WriteOutput        => &OPERATIONS[3],
      Opcode::JumpIfTrue         => &OPERATIONS[4],
      Opcode::JumpIfFalse        => &OPERATIONS[5],
      Opcode::LessThan           => &OPERATIONS[6],
      Opcode::Equals             => &OPERATIONS[7],
      Opcode::AdjustRelativeBase => &OPERATIONS[8],
      Opcode::Halt               => &OPERATIONS[9],
    }
  }

  /// Number of parameter words following the opcode word, destination included.
  pub fn parameter_count(&self) -> usize {
    match self.output {
      OutputKind::Write => self.inputs + 1,
      _                 => self.inputs
    }
  }

  /// Size in words of the whole instruction.
  pub fn size(&self) -> usize {
    1 + self.parameter_count()
  }

  pub fn writes_memory(&self) -> bool {
    self.output == OutputKind::Write
  }
}

impl Debug for Operation {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Operation")
     .field("opcode", &self.opcode)
     .field("inputs", &self.inputs)
     .field("reads_input", &self.reads_input)
     .field("output", &self.output)
     .finish()
  }
}

// region Transforms

fn add(args: &[Value]) -> Option<Value> {
  args[0].checked_add(args[1])
}

fn multiply(args: &[Value]) -> Option<Value> {
  args[0].checked_mul(args[1])
}

/// Both the read-input and write-output operations pass their single value through.
fn identity(args: &[Value]) -> Option<Value> {
  Some(args[0])
}

fn jump_if_true(args: &[Value]) -> Option<Value> {
  match args[0] {
    0 => None,
    _ => Some(args[1])
  }
}

fn jump_if_false(args: &[Value]) -> Option<Value> {
  match args[0] {
    0 => Some(args[1]),
    _ => None
  }
}

fn less_than(args: &[Value]) -> Option<Value> {
  Some((args[0] < args[1]) as Value)
}

fn equals(args: &[Value]) -> Option<Value> {
  Some((args[0] == args[1]) as Value)
}

fn halt(_args: &[Value]) -> Option<Value> {
  None
}

// endregion

static OPERATIONS: [Operation; 10] = [
  Operation{ opcode: Opcode::Add,                inputs: 2, reads_input: false, output: OutputKind::Write,        transform: add           },
  Operation{ opcode: Opcode::Multiply,           inputs: 2, reads_input: false, output: OutputKind::Write,        transform: multiply      },
  Operation{ opcode: Opcode::ReadInput,          inputs: 0, reads_input: true,  output: OutputKind::Write,        transform: identity      },
  Operation{ opcode: Opcode::WriteOutput,        inputs: 1, reads_input: false, output: OutputKind::Emit,         transform: identity      },
  Operation{ opcode: Opcode::JumpIfTrue,         inputs: 2, reads_input: false, output: OutputKind::Jump,         transform: jump_if_true  },
  Operation{ opcode: Opcode::JumpIfFalse,        inputs: 2, reads_input: false, output: OutputKind::Jump,         transform: jump_if_false },
  Operation{ opcode: Opcode::LessThan,           inputs: 2, reads_input: false, output: OutputKind::Write,        transform: less_than     },
  Operation{ opcode: Opcode::Equals,             inputs: 2, reads_input: false, output: OutputKind::Write,        transform: equals        },
  Operation{ opcode: Opcode::AdjustRelativeBase, inputs: 1, reads_input: false, output: OutputKind::RelativeBase, transform: identity      },
  Operation{ opcode: Opcode::Halt,               inputs: 0, reads_input: false, output: OutputKind::Halt,         transform: halt          },
];
