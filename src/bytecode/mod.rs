/*!

  Intcode has no separate code segment: a program is a flat list of signed words, and the
  instruction pointer walks the same memory that instructions read and write. An
  instruction is an opcode word followed by one word per parameter. The opcode word
  packs two things in decimal:

    ABCDE
     ^^^     mode digits, one per parameter, read right to left (C is the first parameter)
       ^^    operation code

  so `1002` is `Multiply` with modes `[Position, Immediate, Position]`. Leading zeros are
  implicit, so any parameter without a digit is in position mode.

  As in the rest of the machine, an enum is only used for the opcode and the mode
  themselves. Decoded parameters stay raw words until the engine resolves them.

*/

mod decode;
mod image;
mod instruction;

pub use decode::{decode, DecodedInstruction, MAX_PARAMETERS};
pub use image::parse_image;
pub use instruction::{Operation, OutputKind, Transform};

use strum_macros::{Display as StrumDisplay, EnumIter};
use num_enum::{IntoPrimitive, TryFromPrimitive};

// If you change this you must also change the checked arithmetic in `instruction`.
pub type Value = i64;

/**
  Operation codes of the virtual machine. The discriminant is the numeric code as it
  appears in the low two digits of an opcode word.
*/
#[derive(
  StrumDisplay, EnumIter, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,     Eq,               PartialEq,     Debug, Hash
)]
#[repr(u8)]
pub enum Opcode {
  Add                = 1,  // add( a, b, dest )
  Multiply           = 2,  // multiply( a, b, dest )
  ReadInput          = 3,  // read_input( dest )
  WriteOutput        = 4,  // write_output( a )
  JumpIfTrue         = 5,  // jump_if_true( cond, target )
  JumpIfFalse        = 6,  // jump_if_false( cond, target )
  LessThan           = 7,  // less_than( a, b, dest )
  Equals             = 8,  // equals( a, b, dest )
  AdjustRelativeBase = 9,  // adjust_relative_base( a )
  Halt               = 99, // halt
}

impl Opcode {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }
}

/// How a raw parameter is turned into a value or an address.
#[derive(
  StrumDisplay, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,             Eq, PartialEq, Debug, Hash
)]
#[repr(u8)]
pub enum Mode {
  /// The parameter is an address to dereference.
  Position  = 0,
  /// The parameter is the value itself. Never valid for a destination.
  Immediate = 1,
  /// The parameter is an offset from the relative base.
  Relative  = 2,
}

impl Default for Mode {
  fn default() -> Mode {
    Mode::Position
  }
}
