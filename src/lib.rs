/*!
  An Intcode virtual machine.

  A program is a list of signed words loaded into a fresh `Program`, which executes it
  against an input and an output `Channel`. Running stops when the program halts or when it
  needs input that has not been supplied yet; in the latter case it can be resumed later.
  That is what makes it possible to wire several engines into a `Pipeline`, where each one
  consumes what the previous one emits.

  ```
  use intcode::{parse_image, Program, State};

  let image = parse_image("3,9,8,9,10,9,4,9,99,-1,8").unwrap();
  let mut program = Program::with_io(&image);
  program.push_input(8);
  assert_eq!(program.run(), Ok(State::Halted));
  assert_eq!(program.drain_output(), vec![1]);
  ```
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod address;
pub mod bytecode;
pub mod channel;
pub mod error;
pub mod memory;
pub mod pipeline;
pub mod program;
pub mod search;

pub use address::Address;
pub use bytecode::{parse_image, Value};
pub use channel::Channel;
pub use error::VmError;
pub use memory::Memory;
pub use pipeline::{max_signal, Pipeline};
pub use program::{Program, State};
pub use search::search_noun_verb;

use prettytable::format as TableFormat;

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}
