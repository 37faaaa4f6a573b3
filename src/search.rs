//! Brute force search over the two patchable words at addresses 1 and 2 (the "noun" and the
//! "verb") for the pair that leaves a given value at address 0.

use std::ops::Range;

use log::trace;

use crate::address::Address;
use crate::bytecode::Value;
use crate::program::{Program, State};

/**
  Runs a fresh engine for every `(noun, verb)` in `range × range`, noun varying slowest, and
  returns the first pair for which the engine halts with `target` at address 0. Engines that
  fail or ask for input are skipped.
*/
pub fn search_noun_verb(image: &[Value], target: Value, range: Range<Value>) -> Option<(Value, Value)> {
  for noun in range.clone() {
    for verb in range.clone() {
      let mut program = Program::with_io(image);
      program.poke(Address::new(1), noun);
      program.poke(Address::new(2), verb);

      match program.run() {
        Ok(State::Halted) if program.memory().read(Address::new(0)) == target => {
          return Some((noun, verb));
        }
        Ok(_) => {}
        Err(error) => trace!("noun {} verb {}: {}", noun, verb, error),
      }
    }
  }
  None
}
