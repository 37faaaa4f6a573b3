/*!
  Several engines wired output-to-input in a ring. Engine `i` writes to channel `i + 1` and
  reads from channel `i`, so channel `0` carries what the last engine emits back to the
  first. Each engine is seeded with its phase setting, the first engine additionally with
  the initial signal, and then the engines are resumed round-robin until all of them halt.

  Everything happens on one thread. An engine that runs out of input just returns control
  to the loop here; the values it is waiting for arrive once its upstream peer gets its
  turn. The flow of values is therefore fully determined by the phase settings and the
  initial signal.
*/

use log::{debug, trace};

use crate::bytecode::Value;
use crate::channel::Channel;
use crate::error::VmError;
use crate::program::Program;

pub struct Pipeline {
  programs: Vec<Program>,
  channels: Vec<Channel>,
}

impl Pipeline {

  /// Builds a ring of `phases.len()` engines, each with its own copy of `image`.
  pub fn new(image: &[Value], phases: &[Value]) -> Pipeline {
    let count = phases.len();
    let channels: Vec<Channel> = (0..count).map(|_| Channel::new()).collect();

    let programs = phases
      .iter()
      .enumerate()
      .map(|(i, phase)| {
        channels[i].push(*phase);
        Program::new(image, channels[i].clone(), channels[(i + 1) % count].clone())
      })
      .collect();

    Pipeline{ programs, channels }
  }

  pub fn len(&self) -> usize {
    self.programs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.programs.is_empty()
  }

  pub fn programs(&self) -> &[Program] {
    &self.programs
  }

  /**
    Feeds `initial_signal` to the first engine and resumes the engines in index order until
    every one of them has halted. Returns the last value left on the channel feeding the
    first engine.

    The first fatal error of any engine is returned as is. A round in which no engine
    executes a single instruction is reported as `VmError::Deadlock`.
  */
  pub fn run(mut self, initial_signal: Value) -> Result<Value, VmError> {
    if self.is_empty() {
      return Err(VmError::NoSignal);
    }
    self.channels[0].push(initial_signal);

    let mut round = 0;
    while !self.programs.iter().all(Program::halted) {
      round += 1;
      let mut progressed = false;

      for (i, program) in self.programs.iter_mut().enumerate() {
        if program.halted() {
          continue;
        }
        let before = program.steps();
        let state  = program.run()?;
        trace!("round {}: engine {} {} after {} steps", round, i, state, program.steps() - before);
        progressed |= program.steps() != before;
      }

      if !progressed {
        debug!("no engine progressed in round {}", round);
        return Err(VmError::Deadlock);
      }
    }

    debug!("all {} engines halted after {} rounds", self.len(), round);
    self.channels[0].last().ok_or(VmError::NoSignal)
  }
}

/// Every ordering of `values`, in the order the positions are picked.
pub fn permutations(values: &[Value]) -> Vec<Vec<Value>> {
  if values.len() <= 1 {
    return vec![values.to_vec()];
  }

  let mut result = Vec::new();
  for (i, first) in values.iter().enumerate() {
    let mut rest = values.to_vec();
    rest.remove(i);
    for mut tail in permutations(&rest) {
      tail.insert(0, *first);
      result.push(tail);
    }
  }
  result
}

/**
  Tries every ordering of `phase_values` on a fresh pipeline and returns the ordering that
  produced the largest signal, together with that signal. Ties keep the first ordering
  found. A failing ordering fails the whole search.
*/
pub fn max_signal(
  image       : &[Value],
  phase_values: &[Value],
  initial_signal: Value
) -> Result<(Vec<Value>, Value), VmError> {
  let mut best: Option<(Vec<Value>, Value)> = None;

  for phases in permutations(phase_values) {
    let signal = Pipeline::new(image, &phases).run(initial_signal)?;
    trace!("phases {:?} -> {}", phases, signal);
    let better = match &best {
      Some((_, best_signal)) => signal > *best_signal,
      None                   => true
    };
    if better {
      best = Some((phases, signal));
    }
  }

  best.ok_or(VmError::NoSignal)
}


#[cfg(test)]
mod tests {
  use super::*;

  const LINEAR: [Value; 17] = [3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0];

  const FEEDBACK: [Value; 29] = [
    3, 26, 1001, 26, -4, 26, 3, 27, 1002, 27, 2, 27, 1, 27, 26, 27, 4, 27, 1001, 28, -1, 28,
    1005, 28, 6, 99, 0, 0, 5
  ];

  #[test]
  fn permutation_order(){
    assert_eq!(
      permutations(&[1, 2, 3]),
      vec![
        vec![1, 2, 3], vec![1, 3, 2],
        vec![2, 1, 3], vec![2, 3, 1],
        vec![3, 1, 2], vec![3, 2, 1],
      ]
    );
    assert_eq!(permutations(&[5, 6, 7, 8, 9]).len(), 120);
    assert_eq!(permutations(&[]), vec![Vec::<Value>::new()]);
  }

  #[test]
  fn linear_chain(){
    let signal = Pipeline::new(&LINEAR, &[4, 3, 2, 1, 0]).run(0);
    assert_eq!(signal, Ok(43210));
  }

  #[test]
  fn feedback_loop(){
    let signal = Pipeline::new(&FEEDBACK, &[9, 8, 7, 6, 5]).run(0);
    assert_eq!(signal, Ok(139629729));
  }

  #[test]
  fn engines_are_wired_in_a_ring(){
    let pipeline = Pipeline::new(&[99], &[1, 2, 3]);
    assert_eq!(pipeline.len(), 3);
    let programs = pipeline.programs();
    for i in 0..3 {
      assert!(programs[i].output().same_channel(programs[(i + 1) % 3].input()));
    }
    assert_eq!(programs[1].input().last(), Some(2));
  }

  #[test]
  fn search_linear(){
    assert_eq!(max_signal(&LINEAR, &[0, 1, 2, 3, 4], 0), Ok((vec![4, 3, 2, 1, 0], 43210)));
  }

  #[test]
  fn search_feedback(){
    assert_eq!(max_signal(&FEEDBACK, &[5, 6, 7, 8, 9], 0), Ok((vec![9, 8, 7, 6, 5], 139629729)));
  }

  #[test]
  fn deadlock(){
    // Each engine wants two values but never emits anything.
    let image = [3, 7, 3, 7, 99, 0, 0, 0];
    assert_eq!(Pipeline::new(&image, &[0, 1]).run(0), Err(VmError::Deadlock));
  }

  #[test]
  fn no_signal(){
    assert_eq!(Pipeline::new(&[99], &[]).run(0), Err(VmError::NoSignal));
    // Consumes the phase and the signal, emits nothing.
    assert_eq!(Pipeline::new(&[3, 5, 3, 5, 99, 0], &[7]).run(0), Err(VmError::NoSignal));
  }

  #[test]
  fn peer_failure_propagates(){
    // Reads its phase over the parameter of the output instruction, then emits MEM[phase].
    let image = [3, 3, 4, 0, 99];
    assert_eq!(Pipeline::new(&image, &[1, -3]).run(0), Err(VmError::NegativeAddress(-3)));
    assert_eq!(max_signal(&image, &[1, -3], 0), Err(VmError::NegativeAddress(-3)));
  }
}
