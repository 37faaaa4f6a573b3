//! An unbounded FIFO of words connecting one producer to one consumer. Cloning a `Channel`
//! clones the handle, not the queue, so an engine's output and its downstream peer's input
//! can be the same channel. Engines run cooperatively on one thread, so popping from an
//! empty channel just returns `None`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::bytecode::Value;

#[derive(Clone, Debug, Default)]
pub struct Channel {
  queue: Rc<RefCell<VecDeque<Value>>>,
}

impl Channel {
  pub fn new() -> Channel {
    Channel::default()
  }

  /// A channel pre-populated with `values`, head first.
  pub fn with_values<I>(values: I) -> Channel
    where I: IntoIterator<Item = Value>
  {
    let channel = Channel::new();
    channel.extend(values);
    channel
  }

  pub fn push(&self, value: Value) {
    self.queue.borrow_mut().push_back(value);
  }

  pub fn extend<I>(&self, values: I)
    where I: IntoIterator<Item = Value>
  {
    self.queue.borrow_mut().extend(values);
  }

  /// Removes the head of the queue, or `None` if it is empty.
  pub fn pop(&self) -> Option<Value> {
    self.queue.borrow_mut().pop_front()
  }

  /// Removes and returns everything queued, head first.
  pub fn drain(&self) -> Vec<Value> {
    self.queue.borrow_mut().drain(..).collect()
  }

  /// The most recently pushed value, left in place.
  pub fn last(&self) -> Option<Value> {
    self.queue.borrow().back().copied()
  }

  pub fn len(&self) -> usize {
    self.queue.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.queue.borrow().is_empty()
  }

  /// Whether two handles refer to the same queue.
  pub fn same_channel(&self, other: &Channel) -> bool {
    Rc::ptr_eq(&self.queue, &other.queue)
  }
}

impl Display for Channel {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "[{}]",
      self.queue
          .borrow()
          .iter()
          .map(Value::to_string)
          .collect::<Vec<String>>()
          .join(", ")
    )
  }
}
