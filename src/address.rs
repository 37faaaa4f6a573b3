//! A resolved memory address. Raw parameters are signed words; an `Address` only exists once
//! a parameter has been checked to be non-negative, so memory itself never sees a negative
//! index.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::ops::Add;

use crate::bytecode::Value;
use crate::error::VmError;

// `AddressNumberType` is `usize`, as it is naturally an index into a memory store.
pub type AddressNumberType = usize;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct Address(AddressNumberType);

impl Address {
  pub fn new(idx: AddressNumberType) -> Address {
    Address(idx)
  }

  /// Converts the address to an index into the memory vector.
  pub fn idx(&self) -> AddressNumberType {
    self.0
  }

  /**
    Interprets a raw word as an absolute address (position mode). Negative words are
    `NegativeAddress`; positive words that do not fit an `AddressNumberType`, which only
    happens on targets narrower than 64 bits, are `AddressOutOfRange`.
  */
  pub fn from_value(value: Value) -> Result<Address, VmError> {
    match AddressNumberType::try_from(value) {
      Ok(idx)               => Ok(Address(idx)),
      Err(_) if value < 0   => Err(VmError::NegativeAddress(value)),
      Err(_)                => Err(VmError::AddressOutOfRange(value)),
    }
  }

  /// Interprets a raw word as an offset from `relative_base` (relative mode).
  pub fn from_relative(relative_base: Value, offset: Value) -> Result<Address, VmError> {
    match relative_base.checked_add(offset) {
      Some(value)         => Address::from_value(value),
      // The sum overflows in the direction of the offset.
      None if offset < 0  => Err(VmError::NegativeAddress(relative_base.saturating_add(offset))),
      None                => Err(VmError::AddressOutOfRange(relative_base.saturating_add(offset))),
    }
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "MEM[{}]", self.0)
  }
}

// Increment an address
impl Add<AddressNumberType> for Address {
  type Output = Address;
  fn add(self, rhs: AddressNumberType) -> Address {
    Address(self.0 + rhs)
  }
}
