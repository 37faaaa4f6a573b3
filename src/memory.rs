//! The memory store of an engine. The loaded image lives in a contiguous vector; cells
//! written past its end live in a sparse map, so a program may address any cell an
//! `Address` can name without the store allocating everything in between. Every cell that
//! has not been written reads as zero. Negative addresses are unrepresentable here; they
//! are rejected when an `Address` is built.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use prettytable::Table;

use crate::address::{Address, AddressNumberType};
use crate::bytecode::Value;
use crate::TABLE_DISPLAY_FORMAT;

#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Memory {
  cells : Vec<Value>,                            // The image, at `0..cells.len()`
  sparse: BTreeMap<AddressNumberType, Value>,    // Cells written past the image
}

impl Memory {

  /// Loads a copy of a program image at addresses `0..image.len()`.
  pub fn new(image: &[Value]) -> Memory {
    Memory{ cells: image.to_vec(), sparse: BTreeMap::new() }
  }

  /// Reads a word. Addresses that were never written read as zero.
  pub fn read(&self, address: Address) -> Value {
    match self.cells.get(address.idx()) {
      Some(value) => *value,
      None        => self.sparse.get(&address.idx()).copied().unwrap_or(0)
    }
  }

  /**
    Writes a word. Inside the image the write lands in the vector; past it, the cell is
    kept in the sparse map, however far out it is.
  */
  pub fn write(&mut self, address: Address, value: Value) {
    match self.cells.get_mut(address.idx()) {
      Some(cell) => *cell = value,
      None       => {
        self.sparse.insert(address.idx(), value);
      }
    }
  }

  /// Number of cells holding a value: the image plus every cell written past it.
  pub fn len(&self) -> usize {
    self.cells.len() + self.sparse.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty() && self.sparse.is_empty()
  }

  /// The image cells as a snapshot, starting at address 0.
  pub fn as_slice(&self) -> &[Value] {
    &self.cells
  }

  /// Cells written past the end of the image, in address order.
  pub fn sparse_cells(&self) -> impl Iterator<Item = (Address, Value)> + '_ {
    self.sparse.iter().map(|(idx, value)| (Address::new(*idx), *value))
  }

  /// Builds a two column table of the image followed by the sparse cells, marking the cell
  /// at `highlight`.
  pub fn make_table(&self, highlight: Option<Address>) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    let dense = self.cells.iter().enumerate().map(|(i, value)| (Address::new(i), *value));
    for (address, value) in dense.chain(self.sparse_cells()) {
      match highlight == Some(address) {

        true  => {
          table.add_row(row![r->format!("* --> {} =", address), value]);
        }

        false => {
          table.add_row(row![r->format!("{} =", address), value]);
        }

      } // end match on highlight
    } // end for
    table
  }
}

impl Display for Memory {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.make_table(None))
  }
}
