//! Cell addressing, values and sparse storage
//!
//! - [`CellAddress`] / [`CellRange`] - A1-style coordinates
//! - [`CellValue`] - what a cell holds
//! - [`CellData`] - value plus style index, as stored

mod address;
mod storage;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIter};
pub use storage::{CellData, CellStorage};
pub use value::{CellError, CellValue};
