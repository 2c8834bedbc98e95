//! # omrsheet-data
//!
//! Roster workbook reading for omrsheet: decode every worksheet of an
//! uploaded workbook into a header row plus data rows of raw cell values.
//!
//! ## Example
//!
//! ```rust,ignore
//! use omrsheet_data::{ExcelSource, RosterSource};
//!
//! let mut source = ExcelSource::open("roster.xlsx")?;
//! for name in source.sheet_names() {
//!     let table = source.read_sheet(&name)?;
//!     println!("{}: {} students", table.name, table.len());
//! }
//! ```

pub mod error;
pub mod sources;
pub mod table;

// Re-exports
pub use error::{DataError, Result};
pub use sources::{ExcelSource, RosterSource};
pub use table::{SheetRow, SheetTable};
