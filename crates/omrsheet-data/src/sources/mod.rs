//! Roster source implementations.
//!
//! This module contains adapters for workbook formats.

pub mod excel;

pub use excel::ExcelSource;

use crate::error::Result;
use crate::table::SheetTable;

/// Trait for multi-sheet sources of roster rows
pub trait RosterSource {
    /// List worksheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Read one worksheet as a table
    ///
    /// An `Err` here only affects this sheet; callers may continue with the
    /// remaining ones.
    fn read_sheet(&mut self, sheet: &str) -> Result<SheetTable>;
}
