//! Workbook roster source using calamine.
//!
//! Any format calamine can detect (xlsx, xlsm, xlsb, xls, ods) is accepted.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use omrsheet_core::CellValue;
use tracing::debug;

use crate::error::{DataError, Result};
use crate::sources::RosterSource;
use crate::table::SheetTable;

/// Workbook roster source, held in memory
pub struct ExcelSource {
    workbook: Sheets<Cursor<Vec<u8>>>,
    /// Sheet names cache
    sheet_names: Vec<String>,
}

impl ExcelSource {
    /// Open a workbook file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes).map_err(|e| match e {
            DataError::WorkbookOpen(reason) => {
                DataError::WorkbookOpen(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })
    }

    /// Open a workbook from uploaded bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| DataError::WorkbookOpen(e.to_string()))?;
        let sheet_names = workbook.sheet_names();
        debug!(sheets = sheet_names.len(), "Opened workbook");

        Ok(Self {
            workbook,
            sheet_names,
        })
    }

    /// Convert a calamine cell to a roster cell
    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::Error(e) => CellValue::Text(e.to_string()),
            Data::DateTime(dt) => CellValue::Text(format!("{}", dt)),
            Data::DateTimeIso(s) => CellValue::Text(s.clone()),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }
}

impl RosterSource for ExcelSource {
    fn sheet_names(&self) -> Vec<String> {
        self.sheet_names.clone()
    }

    fn read_sheet(&mut self, sheet: &str) -> Result<SheetTable> {
        if !self.sheet_names.iter().any(|name| name == sheet) {
            return Err(DataError::SheetNotFound(sheet.to_string()));
        }

        let range = self
            .workbook
            .worksheet_range(sheet)
            .map_err(|e| DataError::SheetUnreadable {
                sheet: sheet.to_string(),
                reason: e.to_string(),
            })?;

        // The used range may not begin on the first worksheet row
        let header_row = range.start().map_or(1, |(row, _)| row as usize + 1);
        let rows = range
            .rows()
            .map(|row| row.iter().map(Self::convert_cell).collect::<Vec<_>>());
        Ok(SheetTable::from_rows_at(sheet, header_row, rows))
    }
}
