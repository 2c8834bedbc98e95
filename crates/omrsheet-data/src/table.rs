//! In-memory worksheet tables.

use omrsheet_core::CellValue;

/// A data row with its position in the worksheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    /// 1-based worksheet row number, as shown by spreadsheet applications
    pub number: usize,
    pub cells: Vec<CellValue>,
}

/// One worksheet read as a header row plus data rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    /// Worksheet name as stored in the workbook
    pub name: String,
    /// Header text, one entry per column
    pub headers: Vec<String>,
    /// Data rows in sheet order; rows with no values are dropped
    pub rows: Vec<SheetRow>,
}

impl SheetTable {
    /// Build a table from raw rows, taking the first row as the header
    ///
    /// The header is assumed to sit on worksheet row 1.
    pub fn from_rows<I>(name: impl Into<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<CellValue>>,
    {
        Self::from_rows_at(name, 1, rows)
    }

    /// Build a table whose header sits on worksheet row `header_row`
    pub fn from_rows_at<I>(name: impl Into<String>, header_row: usize, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<CellValue>>,
    {
        let mut rows = rows.into_iter();
        let headers = rows
            .next()
            .map(|header| header.iter().map(CellValue::display).collect())
            .unwrap_or_default();

        Self {
            name: name.into(),
            headers,
            rows: rows
                .enumerate()
                .filter(|(_, cells)| !cells.iter().all(CellValue::is_blank))
                .map(|(offset, cells)| SheetRow {
                    number: header_row + offset + 1,
                    cells,
                })
                .collect(),
        }
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the sheet has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_splits_header() {
        let table = SheetTable::from_rows(
            "Class 1",
            vec![
                vec![CellValue::from("Name"), CellValue::Float(2024.0)],
                vec![CellValue::from("Asha"), CellValue::Float(5.0)],
            ],
        );

        assert_eq!(table.name, "Class 1");
        assert_eq!(table.headers, vec!["Name", "2024"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_blank_rows_dropped() {
        let table = SheetTable::from_rows(
            "S",
            vec![
                vec![CellValue::from("Name")],
                vec![CellValue::Empty],
                vec![CellValue::from("   ")],
                vec![CellValue::from("Ravi")],
            ],
        );
        assert_eq!(
            table.rows,
            vec![SheetRow {
                number: 4,
                cells: vec![CellValue::from("Ravi")]
            }]
        );
    }

    #[test]
    fn test_row_numbers_follow_header_position() {
        let table = SheetTable::from_rows_at(
            "S",
            3,
            vec![
                vec![CellValue::from("Name")],
                vec![CellValue::from("Asha")],
                vec![CellValue::Empty],
                vec![CellValue::from("Ravi")],
            ],
        );
        let numbers: Vec<usize> = table.rows.iter().map(|row| row.number).collect();
        assert_eq!(numbers, vec![4, 6]);
    }

    #[test]
    fn test_empty_sheet() {
        let table = SheetTable::from_rows("Empty", Vec::new());
        assert!(table.headers.is_empty());
        assert!(table.is_empty());
    }
}
