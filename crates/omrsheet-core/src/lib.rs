//! omrsheet-core - roster normalization and OMR bubble layout
//!
//! Pure logic shared by the omrsheet tools: turning raw roster cells into
//! student records, choosing a sheet layout, and computing where the roll
//! number bubbles go.
//!
//! # Example
//!
//! ```
//! use omrsheet_core::{layout_roll, ColumnMap, CellValue, StudentRecord, Track};
//!
//! let columns = ColumnMap::resolve(&["Class", "Roll No", "Student Name"]);
//! let row = vec![CellValue::from("III"), CellValue::from(7.0), CellValue::from("Asha")];
//!
//! let record = StudentRecord::from_row(&columns, &row);
//! assert_eq!(record.roll_no, "007");
//! assert_eq!(record.track, Track::Child);
//!
//! let layout = layout_roll(&record.roll_no, record.track.calibration());
//! assert_eq!(layout.bubbles.len(), 3);
//! ```

pub mod columns;
pub mod diagnostics;
pub mod layout;
pub mod normalize;
pub mod record;
pub mod track;

// Re-export main types and functions
pub use columns::{ColumnMap, Field, MatchStrategy, ResolvedColumn};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use layout::{layout_roll, BubbleMark, DigitLabel, Point, RollLayout};
pub use normalize::{
    format_roll_value, normalize_column_name, parse_class_value, safe_filename, CellValue,
};
pub use record::StudentRecord;
pub use track::{Calibration, Track, CALIBRATION_VERSION, CM};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
