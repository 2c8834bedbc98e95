//! Normalized student records

use serde::Serialize;

use crate::columns::{ColumnMap, Field};
use crate::normalize::{format_roll_value, parse_class_value, CellValue};
use crate::track::Track;

/// One roster row, normalized and classified
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub student_name: String,
    pub school_name: String,
    /// Class as written in the sheet
    pub class_label: String,
    pub division: String,
    /// Always exactly three characters
    pub roll_no: String,
    /// Parsed class level, `None` when unrecognized
    pub class_level: Option<u32>,
    pub track: Track,
}

impl StudentRecord {
    /// Build a record from a data row using a resolved column map
    pub fn from_row(columns: &ColumnMap, row: &[CellValue]) -> Self {
        let class = columns.value(Field::Class, row);
        let class_level = parse_class_value(class);

        Self {
            student_name: columns.value(Field::StudentName, row).display(),
            school_name: columns.value(Field::SchoolName, row).display(),
            class_label: class.display(),
            division: columns.value(Field::Division, row).display(),
            roll_no: format_roll_value(columns.value(Field::RollNo, row)),
            class_level,
            track: Track::for_class_level(class_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_record() {
        let columns = ColumnMap::resolve(&["Class", "Roll No", "Student Name"]);
        let row = vec![
            CellValue::from("II"),
            CellValue::from("5"),
            CellValue::from("Asha"),
        ];

        let record = StudentRecord::from_row(&columns, &row);
        assert_eq!(record.roll_no, "005");
        assert_eq!(record.class_level, Some(2));
        assert_eq!(record.track, Track::Child);
        assert_eq!(record.class_label, "II");
        assert_eq!(record.school_name, "");
    }

    #[test]
    fn test_missing_class_column_routes_to_master() {
        let columns = ColumnMap::resolve(&["Name", "Roll Number"]);
        let row = vec![CellValue::from("Ravi"), CellValue::Float(17.0)];

        let record = StudentRecord::from_row(&columns, &row);
        assert_eq!(record.track, Track::Master);
        assert_eq!(record.class_level, None);
        assert_eq!(record.class_label, "");
        assert_eq!(record.roll_no, "017");
    }

    #[test]
    fn test_unparseable_class_routes_to_master() {
        let columns = ColumnMap::resolve(&["Grade"]);
        let record = StudentRecord::from_row(&columns, &[CellValue::from("LKG")]);
        assert_eq!(record.track, Track::Master);
        assert_eq!(record.roll_no, "000");
    }
}
