//! Column resolution
//!
//! Maps a worksheet's header row onto the five canonical roster fields.
//! Resolution depends only on the headers, so it runs once per worksheet.

use serde::Serialize;

use crate::normalize::{normalize_column_name, CellValue};

/// A canonical roster field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    SchoolName,
    Class,
    Division,
    RollNo,
    StudentName,
}

impl Field {
    /// All fields, in reporting order
    pub const ALL: [Field; 5] = [
        Field::SchoolName,
        Field::Class,
        Field::Division,
        Field::RollNo,
        Field::StudentName,
    ];

    /// Stable name used in messages and reports
    pub fn key(self) -> &'static str {
        match self {
            Field::SchoolName => "school_name",
            Field::Class => "class",
            Field::Division => "division",
            Field::RollNo => "roll_no",
            Field::StudentName => "student_name",
        }
    }

    /// Header aliases, already in normalized form
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::SchoolName => &["schoolname", "scoolname", "school"],
            Field::Class => &["class", "grade", "standard"],
            Field::Division => &["division", "section"],
            Field::RollNo => &["rollno", "rollnumber"],
            Field::StudentName => &["nameofthestudent", "name", "studentname"],
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.key())
    }
}

/// How a normalized header is compared against an alias
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Header equals the alias
    Exact,
    /// Header contains the alias
    Substring,
}

impl MatchStrategy {
    /// Strategies in the order they are tried
    pub const CHAIN: [MatchStrategy; 2] = [MatchStrategy::Exact, MatchStrategy::Substring];

    fn matches(self, header: &str, alias: &str) -> bool {
        match self {
            MatchStrategy::Exact => header == alias,
            MatchStrategy::Substring => header.contains(alias),
        }
    }

    /// First header (in sheet order) matching any alias under this strategy
    fn find(self, normalized: &[String], aliases: &[&str]) -> Option<usize> {
        normalized
            .iter()
            .position(|header| aliases.iter().any(|alias| self.matches(header, alias)))
    }
}

/// A header bound to a canonical field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    /// Zero-based column position in the row
    pub index: usize,
    /// Header text as written in the sheet
    pub header: String,
    /// Whether the header matched exactly or by substring
    #[serde(skip)]
    pub strategy: MatchStrategy,
}

/// Mapping from canonical fields to worksheet columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: [Option<ResolvedColumn>; 5],
}

impl ColumnMap {
    /// Resolve the canonical fields against a header row
    ///
    /// For each field, the exact pass runs over all headers before the
    /// substring pass, so an exact alias always beats a header that merely
    /// contains one.
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Self {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| normalize_column_name(h.as_ref()))
            .collect();

        let mut map = ColumnMap::default();
        for field in Field::ALL {
            map.columns[field.index()] = MatchStrategy::CHAIN.iter().find_map(|strategy| {
                strategy
                    .find(&normalized, field.aliases())
                    .map(|index| ResolvedColumn {
                        index,
                        header: headers[index].as_ref().to_string(),
                        strategy: *strategy,
                    })
            });
        }
        map
    }

    /// The column bound to a field, if any
    pub fn get(&self, field: Field) -> Option<&ResolvedColumn> {
        self.columns[field.index()].as_ref()
    }

    /// Fields with no matching column
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }

    /// The cell for a field in a row, `Empty` when the field is unresolved
    pub fn value<'a>(&self, field: Field, row: &'a [CellValue]) -> &'a CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.get(field)
            .and_then(|col| row.get(col.index))
            .unwrap_or(EMPTY)
    }
}
