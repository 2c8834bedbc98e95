//! Value normalizers
//!
//! Pure functions that turn raw spreadsheet cell values into the canonical
//! forms used by the rest of the pipeline.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Width of a roll number on the sheet (one bubble column per digit)
pub const ROLL_WIDTH: usize = 3;

/// Maximum length of a generated file stem
pub const MAX_FILENAME_LEN: usize = 200;

/// A raw cell value as decoded from a worksheet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// No value
    #[default]
    Empty,
    /// Boolean cell
    Bool(bool),
    /// Integer cell
    Int(i64),
    /// Floating point cell (spreadsheets store most numbers this way)
    Float(f64),
    /// Text cell, or any value rendered as text (dates, errors)
    Text(String),
}

impl CellValue {
    /// True for empty cells and whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Numeric interpretation of the value, accepting float-like text
    pub fn as_number(&self) -> Option<f64> {
        let number = match self {
            CellValue::Empty => return None,
            CellValue::Bool(b) => f64::from(u8::from(*b)),
            CellValue::Int(i) => *i as f64,
            CellValue::Float(f) => *f,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        number.is_finite().then_some(number)
    }

    /// Text shown on the sheet for this value
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => {
                // Integral floats read as integers ("3", not "3.0")
                if f.fract() == 0.0 && f.is_finite() {
                    format!("{:.0}", f)
                } else {
                    f.to_string()
                }
            }
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

/// Normalize a column header for comparison: lowercase, trimmed, `[a-z0-9]` only
pub fn normalize_column_name(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Format a roll number cell as exactly three characters
///
/// Numeric values (including float-like text such as `"7.0"`) are truncated
/// to an integer and zero-padded. Anything else is padded and cut to three
/// characters, which is lossy: `"abcd"` becomes `"abc"`.
pub fn format_roll_value(value: &CellValue) -> String {
    if value.is_blank() {
        return "0".repeat(ROLL_WIDTH);
    }

    let text = match value.as_number() {
        Some(n) if n.abs() < i64::MAX as f64 => (n.trunc() as i64).to_string(),
        _ => value.display(),
    };

    zero_pad(&text, ROLL_WIDTH)
        .chars()
        .take(ROLL_WIDTH)
        .collect()
}

/// Left-pad with zeros to `width` characters, keeping a leading sign first
fn zero_pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.to_string();
    }

    let zeros = "0".repeat(width - len);
    match s.strip_prefix(['+', '-']) {
        Some(rest) => format!("{}{}{}", &s[..1], zeros, rest),
        None => format!("{}{}", zeros, s),
    }
}

/// A strategy that tries to read a class level from trimmed, lowercase text
type ClassMatcher = fn(&str) -> Option<u32>;

/// Class level strategies, tried in order; the first success wins
const CLASS_MATCHERS: [ClassMatcher; 4] = [whole_numeral, first_digit_run, roman_numeral, ordinal_word];

const ROMAN_NUMERALS: [(&str, u32); 12] = [
    ("i", 1),
    ("ii", 2),
    ("iii", 3),
    ("iv", 4),
    ("v", 5),
    ("vi", 6),
    ("vii", 7),
    ("viii", 8),
    ("ix", 9),
    ("x", 10),
    ("xi", 11),
    ("xii", 12),
];

const ORDINAL_WORDS: [(&str, u32); 12] = [
    ("first", 1),
    ("second", 2),
    ("third", 3),
    ("fourth", 4),
    ("fifth", 5),
    ("sixth", 6),
    ("seventh", 7),
    ("eighth", 8),
    ("ninth", 9),
    ("tenth", 10),
    ("eleventh", 11),
    ("twelfth", 12),
];

/// Parse a class level from a cell
///
/// Accepts plain numerals (`"3"`), text containing a number (`"Class 3-A"`),
/// Roman numerals (`"III"`) and ordinal words (`"third"`). Returns `None`
/// when nothing matches, which is distinct from level 0.
pub fn parse_class_value(value: &CellValue) -> Option<u32> {
    if matches!(value, CellValue::Empty) {
        return None;
    }

    let text = value.display().trim().to_lowercase();
    CLASS_MATCHERS.iter().find_map(|matcher| matcher(&text))
}

fn whole_numeral(s: &str) -> Option<u32> {
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

fn first_digit_run(s: &str) -> Option<u32> {
    static DIGITS_RE: OnceLock<Regex> = OnceLock::new();
    let re = DIGITS_RE.get_or_init(|| Regex::new(r"[0-9]+").unwrap());
    re.find(s).and_then(|m| m.as_str().parse().ok())
}

fn roman_numeral(s: &str) -> Option<u32> {
    lookup(&ROMAN_NUMERALS, s)
}

fn ordinal_word(s: &str) -> Option<u32> {
    lookup(&ORDINAL_WORDS, s)
}

fn lookup(table: &[(&str, u32)], key: &str) -> Option<u32> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, level)| *level)
}

/// Make a string safe to use as a file name inside the output archive
///
/// Path and shell-hostile characters become `_`, whitespace runs collapse to
/// a single `_`, and the result is cut to 200 characters.
pub fn safe_filename(s: &str) -> String {
    static WS_RE: OnceLock<Regex> = OnceLock::new();
    let ws = WS_RE.get_or_init(|| Regex::new(r"\s+").unwrap());

    let replaced: String = s
        .trim()
        .chars()
        .map(|c| match c {
            '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect();

    ws.replace_all(&replaced, "_")
        .chars()
        .take(MAX_FILENAME_LEN)
        .collect()
}
