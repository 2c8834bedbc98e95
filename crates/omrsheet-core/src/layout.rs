//! Roll number bubble layout
//!
//! Turns a three-character roll number and a calibration table into the
//! marks drawn on the page. All coordinates are PDF points with the origin
//! at the bottom-left corner of the page.

use serde::Serialize;

use crate::normalize::ROLL_WIDTH;
use crate::track::{Calibration, CM, X_SCALE_DIVISOR};

/// A point on the page, in PDF points from the bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A filled bubble
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BubbleMark {
    /// Digit column (0 = hundreds)
    pub column: usize,
    /// Digit value, which selects the bubble row
    pub digit: u8,
    /// Bubble centre
    pub center: Point,
    /// Bubble radius in points
    pub radius: f64,
}

/// A digit printed above its bubble column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DigitLabel {
    /// Digit column (0 = hundreds)
    pub column: usize,
    /// The character printed
    pub glyph: char,
    /// Baseline centre of the glyph
    pub anchor: Point,
}

/// Everything drawn for one roll number
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RollLayout {
    pub bubbles: Vec<BubbleMark>,
    pub labels: Vec<DigitLabel>,
}

/// Compute bubble and label positions for a roll number
///
/// Only the first three characters are used. Non-digit characters get a
/// label but no bubble.
pub fn layout_roll(roll_no: &str, calibration: &Calibration) -> RollLayout {
    let mut layout = RollLayout::default();
    let label_y = label_baseline(calibration);

    for (column, glyph) in roll_no.chars().take(ROLL_WIDTH).enumerate() {
        let x = column_x(calibration, column);

        if let Some(digit) = glyph.to_digit(10) {
            layout.bubbles.push(BubbleMark {
                column,
                digit: digit as u8,
                center: Point {
                    x,
                    y: bubble_y(calibration, column, digit),
                },
                radius: calibration.bubble_radius * CM,
            });
        }

        layout.labels.push(DigitLabel {
            column,
            glyph,
            anchor: Point { x, y: label_y },
        });
    }

    layout
}

fn column_x(calibration: &Calibration, column: usize) -> f64 {
    (calibration.roll_x[column] * CM) / X_SCALE_DIVISOR
}

fn bubble_y(calibration: &Calibration, column: usize, digit: u32) -> f64 {
    calibration.bubble_y_top[column] * CM - f64::from(digit) * calibration.bubble_spacing * CM
        - (calibration.bubble_drop * CM)
        + calibration.bubble_nudge * CM
}

fn label_baseline(calibration: &Calibration) -> f64 {
    calibration.bubble_y_top[0] * CM - (calibration.label_drop * CM)
}
