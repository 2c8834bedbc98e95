//! Sheet tracks and their calibration tables
//!
//! Two physical answer-sheet layouts exist. Each has its own background
//! template and its own set of bubble coordinates, measured against the
//! scanned template in centimetres.
//!
//! The constants below are matched to printed templates. Changing any of
//! them, including the odd horizontal divisor and the per-track nudges,
//! moves the bubbles off the printed circles.

use serde::{Deserialize, Serialize};

/// Bump when any calibration value changes
pub const CALIBRATION_VERSION: u32 = 1;

/// PDF points per centimetre
pub const CM: f64 = 72.0 / 2.54;

/// Horizontal calibration values are authored at a different scale than
/// the page; x coordinates are divided by this after conversion to points.
pub const X_SCALE_DIVISOR: f64 = 2.2;

/// Class levels printed on the child layout
pub const CHILD_LEVELS: [u32; 3] = [1, 2, 3];

/// Which sheet layout a student receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    /// Classes 1 to 3
    Child,
    /// Every other class, including unknown ones
    Master,
}

impl Track {
    /// Both tracks
    pub const ALL: [Track; 2] = [Track::Child, Track::Master];

    /// Select the track for a parsed class level
    pub fn for_class_level(level: Option<u32>) -> Self {
        match level {
            Some(level) if CHILD_LEVELS.contains(&level) => Track::Child,
            _ => Track::Master,
        }
    }

    /// The calibration table for this track
    pub fn calibration(self) -> &'static Calibration {
        match self {
            Track::Child => &CHILD_CALIBRATION,
            Track::Master => &MASTER_CALIBRATION,
        }
    }

    /// Lowercase track name
    pub fn name(self) -> &'static str {
        match self {
            Track::Child => "child",
            Track::Master => "master",
        }
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Geometric constants for one track, in centimetres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Horizontal position of each roll digit column
    pub roll_x: [f64; 3],
    /// Vertical position of the "0" row for each digit column
    pub bubble_y_top: [f64; 3],
    /// Distance between consecutive digit rows
    pub bubble_spacing: f64,
    /// Radius of a filled bubble
    pub bubble_radius: f64,
    /// Fixed drop from the top row to the first bubble centre
    pub bubble_drop: f64,
    /// Per-track correction added to bubble centres
    pub bubble_nudge: f64,
    /// Drop from the top row to the digit label baseline
    pub label_drop: f64,
}

const MASTER_CALIBRATION: Calibration = Calibration {
    roll_x: [10.1, 11.5, 12.9],
    bubble_y_top: [22.0, 22.0, 22.0],
    bubble_spacing: 0.62,
    bubble_radius: 0.24,
    bubble_drop: 2.6,
    bubble_nudge: 0.03,
    label_drop: 2.1,
};

// The child template is offset against the master scan
const CHILD_SHIFT_X: f64 = 6.0;
const CHILD_SHIFT_Y: f64 = -0.3;

const CHILD_CALIBRATION: Calibration = Calibration {
    roll_x: [9.9 + CHILD_SHIFT_X, 11.3 + CHILD_SHIFT_X, 12.6 + CHILD_SHIFT_X],
    bubble_y_top: [
        21.5 + CHILD_SHIFT_Y,
        21.5 + CHILD_SHIFT_Y,
        21.5 + CHILD_SHIFT_Y,
    ],
    bubble_spacing: 0.61,
    bubble_radius: 0.23,
    bubble_drop: 2.6,
    bubble_nudge: 0.2,
    label_drop: 2.0,
};
