//! Pixel-to-meter calibration for video marker tracks.
//!
//! A movement is calibrated by measuring a body segment of known length in
//! the first frame. Only movements listed in a [`CalibrationTable`] have a
//! formula; the rest are reported as uncalibrated and left in pixels.

use std::collections::HashMap;

use kinesync_track_model::movement::Movement;
use kinesync_track_model::table::{Table, TableError};
use serde::Serialize;

/// X/Y column pair of one tracked marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerColumns {
    pub x: String,
    pub y: String,
}

impl MarkerColumns {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    /// Pixel position of the marker at `row`.
    fn position(&self, table: &Table, row: usize) -> Result<(f64, f64), CalibrationError> {
        let x = table.require(&self.x)?;
        let y = table.require(&self.y)?;
        match (x.get(row), y.get(row)) {
            (Some(&x), Some(&y)) => Ok((x, y)),
            _ => Err(CalibrationError::NoSamples),
        }
    }
}

/// How a movement's scale is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalibrationPolicy {
    /// The arm is straight in the first frame: the pixel distance from the
    /// shoulder marker to the hand marker spans the measured arm length.
    ArmLength {
        shoulder: MarkerColumns,
        hand: MarkerColumns,
    },
}

/// Whether a scale has physical meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationStatus {
    /// Scale converts pixels to meters.
    Calibrated,
    /// No formula for this movement; scale is 1 and values stay in pixels.
    Uncalibrated,
}

/// Meters-per-pixel scale of one optical track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Calibration {
    pub scale: f64,
    pub status: CalibrationStatus,
}

impl Calibration {
    /// Identity scale for movements without a formula.
    pub const UNCALIBRATED: Calibration = Calibration {
        scale: 1.0,
        status: CalibrationStatus::Uncalibrated,
    };

    pub fn is_calibrated(&self) -> bool {
        self.status == CalibrationStatus::Calibrated
    }
}

/// Calibration formulas per movement.
#[derive(Debug, Clone)]
pub struct CalibrationTable {
    policies: HashMap<Movement, CalibrationPolicy>,
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CalibrationTable {
    /// Only chest abduction has a formula so far.
    pub fn builtin() -> Self {
        let mut policies = HashMap::new();
        policies.insert(
            Movement::ChestAA,
            CalibrationPolicy::ArmLength {
                shoulder: MarkerColumns::new("Shoulder Green X", "Shoulder Green Y"),
                hand: MarkerColumns::new("Hand Pink X", "Hand Pink Y"),
            },
        );
        Self { policies }
    }

    /// Insert or replace the formula for `movement`.
    pub fn set(&mut self, movement: Movement, policy: CalibrationPolicy) {
        self.policies.insert(movement, policy);
    }

    pub fn policy(&self, movement: &Movement) -> Option<&CalibrationPolicy> {
        self.policies.get(movement)
    }

    /// Compute the scale for `movement` from the first row of `table`.
    pub fn calibrate(
        &self,
        movement: &Movement,
        table: &Table,
        arm_length_m: f64,
    ) -> Result<Calibration, CalibrationError> {
        let Some(policy) = self.policy(movement) else {
            tracing::warn!(
                %movement,
                "No calibration formula for movement; positions stay in pixels"
            );
            return Ok(Calibration::UNCALIBRATED);
        };

        match policy {
            CalibrationPolicy::ArmLength { shoulder, hand } => {
                if !(arm_length_m.is_finite() && arm_length_m > 0.0) {
                    return Err(CalibrationError::InvalidArmLength { arm_length_m });
                }
                let (sx, sy) = shoulder.position(table, 0)?;
                let (hx, hy) = hand.position(table, 0)?;
                let arm_px = (hx - sx).hypot(hy - sy);
                if !(arm_px.is_finite() && arm_px > 0.0) {
                    return Err(CalibrationError::DegenerateReference { distance_px: arm_px });
                }

                let scale = arm_length_m / arm_px;
                tracing::debug!(%movement, arm_px, scale, "Calibrated arm length");
                Ok(Calibration {
                    scale,
                    status: CalibrationStatus::Calibrated,
                })
            }
        }
    }
}

/// Errors raised while calibrating a track.
#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Calibration needs at least one sample")]
    NoSamples,

    #[error("Arm length must be positive, got {arm_length_m} m")]
    InvalidArmLength { arm_length_m: f64 },

    #[error("Reference markers are {distance_px} px apart; cannot derive a scale")]
    DegenerateReference { distance_px: f64 },
}
