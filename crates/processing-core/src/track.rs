//! The contract both capture systems' tracks share.
//!
//! A track is loaded, reduced to vertical/horizontal displacement in meters,
//! zeroed at its first sample, and scanned for repetition peaks. After that
//! only its adjusted series change, through the methods on [`Track`].

use std::path::Path;

use kinesync_track_model::columns::ColumnError;
use kinesync_track_model::file_info::FileNameError;
use kinesync_track_model::movement::{Movement, Speed, TrackKind};
use kinesync_track_model::series::{SeriesError, TrackSeries};
use kinesync_track_model::table::TableError;

use crate::calibration::CalibrationError;
use crate::peaks::{PeakError, PeakPolicy, PeakSet};

/// Position axis of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionAxis {
    Vertical,
    Horizontal,
}

impl std::fmt::Display for PositionAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
        })
    }
}

pub trait Track {
    fn kind(&self) -> TrackKind;

    /// Source file the track was loaded from.
    fn path(&self) -> &Path;

    fn movement(&self) -> &Movement;

    /// Trial speed from the file name, if it carried one.
    fn speed(&self) -> Option<Speed>;

    fn series(&self) -> &TrackSeries;

    fn series_mut(&mut self) -> &mut TrackSeries;

    fn peaks(&self) -> &PeakSet;

    fn peaks_mut(&mut self) -> &mut PeakSet;

    /// Replace the peak set with a fresh detection on the current adjusted
    /// series.
    fn redetect_peaks(&mut self, policy: &PeakPolicy) -> Result<(), TrackError> {
        let series = self.series();
        let peaks = policy.detect(
            self.movement(),
            self.speed(),
            self.kind(),
            series.adjusted_vertical(),
            series.adjusted_horizontal(),
        )?;
        tracing::debug!(
            track = %self.kind(),
            vertical = peaks.vertical.len(),
            horizontal = peaks.horizontal.len(),
            "Re-detected peaks"
        );
        *self.peaks_mut() = peaks;
        Ok(())
    }

    /// Drop every adjustment, returning to the zeroed raw series.
    fn reset_adjustments(&mut self) {
        self.series_mut().reset_adjusted();
    }

    /// Rebase the adjusted epoch to seconds since `reference_us`.
    fn set_adj_epoch(&mut self, reference_us: i64) {
        self.series_mut().rebase_epoch(reference_us);
    }

    /// Add a constant to the adjusted vertical series (meters).
    fn man_vert_adj(&mut self, amount: f64) {
        self.series_mut().shift_vertical(amount);
    }

    /// Add a constant to the adjusted horizontal series (meters).
    fn man_horiz_adj(&mut self, amount: f64) {
        self.series_mut().shift_horizontal(amount);
    }

    /// Add a constant to the adjusted epoch (seconds, once rebased).
    fn shift_epoch(&mut self, seconds: f64) {
        self.series_mut().shift_epoch(seconds);
    }

    /// Flatten jumps above `threshold` meters in the adjusted positions.
    /// Returns how many samples were replaced.
    fn smooth(&mut self, threshold: f64) -> usize {
        let replaced = self.series_mut().suppress_jumps(threshold);
        if replaced > 0 {
            tracing::debug!(
                track = %self.kind(),
                replaced,
                threshold,
                "Suppressed position jumps"
            );
        }
        replaced
    }

    /// Index and adjusted value of the first vertical peak.
    fn first_vertical_peak(&self) -> Result<(usize, f64), TrackError> {
        let index = self
            .peaks()
            .vertical
            .first()
            .copied()
            .ok_or(TrackError::NoPeaksDetected {
                track: self.kind(),
                axis: PositionAxis::Vertical,
            })?;
        Ok((index, self.series().adjusted_vertical()[index]))
    }

    /// Shift the adjusted vertical series so the first vertical peak lands
    /// on `reference_value - extra_offset`. Returns the shift applied.
    fn set_adj_vert(&mut self, reference_value: f64, extra_offset: f64) -> Result<f64, TrackError> {
        let (_, peak_value) = self.first_vertical_peak()?;
        let delta = reference_value - extra_offset - peak_value;
        self.series_mut().shift_vertical(delta);
        Ok(delta)
    }
}

/// Convert a timestamp column to whole microseconds.
pub(crate) fn epoch_micros(values: &[f64]) -> Result<Vec<i64>, TrackError> {
    values
        .iter()
        .enumerate()
        .map(|(index, &v)| {
            if v.is_finite() {
                Ok(v.round() as i64)
            } else {
                Err(TrackError::InvalidTimestamp { index })
            }
        })
        .collect()
}

/// Errors raised while building or adjusting a track.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Column(#[from] ColumnError),

    #[error(transparent)]
    FileName(#[from] FileNameError),

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error(transparent)]
    Peaks(#[from] PeakError),

    #[error("Movement '{movement}' has no calibration formula")]
    UnsupportedMovement { movement: Movement },

    #[error("Timestamp at sample {index} is not a finite number")]
    InvalidTimestamp { index: usize },

    #[error("No {axis} peaks detected on the {track} track")]
    NoPeaksDetected { track: TrackKind, axis: PositionAxis },
}
