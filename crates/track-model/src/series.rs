//! Aligned per-sample series shared by every track.
//!
//! Raw series are written once at construction and never touched again.
//! All alignment work happens on the adjusted copies, so a track can be
//! re-aligned from its original capture data at any time.

use kinesync_common::clock::rebase_micros;
use serde::Serialize;

/// What the adjusted epoch series currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EpochBasis {
    /// Raw capture timestamps, in microseconds.
    RawMicros,
    /// Seconds relative to `reference_us`.
    SecondsSince { reference_us: i64 },
}

/// Time and position series of one track. Index `i` in every series refers
/// to the same sample instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSeries {
    epoch_us: Vec<i64>,
    vertical: Vec<f64>,
    horizontal: Vec<f64>,
    adjusted_epoch: Vec<f64>,
    adjusted_vertical: Vec<f64>,
    adjusted_horizontal: Vec<f64>,
    epoch_basis: EpochBasis,
}

impl TrackSeries {
    /// Build series from raw samples. Adjusted positions start zeroed at the
    /// first sample; the adjusted epoch starts as a copy of the raw epoch.
    pub fn new(
        epoch_us: Vec<i64>,
        vertical: Vec<f64>,
        horizontal: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        if epoch_us.is_empty() {
            return Err(SeriesError::Empty);
        }
        if vertical.len() != epoch_us.len() || horizontal.len() != epoch_us.len() {
            return Err(SeriesError::LengthMismatch {
                epoch: epoch_us.len(),
                vertical: vertical.len(),
                horizontal: horizontal.len(),
            });
        }
        if let Some(i) = epoch_us.windows(2).position(|w| w[1] < w[0]) {
            return Err(SeriesError::NonMonotonicEpoch { index: i + 1 });
        }

        let adjusted_vertical = zeroed(&vertical);
        let adjusted_horizontal = zeroed(&horizontal);
        let adjusted_epoch = epoch_us.iter().map(|&t| t as f64).collect();

        Ok(Self {
            epoch_us,
            vertical,
            horizontal,
            adjusted_epoch,
            adjusted_vertical,
            adjusted_horizontal,
            epoch_basis: EpochBasis::RawMicros,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.epoch_us.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epoch_us.is_empty()
    }

    /// Raw capture timestamps (microseconds).
    pub fn epoch_us(&self) -> &[i64] {
        &self.epoch_us
    }

    /// First raw capture timestamp.
    pub fn first_epoch_us(&self) -> i64 {
        self.epoch_us[0]
    }

    /// Raw vertical position (meters, up is positive).
    pub fn vertical(&self) -> &[f64] {
        &self.vertical
    }

    /// Raw horizontal position (meters).
    pub fn horizontal(&self) -> &[f64] {
        &self.horizontal
    }

    pub fn adjusted_epoch(&self) -> &[f64] {
        &self.adjusted_epoch
    }

    pub fn adjusted_vertical(&self) -> &[f64] {
        &self.adjusted_vertical
    }

    pub fn adjusted_horizontal(&self) -> &[f64] {
        &self.adjusted_horizontal
    }

    pub fn epoch_basis(&self) -> EpochBasis {
        self.epoch_basis
    }

    /// Recompute the adjusted epoch as seconds since `reference_us`.
    pub fn rebase_epoch(&mut self, reference_us: i64) {
        self.adjusted_epoch = self
            .epoch_us
            .iter()
            .map(|&t| rebase_micros(t, reference_us))
            .collect();
        self.epoch_basis = EpochBasis::SecondsSince { reference_us };
    }

    /// Add `amount` to every adjusted epoch sample, in the adjusted
    /// series' current unit.
    pub fn shift_epoch(&mut self, amount: f64) {
        shift(&mut self.adjusted_epoch, amount);
    }

    /// Add `amount` meters to every adjusted vertical sample.
    pub fn shift_vertical(&mut self, amount: f64) {
        shift(&mut self.adjusted_vertical, amount);
    }

    /// Add `amount` meters to every adjusted horizontal sample.
    pub fn shift_horizontal(&mut self, amount: f64) {
        shift(&mut self.adjusted_horizontal, amount);
    }

    /// Flatten jumps larger than `threshold` meters in both adjusted
    /// position series. Returns the number of samples replaced.
    pub fn suppress_jumps(&mut self, threshold: f64) -> usize {
        suppress_jumps(&mut self.adjusted_vertical, threshold)
            + suppress_jumps(&mut self.adjusted_horizontal, threshold)
    }

    /// Restore adjusted series to their post-construction state.
    pub fn reset_adjusted(&mut self) {
        self.adjusted_vertical = zeroed(&self.vertical);
        self.adjusted_horizontal = zeroed(&self.horizontal);
        self.adjusted_epoch = self.epoch_us.iter().map(|&t| t as f64).collect();
        self.epoch_basis = EpochBasis::RawMicros;
    }
}

/// Copy of `values` shifted so index 0 is zero.
pub fn zeroed(values: &[f64]) -> Vec<f64> {
    let first = values.first().copied().unwrap_or_default();
    values.iter().map(|v| v - first).collect()
}

fn shift(values: &mut [f64], amount: f64) {
    values.iter_mut().for_each(|v| *v += amount);
}

/// Walk `values` front to back; whenever a sample differs from its
/// predecessor by more than `threshold`, overwrite it with the predecessor.
///
/// The comparison uses the already-corrected predecessor, so after one pass
/// no adjacent pair differs by more than `threshold` and a second pass is a
/// no-op.
pub fn suppress_jumps(values: &mut [f64], threshold: f64) -> usize {
    let mut replaced = 0;
    for i in 1..values.len() {
        if (values[i - 1] - values[i]).abs() > threshold {
            values[i] = values[i - 1];
            replaced += 1;
        }
    }
    replaced
}

/// Errors raised when raw series cannot form a track.
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    #[error("Track has no samples")]
    Empty,

    #[error(
        "Series lengths differ: epoch={epoch}, vertical={vertical}, horizontal={horizontal}"
    )]
    LengthMismatch {
        epoch: usize,
        vertical: usize,
        horizontal: usize,
    },

    #[error("Epoch timestamps decrease at sample {index}")]
    NonMonotonicEpoch { index: usize },
}
