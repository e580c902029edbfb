//! Time and amplitude alignment of an optical track onto an inertial one.
//!
//! Alignment runs in a fixed order:
//! 1. optional jump suppression on the optical track
//! 2. both tracks rebased to seconds since the optical recording's first
//!    sample
//! 3. optional amplitude registration: the optical vertical series is shifted
//!    so its first vertical peak matches the inertial first vertical peak,
//!    less the sensor-to-marker offset
//! 4. manual offsets applied to the optical track
//!
//! Every precondition is checked before the first mutation, so a failed
//! alignment leaves both tracks untouched. A successful run starts from the
//! zeroed raw series, so aligning the same pair again gives the same result.

use std::path::PathBuf;

use kinesync_common::clock::StartOffset;
use kinesync_common::config::AppConfig;
use kinesync_track_model::movement::{Movement, TrackKind};
use serde::Serialize;

use crate::track::{Track, TrackError};

/// What the aligner does, and with which constants.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentPlan {
    /// Suppress optical jumps larger than this many meters first.
    pub smooth_threshold_m: Option<f64>,

    /// Register the optical vertical amplitude on the inertial one.
    pub register_amplitude: bool,

    /// Vertical distance between the wearable sensor and the tracked marker
    /// (meters). Only used with amplitude registration.
    pub sensor_marker_offset_m: f64,

    pub manual_vertical_m: f64,
    pub manual_horizontal_m: f64,
    pub manual_time_shift_s: f64,
}

impl Default for AlignmentPlan {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl AlignmentPlan {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            smooth_threshold_m: config.optical.smooth_threshold_m,
            register_amplitude: config.alignment.register_amplitude,
            sensor_marker_offset_m: config.alignment.sensor_marker_offset_m,
            manual_vertical_m: config.alignment.manual_vertical_m,
            manual_horizontal_m: config.alignment.manual_horizontal_m,
            manual_time_shift_s: config.alignment.manual_time_shift_s,
        }
    }
}

/// Per-track facts recorded in an [`AlignmentReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    pub kind: TrackKind,
    pub path: PathBuf,
    pub movement: Movement,
    pub samples: usize,
    pub first_epoch_us: i64,
    pub vertical_peaks: usize,
    pub horizontal_peaks: usize,
}

impl TrackSummary {
    pub fn of(track: &impl Track) -> Self {
        Self {
            kind: track.kind(),
            path: track.path().to_path_buf(),
            movement: track.movement().clone(),
            samples: track.series().len(),
            first_epoch_us: track.series().first_epoch_us(),
            vertical_peaks: track.peaks().vertical.len(),
            horizontal_peaks: track.peaks().horizontal.len(),
        }
    }
}

/// Result of amplitude registration.
///
/// Registration is a heuristic: it assumes the first detected peak on each
/// track belongs to the same repetition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmplitudeRegistration {
    /// Inertial adjusted vertical value at its first vertical peak.
    pub reference_value_m: f64,
    pub sensor_marker_offset_m: f64,
    /// Constant added to the optical adjusted vertical series.
    pub vertical_shift_m: f64,
    pub best_effort: bool,
}

/// Summary of one alignment run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentReport {
    /// Instant both adjusted epochs are measured from (optical first sample).
    pub reference_epoch_us: i64,
    /// Inertial start minus optical start, in seconds.
    pub start_offset_s: f64,
    pub optical: TrackSummary,
    pub inertial: TrackSummary,
    pub smoothed_samples: usize,
    pub amplitude: Option<AmplitudeRegistration>,
    pub manual_vertical_m: f64,
    pub manual_horizontal_m: f64,
    pub manual_time_shift_s: f64,
    pub generated_at: String,
}

/// Runs an [`AlignmentPlan`] against a pair of tracks.
#[derive(Debug, Clone, Default)]
pub struct Aligner {
    plan: AlignmentPlan,
}

impl Aligner {
    pub fn new(plan: AlignmentPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &AlignmentPlan {
        &self.plan
    }

    /// Align `optical` onto `inertial`. Only the adjusted series change, and
    /// any earlier adjustment is discarded first.
    pub fn align<O: Track, I: Track>(
        &self,
        optical: &mut O,
        inertial: &mut I,
    ) -> Result<AlignmentReport, TrackError> {
        let plan = &self.plan;

        if plan.register_amplitude {
            optical.first_vertical_peak()?;
            inertial.first_vertical_peak()?;
        }

        optical.reset_adjustments();
        inertial.reset_adjustments();

        let reference_value = if plan.register_amplitude {
            let (_, value) = inertial.first_vertical_peak()?;
            Some(value)
        } else {
            None
        };

        let smoothed_samples = match plan.smooth_threshold_m {
            Some(threshold) => optical.smooth(threshold),
            None => 0,
        };

        let reference_us = optical.series().first_epoch_us();
        optical.set_adj_epoch(reference_us);
        inertial.set_adj_epoch(reference_us);

        let offset = StartOffset {
            reference_us,
            measured_us: inertial.series().first_epoch_us(),
        };
        if offset.exceeds_threshold_secs(1.0) {
            tracing::warn!(
                offset_s = offset.offset_secs(),
                "Recordings started more than a second apart"
            );
        }

        let amplitude = match reference_value {
            Some(reference_value_m) => {
                let vertical_shift_m =
                    optical.set_adj_vert(reference_value_m, plan.sensor_marker_offset_m)?;
                tracing::info!(
                    reference_value_m,
                    vertical_shift_m,
                    "Registered optical amplitude on first inertial peak (best effort)"
                );
                Some(AmplitudeRegistration {
                    reference_value_m,
                    sensor_marker_offset_m: plan.sensor_marker_offset_m,
                    vertical_shift_m,
                    best_effort: true,
                })
            }
            None => None,
        };

        optical.man_vert_adj(plan.manual_vertical_m);
        optical.man_horiz_adj(plan.manual_horizontal_m);
        optical.shift_epoch(plan.manual_time_shift_s);

        let report = AlignmentReport {
            reference_epoch_us: reference_us,
            start_offset_s: offset.offset_secs(),
            optical: TrackSummary::of(&*optical),
            inertial: TrackSummary::of(&*inertial),
            smoothed_samples,
            amplitude,
            manual_vertical_m: plan.manual_vertical_m,
            manual_horizontal_m: plan.manual_horizontal_m,
            manual_time_shift_s: plan.manual_time_shift_s,
            generated_at: chrono::Utc::now().to_rfc3339(),
        };

        tracing::info!(
            reference_epoch_us = reference_us,
            start_offset_s = report.start_offset_s,
            optical_samples = report.optical.samples,
            inertial_samples = report.inertial.samples,
            "Aligned tracks"
        );
        Ok(report)
    }
}

/// One adjusted sample, as exported for charting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedRow {
    pub track: TrackKind,
    pub seconds: f64,
    pub vertical_m: f64,
    pub horizontal_m: f64,
}

/// Adjusted samples of `track` in order.
pub fn aligned_rows(track: &impl Track) -> Vec<AlignedRow> {
    let series = track.series();
    series
        .adjusted_epoch()
        .iter()
        .zip(series.adjusted_vertical())
        .zip(series.adjusted_horizontal())
        .map(|((&seconds, &vertical_m), &horizontal_m)| AlignedRow {
            track: track.kind(),
            seconds,
            vertical_m,
            horizontal_m,
        })
        .collect()
}
