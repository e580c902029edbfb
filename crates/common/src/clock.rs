//! Clock and timing utilities for recording synchronization.
//!
//! Both recording devices stamp samples with absolute epoch timestamps in
//! microseconds. This module provides utilities for:
//! - Converting microseconds to seconds
//! - Rebasing an epoch timestamp against a reference instant
//! - Synthesizing per-frame timestamps for fixed-rate video captures
//! - Measuring the offset between two recordings' start instants

/// Microseconds in one second.
pub const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Nominal frame rate of the optical capture camera.
pub const DEFAULT_VIDEO_FPS: f64 = 60.0;

/// Convert a microsecond value to seconds.
pub fn micros_to_secs(us: i64) -> f64 {
    us as f64 / MICROS_PER_SEC
}

/// Seconds elapsed between `reference_us` and `epoch_us`.
///
/// Negative when the sample precedes the reference.
pub fn rebase_micros(epoch_us: i64, reference_us: i64) -> f64 {
    (epoch_us - reference_us) as f64 / MICROS_PER_SEC
}

/// Epoch timestamp (microseconds) of a video frame, given the recording
/// start in epoch seconds and the capture frame rate.
pub fn frame_epoch_micros(start_epoch_secs: i64, frame_index: usize, fps: f64) -> f64 {
    (start_epoch_secs as f64 + frame_index as f64 / fps) * MICROS_PER_SEC
}

/// Start-time offset between two recordings.
#[derive(Debug, Clone, Copy)]
pub struct StartOffset {
    /// First epoch sample of the reference recording (us).
    pub reference_us: i64,
    /// First epoch sample of the measured recording (us).
    pub measured_us: i64,
}

impl StartOffset {
    /// Offset in microseconds (positive = measured started later).
    pub fn offset_us(&self) -> i64 {
        self.measured_us - self.reference_us
    }

    /// Offset in seconds.
    pub fn offset_secs(&self) -> f64 {
        micros_to_secs(self.offset_us())
    }

    /// Whether the recordings started further apart than `threshold_secs`.
    pub fn exceeds_threshold_secs(&self, threshold_secs: f64) -> bool {
        self.offset_secs().abs() > threshold_secs
    }
}
