//! Repetition peak detection.
//!
//! Each repetition of a cyclic movement shows up as one local maximum in the
//! displacement curve. Peaks are picked by height and by a minimum spacing
//! in samples.
//!
//! # Algorithm
//!
//! 1. **Candidates:** every sample strictly higher than both neighbours.
//!    A flat top counts once, at its middle sample (left middle for even
//!    widths). The first and last samples never qualify.
//! 2. **Height:** drop candidates below the minimum height.
//! 3. **Distance:** visit candidates tallest first (equal heights: earlier
//!    index first). Each survivor removes every other candidate closer than
//!    `distance` samples.
//!
//! Thresholds are only trusted for movement/speed combinations that have
//! been checked against recorded trials. [`PeakPolicy`] holds those
//! combinations; anything else gets an empty peak set rather than a guess.

use std::collections::HashMap;

use kinesync_common::config::PeakThresholdEntry;
use kinesync_track_model::movement::{Movement, Speed, TrackKind};
use serde::{Deserialize, Serialize};

/// Parameters for one peak search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakParams {
    /// Minimum peak value (inclusive).
    pub height: f64,
    /// Minimum index distance between accepted peaks.
    pub distance: usize,
}

/// Peak parameters for both axes of one track configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakThresholds {
    pub vertical: PeakParams,
    pub horizontal: PeakParams,
}

/// Peaks found on a track's adjusted series, as ascending sample indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeakSet {
    pub vertical: Vec<usize>,
    pub horizontal: Vec<usize>,
}

impl PeakSet {
    pub fn is_empty(&self) -> bool {
        self.vertical.is_empty() && self.horizontal.is_empty()
    }
}

/// Indices of peaks in `values` satisfying `params`, ascending.
pub fn find_peaks(values: &[f64], params: PeakParams) -> Result<Vec<usize>, PeakError> {
    if params.distance < 1 {
        return Err(PeakError::InvalidDistance {
            distance: params.distance,
        });
    }
    if params.height.is_nan() {
        return Err(PeakError::InvalidHeight);
    }

    let candidates: Vec<usize> = local_maxima(values)
        .into_iter()
        .filter(|&i| values[i] >= params.height)
        .collect();

    Ok(select_by_distance(values, &candidates, params.distance))
}

/// Local maxima, with plateaus reported at their middle sample.
fn local_maxima(values: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if values.len() < 3 {
        return maxima;
    }

    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                let right = ahead - 1;
                maxima.push((i + right) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    maxima
}

fn select_by_distance(values: &[f64], candidates: &[usize], distance: usize) -> Vec<usize> {
    if distance == 1 || candidates.len() < 2 {
        return candidates.to_vec();
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        values[candidates[b]]
            .total_cmp(&values[candidates[a]])
            .then(a.cmp(&b))
    });

    let mut keep = vec![true; candidates.len()];
    for &i in &order {
        if !keep[i] {
            continue;
        }
        let peak = candidates[i];

        for k in (0..i).rev() {
            if peak - candidates[k] >= distance {
                break;
            }
            keep[k] = false;
        }
        for k in i + 1..candidates.len() {
            if candidates[k] - peak >= distance {
                break;
            }
            keep[k] = false;
        }
    }

    candidates
        .iter()
        .zip(keep)
        .filter_map(|(&c, k)| k.then_some(c))
        .collect()
}

/// Validated peak thresholds per movement, speed, and capture system.
#[derive(Debug, Clone)]
pub struct PeakPolicy {
    entries: HashMap<(Movement, Speed, TrackKind), PeakThresholds>,
}

impl Default for PeakPolicy {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PeakPolicy {
    /// A policy with no validated configurations.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Thresholds checked against fast chest abduction trials.
    pub fn builtin() -> Self {
        let mut policy = Self::empty();
        policy.set(
            Movement::ChestAA,
            Speed::Fast,
            TrackKind::Optical,
            PeakThresholds {
                vertical: PeakParams {
                    height: 0.75,
                    distance: 100,
                },
                horizontal: PeakParams {
                    height: 0.85,
                    distance: 100,
                },
            },
        );
        policy.set(
            Movement::ChestAA,
            Speed::Fast,
            TrackKind::Inertial,
            PeakThresholds {
                vertical: PeakParams {
                    height: 0.4,
                    distance: 100,
                },
                horizontal: PeakParams {
                    height: 0.5,
                    distance: 100,
                },
            },
        );
        policy
    }

    /// Built-in thresholds with `overrides` layered on top.
    pub fn with_overrides(overrides: &[PeakThresholdEntry]) -> Result<Self, PeakError> {
        let mut policy = Self::builtin();
        for entry in overrides {
            let speed = Speed::parse(&entry.speed).ok_or_else(|| PeakError::UnknownSpeed {
                label: entry.speed.clone(),
            })?;
            let kind = TrackKind::parse(&entry.track).ok_or_else(|| PeakError::UnknownTrack {
                label: entry.track.clone(),
            })?;
            if entry.distance < 1 {
                return Err(PeakError::InvalidDistance {
                    distance: entry.distance,
                });
            }
            let movement = entry.movement.parse().unwrap_or_else(|e| match e {});
            tracing::debug!(%movement, %speed, %kind, "Overriding peak thresholds");
            policy.set(
                movement,
                speed,
                kind,
                PeakThresholds {
                    vertical: PeakParams {
                        height: entry.vertical_height,
                        distance: entry.distance,
                    },
                    horizontal: PeakParams {
                        height: entry.horizontal_height,
                        distance: entry.distance,
                    },
                },
            );
        }
        Ok(policy)
    }

    /// Insert or replace one configuration.
    pub fn set(
        &mut self,
        movement: Movement,
        speed: Speed,
        kind: TrackKind,
        thresholds: PeakThresholds,
    ) {
        self.entries.insert((movement, speed, kind), thresholds);
    }

    /// Thresholds for a configuration, if validated.
    pub fn lookup(
        &self,
        movement: &Movement,
        speed: Option<Speed>,
        kind: TrackKind,
    ) -> Option<PeakThresholds> {
        let speed = speed?;
        self.entries.get(&(movement.clone(), speed, kind)).copied()
    }

    /// Detect peaks on both axes. Unvalidated configurations yield an
    /// empty set.
    pub fn detect(
        &self,
        movement: &Movement,
        speed: Option<Speed>,
        kind: TrackKind,
        vertical: &[f64],
        horizontal: &[f64],
    ) -> Result<PeakSet, PeakError> {
        let Some(thresholds) = self.lookup(movement, speed, kind) else {
            tracing::debug!(
                %movement,
                speed = ?speed,
                %kind,
                "No validated peak thresholds; skipping detection"
            );
            return Ok(PeakSet::default());
        };

        let peaks = PeakSet {
            vertical: find_peaks(vertical, thresholds.vertical)?,
            horizontal: find_peaks(horizontal, thresholds.horizontal)?,
        };
        tracing::debug!(
            %movement,
            %kind,
            vertical = peaks.vertical.len(),
            horizontal = peaks.horizontal.len(),
            "Detected peaks"
        );
        Ok(peaks)
    }
}

/// Errors raised by peak detection or threshold configuration.
#[derive(Debug, thiserror::Error)]
pub enum PeakError {
    #[error("Peak distance must be at least 1, got {distance}")]
    InvalidDistance { distance: usize },

    #[error("Peak height must be a number")]
    InvalidHeight,

    #[error("Unknown speed label '{label}'")]
    UnknownSpeed { label: String },

    #[error("Unknown track kind '{label}'")]
    UnknownTrack { label: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params(height: f64, distance: usize) -> PeakParams {
        PeakParams { height, distance }
    }

    #[test]
    fn test_simple_peaks() {
        let values = [0.0, 1.0, 0.0, 2.0, 0.0, 0.5, 0.0];
        assert_eq!(find_peaks(&values, params(0.0, 1)).unwrap(), [1, 3, 5]);
        assert_eq!(find_peaks(&values, params(0.9, 1)).unwrap(), [1, 3]);
    }

    #[test]
    fn test_height_is_inclusive() {
        let values = [0.0, 1.0, 0.0];
        assert_eq!(find_peaks(&values, params(1.0, 1)).unwrap(), [1]);
        assert!(find_peaks(&values, params(1.0001, 1)).unwrap().is_empty());
    }

    #[test]
    fn test_endpoints_never_peak() {
        let values = [3.0, 1.0, 2.0, 1.0, 5.0];
        assert_eq!(find_peaks(&values, params(0.0, 1)).unwrap(), [2]);
    }

    #[test]
    fn test_plateau_reports_middle() {
        let values = [0.0, 1.0, 1.0, 1.0, 0.0];
        assert_eq!(find_peaks(&values, params(0.0, 1)).unwrap(), [2]);
        let even = [0.0, 1.0, 1.0, 0.0];
        assert_eq!(find_peaks(&even, params(0.0, 1)).unwrap(), [1]);
        // a plateau that rises again is not a peak
        let shelf = [0.0, 1.0, 1.0, 2.0, 0.0];
        assert_eq!(find_peaks(&shelf, params(0.0, 1)).unwrap(), [3]);
    }

    #[test]
    fn test_distance_prefers_taller_peak() {
        let values = [0.0, 1.0, 0.0, 3.0, 0.0, 2.0, 0.0];
        assert_eq!(find_peaks(&values, params(0.0, 3)).unwrap(), [3]);
        assert_eq!(find_peaks(&values, params(0.0, 2)).unwrap(), [1, 3, 5]);
    }

    #[test]
    fn test_distance_tie_keeps_earlier() {
        let values = [0.0, 2.0, 0.0, 2.0, 0.0];
        assert_eq!(find_peaks(&values, params(0.0, 3)).unwrap(), [1]);
    }

    #[test]
    fn test_nan_is_never_a_peak() {
        let values = [0.0, f64::NAN, 0.0, 1.0, 0.0];
        assert_eq!(find_peaks(&values, params(0.0, 1)).unwrap(), [3]);
    }

    #[test]
    fn test_invalid_params() {
        assert!(matches!(
            find_peaks(&[0.0], params(0.0, 0)).unwrap_err(),
            PeakError::InvalidDistance { distance: 0 }
        ));
        assert!(matches!(
            find_peaks(&[0.0], params(f64::NAN, 1)).unwrap_err(),
            PeakError::InvalidHeight
        ));
    }

    #[test]
    fn test_policy_only_detects_validated_configs() {
        let policy = PeakPolicy::builtin();
        let wave: Vec<f64> = (0..600)
            .map(|i| (i as f64 * std::f64::consts::TAU / 150.0).sin())
            .collect();

        let fast = policy
            .detect(
                &Movement::ChestAA,
                Some(Speed::Fast),
                TrackKind::Inertial,
                &wave,
                &wave,
            )
            .unwrap();
        assert_eq!(fast.vertical.len(), 4);

        let slow = policy
            .detect(
                &Movement::ChestAA,
                Some(Speed::Slow),
                TrackKind::Inertial,
                &wave,
                &wave,
            )
            .unwrap();
        assert!(slow.is_empty());

        let unknown = policy
            .detect(&Movement::BicepC, None, TrackKind::Optical, &wave, &wave)
            .unwrap();
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_overrides_replace_builtin() {
        let policy = PeakPolicy::with_overrides(&[PeakThresholdEntry {
            movement: "chestaa".to_string(),
            speed: "FAST".to_string(),
            track: "moca".to_string(),
            vertical_height: 0.6,
            horizontal_height: 0.7,
            distance: 50,
        }])
        .unwrap();
        let t = policy
            .lookup(&Movement::ChestAA, Some(Speed::Fast), TrackKind::Optical)
            .unwrap();
        assert_eq!(t.vertical, params(0.6, 50));
        // untouched entry keeps built-in values
        let t = policy
            .lookup(&Movement::ChestAA, Some(Speed::Fast), TrackKind::Inertial)
            .unwrap();
        assert_eq!(t.vertical, params(0.4, 100));
    }

    #[test]
    fn test_overrides_reject_bad_labels() {
        let entry = PeakThresholdEntry {
            movement: "ChestAA".to_string(),
            speed: "brisk".to_string(),
            track: "optical".to_string(),
            vertical_height: 0.6,
            horizontal_height: 0.7,
            distance: 50,
        };
        assert!(matches!(
            PeakPolicy::with_overrides(&[entry]).unwrap_err(),
            PeakError::UnknownSpeed { .. }
        ));
    }

    proptest! {
        #[test]
        fn prop_accepted_peaks_respect_distance_and_height(
            values in prop::collection::vec(-1.0f64..1.0, 0..300),
            height in -1.0f64..1.0,
            distance in 1usize..40,
        ) {
            let peaks = find_peaks(&values, params(height, distance)).unwrap();
            for w in peaks.windows(2) {
                prop_assert!(w[1] - w[0] >= distance);
            }
            for &p in &peaks {
                prop_assert!(p > 0 && p + 1 < values.len());
                prop_assert!(values[p] >= height);
                prop_assert!(values[p - 1] <= values[p]);
            }
        }
    }
}
