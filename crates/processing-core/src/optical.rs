//! Video marker (MOCA) tracks.
//!
//! Marker positions arrive in screen pixels with the origin at the top-left
//! corner and Y growing downwards. Both axes are negated while scaling to
//! meters: Y so that up is positive, X so the horizontal axis has the same
//! handedness as the wearable track.

use std::path::{Path, PathBuf};

use kinesync_common::config::AppConfig;
use kinesync_track_model::columns::OpticalColumns;
use kinesync_track_model::file_info::OpticalFileInfo;
use kinesync_track_model::movement::{Movement, Speed, TrackKind};
use kinesync_track_model::series::TrackSeries;
use kinesync_track_model::table::Table;

use crate::calibration::{Calibration, CalibrationTable};
use crate::peaks::{PeakError, PeakPolicy, PeakSet};
use crate::track::{epoch_micros, Track, TrackError};

/// Parameters for loading an optical track.
#[derive(Debug, Clone)]
pub struct OpticalOptions {
    /// Case-insensitive substring naming the tracked marker's columns.
    pub marker_label: String,

    /// Measured shoulder-to-hand length (meters).
    pub arm_length_m: f64,

    /// Fail instead of falling back to pixels when the movement has no
    /// calibration formula.
    pub require_calibration: bool,

    pub calibration: CalibrationTable,

    pub peaks: PeakPolicy,
}

impl Default for OpticalOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default()).unwrap_or_else(|_| Self {
            marker_label: "hand".to_string(),
            arm_length_m: 0.69,
            require_calibration: false,
            calibration: CalibrationTable::builtin(),
            peaks: PeakPolicy::builtin(),
        })
    }
}

impl OpticalOptions {
    /// Options taken from application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, PeakError> {
        Ok(Self {
            marker_label: config.optical.marker_label.clone(),
            arm_length_m: config.optical.arm_length_m,
            require_calibration: config.optical.require_calibration,
            calibration: CalibrationTable::builtin(),
            peaks: PeakPolicy::with_overrides(&config.peaks)?,
        })
    }
}

/// A video marker track normalized to meters.
#[derive(Debug, Clone)]
pub struct OpticalTrack {
    path: PathBuf,
    info: OpticalFileInfo,
    marker_label: String,
    columns: OpticalColumns,
    calibration: Calibration,
    table: Table,
    series: TrackSeries,
    peaks: PeakSet,
}

impl OpticalTrack {
    /// Load and normalize a marker export.
    pub fn load(path: impl AsRef<Path>, options: &OpticalOptions) -> Result<Self, TrackError> {
        let path = path.as_ref();
        let table = Table::from_path(path)?;
        Self::from_table(path, table, options)
    }

    /// Normalize an already loaded marker export. `path` supplies the trial
    /// metadata through its file name.
    pub fn from_table(
        path: impl Into<PathBuf>,
        table: Table,
        options: &OpticalOptions,
    ) -> Result<Self, TrackError> {
        let path = path.into();
        let info = OpticalFileInfo::from_path(&path)?;

        let calibration =
            options
                .calibration
                .calibrate(&info.movement, &table, options.arm_length_m)?;
        if options.require_calibration && !calibration.is_calibrated() {
            return Err(TrackError::UnsupportedMovement {
                movement: info.movement.clone(),
            });
        }

        let columns = OpticalColumns::resolve(&table, &options.marker_label)?;
        let epoch = epoch_micros(table.require(&columns.timestamp)?)?;
        let scale = calibration.scale;
        let horizontal = table
            .require(&columns.x)?
            .iter()
            .map(|x| -x * scale)
            .collect();
        let vertical = table
            .require(&columns.y)?
            .iter()
            .map(|y| -y * scale)
            .collect();
        let series = TrackSeries::new(epoch, vertical, horizontal)?;

        let peaks = options.peaks.detect(
            &info.movement,
            info.speed,
            TrackKind::Optical,
            series.adjusted_vertical(),
            series.adjusted_horizontal(),
        )?;

        tracing::info!(
            path = %path.display(),
            movement = %info.movement,
            marker = %options.marker_label,
            samples = series.len(),
            scale,
            calibrated = calibration.is_calibrated(),
            "Loaded optical track"
        );

        Ok(Self {
            path,
            info,
            marker_label: options.marker_label.to_lowercase(),
            columns,
            calibration,
            table,
            series,
            peaks,
        })
    }

    pub fn info(&self) -> &OpticalFileInfo {
        &self.info
    }

    /// Marker label the track was built from, lower-cased.
    pub fn marker_label(&self) -> &str {
        &self.marker_label
    }

    pub fn columns(&self) -> &OpticalColumns {
        &self.columns
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// The loaded export, unmodified.
    pub fn table(&self) -> &Table {
        &self.table
    }
}

impl Track for OpticalTrack {
    fn kind(&self) -> TrackKind {
        TrackKind::Optical
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn movement(&self) -> &Movement {
        &self.info.movement
    }

    fn speed(&self) -> Option<Speed> {
        self.info.speed
    }

    fn series(&self) -> &TrackSeries {
        &self.series
    }

    fn series_mut(&mut self) -> &mut TrackSeries {
        &mut self.series
    }

    fn peaks(&self) -> &PeakSet {
        &self.peaks
    }

    fn peaks_mut(&mut self) -> &mut PeakSet {
        &mut self.peaks
    }
}
