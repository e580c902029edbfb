//! Wearable (Biostamp) position tracks.
//!
//! The sensor export is already in meters. Its Z axis points up, so Z is the
//! vertical displacement and the horizontal displacement is the magnitude of
//! the X/Z projection.

use std::path::{Path, PathBuf};

use kinesync_common::clock::rebase_micros;
use kinesync_track_model::columns::{InertialColumns, SECONDS_COLUMN};
use kinesync_track_model::file_info::InertialFileInfo;
use kinesync_track_model::movement::{Movement, Speed, TrackKind};
use kinesync_track_model::series::TrackSeries;
use kinesync_track_model::table::Table;

use crate::peaks::{PeakPolicy, PeakSet};
use crate::track::{epoch_micros, Track, TrackError};

/// A wearable position track.
#[derive(Debug, Clone)]
pub struct InertialTrack {
    path: PathBuf,
    info: InertialFileInfo,
    columns: InertialColumns,
    table: Table,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    series: TrackSeries,
    peaks: PeakSet,
}

impl InertialTrack {
    pub fn load(path: impl AsRef<Path>, peaks: &PeakPolicy) -> Result<Self, TrackError> {
        let path = path.as_ref();
        let table = Table::from_path(path)?;
        Self::from_table(path, table, peaks)
    }

    /// Build a track from an already loaded export. The file name of `path`
    /// must follow the wearable naming convention.
    pub fn from_table(
        path: impl Into<PathBuf>,
        mut table: Table,
        peaks: &PeakPolicy,
    ) -> Result<Self, TrackError> {
        let path = path.into();
        let info = InertialFileInfo::from_path(&path)?;

        let columns = InertialColumns::resolve(&table)?;
        let epoch = epoch_micros(table.require(&columns.timestamp)?)?;
        if table.column(SECONDS_COLUMN).is_none() {
            let start = epoch.first().copied().unwrap_or_default();
            let seconds = epoch.iter().map(|&t| rebase_micros(t, start)).collect();
            table.push_column(SECONDS_COLUMN, seconds)?;
        }

        let x = table.require(&columns.x)?.to_vec();
        let y: Vec<f64> = table.require(&columns.y)?.iter().map(|v| -v).collect();
        let z = table.require(&columns.z)?.to_vec();

        let vertical = z.clone();
        let horizontal = x.iter().zip(&z).map(|(x, z)| x.hypot(*z)).collect();
        let series = TrackSeries::new(epoch, vertical, horizontal)?;

        let peaks = peaks.detect(
            &info.movement,
            info.speed,
            TrackKind::Inertial,
            series.adjusted_vertical(),
            series.adjusted_horizontal(),
        )?;

        tracing::info!(
            path = %path.display(),
            movement = %info.movement,
            subject = %info.subject,
            run = %info.run,
            samples = series.len(),
            "Loaded inertial track"
        );

        Ok(Self {
            path,
            info,
            columns,
            table,
            x,
            y,
            z,
            series,
            peaks,
        })
    }

    pub fn info(&self) -> &InertialFileInfo {
        &self.info
    }

    pub fn columns(&self) -> &InertialColumns {
        &self.columns
    }

    /// The loaded export with the derived seconds column.
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Y axis, negated from the export.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Seconds since the first sample.
    pub fn seconds(&self) -> &[f64] {
        self.table.column(SECONDS_COLUMN).unwrap_or_default()
    }
}

impl Track for InertialTrack {
    fn kind(&self) -> TrackKind {
        TrackKind::Inertial
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peaks::{PeakParams, PeakThresholds};
    use kinesync_track_model::series::EpochBasis;

    const NAME: &str = "ChestAA.Brachio.CH2M.Run1.Biostamp.position.Fast.csv";

    fn table(rows: &str) -> Table {
        Table::from_reader(format!("Timestamp (microseconds),x (m),y (m),z (m)\n{rows}").as_bytes())
            .unwrap()
    }

    fn loose_policy() -> PeakPolicy {
        let mut policy = PeakPolicy::empty();
        let params = PeakParams {
            height: 0.1,
            distance: 1,
        };
        policy.set(
            Movement::ChestAA,
            Speed::Fast,
            TrackKind::Inertial,
            PeakThresholds {
                vertical: params,
                horizontal: params,
            },
        );
        policy
    }

    #[test]
    fn test_vertical_is_z_and_horizontal_is_xz_magnitude() {
        let rows = "1000000,0,0.5,0\n1500000,0,0.5,0.3\n2000000,0,0.5,0.6\n2500000,0,0.5,0.3\n3000000,0,0.5,0\n";
        let t = InertialTrack::from_table(NAME, table(rows), &loose_policy()).unwrap();

        assert_eq!(t.series().vertical(), [0.0, 0.3, 0.6, 0.3, 0.0]);
        assert_eq!(t.series().horizontal(), [0.0, 0.3, 0.6, 0.3, 0.0]);
        assert_eq!(t.y(), [-0.5; 5]);
        assert_eq!(t.peaks().vertical, vec![2]);
        assert_eq!(t.peaks().horizontal, vec![2]);
        assert_eq!(t.seconds(), [0.0, 0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_horizontal_is_never_negative() {
        let rows = "0,-3,0,-4\n1,3,1,4\n";
        let t = InertialTrack::from_table(NAME, table(rows), &PeakPolicy::builtin()).unwrap();
        assert_eq!(t.series().horizontal(), [5.0, 5.0]);
        assert_eq!(t.series().adjusted_horizontal(), [0.0, 0.0]);
        assert_eq!(t.series().adjusted_vertical(), [0.0, 8.0]);
    }

    #[test]
    fn test_rebased_epoch() {
        let rows = "1000000,0,0,0\n1500000,0,0,0\n";
        let mut t = InertialTrack::from_table(NAME, table(rows), &PeakPolicy::builtin()).unwrap();
        assert_eq!(t.series().epoch_basis(), EpochBasis::RawMicros);
        t.set_adj_epoch(500_000);
        assert_eq!(t.series().adjusted_epoch(), [0.5, 1.0]);
        assert_eq!(
            t.series().epoch_basis(),
            EpochBasis::SecondsSince {
                reference_us: 500_000
            }
        );
    }

    #[test]
    fn test_short_file_name_is_rejected() {
        let err = InertialTrack::from_table(
            "ChestAA.Brachio.CH2M.csv",
            table("0,0,0,0\n"),
            &PeakPolicy::builtin(),
        )
        .unwrap_err();
        assert!(matches!(err, TrackError::FileName(_)));
    }

    #[test]
    fn test_file_name_fields() {
        let t = InertialTrack::from_table(NAME, table("0,0,0,0\n"), &PeakPolicy::builtin()).unwrap();
        assert_eq!(t.info().muscle, "Brachio");
        assert_eq!(t.info().subject, "CH2M");
        assert_eq!(t.info().run, "Run1");
        assert_eq!(t.info().speed, Some(Speed::Fast));
    }

    #[test]
    fn test_ambiguous_axis_column() {
        let text = "Timestamp (microseconds),x (m),x raw,y (m),z (m)\n0,0,0,0,0\n";
        let t = Table::from_reader(text.as_bytes()).unwrap();
        let err = InertialTrack::from_table(NAME, t, &PeakPolicy::builtin()).unwrap_err();
        assert!(matches!(err, TrackError::Column(_)));
    }

    #[test]
    fn test_existing_seconds_column_is_kept() {
        let text = "Timestamp (microseconds),Seconds,x (m),y (m),z (m)\n0,9,0,0,0\n";
        let t = Table::from_reader(text.as_bytes()).unwrap();
        let t = InertialTrack::from_table(NAME, t, &PeakPolicy::builtin()).unwrap();
        assert_eq!(t.seconds(), [9.0]);
    }
}
