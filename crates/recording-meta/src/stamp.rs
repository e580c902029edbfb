//! Per-frame epoch timestamps for video marker exports.
//!
//! Marker tracking exports number frames but carry no absolute time. Given
//! the recording start and the camera frame rate, each row gets
//! `(start + row / fps) * 1e6` in a "Timestamp (microseconds)" column so the
//! export can be aligned with wearable data.

use std::path::{Path, PathBuf};

use kinesync_common::clock::frame_epoch_micros;
use kinesync_track_model::columns::TIMESTAMP_COLUMN;
use kinesync_track_model::table::{Table, TableError};

/// Frame counter column written by the marker tracker.
pub const FRAME_COLUMN: &str = "Frame #";

/// Append the timestamp column to `table`.
///
/// Timestamps follow row order, not the values in the frame column; the
/// frame column only has to be present to confirm this is a marker export.
pub fn stamp_frames(table: &mut Table, start_epoch_secs: i64, fps: f64) -> Result<(), StampError> {
    if !(fps.is_finite() && fps > 0.0) {
        return Err(StampError::InvalidFrameRate { fps });
    }
    table.require(FRAME_COLUMN)?;
    if table.column_ci(TIMESTAMP_COLUMN).is_some() {
        return Err(StampError::AlreadyStamped);
    }

    let timestamps = (0..table.row_count())
        .map(|row| frame_epoch_micros(start_epoch_secs, row, fps))
        .collect();
    table.push_column(TIMESTAMP_COLUMN, timestamps)?;

    tracing::info!(
        rows = table.row_count(),
        start_epoch_secs,
        fps,
        "Stamped frame timestamps"
    );
    Ok(())
}

/// Output path for a stamped copy of `input`: `<stem>.Epoch.csv` in the
/// same directory.
pub fn stamped_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}.Epoch.csv"))
}

/// Errors raised while stamping a marker export.
#[derive(Debug, thiserror::Error)]
pub enum StampError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Frame rate must be positive, got {fps}")]
    InvalidFrameRate { fps: f64 },

    #[error("Table already has a timestamp column")]
    AlreadyStamped,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker_table() -> Table {
        Table::from_reader("Frame #,Hand Pink X,Hand Pink Y\n0,10,20\n1,11,21\n2,,22\n".as_bytes())
            .unwrap()
    }

    #[test]
    fn test_stamp_frames_at_sixty_fps() {
        let mut table = marker_table();
        stamp_frames(&mut table, 1_658_789_494, 60.0).unwrap();

        let ts = table.column(TIMESTAMP_COLUMN).unwrap();
        assert_eq!(ts.len(), 3);
        assert_eq!(ts[0], 1_658_789_494_000_000.0);
        assert!((ts[1] - (1_658_789_494.0 + 1.0 / 60.0) * 1e6).abs() < 1e-3);
        assert!((ts[2] - ts[0] - 2.0 / 60.0 * 1e6).abs() < 1.0);
    }

    #[test]
    fn test_requires_frame_column() {
        let mut table = Table::from_reader("x,y\n1,2\n".as_bytes()).unwrap();
        assert!(matches!(
            stamp_frames(&mut table, 0, 60.0).unwrap_err(),
            StampError::Table(TableError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_refuses_to_stamp_twice() {
        let mut table = marker_table();
        stamp_frames(&mut table, 0, 60.0).unwrap();
        assert!(matches!(
            stamp_frames(&mut table, 0, 60.0).unwrap_err(),
            StampError::AlreadyStamped
        ));
    }

    #[test]
    fn test_rejects_bad_frame_rate() {
        let mut table = marker_table();
        assert!(matches!(
            stamp_frames(&mut table, 0, 0.0).unwrap_err(),
            StampError::InvalidFrameRate { .. }
        ));
    }

    #[test]
    fn test_stamped_path() {
        let out = stamped_path(Path::new("trial/ChestAA.Cam1.CH2M.Run1.MOCA.Fast.csv"));
        assert_eq!(
            out,
            Path::new("trial/ChestAA.Cam1.CH2M.Run1.MOCA.Fast.Epoch.csv")
        );
    }
}
