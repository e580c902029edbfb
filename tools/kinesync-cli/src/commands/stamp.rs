//! Add epoch timestamps to a marker export.

use std::path::PathBuf;

use kinesync_recording_meta::{
    stamp_frames, stamped_path, FixedStart, Mp4CreationTime, RecordingStartSource,
};
use kinesync_track_model::table::Table;

pub fn run(
    path: PathBuf,
    start_epoch: Option<i64>,
    video: Option<PathBuf>,
    fps: f64,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let start = match (start_epoch, video) {
        (Some(secs), None) => FixedStart(secs).recording_start(&path)?,
        (None, Some(video)) => {
            let secs = Mp4CreationTime.recording_start(&video)?;
            println!("Recording start from {}: {secs}", video.display());
            secs
        }
        _ => anyhow::bail!("Give exactly one of --start-epoch or --video"),
    };

    let mut table = Table::from_path(&path)?;
    stamp_frames(&mut table, start, fps)?;

    let output = output.unwrap_or_else(|| stamped_path(&path));
    table.write_path(&output)?;

    println!(
        "Stamped {} frames at {fps} fps: {}",
        table.row_count(),
        output.display()
    );
    Ok(())
}
