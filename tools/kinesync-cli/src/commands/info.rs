//! Show track information.

use std::path::{Path, PathBuf};

use kinesync_common::clock::micros_to_secs;
use kinesync_common::config::AppConfig;
use kinesync_processing_core::{InertialTrack, OpticalOptions, OpticalTrack, Track};
use kinesync_track_model::file_info::{base_name, InertialFileInfo};
use kinesync_track_model::movement::TrackKind;

pub fn run(path: PathBuf, kind: Option<String>, config: &AppConfig) -> anyhow::Result<()> {
    let kind = match kind {
        Some(label) => TrackKind::parse(&label)
            .ok_or_else(|| anyhow::anyhow!("Unknown track kind '{label}'"))?,
        None => guess_kind(&path),
    };
    let options = OpticalOptions::from_config(config)?;

    match kind {
        TrackKind::Optical => {
            let track = OpticalTrack::load(&path, &options)?;
            print_common(&track);
            println!("Optical:");
            println!("  Speed: {}", speed_text(track.info().speed));
            println!("  Marker: {}", track.marker_label());
            println!(
                "  Columns: x={}, y={}",
                track.columns().x,
                track.columns().y
            );
            let calibration = track.calibration();
            if calibration.is_calibrated() {
                println!("  Scale: {:.6} m/px", calibration.scale);
            } else {
                println!("  Scale: uncalibrated (pixels)");
            }
            print_peaks(&track);
        }
        TrackKind::Inertial => {
            let track = InertialTrack::load(&path, &options.peaks)?;
            print_common(&track);
            let info = track.info();
            println!("Inertial:");
            println!("  Muscle: {}", info.muscle);
            println!("  Subject: {}", info.subject);
            println!("  Run: {}", info.run);
            println!("  Speed: {}", info.speed_label);
            println!(
                "  Columns: x={}, y={}, z={}",
                track.columns().x,
                track.columns().y,
                track.columns().z
            );
            print_peaks(&track);
        }
    }
    Ok(())
}

/// Wearable exports follow a stricter naming convention, so anything that
/// parses as one and does not mention the marker system is treated as one.
fn guess_kind(path: &Path) -> TrackKind {
    let name = base_name(path);
    if !name.to_lowercase().contains("moca") && InertialFileInfo::parse(&name).is_ok() {
        TrackKind::Inertial
    } else {
        TrackKind::Optical
    }
}

fn speed_text(speed: Option<kinesync_track_model::movement::Speed>) -> String {
    speed.map_or_else(|| "unknown".to_string(), |s| s.to_string())
}

fn print_common(track: &impl Track) {
    let series = track.series();
    let epoch = series.epoch_us();
    let duration = micros_to_secs(epoch[epoch.len() - 1] - epoch[0]);

    println!("Track: {}", track.path().display());
    println!("  Kind: {}", track.kind());
    println!("  Movement: {}", track.movement());
    println!("  Samples: {} ({duration:.2}s)", series.len());
    println!("  First timestamp: {} us", series.first_epoch_us());
    println!();
}

fn print_peaks(track: &impl Track) {
    let peaks = track.peaks();
    println!();
    println!("Peaks:");
    if peaks.is_empty() {
        println!("  none (no validated thresholds, or nothing above them)");
        return;
    }
    println!("  Vertical: {} at {:?}", peaks.vertical.len(), peaks.vertical);
    println!(
        "  Horizontal: {} at {:?}",
        peaks.horizontal.len(),
        peaks.horizontal
    );
}
