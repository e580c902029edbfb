//! KineSync CLI: command-line interface for stamping, inspecting, and
//! aligning motion capture tracks.
//!
//! Usage:
//!   kinesync stamp <CSV> --start-epoch <SECS>   Add epoch timestamps to a marker export
//!   kinesync stamp <CSV> --video <MP4>          Same, start read from the video
//!   kinesync info <CSV>                         Show track information
//!   kinesync align <OPTICAL> <INERTIAL>         Align a marker track onto a wearable track
//!   kinesync config [--write]                   Show (or save) the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kinesync_common::clock::DEFAULT_VIDEO_FPS;
use kinesync_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "kinesync",
    about = "Align video marker and wearable sensor motion tracks",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append per-frame epoch timestamps to a marker export
    Stamp {
        /// Marker export CSV with a "Frame #" column
        path: PathBuf,

        /// Recording start, seconds since the Unix epoch (UTC)
        #[arg(long, conflicts_with = "video", required_unless_present = "video")]
        start_epoch: Option<i64>,

        /// Video the markers were tracked in; its creation time is the start
        #[arg(long)]
        video: Option<PathBuf>,

        /// Camera frame rate
        #[arg(long, default_value_t = DEFAULT_VIDEO_FPS)]
        fps: f64,

        /// Output file (default: <stem>.Epoch.csv next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show file metadata, calibration, and peak counts for one track
    Info {
        /// Track CSV
        path: PathBuf,

        /// Track kind: optical|inertial (default: guessed from the file name)
        #[arg(long)]
        kind: Option<String>,
    },

    /// Align an optical track onto an inertial track and export the result
    Align {
        /// Marker export with epoch timestamps
        optical: PathBuf,

        /// Wearable position export
        inertial: PathBuf,

        /// Output directory (default: next to the optical track)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Marker whose columns to track
        #[arg(long)]
        marker: Option<String>,

        /// Measured shoulder-to-hand length (meters)
        #[arg(long)]
        arm_length: Option<f64>,

        /// Shift the optical vertical series onto the first inertial peak
        #[arg(long)]
        register_amplitude: bool,

        /// Sensor-to-marker vertical offset used by amplitude registration (meters)
        #[arg(long)]
        sensor_offset: Option<f64>,

        /// Constant added to the optical vertical series (meters)
        #[arg(long, allow_negative_numbers = true)]
        vertical_offset: Option<f64>,

        /// Constant added to the optical horizontal series (meters)
        #[arg(long, allow_negative_numbers = true)]
        horizontal_offset: Option<f64>,

        /// Constant added to the optical time axis (seconds)
        #[arg(long, allow_negative_numbers = true)]
        time_shift: Option<f64>,

        /// Skip optical jump suppression
        #[arg(long)]
        no_smooth: bool,
    },

    /// Print the effective configuration
    Config {
        /// Save it to the standard config location
        #[arg(long)]
        write: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    kinesync_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Stamp {
            path,
            start_epoch,
            video,
            fps,
            output,
        } => commands::stamp::run(path, start_epoch, video, fps, output),
        Commands::Info { path, kind } => commands::info::run(path, kind, &config),
        Commands::Config { write } => commands::config::run(&config, write),
        Commands::Align {
            optical,
            inertial,
            output,
            marker,
            arm_length,
            register_amplitude,
            sensor_offset,
            vertical_offset,
            horizontal_offset,
            time_shift,
            no_smooth,
        } => {
            let mut config = config;
            if let Some(marker) = marker {
                config.optical.marker_label = marker;
            }
            if let Some(arm_length) = arm_length {
                config.optical.arm_length_m = arm_length;
            }
            if no_smooth {
                config.optical.smooth_threshold_m = None;
            }
            let alignment = &mut config.alignment;
            alignment.register_amplitude |= register_amplitude;
            if let Some(v) = sensor_offset {
                alignment.sensor_marker_offset_m = v;
            }
            if let Some(v) = vertical_offset {
                alignment.manual_vertical_m = v;
            }
            if let Some(v) = horizontal_offset {
                alignment.manual_horizontal_m = v;
            }
            if let Some(v) = time_shift {
                alignment.manual_time_shift_s = v;
            }
            commands::align::run(optical, inertial, output, &config)
        }
    }
}
