//! Align an optical track onto an inertial track and export the result.

use std::io::Write;
use std::path::{Path, PathBuf};

use kinesync_common::config::AppConfig;
use kinesync_processing_core::{
    aligned_rows, Aligner, AlignmentPlan, InertialTrack, OpticalOptions, OpticalTrack, Track,
};

pub fn run(
    optical: PathBuf,
    inertial: PathBuf,
    output: Option<PathBuf>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    println!("Aligning {}", optical.display());
    println!("    onto {}", inertial.display());

    let options = OpticalOptions::from_config(config)?;
    let mut optical_track = OpticalTrack::load(&optical, &options)?;
    let mut inertial_track = InertialTrack::load(&inertial, &options.peaks)?;

    let plan = AlignmentPlan::from_config(config);
    let report = Aligner::new(plan).align(&mut optical_track, &mut inertial_track)?;

    println!(
        "  Start offset: {:+.3}s (inertial relative to optical)",
        report.start_offset_s
    );
    if report.smoothed_samples > 0 {
        println!("  Suppressed {} jumping samples", report.smoothed_samples);
    }
    if let Some(amplitude) = &report.amplitude {
        println!(
            "  Vertical shift: {:+.4} m (best effort, first peak registration)",
            amplitude.vertical_shift_m
        );
    }

    let out_dir = output.unwrap_or_else(|| {
        optical
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    std::fs::create_dir_all(&out_dir)?;
    let stem = optical
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "aligned".to_string());

    let csv_path = out_dir.join(format!("{stem}.aligned.csv"));
    let file = std::fs::File::create(&csv_path)?;
    write_rows(file, &optical_track, &inertial_track)?;
    println!("  Wrote {}", csv_path.display());

    let report_path = out_dir.join(format!("{stem}.report.json"));
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&report_path, json)?;
    println!("  Wrote {}", report_path.display());

    Ok(())
}

/// Write the adjusted samples of both tracks as one long-format CSV.
fn write_rows<W: Write>(writer: W, optical: &impl Track, inertial: &impl Track) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in aligned_rows(optical)
        .into_iter()
        .chain(aligned_rows(inertial))
    {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    tracing::debug!(
        optical = optical.series().len(),
        inertial = inertial.series().len(),
        "Wrote aligned rows"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinesync_processing_core::PeakPolicy;
    use kinesync_track_model::table::Table;

    #[test]
    fn test_write_rows_long_format() {
        let optical = OpticalTrack::from_table(
            "ShoulderFE.Cam1.S1.Run1.MOCA.Fast.csv",
            Table::from_reader(
                "Hand X,Hand Y,Timestamp (microseconds)\n1,2,1000000\n3,5,2000000\n".as_bytes(),
            )
            .unwrap(),
            &OpticalOptions::default(),
        )
        .unwrap();
        let inertial = InertialTrack::from_table(
            "ShoulderFE.Delt.S1.Run1.Biostamp.position.Fast.csv",
            Table::from_reader("Timestamp (microseconds),x,y,z\n1000000,0,0,1\n".as_bytes())
                .unwrap(),
            &PeakPolicy::builtin(),
        )
        .unwrap();

        let mut buf = Vec::new();
        write_rows(&mut buf, &optical, &inertial).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "track,seconds,vertical_m,horizontal_m");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("optical,"));
        assert_eq!(lines[2], "optical,2000000.0,-3.0,-2.0");
        assert!(lines[3].starts_with("inertial,"));
    }
}
