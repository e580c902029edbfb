//! Trial metadata encoded in recording file names.
//!
//! Wearable exports are named
//! `Movement.Muscle.Subject.Run.<field>.<field>.Speed[.<more>...]`, for
//! example `ChestAA.Brachio.CH2M.Run1.Biostamp.position.Fast.csv`. Video
//! marker exports only reliably carry the movement as their first field,
//! e.g. `ChestAA.Cam1.CH2M.Run1.MOCA.7:25:22.Fast.Epoch.csv`.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::movement::{Movement, Speed};

/// Fields parsed from a wearable export's file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InertialFileInfo {
    pub movement: Movement,
    pub muscle: String,
    pub subject: String,
    pub run: String,
    /// Speed field as written.
    pub speed_label: String,
    /// Speed field, when it is a known label.
    pub speed: Option<Speed>,
}

/// Fields parsed from a video marker export's file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpticalFileInfo {
    pub movement: Movement,
    pub speed: Option<Speed>,
}

fn inertial_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<movement>[^.]+)\.(?P<muscle>[^.]+)\.(?P<subject>[^.]+)\.(?P<run>[^.]+)\.[^.]+\.[^.]+\.(?P<speed>[^.]+)(?:\..*)?$",
        )
        .expect("inertial file name pattern is valid")
    })
}

/// Final path component as text.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl InertialFileInfo {
    /// Parse the file name of `path`.
    pub fn from_path(path: &Path) -> Result<Self, FileNameError> {
        Self::parse(&base_name(path))
    }

    /// Parse a bare file name.
    pub fn parse(name: &str) -> Result<Self, FileNameError> {
        let caps = inertial_pattern()
            .captures(name)
            .ok_or_else(|| FileNameError::Pattern {
                name: name.to_string(),
                expected: "Movement.Muscle.Subject.Run.<field>.<field>.Speed[...]",
            })?;

        let movement = caps["movement"]
            .parse::<Movement>()
            .unwrap_or_else(|e| match e {});
        let speed_label = caps["speed"].to_string();

        Ok(Self {
            movement,
            muscle: caps["muscle"].to_string(),
            subject: caps["subject"].to_string(),
            run: caps["run"].to_string(),
            speed: Speed::parse(&speed_label),
            speed_label,
        })
    }
}

impl OpticalFileInfo {
    /// Parse the file name of `path`.
    pub fn from_path(path: &Path) -> Result<Self, FileNameError> {
        Self::parse(&base_name(path))
    }

    /// Parse a bare file name. The movement is everything before the first
    /// '.'. The speed comes from a '.'-field equal to a speed label, or
    /// failing that from a speed label appearing anywhere in the name.
    pub fn parse(name: &str) -> Result<Self, FileNameError> {
        let movement = name.split('.').next().unwrap_or_default();
        if movement.is_empty() {
            return Err(FileNameError::Pattern {
                name: name.to_string(),
                expected: "Movement.<anything>",
            });
        }

        let speed = name.split('.').find_map(Speed::parse).or_else(|| {
            let lower = name.to_lowercase();
            if lower.contains("fast") {
                Some(Speed::Fast)
            } else if lower.contains("slow") {
                Some(Speed::Slow)
            } else {
                None
            }
        });

        Ok(Self {
            movement: movement.parse().unwrap_or_else(|e| match e {}),
            speed,
        })
    }
}

/// Errors raised when a file name does not follow the naming convention.
#[derive(Debug, thiserror::Error)]
pub enum FileNameError {
    #[error("File name '{name}' does not match {expected}")]
    Pattern {
        name: String,
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inertial_name() {
        let info =
            InertialFileInfo::parse("ChestAA.Brachio.CH2M.Run1.Biostamp.position.Fast.csv")
                .unwrap();
        assert_eq!(info.movement, Movement::ChestAA);
        assert_eq!(info.muscle, "Brachio");
        assert_eq!(info.subject, "CH2M");
        assert_eq!(info.run, "Run1");
        assert_eq!(info.speed_label, "Fast");
        assert_eq!(info.speed, Some(Speed::Fast));
    }

    #[test]
    fn test_parse_inertial_name_exactly_seven_fields() {
        let info = InertialFileInfo::parse("BicepC.Delt.S01.Run2.a.b.slow").unwrap();
        assert_eq!(info.movement, Movement::BicepC);
        assert_eq!(info.speed, Some(Speed::Slow));
    }

    #[test]
    fn test_inertial_name_with_too_few_fields_is_rejected() {
        let err = InertialFileInfo::parse("ChestAA.Brachio.CH2M.Run1.csv").unwrap_err();
        assert!(matches!(err, FileNameError::Pattern { .. }));
    }

    #[test]
    fn test_inertial_name_with_empty_field_is_rejected() {
        assert!(InertialFileInfo::parse("ChestAA..CH2M.Run1.a.b.Fast.csv").is_err());
    }

    #[test]
    fn test_inertial_unknown_speed_label_is_kept() {
        let info = InertialFileInfo::parse("ChestAA.Brachio.CH2M.Run1.a.b.Medium").unwrap();
        assert_eq!(info.speed, None);
        assert_eq!(info.speed_label, "Medium");
    }

    #[test]
    fn test_from_path_uses_base_name() {
        let path = Path::new("trials/ChestAA.Run1/ChestAA.Brachio.CH2M.Run1.x.y.Fast.csv");
        let info = InertialFileInfo::from_path(path).unwrap();
        assert_eq!(info.run, "Run1");
    }

    #[test]
    fn test_parse_optical_name() {
        let info = OpticalFileInfo::parse("ChestAA.Cam1.CH2M.Run1.MOCA.7:25:22.Slow.csv").unwrap();
        assert_eq!(info.movement, Movement::ChestAA);
        assert_eq!(info.speed, Some(Speed::Slow));
    }

    #[test]
    fn test_optical_speed_substring_fallback() {
        let info = OpticalFileInfo::parse("ChestAA_fastrun.csv").unwrap();
        assert_eq!(info.movement, Movement::Other("ChestAA_fastrun".to_string()));
        assert_eq!(info.speed, Some(Speed::Fast));
    }

    #[test]
    fn test_optical_empty_movement_is_rejected() {
        assert!(OpticalFileInfo::parse(".hidden.csv").is_err());
    }
}
