//! Movement, speed, and track-kind labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Movement performed during a trial.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Movement {
    /// Chest-level arm abduction/adduction.
    ChestAA,
    /// Shoulder flexion/extension.
    ShoulderFE,
    /// Shoulder abduction/adduction.
    ShoulderAA,
    /// Bicep curl.
    BicepC,
    /// Finger pinch.
    FingerP,
    /// Body lean.
    BodyLean,
    /// Any label not in the list above, kept as written.
    Other(String),
}

impl Movement {
    const KNOWN: [Movement; 6] = [
        Movement::ChestAA,
        Movement::ShoulderFE,
        Movement::ShoulderAA,
        Movement::BicepC,
        Movement::FingerP,
        Movement::BodyLean,
    ];

    /// Canonical label, as used in recording file names.
    pub fn label(&self) -> &str {
        match self {
            Self::ChestAA => "ChestAA",
            Self::ShoulderFE => "ShoulderFE",
            Self::ShoulderAA => "ShoulderAA",
            Self::BicepC => "BicepC",
            Self::FingerP => "FingerP",
            Self::BodyLean => "BodyLean",
            Self::Other(label) => label,
        }
    }
}

impl FromStr for Movement {
    type Err = std::convert::Infallible;

    /// Case-insensitive; unknown labels become [`Movement::Other`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::KNOWN
            .iter()
            .find(|m| m.label().eq_ignore_ascii_case(s))
            .cloned()
            .unwrap_or_else(|| Self::Other(s.to_string())))
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Repetition speed of a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    Fast,
    Slow,
}

impl Speed {
    /// Parse a speed label, ignoring case.
    pub fn parse(label: &str) -> Option<Self> {
        if label.eq_ignore_ascii_case("fast") {
            Some(Self::Fast)
        } else if label.eq_ignore_ascii_case("slow") {
            Some(Self::Slow)
        } else {
            None
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fast => "fast",
            Self::Slow => "slow",
        })
    }
}

/// Which capture system produced a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    /// Video marker tracking (MOCA).
    Optical,
    /// Wearable sensor (Biostamp).
    Inertial,
}

impl TrackKind {
    /// Parse a track-kind label, ignoring case. Accepts the device names too.
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "optical" | "moca" => Some(Self::Optical),
            "inertial" | "biostamp" => Some(Self::Inertial),
            _ => None,
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Optical => "optical",
            Self::Inertial => "inertial",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_parse_is_case_insensitive() {
        assert_eq!("chestaa".parse::<Movement>().unwrap(), Movement::ChestAA);
        assert_eq!("ShoulderFE".parse::<Movement>().unwrap(), Movement::ShoulderFE);
        assert_eq!(
            "Wave".parse::<Movement>().unwrap(),
            Movement::Other("Wave".to_string())
        );
        assert_eq!(Movement::Other("Wave".to_string()).to_string(), "Wave");
    }

    #[test]
    fn test_speed_parse() {
        assert_eq!(Speed::parse("FAST"), Some(Speed::Fast));
        assert_eq!(Speed::parse("slow"), Some(Speed::Slow));
        assert_eq!(Speed::parse("medium"), None);
    }

    #[test]
    fn test_track_kind_aliases() {
        assert_eq!(TrackKind::parse("MOCA"), Some(TrackKind::Optical));
        assert_eq!(TrackKind::parse("inertial"), Some(TrackKind::Inertial));
        assert_eq!(TrackKind::parse("gps"), None);
    }
}
