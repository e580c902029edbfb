//! Column role resolution.
//!
//! Exports name their axis columns loosely ("Hand Pink X", "x (m)",
//! "Position Z"). Each role a track needs is resolved once, right after
//! load, to exactly one header. A role that matches nothing, or matches
//! more than one header, is rejected up front.
//!
//! A header carries an axis when one of its alphanumeric tokens is the
//! axis letter: "Hand Pink X" and "x (m)" carry X, "Box" does not.

use crate::table::Table;

/// Header of the absolute capture timestamp column.
pub const TIMESTAMP_COLUMN: &str = "Timestamp (microseconds)";

/// Header of the derived elapsed-seconds column on inertial tables.
pub const SECONDS_COLUMN: &str = "Seconds";

/// Spatial axis carried by a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Header token identifying the axis.
    pub fn token(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Lower-cased alphanumeric tokens of a header.
pub fn header_tokens(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Whether `name` carries `axis`.
pub fn carries_axis(name: &str, axis: Axis) -> bool {
    header_tokens(name).iter().any(|t| t == axis.token())
}

/// Resolve the single column carrying `axis`, optionally restricted to
/// headers containing `marker` (case-insensitive substring). Headers in
/// `exclude` never match.
pub fn resolve_axis(
    table: &Table,
    axis: Axis,
    marker: Option<&str>,
    exclude: &[&str],
) -> Result<String, ColumnError> {
    let marker = marker.map(str::to_lowercase);
    let mut candidates: Vec<String> = table
        .names()
        .iter()
        .filter(|name| !exclude.iter().any(|e| name.eq_ignore_ascii_case(e)))
        .filter(|name| {
            marker
                .as_deref()
                .map_or(true, |m| name.to_lowercase().contains(m))
        })
        .filter(|name| carries_axis(name, axis))
        .cloned()
        .collect();

    let role = match &marker {
        Some(m) => format!("{axis} axis of marker '{m}'"),
        None => format!("{axis} axis"),
    };

    match candidates.len() {
        1 => Ok(candidates.swap_remove(0)),
        0 => Err(ColumnError::Unmatched {
            role,
            available: table.names().to_vec(),
        }),
        _ => Err(ColumnError::Ambiguous { role, candidates }),
    }
}

/// Resolve the timestamp column header as spelled in the table.
pub fn resolve_timestamp(table: &Table) -> Result<String, ColumnError> {
    table
        .names()
        .iter()
        .find(|n| n.eq_ignore_ascii_case(TIMESTAMP_COLUMN))
        .cloned()
        .ok_or_else(|| ColumnError::Unmatched {
            role: "timestamp".to_string(),
            available: table.names().to_vec(),
        })
}

/// Columns backing an optical (marker) track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpticalColumns {
    pub timestamp: String,
    pub x: String,
    pub y: String,
}

impl OpticalColumns {
    /// Resolve the timestamp column and the X/Y columns of `marker`.
    pub fn resolve(table: &Table, marker: &str) -> Result<Self, ColumnError> {
        let timestamp = resolve_timestamp(table)?;
        let exclude = [timestamp.as_str()];
        Ok(Self {
            x: resolve_axis(table, Axis::X, Some(marker), &exclude)?,
            y: resolve_axis(table, Axis::Y, Some(marker), &exclude)?,
            timestamp,
        })
    }
}

/// Columns backing an inertial (wearable) track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InertialColumns {
    pub timestamp: String,
    pub x: String,
    pub y: String,
    pub z: String,
}

impl InertialColumns {
    /// Resolve the timestamp column and one column per axis.
    pub fn resolve(table: &Table) -> Result<Self, ColumnError> {
        let timestamp = resolve_timestamp(table)?;
        let exclude = [timestamp.as_str(), SECONDS_COLUMN];
        Ok(Self {
            x: resolve_axis(table, Axis::X, None, &exclude)?,
            y: resolve_axis(table, Axis::Y, None, &exclude)?,
            z: resolve_axis(table, Axis::Z, None, &exclude)?,
            timestamp,
        })
    }
}

/// Errors raised while resolving column roles.
#[derive(Debug, thiserror::Error)]
pub enum ColumnError {
    #[error("No column for {role}; available columns: {available:?}")]
    Unmatched {
        role: String,
        available: Vec<String>,
    },

    #[error("Several columns match {role}: {candidates:?}")]
    Ambiguous {
        role: String,
        candidates: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str]) -> Table {
        let mut text = headers.join(",");
        text.push('\n');
        text.push_str(&vec!["0"; headers.len()].join(","));
        text.push('\n');
        Table::from_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_header_tokens() {
        assert_eq!(header_tokens("Hand Pink X"), ["hand", "pink", "x"]);
        assert_eq!(header_tokens("x (m)"), ["x", "m"]);
        assert_eq!(header_tokens("Timestamp (microseconds)"), ["timestamp", "microseconds"]);
    }

    #[test]
    fn test_carries_axis_needs_whole_token() {
        assert!(carries_axis("Hand Pink Y", Axis::Y));
        assert!(!carries_axis("Body Lean", Axis::Y));
        assert!(!carries_axis("Box", Axis::X));
    }

    #[test]
    fn test_optical_columns_pick_marker_pair() {
        let t = table(&[
            "Frame #",
            "Shoulder Green X",
            "Shoulder Green Y",
            "Hand Pink X",
            "Hand Pink Y",
            "Timestamp (microseconds)",
        ]);
        let cols = OpticalColumns::resolve(&t, "HAND").unwrap();
        assert_eq!(cols.x, "Hand Pink X");
        assert_eq!(cols.y, "Hand Pink Y");
        assert_eq!(cols.timestamp, "Timestamp (microseconds)");
    }

    #[test]
    fn test_optical_columns_unknown_marker() {
        let t = table(&["Hand Pink X", "Hand Pink Y", "Timestamp (microseconds)"]);
        let err = OpticalColumns::resolve(&t, "elbow").unwrap_err();
        assert!(matches!(err, ColumnError::Unmatched { .. }));
    }

    #[test]
    fn test_ambiguous_marker_is_rejected() {
        let t = table(&[
            "Hand Pink X",
            "Hand Pink Y",
            "Hand Blue X",
            "Hand Blue Y",
            "Timestamp (microseconds)",
        ]);
        match OpticalColumns::resolve(&t, "hand").unwrap_err() {
            ColumnError::Ambiguous { candidates, .. } => {
                assert_eq!(candidates, ["Hand Pink X", "Hand Blue X"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_inertial_columns_skip_timestamp_and_seconds() {
        let t = table(&["Timestamp (microseconds)", "x (m)", "y (m)", "z (m)", "Seconds"]);
        let cols = InertialColumns::resolve(&t).unwrap();
        assert_eq!(cols.x, "x (m)");
        assert_eq!(cols.y, "y (m)");
        assert_eq!(cols.z, "z (m)");
    }

    #[test]
    fn test_missing_timestamp() {
        let t = table(&["x", "y", "z"]);
        assert!(matches!(
            InertialColumns::resolve(&t).unwrap_err(),
            ColumnError::Unmatched { ref role, .. } if role == "timestamp"
        ));
    }
}
