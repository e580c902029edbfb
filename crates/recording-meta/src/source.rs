//! Recording start-time sources.

use std::path::{Path, PathBuf};

/// Something that knows when a recording started.
pub trait RecordingStartSource {
    /// Recording start of `media` as whole seconds since the Unix epoch (UTC).
    fn recording_start(&self, media: &Path) -> Result<i64, MediaError>;
}

/// A start instant known ahead of time, e.g. noted during the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedStart(pub i64);

impl RecordingStartSource for FixedStart {
    fn recording_start(&self, _media: &Path) -> Result<i64, MediaError> {
        Ok(self.0)
    }
}

/// Errors raised while reading recording metadata.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No '{name}' box in {path}")]
    MissingBox { path: PathBuf, name: &'static str },

    #[error("Malformed container {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("Creation time in {path} predates the Unix epoch")]
    BeforeUnixEpoch { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_start_ignores_media() {
        let source = FixedStart(1_658_789_494);
        assert_eq!(
            source.recording_start(Path::new("missing.mp4")).unwrap(),
            1_658_789_494
        );
    }
}
