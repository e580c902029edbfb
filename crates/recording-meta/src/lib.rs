//! KineSync Recording Metadata
//!
//! Recovers absolute timing for video marker exports, which only number
//! their frames:
//! - **Start sources:** the recording start instant, either given directly
//!   or read from the video container's creation time
//! - **Stamping:** synthesizing a per-frame epoch timestamp column from the
//!   start instant and the camera frame rate

pub mod mp4;
pub mod source;
pub mod stamp;

pub use mp4::Mp4CreationTime;
pub use source::{FixedStart, MediaError, RecordingStartSource};
pub use stamp::{stamp_frames, stamped_path, StampError};
