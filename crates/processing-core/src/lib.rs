//! KineSync Processing Core
//!
//! Turns raw capture exports into comparable displacement tracks:
//! - **Optical tracks:** marker pixels calibrated to meters
//! - **Inertial tracks:** wearable positions projected to vertical/horizontal
//! - **Peak detection:** repetition peaks under per-movement thresholds
//! - **Alignment:** common time base and optional amplitude registration
//!
//! Loading reads CSV through `kinesync-track-model`; everything after that is
//! pure computation on in-memory series.

pub mod align;
pub mod calibration;
pub mod inertial;
pub mod optical;
pub mod peaks;
pub mod track;

pub use align::{aligned_rows, AlignedRow, Aligner, AlignmentPlan, AlignmentReport};
pub use calibration::{Calibration, CalibrationTable};
pub use inertial::InertialTrack;
pub use optical::{OpticalOptions, OpticalTrack};
pub use peaks::{find_peaks, PeakParams, PeakPolicy, PeakSet};
pub use track::{Track, TrackError};
