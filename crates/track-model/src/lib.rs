//! KineSync Track Model
//!
//! Defines the data contracts shared by both capture systems:
//! - **Table:** CSV telemetry loaded into equally long numeric columns
//! - **Columns:** Resolution of the axis/timestamp columns a track needs
//! - **File info:** Trial metadata parsed from recording file names
//! - **Series:** Raw and adjusted time/position series of one track
//!
//! Positions are in meters with up positive; timestamps are epoch
//! microseconds until a track is rebased onto a shared reference.

pub mod columns;
pub mod file_info;
pub mod movement;
pub mod series;
pub mod table;

pub use columns::*;
pub use file_info::*;
pub use movement::*;
pub use series::*;
pub use table::*;
