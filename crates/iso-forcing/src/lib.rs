//! Time-varying land-ice forcing built from a single reference state.
//!
//! Draft and pressure are scaled per year by a user schedule normalized to
//! its first entry; the land-ice fraction is held at the reference value.

pub mod error;
pub mod schedule;
pub mod series;
pub mod xtime;

pub use error::{ForcingError, ForcingResult};
pub use schedule::ScalingSchedule;
pub use series::{ForcingSeries, ReferenceLandIce, build_forcing_series};
pub use xtime::{STR_LEN, year_timestamp};
