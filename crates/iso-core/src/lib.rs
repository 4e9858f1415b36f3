//! iso-core: shared foundation for the ISOMIP+ preparation workspace.
//!
//! Contains:
//! - error (shared error types)
//! - numeric (masked argmax)
//! - units (uom SI types + constructors + hydrostatic helpers)
//! - grid (named 2-D fields with descriptive metadata)

pub mod error;
pub mod grid;
pub mod numeric;
pub mod units;

pub use error::{IsoError, IsoResult};
pub use grid::{AttrValue, Attribute, GridField};
pub use numeric::*;
pub use units::*;
