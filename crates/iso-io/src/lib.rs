//! iso-io: reading and writing the ocean model's self-describing array
//! files.
//!
//! The NetCDF backend is compiled in with the `netcdf` feature (it links
//! against the system libnetcdf). Without it every file operation returns
//! [`IoError::FeatureDisabled`]; the layout helpers are always available.

pub mod error;
pub mod layout;
#[cfg(feature = "netcdf")]
mod nc;

use std::path::Path;

use iso_adjust::{IterationState, ModelOutput};
use iso_forcing::{ForcingSeries, ReferenceLandIce};
use iso_geometry::{ProcessedGeometry, RawGeometry};

pub use error::{IoError, IoResult};
pub use layout::iteration_file_name;

/// Whether this build can touch NetCDF files.
pub const fn netcdf_enabled() -> bool {
    cfg!(feature = "netcdf")
}

macro_rules! dispatch {
    ($name:ident ( $($arg:ident),* )) => {{
        #[cfg(feature = "netcdf")]
        {
            nc::$name($($arg),*)
        }
        #[cfg(not(feature = "netcdf"))]
        {
            $(let _ = $arg;)*
            Err(IoError::FeatureDisabled)
        }
    }};
}

/// Read the benchmark geometry (`x`, `y` and six `(y, x)` fields).
pub fn read_raw_geometry(path: &Path) -> IoResult<RawGeometry> {
    dispatch!(read_raw_geometry(path))
}

/// Write the processed geometry, copying each field's attributes.
pub fn write_processed_geometry(path: &Path, geometry: &ProcessedGeometry) -> IoResult<()> {
    dispatch!(write_processed_geometry(path, geometry))
}

/// Read the adjustable fields of an initial-state file.
pub fn read_iteration_state(path: &Path) -> IoResult<IterationState> {
    dispatch!(read_iteration_state(path))
}

/// Overwrite SSH, draft, pressure and layer thickness in an existing
/// initial-state file.
pub fn write_iteration_state(path: &Path, state: &IterationState) -> IoResult<()> {
    dispatch!(write_iteration_state(path, state))
}

/// Final-time SSH and top-layer density from a model output file.
pub fn read_model_output(path: &Path) -> IoResult<ModelOutput> {
    dispatch!(read_model_output(path))
}

pub fn read_reference_land_ice(path: &Path) -> IoResult<ReferenceLandIce> {
    dispatch!(read_reference_land_ice(path))
}

/// Write a forcing file in 64-bit offset format with an unlimited `Time`.
pub fn write_forcing_series(path: &Path, series: &ForcingSeries) -> IoResult<()> {
    dispatch!(write_forcing_series(path, series))
}

pub fn set_global_attribute(path: &Path, name: &str, value: &str) -> IoResult<()> {
    dispatch!(set_global_attribute(path, name, value))
}

/// Copy a whole state file, e.g. `init{i}.nc` to `init{i+1}.nc`.
pub fn copy_state_file(from: &Path, to: &Path) -> IoResult<()> {
    std::fs::copy(from, to)?;
    Ok(())
}
