//! iso-app: service layer shared by the CLI.
//!
//! Owns the external collaborators (forward model, partitioner, mesh tools)
//! and sequences them into the test case's stages.

pub mod adjust;
pub mod collaborators;
pub mod error;
pub mod progress;
pub mod stages;
pub mod workdir;

pub use collaborators::{Collaborators, ProcessRunner, SystemRunner, ToolCommand};
pub use error::{AppError, AppResult};
pub use progress::{StageEvent, StageStep};
pub use stages::{
    RunStatus, StageRequest, build_forcing_file, load_config, process_geometry_file,
    run_initial_state, run_simulation, run_ssh_adjustment, run_test, status,
};

/// Whether this build can read and write NetCDF files.
pub fn netcdf_enabled() -> bool {
    iso_io::netcdf_enabled()
}
