//! Iterative SSH / land-ice pressure adjustment.
//!
//! Provides:
//! - `IterationState`: the per-iteration initial condition
//! - correction rules for the `ssh` and `landIcePressure` modes
//! - `Equilibrator`: fixed-budget loop alternating forward-model runs and
//!   corrections, with a per-iteration max-|ΔSSH| diagnostic
//! - `ForwardModel` / `StateArchive` seams for the external model and
//!   durable iteration artifacts

pub mod correction;
pub mod diagnostics;
pub mod equilibrator;
pub mod error;
pub mod mode;
pub mod state;

pub use correction::{Correction, apply_correction};
pub use diagnostics::{IterationReport, MaxDeltaSsh, find_max_delta, log_file_name};
pub use equilibrator::{
    AdjustOutcome, Equilibrator, EquilibratorConfig, ForwardModel, MemoryArchive, Phase,
    StateArchive, equilibrate,
};
pub use error::{AdjustError, AdjustResult};
pub use mode::CorrectionMode;
pub use state::{IterationState, ModelOutput};
