//! iso-project: test-case configuration, validation and namelist updates.

pub mod namelist;
pub mod schema;
pub mod validate;

pub use namelist::{UnmatchedKey, apply_overrides, update_namelist};
pub use schema::*;
pub use validate::{ValidationError, validate_config};

use std::path::{Path, PathBuf};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Namelist key '{key}' not found in {}", path.display())]
    NamelistKey { key: String, path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<Config> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn from_yaml_str(content: &str) -> ProjectResult<Config> {
    let config: Config = serde_yaml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

impl Config {
    /// User namelist overrides in file order, rendered as namelist values.
    pub fn namelist_overrides(&self) -> Vec<(&str, String)> {
        self.namelist
            .iter()
            .filter_map(|(k, v)| k.as_str().map(|k| (k, namelist_value(v))))
            .collect()
    }

    /// Overrides for one model stage: the user's entries followed by the
    /// derived PIO settings, plus the forcing cycle length for the
    /// production run.
    pub fn stage_overrides(&self, stage: Stage) -> Vec<(&str, String)> {
        let mut out = self.namelist_overrides();
        let r = self.execution.resources(stage);
        out.push(("config_pio_num_iotasks", r.pio_tasks.to_string()));
        out.push(("config_pio_stride", r.pio_stride().to_string()));
        if stage == Stage::Simulation {
            out.push((
                "config_time_varying_land_ice_forcing_cycle_duration",
                format!("'{:04}-00-00_00:00:00'", self.forcing.scaling.len()),
            ));
        }
        out
    }
}
