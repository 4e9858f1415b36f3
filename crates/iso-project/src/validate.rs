//! Configuration validation, run before any model or file work.

use iso_adjust::CorrectionMode;
use iso_forcing::ScalingSchedule;
use iso_geometry::GeometryParams;

use crate::schema::{Config, Stage};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing value: {field}")]
    Missing { field: String },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },
}

fn invalid(field: &str, value: impl ToString, reason: impl ToString) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_config(config: &Config) -> Result<(), ValidationError> {
    validate_execution(config)?;

    config.correction_mode()?;
    if config.ssh_adjustment.iteration_count == 0 {
        return Err(invalid(
            "ssh_adjustment.iteration_count",
            0,
            "at least one iteration is required",
        ));
    }

    config.schedule()?;
    config.geometry_params()?;
    Ok(())
}

fn validate_execution(config: &Config) -> Result<(), ValidationError> {
    let exec = &config.execution;
    if exec.parallel_executable.trim().is_empty() {
        return Err(ValidationError::Missing {
            field: "execution.parallel_executable".to_string(),
        });
    }
    if exec.omp_threads == 0 {
        return Err(invalid("execution.omp_threads", 0, "must be at least 1"));
    }
    for stage in [
        Stage::Init,
        Stage::SshAdjustment,
        Stage::Simulation,
        Stage::Test,
    ] {
        let r = exec.resources(stage);
        if r.cores == 0 {
            return Err(invalid(
                &format!("execution.{stage}.cores"),
                0,
                "must be at least 1",
            ));
        }
        if r.pio_tasks == 0 {
            return Err(invalid(
                &format!("execution.{stage}.pio_tasks"),
                0,
                "must be at least 1",
            ));
        }
        if r.pio_tasks > r.cores {
            return Err(invalid(
                &format!("execution.{stage}.pio_tasks"),
                r.pio_tasks,
                format!("exceeds cores ({})", r.cores),
            ));
        }
    }
    for (i, key) in config.namelist.keys().enumerate() {
        if key.as_str().is_none() {
            return Err(invalid(
                &format!("namelist[{i}]"),
                format!("{key:?}"),
                "namelist keys must be strings",
            ));
        }
    }
    Ok(())
}

impl Config {
    pub fn correction_mode(&self) -> Result<CorrectionMode, ValidationError> {
        self.ssh_adjustment
            .variable_to_modify
            .parse::<CorrectionMode>()
            .map_err(|e| invalid("ssh_adjustment.variable_to_modify", &self.ssh_adjustment.variable_to_modify, e))
    }

    pub fn schedule(&self) -> Result<ScalingSchedule, ValidationError> {
        ScalingSchedule::new(self.forcing.resolved_years(), self.forcing.scaling.clone())
            .map_err(|e| invalid("forcing", format!("{:?}", self.forcing.scaling), e))
    }

    /// Geometry parameters for the initial state, scaled by the first
    /// (unnormalized) scale factor.
    pub fn geometry_params(&self) -> Result<GeometryParams, ValidationError> {
        let scale = self
            .forcing
            .scaling
            .first()
            .copied()
            .ok_or_else(|| ValidationError::Missing {
                field: "forcing.scaling".to_string(),
            })?;
        let params = GeometryParams {
            filter_sigma: self.geometry.filter_sigma,
            min_ice_thickness: self.geometry.min_ice_thickness,
            scale,
        };
        params
            .validate()
            .map_err(|e| invalid("geometry", format!("{params:?}"), e))?;
        Ok(params)
    }
}
