//! Per-iteration max-|ΔSSH| diagnostic.

use std::fmt;

use iso_core::argmax_abs;
use serde::{Deserialize, Serialize};

use crate::correction::Correction;

/// Location and size of the largest SSH change in one iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxDeltaSsh {
    pub iteration: usize,
    pub cell: usize,
    pub delta_ssh: f64,
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub ssh: f64,
    pub land_ice_pressure: f64,
}

impl fmt::Display for MaxDeltaSsh {
    /// The single line written to `maxDeltaSSH_{iii}.log`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "deltaSSHMax: {}, lon/lat: {:.6} {:.6}, ssh: {}, landIcePressure: {}",
            general(self.delta_ssh),
            self.lon_deg,
            self.lat_deg,
            general(self.ssh),
            general(self.land_ice_pressure)
        )
    }
}

impl MaxDeltaSsh {
    pub fn log_file_name(&self) -> String {
        log_file_name(self.iteration)
    }
}

/// `maxDeltaSSH_000.log`, `maxDeltaSSH_001.log`, ...
pub fn log_file_name(iteration: usize) -> String {
    format!("maxDeltaSSH_{iteration:03}.log")
}

/// Summary of one completed iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationReport {
    pub iteration: usize,
    pub corrected_cells: usize,
    pub max_delta: Option<MaxDeltaSsh>,
}

/// Find the largest |ΔSSH| among adjustable cells still carrying land-ice
/// pressure after the correction. `None` when there is no such cell.
pub fn find_max_delta(iteration: usize, correction: &Correction) -> Option<MaxDeltaSsh> {
    let next = &correction.state;
    let candidates = next
        .adjustable_cells()
        .filter(|&c| next.land_ice_pressure[c] != 0.0);
    let (cell, delta_ssh) = argmax_abs(&correction.delta_ssh, candidates)?;
    Some(MaxDeltaSsh {
        iteration,
        cell,
        delta_ssh,
        lon_deg: next.lon_cell[cell].to_degrees(),
        lat_deg: next.lat_cell[cell].to_degrees(),
        ssh: next.ssh[cell],
        land_ice_pressure: next.land_ice_pressure[cell],
    })
}

/// Six significant digits, trailing zeros trimmed, exponent form when the
/// rounded exponent is outside `[-4, 6)`.
fn general(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{v}");
    }
    let rounded = format!("{v:.5e}");
    let (mantissa, e) = rounded.split_once('e').unwrap_or((&rounded, "0"));
    let exp: i32 = e.parse().unwrap_or(0);
    if (-4..6).contains(&exp) {
        let decimals = (5 - exp) as usize;
        trim_zeros(format!("{v:.decimals$}"))
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_zeros(mantissa.to_string()), exp.abs())
    }
}

fn trim_zeros(s: String) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
