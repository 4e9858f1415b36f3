//! Which field the adjustment loop corrects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdjustError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectionMode {
    /// Replace SSH with the model's final SSH and stretch the layers.
    #[serde(rename = "ssh")]
    Ssh,
    /// Convert the SSH change into a land-ice pressure change.
    #[serde(rename = "landIcePressure")]
    LandIcePressure,
}

impl CorrectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CorrectionMode::Ssh => "ssh",
            CorrectionMode::LandIcePressure => "landIcePressure",
        }
    }
}

impl fmt::Display for CorrectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrectionMode {
    type Err = AdjustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ssh" => Ok(CorrectionMode::Ssh),
            "landIcePressure" => Ok(CorrectionMode::LandIcePressure),
            other => Err(AdjustError::UnsupportedMode {
                mode: other.to_string(),
            }),
        }
    }
}
