//! Content hashing of the configuration a stage ran with.

use iso_project::Config;
use sha2::{Digest, Sha256};

pub fn compute_config_hash(config: &Config) -> String {
    let mut hasher = Sha256::new();
    let config_json = serde_json::to_string(config).unwrap_or_default();
    hasher.update(config_json.as_bytes());
    hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
    format!("{:x}", hasher.finalize())
}
