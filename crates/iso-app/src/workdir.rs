//! File placement inside a test-case work directory.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::error::{AppError, AppResult};

/// The state file the model reads at start-up.
pub const INIT_FILE: &str = "init.nc";
/// Model output read back by the adjustment loop.
pub const OUTPUT_SSH_FILE: &str = "output_ssh.nc";
pub const FORCING_FILE: &str = "land_ice_forcing.nc";

/// Make `link` (inside `dir`) refer to the sibling file `target`.
///
/// A symlink with a relative target on unix, a copy elsewhere. Whatever
/// was at `link` before is replaced.
pub fn point_to(dir: &Path, link: &str, target: &str) -> AppResult<()> {
    let link_path = dir.join(link);
    if !dir.join(target).exists() {
        return Err(AppError::MissingInput {
            path: dir.join(target),
        });
    }
    match fs::symlink_metadata(&link_path) {
        Ok(_) => fs::remove_file(&link_path)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    link_file(dir, &link_path, target)?;
    debug!(link, target, "re-pointed");
    Ok(())
}

#[cfg(unix)]
fn link_file(_dir: &Path, link_path: &Path, target: &str) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link_path)
}

#[cfg(not(unix))]
fn link_file(dir: &Path, link_path: &Path, target: &str) -> io::Result<()> {
    fs::copy(dir.join(target), link_path).map(|_| ())
}

/// Error unless `dir/name` exists.
pub fn require(dir: &Path, name: &str) -> AppResult<()> {
    let path = dir.join(name);
    if path.exists() {
        Ok(())
    } else {
        Err(AppError::MissingInput { path })
    }
}
