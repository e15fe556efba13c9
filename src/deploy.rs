//! Copy a configuration onto the keypad's USB mass-storage volume

use crate::config::Config;
use crate::error::DeployError;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Volume label the keypad firmware mounts as
pub const VOLUME_LABEL: &str = "CIRCUITPY";

/// File name the firmware reads at boot
pub const CONFIG_FILE: &str = "config.json";

/// Places a removable volume labelled [`VOLUME_LABEL`] usually shows up
pub fn candidate_mounts(user: Option<&str>) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(user) = user {
        roots.push(Path::new("/media").join(user));
        roots.push(Path::new("/run/media").join(user));
    }
    roots.push(PathBuf::from("/media"));
    roots.push(PathBuf::from("/Volumes"));
    roots.into_iter().map(|r| r.join(VOLUME_LABEL)).collect()
}

/// First candidate that exists as a directory
pub fn find_volume_in(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.is_dir()).cloned()
}

/// Look for the keypad in the usual mount locations
pub fn find_volume() -> Option<PathBuf> {
    let user = std::env::var("USER").ok();
    let candidates = candidate_mounts(user.as_deref());
    debug!("Looking for {VOLUME_LABEL} in {candidates:?}");
    find_volume_in(&candidates)
}

/// Validate `source`, then write it to `<volume>/config.json`
///
/// The file is written beside the target and renamed over it so the
/// firmware never sees a half-written configuration.
pub fn deploy(source: &Path, volume: Option<&Path>) -> Result<(PathBuf, Config), DeployError> {
    let config = Config::load(source)?;

    let volume = match volume {
        Some(v) => v.to_path_buf(),
        None => find_volume().ok_or(DeployError::NoVolume)?,
    };
    if !volume.is_dir() {
        return Err(DeployError::NotADirectory(volume));
    }

    let target = volume.join(CONFIG_FILE);
    let staging = volume.join(format!(".{CONFIG_FILE}.tmp"));
    std::fs::copy(source, &staging).map_err(|source| DeployError::Write {
        path: staging.clone(),
        source,
    })?;
    if let Err(source) = std::fs::rename(&staging, &target) {
        if let Err(e) = std::fs::remove_file(&staging) {
            warn!("Failed to remove {}: {e}", staging.display());
        }
        return Err(DeployError::Write {
            path: target,
            source,
        });
    }

    info!("Deployed {} to {}", source.display(), target.display());
    Ok((target, config))
}
