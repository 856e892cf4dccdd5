//! Agent roster loading.
//!
//! A roster is a directory of `*.json` files, one [`AgentProfile`] per
//! file. Profiles are returned sorted by file name so registration order is
//! stable across runs.

use std::collections::BTreeSet;
use std::path::Path;

use hamlet_types::AgentProfile;
use validator::Validate;

use crate::config::ConfigError;

/// Read and validate every profile in `dir`.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the directory is missing, holds no
/// profiles, a file does not parse, a profile fails validation, or two
/// profiles share an id. Returns [`ConfigError::Io`] on read failures.
pub fn load_roster(dir: &Path) -> Result<Vec<AgentProfile>, ConfigError> {
    if !dir.is_dir() {
        return Err(ConfigError::Invalid {
            reason: format!("roster directory {} does not exist", dir.display()),
        });
    }
    let io = |source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io)? {
        let path = entry.map_err(io)?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut seen = BTreeSet::new();
    let mut profiles = Vec::with_capacity(paths.len());
    for path in paths {
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let profile: AgentProfile =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Invalid {
                reason: format!("{}: {e}", path.display()),
            })?;
        profile.validate().map_err(|e| ConfigError::Invalid {
            reason: format!("{}: {e}", path.display()),
        })?;
        if !seen.insert(profile.id.clone()) {
            return Err(ConfigError::Invalid {
                reason: format!("{}: duplicate agent id {}", path.display(), profile.id),
            });
        }
        tracing::debug!(agent_id = %profile.id, path = %path.display(), "Loaded profile");
        profiles.push(profile);
    }

    if profiles.is_empty() {
        return Err(ConfigError::Invalid {
            reason: format!("roster directory {} holds no profiles", dir.display()),
        });
    }
    Ok(profiles)
}
