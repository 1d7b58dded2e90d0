//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::{AuditConfig, AuditSettings};
use crate::error::{AuditError, Result};

/// File name looked up in the working directory.
pub const PROJECT_CONFIG: &str = "ocaudit.yml";

/// Find the config file to use.
///
/// Order:
/// 1. Explicit `--config` path (must exist)
/// 2. `./ocaudit.yml`
/// 3. `~/.config/ocaudit/config.yml`
pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(Some(path.to_path_buf()));
        }
        return Err(AuditError::ConfigValidationError {
            message: format!("config file {} does not exist", path.display()),
        });
    }

    let project = cwd.join(PROJECT_CONFIG);
    if project.is_file() {
        return Ok(Some(project));
    }

    Ok(dirs::config_dir()
        .map(|d| d.join("ocaudit").join("config.yml"))
        .filter(|p| p.is_file()))
}

/// Load and parse a single config file.
///
/// # Errors
///
/// Returns `ConfigParseError` if the YAML is invalid or has unknown fields.
pub fn load_config_file(path: &Path) -> Result<AuditConfig> {
    let content = fs::read_to_string(path)?;

    // An empty file is a valid, empty config.
    if content.trim().is_empty() {
        return Ok(AuditConfig::default());
    }

    serde_yaml::from_str(&content).map_err(|e| AuditError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Discover and load config, falling back to defaults when none exists.
pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<AuditConfig> {
    match discover(explicit, cwd)? {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            load_config_file(&path)
        }
        None => Ok(AuditConfig::default()),
    }
}

impl AuditSettings {
    /// Settings from a config file, with defaults for anything unset.
    pub fn from_config(config: AuditConfig) -> Self {
        let defaults = Self::default();
        Self {
            customer: config.customer.unwrap_or(defaults.customer),
            output_dir: config.output_dir.unwrap_or(defaults.output_dir),
            template: config.template,
            transport: config.transport.unwrap_or(defaults.transport),
            oc_binary: config.oc_binary.unwrap_or(defaults.oc_binary),
            delay_ms: config.delay_ms.unwrap_or(defaults.delay_ms),
            release_mirror: config.release_mirror.unwrap_or(defaults.release_mirror),
            skip: config.skip,
            only: Vec::new(),
            archive: None,
            create_archive: true,
            thresholds: config.thresholds,
        }
    }
}
