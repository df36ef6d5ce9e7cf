//! Configuration loading for the CLI.

use crate::error::{CliError, Result};
use logkeeper_janitor::JanitorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG: &str = "config.json";

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Per-user configuration file: `~/.logkeeper/config.toml`.
pub fn user_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".logkeeper").join("config.toml"))
}

/// Pick the configuration file to load.
///
/// An explicit path always wins, even if it does not exist. Otherwise
/// `./config.json` is used when present, then `~/.logkeeper/config.toml`.
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    if local.is_file() {
        return Ok(local);
    }

    let user = user_config_path()?;
    if user.is_file() {
        return Ok(user);
    }

    Err(CliError::Config(format!(
        "no configuration file found (tried ./{} and {}); pass one with --config",
        LOCAL_CONFIG,
        user.display()
    )))
}

/// Parse configuration text, choosing the format by the file extension.
pub fn parse(path: &Path, contents: &str) -> Result<JanitorConfig> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let config = if is_toml {
        toml::from_str(contents)?
    } else {
        serde_json::from_str(contents)?
    };
    Ok(config)
}

/// Load and validate the configuration.
///
/// Returns the path it was read from along with the configuration.
pub fn load(explicit: Option<&Path>) -> Result<(PathBuf, JanitorConfig)> {
    let path = resolve_path(explicit)?;
    let contents = fs::read_to_string(&path).map_err(|e| {
        CliError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;

    let config = parse(&path, &contents)?;
    config.validate()?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok((path, config))
}
