//! comarks configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level comarks configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComarksConfig {
    /// Directory holding the stored exam and record documents.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Minimum overall percentage counted as a pass.
    #[serde(default = "default_pass_percentage")]
    pub pass_percentage: u32,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./comarks-data")
}

fn default_pass_percentage() -> u32 {
    40
}

impl Default for ComarksConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            pass_percentage: default_pass_percentage(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `comarks.toml` in the current directory
/// 2. `~/.config/comarks/config.toml`
///
/// Environment variable override: `COMARKS_DATA_DIR`.
pub fn load_config() -> Result<ComarksConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ComarksConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("comarks.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => ComarksConfig::default(),
    };

    if let Ok(dir) = std::env::var("COMARKS_DATA_DIR") {
        if !dir.is_empty() {
            config.data_dir = PathBuf::from(dir);
        }
    }

    Ok(config)
}

/// Parse a config document, expanding `${VAR}` references in `data_dir`.
pub fn parse_config(content: &str) -> Result<ComarksConfig> {
    let mut config: ComarksConfig = toml::from_str(content)?;
    config.data_dir = PathBuf::from(resolve_env_vars(&config.data_dir.to_string_lossy()));
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("comarks"))
}
