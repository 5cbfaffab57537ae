pub mod delete;
pub mod enter;
pub mod export;
pub mod init;
pub mod list;
pub mod results;
pub mod setup;
pub mod show;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;

use comarks_core::config::{load_config_from, ComarksConfig};
use comarks_core::store::{DirBackend, ExamRepository};

/// Global options shared by every command.
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

impl Context {
    /// Load the config, applying `--data-dir` on top.
    pub fn config(&self) -> Result<ComarksConfig> {
        let mut config = load_config_from(self.config_path.as_deref())?;
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        Ok(config)
    }

    /// Open the repository under the configured data directory.
    pub fn repository(&self) -> Result<(ComarksConfig, ExamRepository<DirBackend>)> {
        let config = self.config()?;
        tracing::debug!(data_dir = %config.data_dir.display(), "opening repository");
        let repo = ExamRepository::open_dir(config.data_dir.clone());
        Ok((config, repo))
    }
}
