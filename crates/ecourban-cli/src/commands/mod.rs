pub mod config;
pub mod evaluate;
pub mod generate;
pub mod predict;
pub mod train;

use std::path::PathBuf;

use ecourban_core::storage::data_dir;
use ecourban_core::{ArtifactPaths, Config};

/// Data directory, its config and the resolved artifact paths.
pub struct Workspace {
    pub dir: PathBuf,
    pub config: Config,
    pub paths: ArtifactPaths,
}

impl Workspace {
    /// Config failures surface as [`ecourban_core::ForecastError::Config`].
    pub fn open() -> ecourban_core::Result<Self> {
        let dir = data_dir()?;
        let config = Config::load_in(&dir)?;
        let paths = config.artifact_paths(&dir);
        Ok(Self { dir, config, paths })
    }
}
