mod config;

pub use config::{Config, PathsConfig, ServerConfig};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Default dataset file name.
pub const DATASET_FILE: &str = "energy_data.csv";
/// Default model artifact file name.
pub const MODEL_FILE: &str = "energy_model.json";
/// Default scaler artifact file name.
pub const SCALER_FILE: &str = "energy_scaler.json";

/// Returns the directory holding the config, dataset and artifacts.
///
/// `ECOURBAN_DATA_DIR` wins when set. Otherwise `~/.config/ecourban[-dev]/`,
/// picking the `-dev` variant when `ECOURBAN_ENV=dev`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("ECOURBAN_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("ECOURBAN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("ecourban-dev")
            } else {
                base_dir.join("ecourban")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// Replace `path` with `contents` via a sibling temp file and a rename, so
/// readers see either the old file or the new one, never a partial write.
///
/// # Errors
/// Returns an error if the parent directory cannot be created or the write
/// or rename fails. The temp file is removed on failure.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = parent.join(format!(".{file_name}.tmp"));

    let result = std::fs::write(&tmp, contents).and_then(|()| std::fs::rename(&tmp, path));
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

/// Locations of the dataset and the two trained artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dataset: PathBuf,
    pub model: PathBuf,
    pub scaler: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            dataset: dir.join(DATASET_FILE),
            model: dir.join(MODEL_FILE),
            scaler: dir.join(SCALER_FILE),
        }
    }

    /// Both artifacts are present on disk.
    pub fn artifacts_exist(&self) -> bool {
        self.model.exists() && self.scaler.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_dir_uses_default_names() {
        let paths = ArtifactPaths::in_dir(Path::new("/tmp/eco"));
        assert_eq!(paths.dataset, PathBuf::from("/tmp/eco/energy_data.csv"));
        assert_eq!(paths.model, PathBuf::from("/tmp/eco/energy_model.json"));
        assert_eq!(paths.scaler, PathBuf::from("/tmp/eco/energy_scaler.json"));
    }

    #[test]
    fn write_atomic_replaces_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("artifact.json");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");

        let names: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("artifact.json")]);
    }

    #[test]
    fn artifacts_exist_needs_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        assert!(!paths.artifacts_exist());
        std::fs::write(&paths.model, "{}").unwrap();
        assert!(!paths.artifacts_exist());
        std::fs::write(&paths.scaler, "{}").unwrap();
        assert!(paths.artifacts_exist());
    }
}
