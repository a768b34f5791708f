use crate::error::{CliError, Result};
use mirsight::core::models::site::CandidateColumns;
use mirsight::engine::config::PairingMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSettings {
    pub use_caching: Option<bool>,
    pub max_cores: Option<i64>,
    pub pairing: Option<PairingMode>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileDirectories {
    pub features: Option<PathBuf>,
    pub conservation: Option<PathBuf>,
    pub features_conservation: Option<PathBuf>,
    pub shape_data: Option<PathBuf>,
    pub parsed_shape: Option<PathBuf>,
    pub features_cons_shape: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub settings: Option<FileSettings>,
    pub directories: Option<FileDirectories>,
    pub columns: Option<CandidateColumns>,
    /// Directory relative paths in the file are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Resolves a directory given in the file against the file's own location.
    pub fn resolve(&self, path: PathBuf) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}
