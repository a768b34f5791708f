use crate::core::models::site::CandidateColumns;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{param}': {reason}")]
    InvalidValue { param: &'static str, reason: String },
}

/// How the aggregator lines up the shape table with the conservation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairingMode {
    /// Row `i` pairs with row `i`; the longer table is truncated with a warning.
    #[default]
    Positional,
    /// Row counts and transcript ids must agree row for row.
    Strict,
}

/// Where each stage reads its inputs and writes its outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDirectories {
    pub features: PathBuf,
    pub conservation: PathBuf,
    pub features_conservation: PathBuf,
    pub shape_data: PathBuf,
    pub parsed_shape: PathBuf,
    pub features_cons_shape: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub directories: StageDirectories,
    pub use_caching: bool,
    pub workers: usize,
    pub columns: CandidateColumns,
    pub pairing: PairingMode,
}

#[derive(Default)]
pub struct EngineConfigBuilder {
    features: Option<PathBuf>,
    conservation: Option<PathBuf>,
    features_conservation: Option<PathBuf>,
    shape_data: Option<PathBuf>,
    parsed_shape: Option<PathBuf>,
    features_cons_shape: Option<PathBuf>,
    use_caching: Option<bool>,
    workers: Option<usize>,
    columns: Option<CandidateColumns>,
    pairing: Option<PairingMode>,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn features_dir(mut self, path: PathBuf) -> Self {
        self.features = Some(path);
        self
    }
    pub fn conservation_dir(mut self, path: PathBuf) -> Self {
        self.conservation = Some(path);
        self
    }
    pub fn features_conservation_dir(mut self, path: PathBuf) -> Self {
        self.features_conservation = Some(path);
        self
    }
    pub fn shape_data_dir(mut self, path: PathBuf) -> Self {
        self.shape_data = Some(path);
        self
    }
    pub fn parsed_shape_dir(mut self, path: PathBuf) -> Self {
        self.parsed_shape = Some(path);
        self
    }
    pub fn features_cons_shape_dir(mut self, path: PathBuf) -> Self {
        self.features_cons_shape = Some(path);
        self
    }
    pub fn directories(self, dirs: StageDirectories) -> Self {
        self.features_dir(dirs.features)
            .conservation_dir(dirs.conservation)
            .features_conservation_dir(dirs.features_conservation)
            .shape_data_dir(dirs.shape_data)
            .parsed_shape_dir(dirs.parsed_shape)
            .features_cons_shape_dir(dirs.features_cons_shape)
    }
    pub fn use_caching(mut self, enabled: bool) -> Self {
        self.use_caching = Some(enabled);
        self
    }
    pub fn workers(mut self, n: usize) -> Self {
        self.workers = Some(n);
        self
    }
    pub fn columns(mut self, columns: CandidateColumns) -> Self {
        self.columns = Some(columns);
        self
    }
    pub fn pairing(mut self, mode: PairingMode) -> Self {
        self.pairing = Some(mode);
        self
    }

    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let directories = StageDirectories {
            features: self
                .features
                .ok_or(ConfigError::MissingParameter("features"))?,
            conservation: self
                .conservation
                .ok_or(ConfigError::MissingParameter("conservation"))?,
            features_conservation: self
                .features_conservation
                .ok_or(ConfigError::MissingParameter("features_conservation"))?,
            shape_data: self
                .shape_data
                .ok_or(ConfigError::MissingParameter("shape_data"))?,
            parsed_shape: self
                .parsed_shape
                .ok_or(ConfigError::MissingParameter("parsed_shape"))?,
            features_cons_shape: self
                .features_cons_shape
                .ok_or(ConfigError::MissingParameter("features_cons_shape"))?,
        };

        let workers = self.workers.ok_or(ConfigError::MissingParameter("workers"))?;
        if workers == 0 {
            return Err(ConfigError::InvalidValue {
                param: "workers",
                reason: "at least one worker is required".to_string(),
            });
        }

        Ok(EngineConfig {
            directories,
            use_caching: self.use_caching.unwrap_or(true),
            workers,
            columns: self.columns.unwrap_or_default(),
            pairing: self.pairing.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn directories(root: &Path) -> StageDirectories {
        StageDirectories {
            features: root.join("features"),
            conservation: root.join("conservation"),
            features_conservation: root.join("features_conservation"),
            shape_data: root.join("shape_data"),
            parsed_shape: root.join("parsed_shape"),
            features_cons_shape: root.join("features_cons_shape"),
        }
    }

    #[test]
    fn build_applies_defaults_for_optional_settings() {
        let config = EngineConfigBuilder::new()
            .directories(directories(Path::new("/data")))
            .workers(4)
            .build()
            .unwrap();

        assert!(config.use_caching);
        assert_eq!(config.workers, 4);
        assert_eq!(config.pairing, PairingMode::Positional);
        assert_eq!(config.columns, CandidateColumns::default());
        assert_eq!(config.directories.shape_data, Path::new("/data/shape_data"));
    }

    #[test]
    fn build_fails_when_a_directory_is_missing() {
        let result = EngineConfigBuilder::new()
            .features_dir("/data/features".into())
            .workers(1)
            .build();
        assert_eq!(result, Err(ConfigError::MissingParameter("conservation")));
    }

    #[test]
    fn build_rejects_zero_workers() {
        let result = EngineConfigBuilder::new()
            .directories(directories(Path::new("/data")))
            .workers(0)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { param: "workers", .. })
        ));
    }
}
