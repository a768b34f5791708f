use mirsight::engine::config::EngineConfig;
use std::path::PathBuf;

pub struct AppConfig {
    pub config_file: Option<PathBuf>,
    pub engine: EngineConfig,
}
