use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::table::TableError;
use crate::core::io::traits::TrackError;
use crate::core::models::site::SiteError;
use crate::core::models::table::TableShapeError;
use crate::core::windows::ScoreParseError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Track(#[from] TrackError),

    #[error("Invalid candidate table '{path}': {source}")]
    Sites {
        path: String,
        #[source]
        source: SiteError,
    },

    #[error("Missing column in '{path}': {source}")]
    Column {
        path: String,
        #[source]
        source: TableShapeError,
    },

    #[error("Invalid score in track '{track}' for transcript '{accession}': {source}")]
    Score {
        track: String,
        accession: String,
        #[source]
        source: ScoreParseError,
    },

    #[error("Invalid value '{value}' in column '{column}' on row {row} of '{path}'")]
    InvalidCell {
        path: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("Directory '{path}' could not be accessed: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Tables for '{file}' cannot be paired: {reason}")]
    Pairing { file: String, reason: String },

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("Processing '{file}' failed: {source}")]
    Task {
        file: String,
        #[source]
        source: Box<EngineError>,
    },

    #[error("Stage '{stage}' failed for {count} file(s); first failure: {first}")]
    Stage {
        stage: &'static str,
        count: usize,
        first: Box<EngineError>,
    },
}
