use super::shape_sources;
use crate::core::io::table::TsvTable;
use crate::core::models::score::{MISSING_MARKER, WindowedScore};
use crate::core::models::table::CandidateTable;
use crate::engine::config::{EngineConfig, PairingMode};
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::scheduler::{BatchReport, BatchScheduler, ensure_dir, list_files};
use std::path::Path;
use tracing::{info, instrument, warn};

pub const STAGE: &str = "Shape aggregation";

pub const SEED_COLUMN: &str = "shape_seed";
pub const SUP_COLUMN: &str = "shape_sup";

/// Fuses the per-source reactivity columns into one seed and one supplementary value.
pub struct SourceAggregator<'a> {
    sources: &'a [String],
    pairing: PairingMode,
    id_column: &'a str,
}

impl<'a> SourceAggregator<'a> {
    pub fn new(sources: &'a [String], pairing: PairingMode, id_column: &'a str) -> Self {
        Self {
            sources,
            pairing,
            id_column,
        }
    }

    /// Appends `shape_seed` and `shape_sup` to `features` and returns the number of
    /// paired rows. Under positional pairing, rows without a partner are dropped.
    pub fn aggregate(
        &self,
        features: &mut CandidateTable,
        shape: &CandidateTable,
        origin: &str,
    ) -> Result<usize, EngineError> {
        let seed_columns = self.source_columns(shape, "seed", origin)?;
        let sup_columns = self.source_columns(shape, "sup", origin)?;
        let paired = self.paired_rows(features, shape, origin)?;

        let fused = (0..paired)
            .map(|row| {
                Ok((
                    fuse(shape, row, &seed_columns, origin)?,
                    fuse(shape, row, &sup_columns, origin)?,
                ))
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        features.truncate(paired);
        let seed = features.reset_column(SEED_COLUMN, MISSING_MARKER);
        let sup = features.reset_column(SUP_COLUMN, MISSING_MARKER);
        for (row, (seed_score, sup_score)) in fused.into_iter().enumerate() {
            features.set_cell(row, seed, seed_score.to_string());
            features.set_cell(row, sup, sup_score.to_string());
        }
        Ok(paired)
    }

    fn source_columns(
        &self,
        shape: &CandidateTable,
        suffix: &str,
        origin: &str,
    ) -> Result<Vec<usize>, EngineError> {
        self.sources
            .iter()
            .map(|source| {
                shape
                    .column_index(&format!("{source}_{suffix}"))
                    .map_err(|source| EngineError::Column {
                        path: origin.to_string(),
                        source,
                    })
            })
            .collect()
    }

    fn paired_rows(
        &self,
        features: &CandidateTable,
        shape: &CandidateTable,
        origin: &str,
    ) -> Result<usize, EngineError> {
        let paired = features.len().min(shape.len());
        match self.pairing {
            PairingMode::Positional => {
                if features.len() != shape.len() {
                    warn!(
                        file = origin,
                        features = features.len(),
                        shape = shape.len(),
                        "Row counts differ; pairing positionally and dropping unpaired rows."
                    );
                }
                Ok(paired)
            }
            PairingMode::Strict => {
                if features.len() != shape.len() {
                    return Err(EngineError::Pairing {
                        file: origin.to_string(),
                        reason: format!(
                            "{} feature rows but {} shape rows",
                            features.len(),
                            shape.len()
                        ),
                    });
                }

                let column_error = |source| EngineError::Column {
                    path: origin.to_string(),
                    source,
                };
                let feature_ids = features.column_index(self.id_column).map_err(column_error)?;
                let shape_ids = shape.column_index(self.id_column).map_err(column_error)?;

                let mismatch = features
                    .column(feature_ids)
                    .zip(shape.column(shape_ids))
                    .enumerate()
                    .find(|(_, (a, b))| a != b);
                if let Some((row, (a, b))) = mismatch {
                    return Err(EngineError::Pairing {
                        file: origin.to_string(),
                        reason: format!("row {row} pairs '{a}' with '{b}'"),
                    });
                }
                Ok(paired)
            }
        }
    }
}

fn fuse(
    shape: &CandidateTable,
    row: usize,
    columns: &[usize],
    origin: &str,
) -> Result<WindowedScore, EngineError> {
    let scores = columns
        .iter()
        .map(|&column| {
            let cell = shape.cell(row, column);
            WindowedScore::from_cell(cell).ok_or_else(|| EngineError::InvalidCell {
                path: origin.to_string(),
                row,
                column: shape.headers()[column].clone(),
                value: cell.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(WindowedScore::mean_of_available(scores))
}

pub fn process_file(
    config: &EngineConfig,
    sources: &[String],
    file: &str,
    output: &Path,
) -> Result<(), EngineError> {
    let dirs = &config.directories;
    let features_path = dirs.features_conservation.join(file);
    let mut features = TsvTable::read_from_path(&features_path)?;
    let shape = TsvTable::read_from_path(dirs.parsed_shape.join(file))?;

    SourceAggregator::new(sources, config.pairing, &config.columns.transcript_id).aggregate(
        &mut features,
        &shape,
        &features_path.to_string_lossy(),
    )?;

    TsvTable::write_to_path(&features, output)?;
    Ok(())
}

#[instrument(skip_all, name = "aggregation_task")]
pub fn run(config: &EngineConfig, reporter: &ProgressReporter) -> Result<BatchReport, EngineError> {
    let dirs = &config.directories;
    info!(input = %dirs.features_conservation.display(), "Starting shape aggregation.");

    let files = list_files(&dirs.features_conservation)?;
    let sources: Vec<String> = shape_sources(&dirs.shape_data)?
        .into_iter()
        .map(|source| source.name)
        .collect();
    if sources.is_empty() {
        warn!(
            dir = %dirs.shape_data.display(),
            "No shape sources found; aggregated columns will be missing."
        );
    }
    ensure_dir(&dirs.features_cons_shape)?;

    let scheduler = BatchScheduler::new(config, reporter)?;
    scheduler.run(STAGE, &files, &dirs.features_cons_shape, |file, output| {
        process_file(config, &sources, file, output)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "ensembl_transcript_id_version";

    fn table(headers: &[&str], rows: &[&[&str]]) -> CandidateTable {
        CandidateTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn sources() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    fn shape_table(rows: &[&[&str]]) -> CandidateTable {
        table(&[ID, "a_seed", "a_sup", "b_seed", "b_sup", "c_seed", "c_sup"], rows)
    }

    #[test]
    fn averages_available_sources_and_keeps_missing_when_none_contribute() {
        let mut features = table(&[ID, "phylo_seed"], &[&["T1.1", "0.0"], &["T2.1", "1.0"]]);
        let shape = shape_table(&[
            &["T1.1", "0.2", "NA", "NA", "NA", "0.6", "0.5"],
            &["T2.1", "NA", "", "NA", "NA", "NA", "NA"],
        ]);
        let sources = sources();

        let paired = SourceAggregator::new(&sources, PairingMode::Positional, ID)
            .aggregate(&mut features, &shape, "t")
            .unwrap();

        assert_eq!(paired, 2);
        let seed = features.column_index(SEED_COLUMN).unwrap();
        let sup = features.column_index(SUP_COLUMN).unwrap();
        assert_eq!(features.cell(0, seed), "0.4");
        assert_eq!(features.cell(0, sup), "0.5");
        assert_eq!(features.cell(1, seed), "NA");
        assert_eq!(features.cell(1, sup), "NA");
        assert_eq!(features.cell(1, 1), "1.0");
    }

    #[test]
    fn positional_pairing_truncates_to_the_shorter_table() {
        let mut features = table(&[ID], &[&["T1.1"], &["T2.1"], &["T3.1"]]);
        let shape = shape_table(&[&["T9.1", "1.0", "1.0", "1.0", "1.0", "1.0", "1.0"]]);
        let sources = sources();

        let paired = SourceAggregator::new(&sources, PairingMode::Positional, ID)
            .aggregate(&mut features, &shape, "t")
            .unwrap();

        assert_eq!(paired, 1);
        assert_eq!(features.len(), 1);
        assert_eq!(features.rows()[0], ["T1.1", "1.0", "1.0"]);
    }

    #[test]
    fn strict_pairing_rejects_count_mismatch() {
        let mut features = table(&[ID], &[&["T1.1"], &["T2.1"]]);
        let shape = shape_table(&[&["T1.1", "1.0", "1.0", "1.0", "1.0", "1.0", "1.0"]]);
        let sources = sources();

        let err = SourceAggregator::new(&sources, PairingMode::Strict, ID)
            .aggregate(&mut features, &shape, "t")
            .unwrap_err();
        assert!(matches!(err, EngineError::Pairing { .. }));
    }

    #[test]
    fn strict_pairing_rejects_transcript_mismatch() {
        let mut features = table(&[ID], &[&["T1.1"], &["T2.1"]]);
        let shape = shape_table(&[
            &["T1.1", "1.0", "1.0", "1.0", "1.0", "1.0", "1.0"],
            &["T3.1", "1.0", "1.0", "1.0", "1.0", "1.0", "1.0"],
        ]);
        let sources = sources();

        let err = SourceAggregator::new(&sources, PairingMode::Strict, ID)
            .aggregate(&mut features, &shape, "t")
            .unwrap_err();
        match err {
            EngineError::Pairing { reason, .. } => assert!(reason.contains("row 1")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_source_column_is_an_error() {
        let mut features = table(&[ID], &[&["T1.1"]]);
        let shape = table(&[ID, "a_seed", "a_sup"], &[&["T1.1", "1.0", "1.0"]]);
        let sources = sources();

        let err = SourceAggregator::new(&sources, PairingMode::Positional, ID)
            .aggregate(&mut features, &shape, "t")
            .unwrap_err();
        assert!(matches!(err, EngineError::Column { .. }));
    }

    #[test]
    fn malformed_source_cell_is_an_error() {
        let mut features = table(&[ID], &[&["T1.1"]]);
        let shape = shape_table(&[&["T1.1", "high", "1.0", "1.0", "1.0", "1.0", "1.0"]]);
        let sources = sources();

        let err = SourceAggregator::new(&sources, PairingMode::Positional, ID)
            .aggregate(&mut features, &shape, "t")
            .unwrap_err();
        match err {
            EngineError::InvalidCell { column, value, .. } => {
                assert_eq!(column, "a_seed");
                assert_eq!(value, "high");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
