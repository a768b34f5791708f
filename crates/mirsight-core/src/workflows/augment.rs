use crate::engine::config::EngineConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::scheduler::BatchReport;
use crate::engine::tasks::{aggregation, conservation, shape};
use std::fmt;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Conservation,
    Shape,
    Aggregation,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Conservation, Stage::Shape, Stage::Aggregation];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Conservation => conservation::STAGE,
            Stage::Shape => shape::STAGE,
            Stage::Aggregation => aggregation::STAGE,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AugmentReport {
    pub conservation: BatchReport,
    pub shape: BatchReport,
    pub aggregation: BatchReport,
}

/// Runs a single stage over every file of its input directory.
pub fn run_stage(
    stage: Stage,
    config: &EngineConfig,
    reporter: &ProgressReporter,
) -> Result<BatchReport, EngineError> {
    match stage {
        Stage::Conservation => conservation::run(config, reporter),
        Stage::Shape => shape::run(config, reporter),
        Stage::Aggregation => aggregation::run(config, reporter),
    }
}

/// Runs all three stages in order. A failing stage stops the workflow.
#[instrument(skip_all, name = "augment_workflow")]
pub fn run(
    config: &EngineConfig,
    reporter: &ProgressReporter,
) -> Result<AugmentReport, EngineError> {
    info!(workers = config.workers, caching = config.use_caching, "Starting feature augmentation.");

    let report = AugmentReport {
        conservation: run_stage(Stage::Conservation, config, reporter)?,
        shape: run_stage(Stage::Shape, config, reporter)?,
        aggregation: run_stage(Stage::Aggregation, config, reporter)?,
    };

    info!(
        files = report.aggregation.total(),
        computed = report.aggregation.computed,
        "Feature augmentation finished."
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{EngineConfigBuilder, PairingMode, StageDirectories};
    use std::fs;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    const SITES: &str = "ensembl_transcript_id_version\tX3_utr_length\tbinding_site_pos\tsite_abundance_6mer\n\
                         ENST00000000010.1\t40\t10\t2\n\
                         ENST00000000010.1\t40\t20\t1\n\
                         ENST00000000030.2\t40\t10\t1\n";

    const EXPECTED: &str = "ensembl_transcript_id_version\tX3_utr_length\tbinding_site_pos\tsite_abundance_6mer\t\
                            phylo_seed\tphylo_sup\tphylo_3\tphylo_5\tshape_seed\tshape_sup\n\
                            ENST00000000010.1\t40\t10\t2\t12.5\t25.5\t34.5\t4.0\t0.5\t0.5\n\
                            ENST00000000010.1\t40\t20\t1\t22.5\t35.5\t40.0\t9.0\t0.5\t0.5\n\
                            ENST00000000030.2\t40\t10\t1\t0.0\t0.0\t0.0\t0.0\t0.25\t0.25\n";

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

    fn shape_line(id: &str, value: &str) -> String {
        format!("{id}\t50\tmeta\t{}\n", vec![value; 50].join("\t"))
    }

    fn fixture(sites: &str) -> (TempDir, EngineConfig) {
        let root = tempdir().unwrap();
        let dirs = directories(root.path());
        fs::create_dir_all(&dirs.features).unwrap();
        fs::create_dir_all(&dirs.conservation).unwrap();
        fs::create_dir_all(&dirs.shape_data).unwrap();

        fs::write(dirs.features.join("sites.tsv"), sites).unwrap();
        let ramp: Vec<String> = (1..=50).map(|i| i.to_string()).collect();
        fs::write(
            dirs.conservation.join("phylo.txt"),
            format!("ENST00000000010 {}\n", ramp.join(" ")),
        )
        .unwrap();
        fs::write(
            dirs.shape_data.join("icSHAPE.txt"),
            shape_line("ENST00000000010.1", "0.5"),
        )
        .unwrap();
        fs::write(
            dirs.shape_data.join("paris.txt"),
            shape_line("ENST00000000030.2", "0.25"),
        )
        .unwrap();

        let config = EngineConfigBuilder::new()
            .directories(dirs)
            .workers(2)
            .pairing(PairingMode::Strict)
            .build()
            .unwrap();
        (root, config)
    }

    #[test]
    fn run_produces_conservation_and_aggregated_shape_features() {
        let (_root, config) = fixture(SITES);
        let reporter = ProgressReporter::new();

        let report = run(&config, &reporter).unwrap();

        assert_eq!(report.aggregation.computed, 1);
        let dirs = &config.directories;
        assert_eq!(
            fs::read_to_string(dirs.features_cons_shape.join("sites.tsv")).unwrap(),
            EXPECTED
        );
        assert_eq!(
            fs::read_to_string(dirs.parsed_shape.join("sites.tsv")).unwrap(),
            "ensembl_transcript_id_version\ticshape_seed\ticshape_sup\tparis_seed\tparis_sup\n\
             ENST00000000010.1\t0.5\t0.5\tNA\tNA\n\
             ENST00000000010.1\t0.5\t0.5\tNA\tNA\n\
             ENST00000000030.2\tNA\tNA\t0.25\t0.25\n"
        );
    }

    #[test]
    fn second_cached_run_writes_nothing_and_leaves_outputs_identical() {
        let (_root, config) = fixture(SITES);
        let reporter = ProgressReporter::new();
        let output = config.directories.features_cons_shape.join("sites.tsv");

        run(&config, &reporter).unwrap();
        let first = fs::read(&output).unwrap();
        let modified = fs::metadata(&output).unwrap().modified().unwrap();

        let report = run(&config, &reporter).unwrap();

        for stage in [report.conservation, report.shape, report.aggregation] {
            assert_eq!(stage, BatchReport { computed: 0, cached: 1 });
        }
        assert_eq!(fs::read(&output).unwrap(), first);
        assert_eq!(fs::metadata(&output).unwrap().modified().unwrap(), modified);
    }

    #[test]
    fn single_stage_can_be_run_on_its_own() {
        let (_root, config) = fixture(SITES);
        let reporter = ProgressReporter::new();

        let report = run_stage(Stage::Conservation, &config, &reporter).unwrap();

        assert_eq!(report.computed, 1);
        assert!(config.directories.features_conservation.join("sites.tsv").is_file());
        assert!(!config.directories.parsed_shape.exists());
    }

    #[test]
    fn failing_stage_stops_later_stages() {
        let bad = "ensembl_transcript_id_version\tX3_utr_length\tbinding_site_pos\tsite_abundance_6mer\n\
                   ENST00000000010.1\t40\tten\t1\n";
        let (_root, config) = fixture(bad);
        let reporter = ProgressReporter::new();

        let err = run(&config, &reporter).unwrap_err();

        match err {
            EngineError::Stage { stage, count, .. } => {
                assert_eq!(stage, Stage::Conservation.name());
                assert_eq!(count, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!config.directories.parsed_shape.exists());
    }
}
