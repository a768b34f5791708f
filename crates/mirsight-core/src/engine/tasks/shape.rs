use super::{Alignment, TrackAligner, TrackSource, shape_sources};
use crate::core::io::shape::{ShapeRow, ShapeTrack};
use crate::core::io::table::TsvTable;
use crate::core::io::traits::{TrackError, TrackFormat};
use crate::core::models::score::MISSING_MARKER;
use crate::core::models::site::{ShapeSite, shape_sites};
use crate::core::models::table::CandidateTable;
use crate::core::windows::shape::{ShapeRegions, ShapeScores, score_site};
use crate::engine::config::EngineConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::scheduler::{BatchReport, BatchScheduler, ensure_dir, list_files};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

pub const STAGE: &str = "Shape extraction";

/// Hash-join of an unordered reactivity track against candidate sites.
///
/// Sites are indexed by unversioned accession, so a transcript may match zero, one or
/// many sites and track lines may arrive in any order.
pub struct ShapeAligner<'a> {
    source: &'a str,
}

impl<'a> ShapeAligner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }
}

impl TrackAligner for ShapeAligner<'_> {
    type Site = ShapeSite;
    type Row = ShapeRow;
    type Scores = ShapeScores;

    fn align<I>(&self, sites: &[ShapeSite], track: I) -> Result<Alignment<ShapeScores>, EngineError>
    where
        I: IntoIterator<Item = Result<ShapeRow, TrackError>>,
    {
        let mut lookup: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, site) in sites.iter().enumerate() {
            lookup.entry(site.accession.stem()).or_default().push(index);
        }

        let mut scores = vec![ShapeScores::default(); sites.len()];
        let mut matched = vec![false; sites.len()];
        let mut track_lines = 0;

        for row in track {
            let row = row?;
            track_lines += 1;

            let Some(indices) = lookup.get(row.transcript.as_str()) else {
                continue;
            };
            for &index in indices {
                let site = &sites[index];
                let regions =
                    ShapeRegions::around(site.binding_site_pos, site.utr_length, row.read_length);
                let site_scores =
                    score_site(regions, &row.scores).map_err(|source| EngineError::Score {
                        track: self.source.to_string(),
                        accession: row.transcript.clone(),
                        source,
                    })?;
                scores[index].merge(site_scores);
                matched[index] = true;
            }
        }

        Ok(Alignment {
            scores,
            matched_sites: matched.iter().filter(|&&m| m).count(),
            track_lines,
        })
    }
}

/// Writes `<source>_seed` and `<source>_sup` onto the table.
pub fn write_source_columns(table: &mut CandidateTable, source: &str, scores: &[ShapeScores]) {
    let seed = table.reset_column(&format!("{source}_seed"), MISSING_MARKER);
    let sup = table.reset_column(&format!("{source}_sup"), MISSING_MARKER);
    for (row, site_scores) in scores.iter().enumerate() {
        table.set_cell(row, seed, site_scores.seed.to_string());
        table.set_cell(row, sup, site_scores.sup.to_string());
    }
}

/// Aligns every reactivity source onto one conservation-augmented table and writes the
/// per-source table (transcript id plus one seed/sup pair per source).
pub fn process_file(
    config: &EngineConfig,
    sources: &[TrackSource],
    input: &Path,
    output: &Path,
) -> Result<(), EngineError> {
    let columns = &config.columns;
    let column_error = |source| EngineError::Column {
        path: input.to_string_lossy().to_string(),
        source,
    };

    let table = TsvTable::read_from_path(input)?;
    let projected = table
        .project(&[
            &columns.transcript_id,
            &columns.utr_length,
            &columns.binding_site_pos,
        ])
        .map_err(column_error)?;
    let sites = shape_sites(&projected, columns).map_err(|source| EngineError::Sites {
        path: input.to_string_lossy().to_string(),
        source,
    })?;

    let mut parsed = table.project(&[&columns.transcript_id]).map_err(column_error)?;
    for source in sources {
        let reader = ShapeTrack::open(&source.path)?;
        let alignment = ShapeAligner::new(&source.name).align(&sites, reader)?;
        debug!(
            file = %input.display(),
            source = %source.name,
            matched_sites = alignment.matched_sites,
            track_lines = alignment.track_lines,
            "Shape source aligned."
        );
        write_source_columns(&mut parsed, &source.name, &alignment.scores);
    }

    TsvTable::write_to_path(&parsed, output)?;
    Ok(())
}

#[instrument(skip_all, name = "shape_task")]
pub fn run(config: &EngineConfig, reporter: &ProgressReporter) -> Result<BatchReport, EngineError> {
    let dirs = &config.directories;
    info!(input = %dirs.features_conservation.display(), "Starting shape extraction.");

    let files = list_files(&dirs.features_conservation)?;
    let sources = shape_sources(&dirs.shape_data)?;
    if sources.is_empty() {
        warn!(dir = %dirs.shape_data.display(), "No shape sources found.");
    }
    ensure_dir(&dirs.parsed_shape)?;

    let scheduler = BatchScheduler::new(config, reporter)?;
    scheduler.run(STAGE, &files, &dirs.parsed_shape, |file, output| {
        process_file(config, &sources, &dirs.features_conservation.join(file), output)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::traits::TrackReader;
    use crate::core::models::accession::{Accession, unversioned};
    use crate::core::models::score::WindowedScore;
    use crate::engine::config::{EngineConfigBuilder, StageDirectories};
    use std::fs;
    use tempfile::tempdir;

    fn site(id: &str, utr_length: i64, pos: i64) -> ShapeSite {
        ShapeSite {
            accession: Accession::parse(id).unwrap(),
            utr_length,
            binding_site_pos: pos,
        }
    }

    fn row(id: &str, scores: &[&str]) -> Result<ShapeRow, TrackError> {
        Ok(ShapeRow {
            transcript: unversioned(id).to_string(),
            read_length: scores.len() as i64,
            scores: scores.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn every_site_of_a_transcript_is_scored_from_unordered_tracks() {
        let sites = [
            site("ENST9.1", 20, 3),
            site("ENST2.4", 20, 3),
            site("ENST9.1", 20, 11),
        ];
        let ones = ["1.0"; 20];
        let twos = ["2.0"; 20];
        let track = vec![row("ENST9.2", &ones), row("ENST2.4", &twos)];

        let alignment = ShapeAligner::new("icshape").align(&sites, track).unwrap();

        assert_eq!(alignment.scores[0].seed, WindowedScore::Value(1.0));
        assert_eq!(alignment.scores[1].seed, WindowedScore::Value(2.0));
        assert_eq!(alignment.scores[2].seed, WindowedScore::Value(1.0));
        assert_eq!(alignment.matched_sites, 3);
    }

    #[test]
    fn unmatched_sites_stay_missing() {
        let sites = [site("ENST9.1", 20, 3)];
        let track = vec![row("ENST4.1", &["1.0"; 20])];

        let alignment = ShapeAligner::new("icshape").align(&sites, track).unwrap();

        assert_eq!(alignment.scores[0], ShapeScores::default());
        assert_eq!(alignment.matched_sites, 0);
    }

    #[test]
    fn foreign_track_ids_are_skipped_without_failing_the_source() {
        let sites = [site("ENST00000000010.1", 20, 3)];
        let reactivities = ["1.0"; 20].join("\t");
        let data = format!(
            "ENST00000381192.8_PAR_Y\t20\tmeta\t{reactivities}\n\
             ENST00000000010.1\t20\tmeta\t{reactivities}\n"
        );
        let track = TrackReader::<ShapeTrack, _>::new(data.as_bytes(), "icshape");

        let alignment = ShapeAligner::new("icshape").align(&sites, track).unwrap();

        assert_eq!(alignment.track_lines, 2);
        assert_eq!(alignment.matched_sites, 1);
        assert_eq!(alignment.scores[0].seed, WindowedScore::Value(1.0));
    }

    #[test]
    fn null_and_nan_reactivities_count_as_zero() {
        let sites = [site("ENST9.1", 8, 2)];
        let track = vec![row(
            "ENST9.1",
            &["1.0", "NULL", "1.0", "nan", "2.0", "2.0", "NULL", "2.0"],
        )];

        let alignment = ShapeAligner::new("icshape").align(&sites, track).unwrap();
        assert_eq!(alignment.scores[0].seed, WindowedScore::Value(1.0));
        assert_eq!(alignment.scores[0].sup, WindowedScore::Missing);
    }

    #[test]
    fn empty_window_does_not_erase_an_earlier_value() {
        let sites = [site("ENST9.1", 20, 3)];
        let track = vec![row("ENST9.1", &["0.5"; 20]), row("ENST9.2", &["0.5"; 4])];

        let alignment = ShapeAligner::new("icshape").align(&sites, track).unwrap();
        assert_eq!(alignment.scores[0].seed, WindowedScore::Value(0.5));
    }

    #[test]
    fn process_file_writes_id_and_per_source_columns() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("sites.tsv");
        fs::write(
            &input,
            "ensembl_transcript_id_version\tX3_utr_length\tbinding_site_pos\tphylo_seed\n\
             ENST00000000010.1\t10\t3\t0.0\n\
             ENST00000000020.1\t10\t3\t0.0\n",
        )
        .unwrap();
        let source_path = dir.path().join("icSHAPE.tsv");
        let reactivities = ["0.5"; 12].join("\t");
        fs::write(
            &source_path,
            format!("ENST00000000010.1\t12\tmeta\t{reactivities}\n"),
        )
        .unwrap();
        let sources = [TrackSource {
            name: "icshape".into(),
            path: source_path,
        }];
        let config = EngineConfigBuilder::new()
            .directories(StageDirectories {
                features: dir.path().into(),
                conservation: dir.path().into(),
                features_conservation: dir.path().into(),
                shape_data: dir.path().into(),
                parsed_shape: dir.path().into(),
                features_cons_shape: dir.path().into(),
            })
            .workers(1)
            .build()
            .unwrap();
        let output = dir.path().join("out.tsv");

        process_file(&config, &sources, &input, &output).unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "ensembl_transcript_id_version\ticshape_seed\ticshape_sup\n\
             ENST00000000010.1\t0.5\t0.5\n\
             ENST00000000020.1\tNA\tNA\n"
        );
    }
}
