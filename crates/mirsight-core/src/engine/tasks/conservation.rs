use super::{Alignment, TrackAligner, TrackSource, conservation_sources};
use crate::core::io::conservation::{ConservationRow, ConservationTrack};
use crate::core::io::table::TsvTable;
use crate::core::io::traits::{TrackError, TrackFormat};
use crate::core::models::site::{ConservationSite, conservation_sites};
use crate::core::models::table::CandidateTable;
use crate::core::windows::conservation::{ConservationScores, REGION_SUFFIXES, score_site};
use crate::engine::config::EngineConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::scheduler::{BatchReport, BatchScheduler, ensure_dir, list_files};
use std::cmp::Ordering;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

pub const STAGE: &str = "Conservation extraction";

const UNCOVERED_VALUE: &str = "0.0";

/// Sorted merge-walk of a conservation track against candidate blocks.
///
/// Both sides are ordered by accession number. The candidate table is grouped into
/// per-transcript blocks whose first row carries the block length, and every row of a
/// matched block is scored against the same track line.
pub struct ConservationAligner<'a> {
    track: &'a str,
}

impl<'a> ConservationAligner<'a> {
    pub fn new(track: &'a str) -> Self {
        Self { track }
    }

    fn block_end(&self, sites: &[ConservationSite], start: usize) -> usize {
        let abundance = sites[start].site_abundance.max(1);
        let end = start + abundance;
        if end > sites.len() {
            warn!(
                track = self.track,
                accession = %sites[start].accession,
                abundance,
                available = sites.len() - start,
                "Site block runs past the end of the table; truncating."
            );
            return sites.len();
        }
        end
    }
}

impl TrackAligner for ConservationAligner<'_> {
    type Site = ConservationSite;
    type Row = ConservationRow;
    type Scores = ConservationScores;

    fn align<I>(
        &self,
        sites: &[ConservationSite],
        track: I,
    ) -> Result<Alignment<ConservationScores>, EngineError>
    where
        I: IntoIterator<Item = Result<ConservationRow, TrackError>>,
    {
        let mut scores = vec![ConservationScores::default(); sites.len()];
        let mut cursor = 0;
        let mut matched_sites = 0;
        let mut track_lines = 0;

        'track: for row in track {
            let row = row?;
            track_lines += 1;

            loop {
                let Some(site) = sites.get(cursor) else {
                    break 'track;
                };
                match row.accession.track_order(&site.accession) {
                    Ordering::Less => continue 'track,
                    Ordering::Greater => cursor += 1,
                    Ordering::Equal => {
                        let end = self.block_end(sites, cursor);
                        for index in cursor..end {
                            scores[index] = score_site(sites[index].binding_site_pos, &row.scores)
                                .map_err(|source| EngineError::Score {
                                    track: self.track.to_string(),
                                    accession: row.accession.to_string(),
                                    source,
                                })?;
                        }
                        matched_sites += end - cursor;
                        cursor = end;
                        continue 'track;
                    }
                }
            }
        }

        Ok(Alignment {
            scores,
            matched_sites,
            track_lines,
        })
    }
}

/// Writes `<track>_seed`, `<track>_sup`, `<track>_3` and `<track>_5` onto the table.
pub fn write_track_columns(table: &mut CandidateTable, track: &str, scores: &[ConservationScores]) {
    for (region, suffix) in REGION_SUFFIXES.iter().enumerate() {
        let column = table.reset_column(&format!("{track}_{suffix}"), UNCOVERED_VALUE);
        for (row, site_scores) in scores.iter().enumerate() {
            table.set_cell(row, column, site_scores.as_array()[region].to_string());
        }
    }
}

/// Aligns every conservation track onto one candidate table and writes the result.
pub fn process_file(
    config: &EngineConfig,
    tracks: &[TrackSource],
    input: &Path,
    output: &Path,
) -> Result<(), EngineError> {
    let mut table = TsvTable::read_from_path(input)?;
    let sites = conservation_sites(&table, &config.columns).map_err(|source| EngineError::Sites {
        path: input.to_string_lossy().to_string(),
        source,
    })?;

    for track in tracks {
        let reader = ConservationTrack::open(&track.path)?;
        let alignment = ConservationAligner::new(&track.name).align(&sites, reader)?;
        debug!(
            file = %input.display(),
            track = %track.name,
            matched_sites = alignment.matched_sites,
            track_lines = alignment.track_lines,
            "Conservation track aligned."
        );
        write_track_columns(&mut table, &track.name, &alignment.scores);
    }

    TsvTable::write_to_path(&table, output)?;
    Ok(())
}

#[instrument(skip_all, name = "conservation_task")]
pub fn run(config: &EngineConfig, reporter: &ProgressReporter) -> Result<BatchReport, EngineError> {
    let dirs = &config.directories;
    info!(input = %dirs.features.display(), "Starting conservation extraction.");

    let files = list_files(&dirs.features)?;
    let tracks = conservation_sources(&dirs.conservation)?;
    if tracks.is_empty() {
        warn!(
            dir = %dirs.conservation.display(),
            "No conservation tracks found; tables are passed through unchanged."
        );
    }
    ensure_dir(&dirs.features_conservation)?;

    let scheduler = BatchScheduler::new(config, reporter)?;
    scheduler.run(STAGE, &files, &dirs.features_conservation, |file, output| {
        process_file(config, &tracks, &dirs.features.join(file), output)
    })
}
