//! The per-file computations run by each stage.
//!
//! Two alignment strategies implement [`TrackAligner`]: a sorted merge-walk for
//! conservation tracks ([`conservation`]) and a hash-join for reactivity tracks
//! ([`shape`]). [`aggregation`] fuses the per-source reactivity columns afterwards.

pub mod aggregation;
pub mod conservation;
pub mod shape;

use super::error::EngineError;
use super::scheduler::list_files;
use crate::core::io::traits::TrackError;
use std::path::{Path, PathBuf};

/// Result of aligning one track against the sites of one candidate table.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment<S> {
    /// One entry per site, in site order.
    pub scores: Vec<S>,
    pub matched_sites: usize,
    pub track_lines: usize,
}

/// Joins a streamed score track onto a slice of candidate sites.
pub trait TrackAligner {
    type Site;
    type Row;
    type Scores;

    /// # Errors
    ///
    /// Returns an error if the track cannot be read or a score inside a window is
    /// malformed.
    fn align<I>(
        &self,
        sites: &[Self::Site],
        track: I,
    ) -> Result<Alignment<Self::Scores>, EngineError>
    where
        I: IntoIterator<Item = Result<Self::Row, TrackError>>;
}

/// A track file and the name its columns are prefixed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSource {
    pub name: String,
    pub path: PathBuf,
}

impl TrackSource {
    fn from_file(dir: &Path, file: &str, lowercase: bool) -> Self {
        let path = dir.join(file);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file.to_string());
        Self {
            name: if lowercase { stem.to_lowercase() } else { stem },
            path,
        }
    }
}

/// Conservation tracks in `dir`, named by file stem.
pub fn conservation_sources(dir: &Path) -> Result<Vec<TrackSource>, EngineError> {
    Ok(list_files(dir)?
        .iter()
        .map(|file| TrackSource::from_file(dir, file, false))
        .collect())
}

/// Reactivity tracks in `dir`, named by lower-cased file stem.
pub fn shape_sources(dir: &Path) -> Result<Vec<TrackSource>, EngineError> {
    Ok(list_files(dir)?
        .iter()
        .map(|file| TrackSource::from_file(dir, file, true))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn sources_are_named_by_file_stem() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("PhyloP100.txt"), "").unwrap();
        fs::write(dir.path().join("phastCons.wig.txt"), "").unwrap();

        let conservation = conservation_sources(dir.path()).unwrap();
        let names: Vec<_> = conservation.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["PhyloP100", "phastCons.wig"]);

        let shape = shape_sources(dir.path()).unwrap();
        let names: Vec<_> = shape.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["phylop100", "phastcons.wig"]);
        assert_eq!(shape[0].path, dir.path().join("PhyloP100.txt"));
    }
}
