use super::traits::{TrackFormat, TrackParseErrorKind};
use crate::core::models::accession::unversioned;
use csv::StringRecord;

const SCORES_OFFSET: usize = 3;

/// One transcript of a reactivity track. Reactivities cover the whole read (CDS and
/// UTR), indexed from the transcript's 5' end.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRow {
    /// Transcript id without its version suffix. Ids are not otherwise validated.
    pub transcript: String,
    pub read_length: i64,
    pub scores: Vec<String>,
}

/// Tab-delimited reactivity tracks: accession, read length, one metadata field, then
/// one reactivity token per base. Rows may appear in any order.
pub struct ShapeTrack;

impl TrackFormat for ShapeTrack {
    type Record = ShapeRow;

    const DELIMITER: u8 = b'\t';

    fn parse_record(record: &StringRecord) -> Result<Self::Record, TrackParseErrorKind> {
        if record.len() < SCORES_OFFSET {
            return Err(TrackParseErrorKind::TooFewFields {
                expected: SCORES_OFFSET,
                found: record.len(),
            });
        }

        let read_length = record[1]
            .trim()
            .parse::<i64>()
            .map_err(|_| TrackParseErrorKind::InvalidReadLength(record[1].to_string()))?;

        Ok(ShapeRow {
            transcript: unversioned(&record[0]).to_string(),
            read_length,
            scores: record
                .iter()
                .skip(SCORES_OFFSET)
                .map(str::to_string)
                .collect(),
        })
    }
}
