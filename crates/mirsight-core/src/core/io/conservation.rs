use super::traits::{TrackFormat, TrackParseErrorKind};
use crate::core::models::accession::Accession;
use csv::StringRecord;

/// One transcript of a conservation track: an unversioned accession followed by one
/// score token per base.
#[derive(Debug, Clone, PartialEq)]
pub struct ConservationRow {
    pub accession: Accession,
    pub scores: Vec<String>,
}

/// Space-delimited conservation tracks, sorted by accession number.
pub struct ConservationTrack;

impl TrackFormat for ConservationTrack {
    type Record = ConservationRow;

    const DELIMITER: u8 = b' ';

    fn parse_record(record: &StringRecord) -> Result<Self::Record, TrackParseErrorKind> {
        let mut fields = record.iter();
        let id = fields.next().ok_or(TrackParseErrorKind::TooFewFields {
            expected: 1,
            found: 0,
        })?;
        let accession = Accession::parse(id)
            .map_err(|_| TrackParseErrorKind::InvalidAccession(id.to_string()))?;

        Ok(ConservationRow {
            accession,
            scores: fields.map(str::to_string).collect(),
        })
    }
}
