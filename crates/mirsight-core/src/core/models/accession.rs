use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessionError {
    #[error("Accession is empty")]
    Empty,
    #[error("Accession '{0}' has no numeric component")]
    MissingNumber(String),
    #[error("Accession '{value}' has an invalid version suffix '{version}'")]
    InvalidVersion { value: String, version: String },
}

/// A transcript accession such as `ENST00000361390.2`.
///
/// Conservation tracks carry unversioned accessions while candidate tables and
/// reactivity tracks carry versioned ones, so equality between sources is decided on
/// the unversioned [`stem`](Accession::stem) or its [`number`](Accession::number), never
/// on the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Accession {
    raw: String,
    stem_len: usize,
    number: u64,
}

/// Text before the first `.` of a transcript id, with surrounding whitespace removed.
///
/// Unlike [`Accession::parse`] this accepts any id, including ones with non-numeric
/// suffixes such as `ENST00000381192.8_PAR_Y`.
pub fn unversioned(id: &str) -> &str {
    let id = id.trim();
    id.split_once('.').map_or(id, |(stem, _)| stem)
}

impl Accession {
    pub fn parse(value: &str) -> Result<Self, AccessionError> {
        let raw = value.trim();
        if raw.is_empty() {
            return Err(AccessionError::Empty);
        }

        let stem = unversioned(raw);
        if let Some((_, version)) = raw.split_once('.') {
            version
                .parse::<u32>()
                .map_err(|_| AccessionError::InvalidVersion {
                    value: raw.to_string(),
                    version: version.to_string(),
                })?;
        }

        let digits = stem.trim_start_matches(|c: char| !c.is_ascii_digit());
        let number = digits
            .parse::<u64>()
            .map_err(|_| AccessionError::MissingNumber(raw.to_string()))?;

        Ok(Self {
            raw: raw.to_string(),
            stem_len: stem.len(),
            number,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The accession without its version suffix.
    pub fn stem(&self) -> &str {
        &self.raw[..self.stem_len]
    }

    /// The numeric part of the stem, used to order transcripts in sorted tracks.
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Orders two accessions the way sorted track files are laid out.
    pub fn track_order(&self, other: &Accession) -> Ordering {
        self.number.cmp(&other.number)
    }
}

impl FromStr for Accession {
    type Err = AccessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Accession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_versioned_accession() {
        let accession = Accession::parse("ENST00000361390.2").unwrap();
        assert_eq!(accession.as_str(), "ENST00000361390.2");
        assert_eq!(accession.stem(), "ENST00000361390");
        assert_eq!(accession.number(), 361390);
    }

    #[test]
    fn parse_accepts_unversioned_accession() {
        let accession = Accession::parse("ENST00000361390").unwrap();
        assert_eq!(accession.stem(), "ENST00000361390");
        assert_eq!(accession.number(), 361390);
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let accession: Accession = " ENST0000042.1\n".parse().unwrap();
        assert_eq!(accession.as_str(), "ENST0000042.1");
        assert_eq!(accession.number(), 42);
    }

    #[test]
    fn parse_rejects_empty_and_non_numeric_values() {
        assert_eq!(Accession::parse("  "), Err(AccessionError::Empty));
        assert!(matches!(
            Accession::parse("ENST"),
            Err(AccessionError::MissingNumber(_))
        ));
        assert!(matches!(
            Accession::parse("ENST0001.x"),
            Err(AccessionError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn unversioned_keeps_text_before_first_dot() {
        assert_eq!(unversioned("ENST00000361390.2"), "ENST00000361390");
        assert_eq!(unversioned("ENST00000381192.8_PAR_Y"), "ENST00000381192");
        assert_eq!(unversioned(" ENST00000361390\t"), "ENST00000361390");
        assert_eq!(unversioned("no_version"), "no_version");
    }

    #[test]
    fn track_order_ignores_version_and_prefix_width() {
        let bare = Accession::parse("ENST00000000123").unwrap();
        let versioned = Accession::parse("ENST00000000123.7").unwrap();
        let later = Accession::parse("ENST00000000200.1").unwrap();

        assert_eq!(bare.track_order(&versioned), Ordering::Equal);
        assert_eq!(bare.track_order(&later), Ordering::Less);
        assert_eq!(later.track_order(&versioned), Ordering::Greater);
    }
}
