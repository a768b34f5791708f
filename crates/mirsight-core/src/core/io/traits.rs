use csv::StringRecord;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("File I/O error for track '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Delimited parsing error in track '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("Parse error in track '{path}' on line {line}: {kind}")]
    Parse {
        path: String,
        line: u64,
        kind: TrackParseErrorKind,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackParseErrorKind {
    #[error("Record has {found} fields, expected at least {expected}")]
    TooFewFields { expected: usize, found: usize },
    #[error("Invalid accession '{0}'")]
    InvalidAccession(String),
    #[error("Invalid read length '{0}'")]
    InvalidReadLength(String),
}

/// Defines the layout of one per-base score track format.
///
/// A track file holds one record per transcript. Implementors decide how a raw delimited
/// record becomes a typed row; [`TrackReader`] drives the streaming.
pub trait TrackFormat {
    /// The typed row produced for each record.
    type Record;

    /// Field delimiter of the format.
    const DELIMITER: u8;

    /// Converts one raw record into a typed row.
    ///
    /// # Errors
    ///
    /// Returns the kind of parse failure; the reader attaches path and line number.
    fn parse_record(record: &StringRecord) -> Result<Self::Record, TrackParseErrorKind>;

    /// Opens a track file for streaming.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    fn open<P: AsRef<Path>>(path: P) -> Result<TrackReader<Self, BufReader<File>>, TrackError>
    where
        Self: Sized,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TrackError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        Ok(TrackReader::new(
            BufReader::new(file),
            &path.to_string_lossy(),
        ))
    }
}

/// Streams typed rows out of a track, one record at a time.
pub struct TrackReader<F: TrackFormat, R: Read> {
    inner: csv::Reader<R>,
    record: StringRecord,
    origin: String,
    _format: PhantomData<F>,
}

impl<F: TrackFormat, R: Read> TrackReader<F, R> {
    pub fn new(reader: R, origin: &str) -> Self {
        let inner = csv::ReaderBuilder::new()
            .delimiter(F::DELIMITER)
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);
        Self {
            inner,
            record: StringRecord::new(),
            origin: origin.to_string(),
            _format: PhantomData,
        }
    }
}

impl<F: TrackFormat, R: Read> Iterator for TrackReader<F, R> {
    type Item = Result<F::Record, TrackError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.read_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => Some(F::parse_record(&self.record).map_err(|kind| {
                TrackError::Parse {
                    path: self.origin.clone(),
                    line: self.record.position().map_or(0, |p| p.line()),
                    kind,
                }
            })),
            Err(source) => Some(Err(TrackError::Csv {
                path: self.origin.clone(),
                source,
            })),
        }
    }
}
