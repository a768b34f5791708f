use crate::core::models::table::{CandidateTable, TableShapeError};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Tab-delimited parsing error for '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("Malformed table '{path}': {source}")]
    Shape {
        path: String,
        #[source]
        source: TableShapeError,
    },
}

/// Reads and writes candidate tables as tab-delimited text with a header row.
pub struct TsvTable;

impl TsvTable {
    pub fn read_from(reader: impl Read, origin: &str) -> Result<CandidateTable, TableError> {
        let csv_err = |source| TableError::Csv {
            path: origin.to_string(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        CandidateTable::new(headers, rows).map_err(|source| TableError::Shape {
            path: origin.to_string(),
            source,
        })
    }

    pub fn write_to(
        table: &CandidateTable,
        writer: impl Write,
        origin: &str,
    ) -> Result<(), TableError> {
        let csv_err = |source| TableError::Csv {
            path: origin.to_string(),
            source,
        };

        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);

        writer.write_record(table.headers()).map_err(csv_err)?;
        for row in table.rows() {
            writer.write_record(row).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| TableError::Io {
            path: origin.to_string(),
            source,
        })
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<CandidateTable, TableError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| io_error(path, source))?;
        Self::read_from(BufReader::new(file), &path.to_string_lossy())
    }

    /// Writes the table next to its destination and renames it into place, so a reader
    /// never observes a half-written file.
    pub fn write_to_path<P: AsRef<Path>>(
        table: &CandidateTable,
        path: P,
    ) -> Result<(), TableError> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staging = NamedTempFile::new_in(dir).map_err(|source| io_error(path, source))?;
        {
            let writer = BufWriter::new(staging.as_file_mut());
            Self::write_to(table, writer, &path.to_string_lossy())?;
        }
        staging
            .persist(path)
            .map_err(|e| io_error(path, e.error))?;
        Ok(())
    }
}

fn io_error(path: &Path, source: io::Error) -> TableError {
    TableError::Io {
        path: path.to_string_lossy().to_string(),
        source,
    }
}
