use super::accession::{Accession, AccessionError};
use super::table::{CandidateTable, TableShapeError};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error(transparent)]
    Table(#[from] TableShapeError),
    #[error("Invalid accession on row {row}: {source}")]
    Accession {
        row: usize,
        #[source]
        source: AccessionError,
    },
    #[error("Invalid integer '{value}' in column '{column}' on row {row}")]
    InvalidInteger {
        row: usize,
        column: String,
        value: String,
    },
}

/// Names of the candidate-table columns the aligners read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct CandidateColumns {
    pub transcript_id: String,
    pub utr_length: String,
    pub binding_site_pos: String,
    pub site_abundance: String,
}

impl Default for CandidateColumns {
    fn default() -> Self {
        Self {
            transcript_id: "ensembl_transcript_id_version".to_string(),
            utr_length: "X3_utr_length".to_string(),
            binding_site_pos: "binding_site_pos".to_string(),
            site_abundance: "site_abundance_6mer".to_string(),
        }
    }
}

/// A candidate row as seen by the conservation merge-walk.
#[derive(Debug, Clone, PartialEq)]
pub struct ConservationSite {
    pub accession: Accession,
    pub binding_site_pos: i64, // 1-based, relative to the 3' UTR
    pub site_abundance: usize, // rows in this transcript's block, counted from here
}

/// A candidate row as seen by the reactivity hash-join.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSite {
    pub accession: Accession,
    pub utr_length: i64,
    pub binding_site_pos: i64,
}

pub fn conservation_sites(
    table: &CandidateTable,
    columns: &CandidateColumns,
) -> Result<Vec<ConservationSite>, SiteError> {
    let id_col = table.column_index(&columns.transcript_id)?;
    let pos_col = table.column_index(&columns.binding_site_pos)?;
    let abundance_col = table.column_index(&columns.site_abundance)?;

    (0..table.len())
        .map(|row| {
            let site_abundance = parse_integer(table, row, abundance_col)?;
            Ok(ConservationSite {
                accession: parse_accession(table, row, id_col)?,
                binding_site_pos: parse_integer(table, row, pos_col)?,
                site_abundance: usize::try_from(site_abundance).map_err(|_| {
                    SiteError::InvalidInteger {
                        row,
                        column: table.headers()[abundance_col].clone(),
                        value: table.cell(row, abundance_col).to_string(),
                    }
                })?,
            })
        })
        .collect()
}

pub fn shape_sites(
    table: &CandidateTable,
    columns: &CandidateColumns,
) -> Result<Vec<ShapeSite>, SiteError> {
    let id_col = table.column_index(&columns.transcript_id)?;
    let utr_col = table.column_index(&columns.utr_length)?;
    let pos_col = table.column_index(&columns.binding_site_pos)?;

    (0..table.len())
        .map(|row| {
            Ok(ShapeSite {
                accession: parse_accession(table, row, id_col)?,
                utr_length: parse_integer(table, row, utr_col)?,
                binding_site_pos: parse_integer(table, row, pos_col)?,
            })
        })
        .collect()
}

fn parse_accession(
    table: &CandidateTable,
    row: usize,
    column: usize,
) -> Result<Accession, SiteError> {
    Accession::parse(table.cell(row, column)).map_err(|source| SiteError::Accession { row, source })
}

// Upstream tables sometimes serialize integer columns as floats ("12.0").
fn parse_integer(table: &CandidateTable, row: usize, column: usize) -> Result<i64, SiteError> {
    let value = table.cell(row, column).trim();
    value
        .parse::<i64>()
        .ok()
        .or_else(|| {
            value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && v.fract() == 0.0)
                .map(|v| v as i64)
        })
        .ok_or_else(|| SiteError::InvalidInteger {
            row,
            column: table.headers()[column].clone(),
            value: value.to_string(),
        })
}
