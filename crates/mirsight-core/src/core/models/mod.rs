//! # Core Models Module
//!
//! Data structures describing candidate binding sites and the scores derived for them.
//!
//! - [`accession`] - Versioned transcript accessions and their numeric ordering key
//! - [`table`] - The tab-delimited candidate table, kept as raw strings and augmented in place
//! - [`site`] - Typed projections of candidate rows used by the two aligners
//! - [`score`] - Windowed score values and their textual representation

pub mod accession;
pub mod score;
pub mod site;
pub mod table;
