//! # Core Module
//!
//! Stateless building blocks shared by every stage of the engine.
//!
//! - **Data Models** ([`models`]) - Transcript accessions, candidate-site tables and
//!   windowed score values
//! - **File I/O** ([`io`]) - Tab-delimited candidate tables and the two score-track formats
//! - **Windowed Scoring** ([`windows`]) - Fixed-offset region definitions and the window
//!   means computed under each track type's missing-data policy

pub mod io;
pub mod models;
pub mod windows;
