//! # mirsight Core Library
//!
//! Aligns per-base conservation and structural reactivity score tracks onto tables of
//! candidate microRNA binding sites, and fuses the results into features for a downstream
//! classifier.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (accessions, candidate tables,
//!   windowed scores), tab/space-delimited I/O for tables and score tracks, and the pure
//!   windowed scorers with their missing-data policies.
//!
//! - **[`engine`]: The Logic Core.** Configuration, error types, progress reporting, the
//!   output cache, the bounded worker pool, and the three per-file tasks: the sorted
//!   merge-walk conservation aligner, the hash-join shape aligner, and the source aggregator.
//!
//! - **[`workflows`]: The Public API.** Runs the stages in order over every candidate file
//!   of a configured directory layout.

pub mod core;
pub mod engine;
pub mod workflows;
