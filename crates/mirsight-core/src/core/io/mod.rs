//! Provides input/output for the tab-delimited candidate tables and the per-base score
//! track formats.
//!
//! Tables are read whole and written atomically; tracks are streamed record by record
//! through a shared [`TrackFormat`](traits::TrackFormat) interface so that large track
//! files are never held in memory.

pub mod conservation;
pub mod shape;
pub mod table;
pub mod traits;
