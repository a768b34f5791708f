//! # Engine Module
//!
//! The stateful layer that turns candidate-site files and score tracks into feature
//! tables.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Directory layout, worker budget, caching and pairing policy
//! - **Error Handling** ([`error`]) - Engine-level errors wrapping I/O, parsing and task failures
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events for front ends
//! - **Output Cache** ([`cache`]) - Skips files whose stage output already exists
//! - **Scheduling** ([`scheduler`]) - Bounded worker pool mapping a task over a file set
//! - **Tasks** ([`tasks`]) - The conservation merge-walk, the reactivity hash-join and the
//!   per-source aggregation
//!
//! Every stage is an embarrassingly parallel map over the candidate files of one
//! directory. Stages depend on each other only through the files they write.

pub mod cache;
pub mod config;
pub mod error;
pub mod progress;
pub mod scheduler;
pub mod tasks;
