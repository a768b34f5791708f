//! # Workflows Module
//!
//! Top-level entry points that sequence the engine stages over a configured directory
//! layout.
//!
//! - **Augmentation Workflow** ([`augment`]) - Conservation extraction, shape extraction
//!   and shape aggregation, each over every candidate file, in that order. Single stages
//!   can be run on their own through [`augment::run_stage`].

pub mod augment;
