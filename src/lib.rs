//! Glossa: resumable generation of long-form curriculum topic descriptions
//!
//! Reads a curriculum, finds reference sources for each topic, composes a
//! five-section description, validates it and writes it into the module file the
//! web UI imports. Progress is persisted after every topic so interrupted runs
//! resume where they stopped.

pub mod cli;
pub mod clock;
pub mod config;
pub mod curriculum;
pub mod error;
pub mod generation;
pub mod logging;
pub mod pipeline;
pub mod progress;
pub mod search;
pub mod store;
pub mod validation;
