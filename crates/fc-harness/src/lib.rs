//! # fc-harness
//!
//! Runs a lint fixture corpus against registered rule evaluators and
//! reports whether each fixture got the verdict its directory declares.
//!
//! | Stage | Module | Produces |
//! |-------|--------|----------|
//! | configure | [`config`] | [`RunConfig`] |
//! | load | [`loader`] | [`Corpus`] (cases + load errors) |
//! | register | [`classifier`] | [`ClassifierRegistry`] |
//! | classify | [`runner`] | [`Report`] |
//!
//! A case matches when its verdict equals the expected one or is
//! indeterminate (no evaluator bound). Unreadable fixtures and panicking
//! evaluators are recorded per case and never abort a run.

pub mod classifier;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod report;
pub mod runner;

pub use classifier::ClassifierRegistry;
pub use config::{ConfigError, ConfigLoader, LoggingConfig, OutputFormat, RunConfig};
pub use error::{HarnessError, Result};
pub use loader::{load_corpus, Corpus, LoadError};
pub use report::{audit_pairs, CaseReport, LoadFailure, PairGap, Report, Summary};
pub use runner::{run_config, Runner};
