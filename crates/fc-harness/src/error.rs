//! Harness-level errors.
//!
//! Per-case problems (unreadable fixtures, evaluator panics) never show up
//! here; they are recorded in the [`Report`](crate::Report). These are the
//! failures that stop a run before or after classification.

use std::path::PathBuf;

use fc_core::DuplicateRuleError;

use crate::config::ConfigError;
use crate::loader::LoadError;

/// Errors returned by harness entry points.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// The corpus could not be loaded at all
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Configuration could not be loaded or is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Two evaluators were registered for one rule
    #[error(transparent)]
    DuplicateRule(#[from] DuplicateRuleError),

    /// The report could not be serialized
    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),

    /// The report could not be written
    #[error("failed to write report to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;
