//! Classifier verdicts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::case::ExpectedVerdict;

/// Result of classifying one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The evaluator reports conformance
    Pass,
    /// The evaluator reports a violation
    Fail,
    /// No evaluator is registered for the rule
    Indeterminate,
}

impl Verdict {
    /// Map an evaluator's conformance answer to a verdict.
    pub fn from_conformance(conforms: bool) -> Self {
        if conforms {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    /// Whether this verdict agrees with the expected one.
    ///
    /// Indeterminate always agrees.
    pub fn matches(&self, expected: ExpectedVerdict) -> bool {
        match (self, expected) {
            (Verdict::Indeterminate, _) => true,
            (Verdict::Pass, ExpectedVerdict::Pass) => true,
            (Verdict::Fail, ExpectedVerdict::Fail) => true,
            _ => false,
        }
    }

    /// Get the name of this verdict.
    pub fn name(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
            Verdict::Indeterminate => "indeterminate",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ExpectedVerdict> for Verdict {
    fn from(expected: ExpectedVerdict) -> Self {
        match expected {
            ExpectedVerdict::Pass => Verdict::Pass,
            ExpectedVerdict::Fail => Verdict::Fail,
        }
    }
}

/// What happened when a case was evaluated inside a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The case received a verdict
    Classified(Verdict),
    /// The evaluator faulted; the message is the panic payload
    EvaluationError(String),
}

impl Outcome {
    /// Whether the outcome agrees with the expected verdict.
    ///
    /// An evaluation error never agrees.
    pub fn matched(&self, expected: ExpectedVerdict) -> bool {
        match self {
            Outcome::Classified(verdict) => verdict.matches(expected),
            Outcome::EvaluationError(_) => false,
        }
    }

    /// The verdict, if the case was classified.
    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            Outcome::Classified(verdict) => Some(*verdict),
            Outcome::EvaluationError(_) => None,
        }
    }
}
