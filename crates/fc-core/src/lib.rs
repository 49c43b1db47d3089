//! # fc-core
//!
//! Core types for lint fixture conformance checking.
//!
//! A lint rule is exercised by a corpus of fixture files. Each fixture
//! sits in a directory that declares the outcome a correct checker must
//! reach for it:
//!
//! | Directory | Expected | Judged by |
//! |-----------|----------|-----------|
//! | `pass/` | Pass | mechanical tool |
//! | `fail/` | Fail | mechanical tool |
//! | `ai-pass/` | Pass | human / AI review |
//! | `ai-fail/` | Fail | human / AI review |
//!
//! This crate defines the case model ([`RuleCase`]), the verdicts a
//! classifier produces ([`Verdict`], [`Outcome`]) and the seam every rule
//! checker plugs into ([`Evaluator`]).

pub mod case;
pub mod evaluator;
pub mod verdict;

pub use case::{Category, ExpectedVerdict, FixtureKind, Language, RuleCase, RuleId};
pub use evaluator::{DuplicateRuleError, Evaluator};
pub use verdict::{Outcome, Verdict};
