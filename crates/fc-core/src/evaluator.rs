//! The evaluator seam.
//!
//! An evaluator answers one question for one rule: does this source text
//! conform? Implementations must be pure: deterministic, free of side
//! effects, and free of shared mutable state. The harness calls them from
//! many threads at once.

use crate::case::RuleId;

/// Conformance check for a single rule.
pub trait Evaluator: Send + Sync {
    /// Whether `source` conforms to the rule.
    fn conforms(&self, source: &str) -> bool;
}

impl<F> Evaluator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn conforms(&self, source: &str) -> bool {
        self(source)
    }
}

/// Two evaluators claimed the same rule id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("an evaluator is already registered for rule {rule_id}")]
pub struct DuplicateRuleError {
    /// The contested rule id
    pub rule_id: RuleId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_evaluator() {
        let no_tabs = |source: &str| !source.contains('\t');
        assert!(no_tabs.conforms("int x;"));
        assert!(!no_tabs.conforms("\tint x;"));
    }

    #[test]
    fn test_duplicate_error_message() {
        let err = DuplicateRuleError {
            rule_id: RuleId::new("C-03-04"),
        };
        assert!(err.to_string().contains("C-03-04"));
    }
}
