//! The classifier registry.
//!
//! Maps rule ids to evaluators. The registry is filled through `&mut`
//! access at startup and then shared read-only (behind an `Arc`) by every
//! worker of a run, so lookups need no locking.

use std::any::Any;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use fc_core::{DuplicateRuleError, Evaluator, Outcome, RuleCase, RuleId, Verdict};

/// Rule id to evaluator bindings.
#[derive(Clone, Default)]
pub struct ClassifierRegistry {
    evaluators: BTreeMap<RuleId, Arc<dyn Evaluator>>,
}

impl ClassifierRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in rule except `disabled`.
    ///
    /// Disabled rules stay unbound and classify as indeterminate.
    pub fn with_builtin_rules<S: AsRef<str>>(disabled: &[S]) -> Result<Self, DuplicateRuleError> {
        let mut registry = Self::new();

        for rule in fc_rules::builtin_rules() {
            if disabled.iter().any(|id| id.as_ref() == rule.id) {
                tracing::debug!(rule_id = rule.id, "Built-in rule disabled");
                continue;
            }
            registry.register(rule.id, rule)?;
        }

        Ok(registry)
    }

    /// Bind `rule_id` to `evaluator`.
    ///
    /// Fails if the id is already bound; the existing binding is kept.
    pub fn register<E>(
        &mut self,
        rule_id: impl Into<RuleId>,
        evaluator: E,
    ) -> Result<(), DuplicateRuleError>
    where
        E: Evaluator + 'static,
    {
        match self.evaluators.entry(rule_id.into()) {
            Entry::Occupied(entry) => Err(DuplicateRuleError {
                rule_id: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(evaluator));
                Ok(())
            }
        }
    }

    /// Whether an evaluator is bound to `rule_id`.
    pub fn is_registered(&self, rule_id: &str) -> bool {
        self.evaluators.contains_key(rule_id)
    }

    /// The evaluator bound to `rule_id`.
    pub fn get(&self, rule_id: &str) -> Option<&Arc<dyn Evaluator>> {
        self.evaluators.get(rule_id)
    }

    /// Bound rule ids, in order.
    pub fn rule_ids(&self) -> impl Iterator<Item = &RuleId> {
        self.evaluators.keys()
    }

    /// Number of bound rules.
    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    /// Whether no rule is bound.
    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    /// Classify one case.
    ///
    /// Pass if the bound evaluator reports conformance, Fail if it reports
    /// a violation, Indeterminate if nothing is bound to the case's rule.
    pub fn classify(&self, case: &RuleCase) -> Verdict {
        match self.evaluators.get(case.rule_id.as_str()) {
            Some(evaluator) => Verdict::from_conformance(evaluator.conforms(&case.source_text)),
            None => Verdict::Indeterminate,
        }
    }

    /// Classify one case, turning an evaluator panic into an
    /// [`Outcome::EvaluationError`].
    pub fn evaluate(&self, case: &RuleCase) -> Outcome {
        match panic::catch_unwind(AssertUnwindSafe(|| self.classify(case))) {
            Ok(verdict) => Outcome::Classified(verdict),
            Err(payload) => Outcome::EvaluationError(panic_message(payload.as_ref())),
        }
    }
}

impl fmt::Debug for ClassifierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierRegistry")
            .field("rules", &self.evaluators.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "evaluator panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use fc_core::FixtureKind;

    use super::*;

    fn snake_only(source: &str) -> bool {
        !source.chars().any(|c| c.is_ascii_uppercase())
    }

    #[test]
    fn test_register_and_classify() {
        let mut registry = ClassifierRegistry::new();
        registry.register("C-03-04", snake_only).unwrap();

        let pass = RuleCase::new("C-03-04", FixtureKind::Pass, "int buffer_size;");
        let fail = RuleCase::new("C-03-04", FixtureKind::Fail, "int bufferSize;");
        assert_eq!(registry.classify(&pass), Verdict::Pass);
        assert_eq!(registry.classify(&fail), Verdict::Fail);
    }

    #[test]
    fn test_duplicate_register_keeps_first() {
        let mut registry = ClassifierRegistry::new();
        registry.register("C-03-04", |_: &str| true).unwrap();

        let err = registry.register("C-03-04", |_: &str| false).unwrap_err();
        assert_eq!(err.rule_id.as_str(), "C-03-04");
        assert_eq!(registry.len(), 1);

        let case = RuleCase::new("C-03-04", FixtureKind::Fail, "anything");
        assert_eq!(registry.classify(&case), Verdict::Pass);
    }

    #[test]
    fn test_unbound_rule_is_indeterminate() {
        let registry = ClassifierRegistry::new();
        for kind in FixtureKind::ALL {
            let case = RuleCase::new("C-04-01", kind, "void f(void) {}");
            let verdict = registry.classify(&case);
            assert_eq!(verdict, Verdict::Indeterminate);
            assert!(verdict.matches(case.expected_verdict));
        }
    }

    #[test]
    fn test_classify_is_deterministic() {
        let registry = ClassifierRegistry::with_builtin_rules::<&str>(&[]).unwrap();
        let case = RuleCase::new(
            "C-01-18",
            FixtureKind::Fail,
            "int* counter;\nchar *name;\n",
        );

        let first = registry.classify(&case);
        for _ in 0..20 {
            assert_eq!(registry.classify(&case), first);
        }
        assert_eq!(first, Verdict::Fail);
    }

    #[test]
    fn test_panic_becomes_evaluation_error() {
        let mut registry = ClassifierRegistry::new();
        registry
            .register("C-01-02", |_: &str| -> bool { panic!("lexer lost track of braces") })
            .unwrap();

        let case = RuleCase::new("C-01-02", FixtureKind::Pass, "switch (x) {}");
        let outcome = registry.evaluate(&case);
        assert_eq!(
            outcome,
            Outcome::EvaluationError("lexer lost track of braces".to_string())
        );
        assert!(!outcome.matched(case.expected_verdict));
    }

    #[test]
    fn test_builtin_rules_respect_disabled() {
        let registry = ClassifierRegistry::with_builtin_rules(&["C-03-04", "T-01-02"]).unwrap();
        assert!(!registry.is_registered("C-03-04"));
        assert!(!registry.is_registered("T-01-02"));
        assert!(registry.is_registered("Py-10-01"));
        assert_eq!(registry.len(), fc_rules::builtin_rules().len() - 2);
    }

    #[test]
    fn test_panic_message_formats() {
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(boxed.as_ref()), "evaluator panicked");
    }
}
