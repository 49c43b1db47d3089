//! # fc-rules
//!
//! Built-in style rule evaluators.
//!
//! Each rule is a line/token scanner over source text. Checks that must
//! not see comments or string literals run on masked source (see
//! [`source`]). A fixture conforms to a rule when the rule reports no
//! violations.
//!
//! ## C rules
//! - `C-01-02` switch labels at switch indent
//! - `C-01-11` function brace on its own line
//! - `C-01-12` control brace on the same line
//! - `C-01-14` control statements always braced
//! - `C-01-15` no assignment in `if` conditions
//! - `C-01-18` pointer `*` next to the variable
//! - `C-02-05` multi-statement macros use `do { } while (0)`
//! - `C-02-08` macro arguments parenthesized
//! - `C-03-04` snake_case identifiers
//!
//! ## Python rules
//! - `Py-02-04` two blank lines around top-level definitions
//! - `Py-03-02` one import per line
//! - `Py-03-04` no wildcard imports
//! - `Py-05-01` double quotes
//! - `Py-06-02` no whitespace inside brackets
//! - `Py-08-05` no mutable default arguments
//! - `Py-10-01` no bare `except:`
//! - `Py-11-01` files opened with `with`
//!
//! ## Text rules
//! - `T-01-01` no trailing whitespace
//! - `T-01-02` no emoji or decorative symbols
//!
//! Review-judged rules (descriptive names, single responsibility,
//! comment language, ...) have no evaluator here on purpose.

pub mod c;
pub mod python;
pub mod source;
pub mod text;

use fc_core::{Evaluator, Language};

/// A rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Rule that was violated
    pub rule: &'static str,
    /// Description of the violation
    pub message: String,
    /// Line number (if available)
    pub line: Option<usize>,
}

impl Violation {
    /// Create a new violation.
    pub fn new(rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
            line: None,
        }
    }

    /// Add line number.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Format for display.
    pub fn format(&self) -> String {
        let line = self.line.map_or(String::new(), |l| format!(":{}", l));
        format!("[{}]{} {}", self.rule, line, self.message)
    }
}

/// Signature shared by every rule check.
pub type CheckFn = fn(&str) -> Vec<Violation>;

/// A built-in rule: identity plus its check.
#[derive(Clone, Copy)]
pub struct RuleDef {
    /// Rule id, as used in fixture file names
    pub id: &'static str,
    /// Short title
    pub title: &'static str,
    /// Language the rule applies to
    pub language: Language,
    /// External tool the rule mirrors
    pub tool: &'static str,
    check: CheckFn,
}

impl RuleDef {
    /// Define a rule.
    pub const fn new(
        id: &'static str,
        title: &'static str,
        language: Language,
        tool: &'static str,
        check: CheckFn,
    ) -> Self {
        Self {
            id,
            title,
            language,
            tool,
            check,
        }
    }

    /// Run the check and return every violation.
    pub fn violations(&self, source: &str) -> Vec<Violation> {
        (self.check)(source)
    }
}

impl std::fmt::Debug for RuleDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleDef")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("language", &self.language)
            .field("tool", &self.tool)
            .finish()
    }
}

impl Evaluator for RuleDef {
    fn conforms(&self, source: &str) -> bool {
        self.violations(source).is_empty()
    }
}

/// Every built-in rule, ordered by id within each language.
pub fn builtin_rules() -> Vec<RuleDef> {
    let mut rules = Vec::new();
    rules.extend(c::rules());
    rules.extend(python::rules());
    rules.extend(text::rules());
    rules
}

/// Look up a built-in rule by id.
pub fn find_rule(id: &str) -> Option<RuleDef> {
    builtin_rules().into_iter().find(|rule| rule.id == id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_violation_format() {
        let v = Violation::new("C-01-15", "assignment inside if condition").at_line(12);
        let formatted = v.format();
        assert!(formatted.contains("C-01-15"));
        assert!(formatted.contains(":12"));
    }

    #[test]
    fn test_builtin_ids_unique() {
        let rules = builtin_rules();
        let ids: HashSet<&str> = rules.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), rules.len());
        assert_eq!(rules.len(), 19);
    }

    #[test]
    fn test_find_rule() {
        let rule = find_rule("Py-10-01").unwrap();
        assert_eq!(rule.language, Language::Python);
        assert!(!rule.conforms("try:\n    x = 1\nexcept:\n    pass\n"));
        assert!(find_rule("C-04-01").is_none());
    }
}
