//! Run reports.
//!
//! A report lists every classified case in path order, every fixture that
//! could not be loaded, and (optionally) the rules missing a pass or fail
//! fixture. Only classified cases count toward the tallies and the exit
//! code.

use std::collections::BTreeMap;
use std::path::PathBuf;

use fc_core::{Category, ExpectedVerdict, Language, Outcome, RuleCase, RuleId, Verdict};
use serde::Serialize;

use crate::loader::LoadError;

/// Per-case result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    pub rule_id: RuleId,
    pub path: PathBuf,
    pub category: Category,
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    pub expected: ExpectedVerdict,
    /// `None` when the evaluator faulted
    pub actual: Option<Verdict>,
    pub matched: bool,
    /// Panic message of a faulted evaluator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaseReport {
    /// Record the outcome of evaluating `case`.
    pub fn new(case: &RuleCase, outcome: Outcome) -> Self {
        let matched = outcome.matched(case.expected_verdict);
        let (actual, error) = match outcome {
            Outcome::Classified(verdict) => (Some(verdict), None),
            Outcome::EvaluationError(message) => (None, Some(message)),
        };

        Self {
            rule_id: case.rule_id.clone(),
            path: case.path.clone(),
            category: case.category,
            language: case.language,
            tool: case.tool.clone(),
            expected: case.expected_verdict,
            actual,
            matched,
            error,
        }
    }

    /// Short status tag for text output.
    pub fn status(&self) -> &'static str {
        match (self.actual, self.matched) {
            (None, _) => "ERROR",
            (Some(Verdict::Indeterminate), _) => "SKIP",
            (Some(_), true) => "ok",
            (Some(_), false) => "MISMATCH",
        }
    }

    fn format_line(&self) -> String {
        let actual = match (&self.actual, &self.error) {
            (Some(verdict), _) => verdict.name().to_string(),
            (None, Some(message)) => format!("panicked: {}", message),
            (None, None) => "no verdict".to_string(),
        };
        format!(
            "[{:<8}] {} {}: expected {}, got {}",
            self.status(),
            self.rule_id,
            self.path.display(),
            self.expected,
            actual
        )
    }
}

/// A fixture that never became a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub message: String,
}

impl From<&LoadError> for LoadFailure {
    fn from(err: &LoadError) -> Self {
        Self {
            path: err.path().to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// A rule whose corpus lacks a pass or a fail fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairGap {
    pub rule_id: RuleId,
    pub missing: ExpectedVerdict,
}

/// List the rules in `cases` that lack a pass or a fail fixture.
pub fn audit_pairs(cases: &[RuleCase]) -> Vec<PairGap> {
    let mut seen: BTreeMap<&RuleId, (bool, bool)> = BTreeMap::new();

    for case in cases {
        let entry = seen.entry(&case.rule_id).or_default();
        match case.expected_verdict {
            ExpectedVerdict::Pass => entry.0 = true,
            ExpectedVerdict::Fail => entry.1 = true,
        }
    }

    let mut gaps = Vec::new();
    for (rule_id, (has_pass, has_fail)) in seen {
        if !has_pass {
            gaps.push(PairGap {
                rule_id: rule_id.clone(),
                missing: ExpectedVerdict::Pass,
            });
        }
        if !has_fail {
            gaps.push(PairGap {
                rule_id: rule_id.clone(),
                missing: ExpectedVerdict::Fail,
            });
        }
    }
    gaps
}

/// Tallies over classified cases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Classified cases (load errors excluded)
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Matched only because no evaluator is bound
    pub indeterminate: usize,
    /// Unmatched because the evaluator panicked
    pub evaluation_errors: usize,
    /// Fixtures that could not be loaded; not part of `total`
    pub load_errors: usize,
}

impl Summary {
    fn tally(cases: &[CaseReport], load_errors: usize) -> Self {
        let matched = cases.iter().filter(|c| c.matched).count();
        let summary = Self {
            total: cases.len(),
            matched,
            unmatched: cases.len() - matched,
            indeterminate: cases
                .iter()
                .filter(|c| c.actual == Some(Verdict::Indeterminate))
                .count(),
            evaluation_errors: cases.iter().filter(|c| c.actual.is_none()).count(),
            load_errors,
        };

        debug_assert!(summary.matched + summary.unmatched == summary.total);
        debug_assert!(summary.evaluation_errors <= summary.unmatched);

        summary
    }
}

/// Result of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub cases: Vec<CaseReport>,
    pub load_errors: Vec<LoadFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pair_gaps: Vec<PairGap>,
}

impl Report {
    /// Build a report; cases are ordered by path, then rule id.
    pub fn new(mut cases: Vec<CaseReport>, mut load_errors: Vec<LoadFailure>) -> Self {
        cases.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.rule_id.cmp(&b.rule_id)));
        load_errors.sort_by(|a, b| a.path.cmp(&b.path));

        Self {
            summary: Summary::tally(&cases, load_errors.len()),
            cases,
            load_errors,
            pair_gaps: Vec::new(),
        }
    }

    /// Attach pair audit results.
    #[must_use]
    pub fn with_pair_gaps(mut self, pair_gaps: Vec<PairGap>) -> Self {
        self.pair_gaps = pair_gaps;
        self
    }

    /// Whether every classified case matched.
    pub fn all_matched(&self) -> bool {
        self.summary.unmatched == 0
    }

    /// Process exit code: 0 iff every classified case matched.
    ///
    /// Load errors and pair gaps do not affect it.
    pub fn exit_code(&self) -> u8 {
        if self.all_matched() {
            0
        } else {
            1
        }
    }

    /// Cases that did not match.
    pub fn unmatched(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| !c.matched)
    }

    /// Render as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Render as a plain-text report.
    pub fn format_text(&self) -> String {
        let mut report = String::new();

        report.push_str("Fixture Conformance Report\n");
        report.push_str("==========================\n\n");

        for case in &self.cases {
            report.push_str(&case.format_line());
            report.push('\n');
        }

        if !self.load_errors.is_empty() {
            report.push_str("\nLoad errors:\n");
            for failure in &self.load_errors {
                report.push_str(&format!("  {}\n", failure.message));
            }
        }

        if !self.pair_gaps.is_empty() {
            report.push_str("\nMissing fixtures:\n");
            for gap in &self.pair_gaps {
                report.push_str(&format!("  {}: no {} fixture\n", gap.rule_id, gap.missing));
            }
        }

        report.push_str(&format!(
            "\nSummary: {}/{} matched ({} indeterminate, {} evaluation errors, {} load errors)\n",
            self.summary.matched,
            self.summary.total,
            self.summary.indeterminate,
            self.summary.evaluation_errors,
            self.summary.load_errors
        ));

        if self.all_matched() {
            report.push_str("Result: PASS\n");
        } else {
            report.push_str("Result: FAIL\n");
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use fc_core::FixtureKind;

    use super::*;

    fn case(rule: &str, kind: FixtureKind, path: &str) -> RuleCase {
        RuleCase::new(rule, kind, "").with_path(path)
    }

    #[test]
    fn test_case_report_from_outcomes() {
        let c = case("C-03-04", FixtureKind::Fail, "c/fail/C-03-04_camel.c");

        let matched = CaseReport::new(&c, Outcome::Classified(Verdict::Fail));
        assert!(matched.matched);
        assert_eq!(matched.status(), "ok");

        let mismatch = CaseReport::new(&c, Outcome::Classified(Verdict::Pass));
        assert!(!mismatch.matched);
        assert_eq!(mismatch.status(), "MISMATCH");

        let faulted = CaseReport::new(&c, Outcome::EvaluationError("boom".to_string()));
        assert!(!faulted.matched);
        assert_eq!(faulted.actual, None);
        assert_eq!(faulted.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_report_orders_by_path_and_tallies() {
        let b = case("Py-10-01", FixtureKind::Pass, "b.py");
        let a = case("C-04-01", FixtureKind::AiFail, "a.c");
        let c = case("C-01-18", FixtureKind::Pass, "c.c");

        let report = Report::new(
            vec![
                CaseReport::new(&b, Outcome::Classified(Verdict::Pass)),
                CaseReport::new(&c, Outcome::EvaluationError("boom".to_string())),
                CaseReport::new(&a, Outcome::Classified(Verdict::Indeterminate)),
            ],
            vec![LoadFailure {
                path: PathBuf::from("z.c"),
                message: "failed to read z.c".to_string(),
            }],
        );

        let paths: Vec<_> = report.cases.iter().map(|c| c.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("a.c"), PathBuf::from("b.py"), PathBuf::from("c.c")]);

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.matched, 2);
        assert_eq!(report.summary.unmatched, 1);
        assert_eq!(report.summary.indeterminate, 1);
        assert_eq!(report.summary.evaluation_errors, 1);
        assert_eq!(report.summary.load_errors, 1);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_load_errors_do_not_affect_exit_code() {
        let c = case("C-03-04", FixtureKind::Pass, "ok.c");
        let report = Report::new(
            vec![CaseReport::new(&c, Outcome::Classified(Verdict::Pass))],
            vec![LoadFailure {
                path: PathBuf::from("bad.c"),
                message: "unreadable".to_string(),
            }],
        );
        assert!(report.all_matched());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_json_shape() {
        let c = case("C-03-04", FixtureKind::Pass, "c/pass/C-03-04_snake.c");
        let report = Report::new(vec![CaseReport::new(&c, Outcome::Classified(Verdict::Pass))], vec![]);

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        let first = &value["cases"][0];
        assert_eq!(first["rule_id"], "C-03-04");
        assert_eq!(first["path"], "c/pass/C-03-04_snake.c");
        assert_eq!(first["expected"], "pass");
        assert_eq!(first["actual"], "pass");
        assert_eq!(first["matched"], true);
        assert_eq!(value["summary"]["matched"], 1);
        assert_eq!(value["summary"]["unmatched"], 0);
        assert!(value["load_errors"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_audit_pairs() {
        let cases = vec![
            case("C-03-04", FixtureKind::Pass, "p.c"),
            case("C-03-04", FixtureKind::Fail, "f.c"),
            case("Py-05-01", FixtureKind::Pass, "p.py"),
            case("C-04-01", FixtureKind::AiFail, "a.c"),
        ];

        let gaps = audit_pairs(&cases);
        assert_eq!(
            gaps,
            vec![
                PairGap {
                    rule_id: RuleId::new("C-04-01"),
                    missing: ExpectedVerdict::Pass,
                },
                PairGap {
                    rule_id: RuleId::new("Py-05-01"),
                    missing: ExpectedVerdict::Fail,
                },
            ]
        );
    }

    #[test]
    fn test_format_text() {
        let c = case("C-03-04", FixtureKind::Fail, "camel.c");
        let report = Report::new(vec![CaseReport::new(&c, Outcome::Classified(Verdict::Pass))], vec![])
            .with_pair_gaps(audit_pairs(std::slice::from_ref(&c)));

        let text = report.format_text();
        assert!(text.contains("MISMATCH"));
        assert!(text.contains("C-03-04: no pass fixture"));
        assert!(text.contains("Summary: 0/1 matched"));
        assert!(text.contains("Result: FAIL"));
    }
}
