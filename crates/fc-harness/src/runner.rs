//! Concurrent classification of a corpus.
//!
//! Each case is evaluated on tokio's blocking pool. A semaphore bounds how
//! many evaluations run at once. Results are collected per case and the
//! report is ordered by case path, never by completion order.

use std::sync::Arc;

use fc_core::{Outcome, RuleCase};
use tokio::sync::Semaphore;

use crate::classifier::{panic_message, ClassifierRegistry};
use crate::config::RunConfig;
use crate::error::Result;
use crate::loader::{self, Corpus};
use crate::report::{audit_pairs, CaseReport, LoadFailure, Report};

/// Runs cases against a frozen registry.
#[derive(Debug, Clone)]
pub struct Runner {
    registry: Arc<ClassifierRegistry>,
    workers: usize,
    audit_pairs: bool,
}

impl Runner {
    /// Create a runner with one worker per CPU and the pair audit off.
    pub fn new(registry: ClassifierRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            workers: num_cpus::get().max(1),
            audit_pairs: false,
        }
    }

    /// Build the registry and runner described by `config`.
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        let registry = ClassifierRegistry::with_builtin_rules(&config.disabled_rules)?;
        Ok(Self::new(registry)
            .with_workers(config.workers)
            .with_pair_audit(config.audit_pairs))
    }

    /// Set the number of concurrent evaluations.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        debug_assert!(workers > 0, "Runner needs at least one worker");
        self.workers = workers.max(1);
        self
    }

    /// Enable or disable the pair audit.
    #[must_use]
    pub fn with_pair_audit(mut self, enabled: bool) -> Self {
        self.audit_pairs = enabled;
        self
    }

    pub fn registry(&self) -> &ClassifierRegistry {
        &self.registry
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Classify every case.
    pub async fn run(&self, cases: Vec<RuleCase>) -> Report {
        self.run_with_load_errors(cases, Vec::new()).await
    }

    /// Classify a loaded corpus, carrying its load errors into the report.
    pub async fn run_corpus(&self, corpus: Corpus) -> Report {
        let load_errors = corpus.errors.iter().map(LoadFailure::from).collect();
        self.run_with_load_errors(corpus.cases, load_errors).await
    }

    async fn run_with_load_errors(&self, cases: Vec<RuleCase>, load_errors: Vec<LoadFailure>) -> Report {
        let cases: Arc<[RuleCase]> = cases.into();
        let outcomes = self.evaluate_all(&cases).await;
        debug_assert_eq!(outcomes.len(), cases.len());

        let mut reports = Vec::with_capacity(cases.len());
        for (case, outcome) in cases.iter().zip(outcomes) {
            log_outcome(case, &outcome);
            reports.push(CaseReport::new(case, outcome));
        }

        let mut report = Report::new(reports, load_errors);
        if self.audit_pairs {
            let gaps = audit_pairs(&cases);
            for gap in &gaps {
                tracing::warn!(rule_id = %gap.rule_id, missing = %gap.missing, "Rule lacks a fixture");
            }
            report = report.with_pair_gaps(gaps);
        }

        tracing::info!(
            total = report.summary.total,
            matched = report.summary.matched,
            unmatched = report.summary.unmatched,
            indeterminate = report.summary.indeterminate,
            load_errors = report.summary.load_errors,
            "Run finished"
        );

        report
    }

    /// Evaluate every case; outcome `i` belongs to case `i`.
    async fn evaluate_all(&self, cases: &Arc<[RuleCase]>) -> Vec<Outcome> {
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(cases.len());

        for index in 0..cases.len() {
            // The semaphore is never closed, so acquisition only waits.
            let permit = permits.clone().acquire_owned().await.ok();
            let registry = Arc::clone(&self.registry);
            let cases = Arc::clone(cases);

            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                registry.evaluate(&cases[index])
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) if err.is_panic() => {
                    Outcome::EvaluationError(panic_message(err.into_panic().as_ref()))
                }
                Err(err) => Outcome::EvaluationError(err.to_string()),
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}

fn log_outcome(case: &RuleCase, outcome: &Outcome) {
    match outcome {
        Outcome::Classified(verdict) => {
            if verdict.matches(case.expected_verdict) {
                tracing::debug!(
                    rule_id = %case.rule_id,
                    path = %case.path.display(),
                    verdict = %verdict,
                    "Case classified"
                );
            } else {
                tracing::warn!(
                    rule_id = %case.rule_id,
                    path = %case.path.display(),
                    expected = %case.expected_verdict,
                    actual = %verdict,
                    "Verdict mismatch"
                );
            }
        }
        Outcome::EvaluationError(message) => {
            tracing::error!(
                rule_id = %case.rule_id,
                path = %case.path.display(),
                error = %message,
                "Evaluator panicked"
            );
        }
    }
}

/// Load the corpus named by `config` and classify it with the built-in
/// rules.
pub async fn run_config(config: &RunConfig) -> Result<Report> {
    config.validate()?;

    let runner = Runner::from_config(config)?;
    let corpus = loader::load_corpus(&config.root, &config.extensions).await?;

    tracing::info!(
        root = %config.root.display(),
        cases = corpus.cases.len(),
        rules = runner.registry().len(),
        workers = runner.workers(),
        "Starting run"
    );

    Ok(runner.run_corpus(corpus).await)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use fc_core::{FixtureKind, Verdict};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    use super::*;

    const SNAKE_CASE_FIXTURE: &str = r#"/* C-03-04: snake_case identifiers (PASS) */
/* Tool: clang-tidy (readability-identifier-naming) */

#define MAX_BUFFER_SIZE 256

static int buffer_count = 0;

int compute_total(int item_count, int unit_price)
{
    int total_price = item_count * unit_price;
    return total_price;
}
"#;

    const CAMEL_CASE_FIXTURE: &str = r#"/* C-03-04: snake_case identifiers (FAIL) */
/* Tool: clang-tidy (readability-identifier-naming) */

static int bufferCount = 0;

int computeTotal(int itemCount, int unitPrice)
{
    int totalPrice = itemCount * unitPrice;
    return totalPrice;
}
"#;

    fn builtin_runner(workers: usize) -> Runner {
        Runner::new(ClassifierRegistry::with_builtin_rules::<&str>(&[]).unwrap()).with_workers(workers)
    }

    #[tokio::test]
    async fn test_snake_case_scenario() {
        let cases = vec![
            RuleCase::new("C-03-04", FixtureKind::Pass, SNAKE_CASE_FIXTURE)
                .with_path("c/pass/C-03-04_snake_case.c"),
            RuleCase::new("C-03-04", FixtureKind::Fail, CAMEL_CASE_FIXTURE)
                .with_path("c/fail/C-03-04_camel_case.c"),
        ];

        let report = builtin_runner(2).run(cases).await;
        assert_eq!(report.summary.total, 2);
        assert!(report.all_matched());

        let fail = &report.cases[0];
        assert!(fail.path.ends_with("C-03-04_camel_case.c"));
        assert_eq!(fail.actual, Some(Verdict::Fail));
        let pass = &report.cases[1];
        assert_eq!(pass.actual, Some(Verdict::Pass));
    }

    #[tokio::test]
    async fn test_mismatch_sets_exit_code() {
        let cases = vec![RuleCase::new("C-03-04", FixtureKind::Pass, CAMEL_CASE_FIXTURE)
            .with_path("c/pass/C-03-04_mislabelled.c")];

        let report = builtin_runner(1).run(cases).await;
        assert_eq!(report.summary.unmatched, 1);
        assert_eq!(report.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_unbound_rules_match() {
        let cases = vec![
            RuleCase::new("C-04-01", FixtureKind::AiPass, "void f(void) {}").with_path("a.c"),
            RuleCase::new("C-04-01", FixtureKind::AiFail, "void g(void) {}").with_path("b.c"),
        ];

        let report = builtin_runner(2).run(cases).await;
        assert_eq!(report.summary.indeterminate, 2);
        assert_eq!(report.exit_code(), 0);
        assert!(report
            .cases
            .iter()
            .all(|c| c.actual == Some(Verdict::Indeterminate) && c.matched));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_evaluator_does_not_abort_run() {
        let mut registry = ClassifierRegistry::new();
        registry
            .register("C-01-02", |source: &str| -> bool {
                if source.contains("switch") {
                    panic!("unbalanced switch body");
                }
                true
            })
            .unwrap();
        let runner = Runner::new(registry).with_workers(4);

        let cases = vec![
            RuleCase::new("C-01-02", FixtureKind::Pass, "switch (x) {").with_path("a.c"),
            RuleCase::new("C-01-02", FixtureKind::Pass, "int x;").with_path("b.c"),
        ];

        let report = runner.run(cases).await;
        assert_eq!(report.summary.evaluation_errors, 1);
        assert_eq!(report.summary.matched, 1);
        assert_eq!(report.cases[0].error.as_deref(), Some("unbalanced switch body"));
        assert!(!report.cases[0].matched);
        assert_eq!(report.exit_code(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_report_independent_of_order_and_workers() {
        let mut cases = Vec::new();
        for i in 0..24 {
            let (kind, source) = if i % 2 == 0 {
                (FixtureKind::Pass, "int item_count;\n")
            } else {
                (FixtureKind::Fail, "int itemCount;\n")
            };
            cases.push(RuleCase::new("C-03-04", kind, source).with_path(format!("case_{:02}.c", i)));
        }

        let baseline = builtin_runner(1).run(cases.clone()).await;

        let mut rng = StdRng::seed_from_u64(0x5eed);
        for workers in [2, 8] {
            let mut shuffled = cases.clone();
            shuffled.shuffle(&mut rng);
            let report = builtin_runner(workers).run(shuffled).await;
            assert_eq!(report, baseline);
        }
        assert!(baseline.all_matched());
    }

    fn write(root: &Path, rel: &str, contents: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn test_ten_cases_one_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            write(
                dir.path(),
                &format!("c/pass/C-03-04_snake_{}.c", i),
                b"int item_count;\n",
            );
        }
        for i in 0..4 {
            write(
                dir.path(),
                &format!("c/fail/C-03-04_camel_{}.c", i),
                b"int itemCount;\n",
            );
        }
        // Not valid UTF-8.
        write(dir.path(), "c/fail/C-03-04_camel_latin1.c", &[0x69, 0x6e, 0x74, 0x20, 0xff, 0xfe, 0x3b, 0x0a]);

        let config = RunConfig {
            root: dir.path().to_path_buf(),
            workers: 3,
            ..RunConfig::default()
        };
        let report = run_config(&config).await.unwrap();

        assert_eq!(report.summary.total, 9);
        assert_eq!(report.summary.load_errors, 1);
        assert_eq!(report.load_errors.len(), 1);
        assert!(report.load_errors[0].path.ends_with("C-03-04_camel_latin1.c"));
        assert_eq!(report.summary.matched, 9);
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_run_config_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            root: dir.path().join("nowhere"),
            ..RunConfig::sequential()
        };
        assert!(run_config(&config).await.is_err());
    }
}
