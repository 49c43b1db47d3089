//! Fixture discovery and loading.
//!
//! A fixture is any file inside a directory named `pass/`, `fail/`,
//! `ai-pass/` or `ai-fail/` whose name has the shape
//! `{rule_id}_{description}.{ext}`. The directory decides the expected
//! verdict and category; the file name decides the rule.

use std::path::{Path, PathBuf};

use fc_core::{FixtureKind, RuleCase, RuleId};
use tokio::task::JoinSet;
use walkdir::WalkDir;

/// Header lines scanned for a tool annotation.
const HEADER_LINES: usize = 20;

/// Errors loading a single fixture or the corpus root.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("fixture root {} does not exist", path.display())]
    RootNotFound { path: PathBuf },

    #[error("{} does not start with a `{{rule_id}}_` prefix", path.display())]
    MalformedName { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl LoadError {
    /// Path the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::RootNotFound { path }
            | LoadError::MalformedName { path }
            | LoadError::Read { path, .. }
            | LoadError::Walk { path, .. } => path,
        }
    }
}

/// A fixture file found on disk, not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureRef {
    pub path: PathBuf,
    pub kind: FixtureKind,
}

/// Everything a load produced: the readable cases and the per-file errors.
#[derive(Debug, Default)]
pub struct Corpus {
    /// Loaded cases, ordered by path
    pub cases: Vec<RuleCase>,
    /// Files that could not be turned into cases, ordered by path
    pub errors: Vec<LoadError>,
}

impl Corpus {
    /// Total number of fixture files seen.
    pub fn len(&self) -> usize {
        self.cases.len() + self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split a fixture file name into rule id and description.
///
/// The rule id is the file stem up to the first underscore.
pub fn parse_file_name(path: &Path) -> Option<(RuleId, String)> {
    let stem = path.file_stem()?.to_str()?;
    let (rule_id, description) = stem.split_once('_')?;

    if rule_id.is_empty() || rule_id.chars().any(char::is_whitespace) {
        return None;
    }

    Some((RuleId::new(rule_id), description.to_string()))
}

/// Find the tool annotation in a fixture header.
///
/// Mechanical fixtures carry `Tool: <name>`; review fixtures carry
/// `AI Review: ...`, recorded as plain `AI Review`.
pub fn detect_tool(source: &str) -> Option<String> {
    for line in source.lines().take(HEADER_LINES) {
        let text = line
            .trim()
            .trim_start_matches("/*")
            .trim_start_matches("//")
            .trim_start_matches('#')
            .trim_end_matches("*/")
            .trim();

        if let Some(tool) = text.strip_prefix("Tool:") {
            let tool = tool.trim();
            if !tool.is_empty() {
                return Some(tool.to_string());
            }
        }
        if text.starts_with("AI Review") {
            return Some("AI Review".to_string());
        }
    }

    None
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

/// Walk `root` for fixture files.
///
/// Returns the fixtures found, in path order, and the walk errors met on
/// the way. `extensions` limits which files count as fixtures; empty means
/// every file does.
pub fn discover(
    root: &Path,
    extensions: &[String],
) -> Result<(Vec<FixtureRef>, Vec<LoadError>), LoadError> {
    if !root.is_dir() {
        return Err(LoadError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut fixtures = Vec::new();
    let mut errors = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !entry.file_name().to_str().is_some_and(is_hidden));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                let path = source
                    .path()
                    .map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                errors.push(LoadError::Walk { path, source });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let kind = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .and_then(FixtureKind::from_dir_name);

        if let Some(kind) = kind {
            if has_extension(path, extensions) {
                fixtures.push(FixtureRef {
                    path: path.to_path_buf(),
                    kind,
                });
            }
        }
    }

    tracing::debug!(
        root = %root.display(),
        fixtures = fixtures.len(),
        walk_errors = errors.len(),
        "Fixture discovery finished"
    );

    Ok((fixtures, errors))
}

/// Read one fixture into a case.
pub async fn load_case(fixture: &FixtureRef) -> Result<RuleCase, LoadError> {
    let (rule_id, description) =
        parse_file_name(&fixture.path).ok_or_else(|| LoadError::MalformedName {
            path: fixture.path.clone(),
        })?;

    let source_text = tokio::fs::read_to_string(&fixture.path)
        .await
        .map_err(|source| LoadError::Read {
            path: fixture.path.clone(),
            source,
        })?;

    let tool = detect_tool(&source_text);
    let mut case = RuleCase::new(rule_id, fixture.kind, source_text)
        .with_path(&fixture.path)
        .with_description(description);
    case.tool = tool;

    Ok(case)
}

/// Discover and read every fixture under `root`.
///
/// Files are read concurrently. A file that cannot be read or named
/// becomes an entry in [`Corpus::errors`]; only a missing root fails the
/// whole load.
pub async fn load_corpus(root: &Path, extensions: &[String]) -> Result<Corpus, LoadError> {
    let (fixtures, mut errors) = discover(root, extensions)?;

    let mut reads = JoinSet::new();
    for fixture in fixtures {
        reads.spawn(async move { load_case(&fixture).await });
    }

    let mut cases = Vec::new();
    while let Some(joined) = reads.join_next().await {
        match joined {
            Ok(Ok(case)) => cases.push(case),
            Ok(Err(err)) => {
                tracing::warn!(path = %err.path().display(), error = %err, "Fixture not loaded");
                errors.push(err);
            }
            Err(join_err) => {
                // Reads hold no user code; a failed join means the runtime
                // is shutting down.
                tracing::error!(error = %join_err, "Fixture read task failed");
            }
        }
    }

    cases.sort_by(|a, b| a.path.cmp(&b.path));
    errors.sort_by(|a, b| a.path().cmp(b.path()));

    tracing::info!(
        root = %root.display(),
        cases = cases.len(),
        load_errors = errors.len(),
        "Corpus loaded"
    );

    Ok(Corpus { cases, errors })
}
