//! Rule cases: one fixture plus the verdict its location declares.

use std::borrow::Borrow;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Identifier of a style rule (e.g. `C-03-04`, `Py-10-01`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    /// Create a rule id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        debug_assert!(!id.is_empty(), "Rule id must not be empty");
        Self(id)
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RuleId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl Borrow<str> for RuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Verdict a fixture is expected to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedVerdict {
    /// The fixture conforms to its rule
    Pass,
    /// The fixture violates its rule
    Fail,
}

impl ExpectedVerdict {
    /// Get the name of this verdict.
    pub fn name(&self) -> &'static str {
        match self {
            ExpectedVerdict::Pass => "pass",
            ExpectedVerdict::Fail => "fail",
        }
    }
}

impl fmt::Display for ExpectedVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How conformance with a rule is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Checked mechanically by a lint tool
    Manual,
    /// Judged by a heuristic or AI reviewer
    #[serde(rename = "ai-review")]
    AIReview,
}

/// The tagged directory a fixture lives in.
///
/// Directory names are decoded once, at load time, into this enum.
/// Nothing downstream inspects directory strings again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureKind {
    /// `pass/`
    Pass,
    /// `fail/`
    Fail,
    /// `ai-pass/`
    AiPass,
    /// `ai-fail/`
    AiFail,
}

impl FixtureKind {
    /// All fixture kinds, in directory listing order.
    pub const ALL: [FixtureKind; 4] = [
        FixtureKind::Pass,
        FixtureKind::Fail,
        FixtureKind::AiPass,
        FixtureKind::AiFail,
    ];

    /// Decode a directory name.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.dir_name() == name)
    }

    /// Directory name for this kind.
    pub fn dir_name(&self) -> &'static str {
        match self {
            FixtureKind::Pass => "pass",
            FixtureKind::Fail => "fail",
            FixtureKind::AiPass => "ai-pass",
            FixtureKind::AiFail => "ai-fail",
        }
    }

    /// Verdict a fixture of this kind must receive.
    pub fn expected(&self) -> ExpectedVerdict {
        match self {
            FixtureKind::Pass | FixtureKind::AiPass => ExpectedVerdict::Pass,
            FixtureKind::Fail | FixtureKind::AiFail => ExpectedVerdict::Fail,
        }
    }

    /// How fixtures of this kind are judged.
    pub fn category(&self) -> Category {
        match self {
            FixtureKind::Pass | FixtureKind::Fail => Category::Manual,
            FixtureKind::AiPass | FixtureKind::AiFail => Category::AIReview,
        }
    }
}

/// Source language of a fixture, taken from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Python,
    /// Anything else; only language-neutral rules apply
    Text,
}

impl Language {
    /// Detect the language from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "c" | "h" => Language::C,
            "py" | "pyi" => Language::Python,
            _ => Language::Text,
        }
    }

    /// Detect the language of a path.
    pub fn of_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(Language::Text, Self::from_extension)
    }
}

/// One fixture: source text plus the verdict it is expected to receive.
#[derive(Debug, Clone)]
pub struct RuleCase {
    /// Rule the fixture exercises
    pub rule_id: RuleId,
    /// Free-form part of the file name after the rule id
    pub description: String,
    /// Location of the fixture; identifies the case within a run
    pub path: PathBuf,
    /// Verdict the fixture must receive
    pub expected_verdict: ExpectedVerdict,
    /// Mechanical or review-judged
    pub category: Category,
    /// Source language
    pub language: Language,
    /// Checking tool named in the fixture header, if any
    pub tool: Option<String>,
    /// Raw fixture text
    pub source_text: String,
}

impl RuleCase {
    /// Create a case for the given rule and fixture kind.
    ///
    /// The path defaults to an empty path; loaders set it with
    /// [`RuleCase::with_path`].
    #[must_use]
    pub fn new(rule_id: impl Into<RuleId>, kind: FixtureKind, source_text: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            description: String::new(),
            path: PathBuf::new(),
            expected_verdict: kind.expected(),
            category: kind.category(),
            language: Language::Text,
            tool: None,
            source_text: source_text.into(),
        }
    }

    /// Set the fixture path; the language follows the extension.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self.language = Language::of_path(&self.path);
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the tool annotation.
    #[must_use]
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_kind_round_trips_dir_names() {
        for kind in FixtureKind::ALL {
            assert_eq!(FixtureKind::from_dir_name(kind.dir_name()), Some(kind));
        }
        assert_eq!(FixtureKind::from_dir_name("src"), None);
        assert_eq!(FixtureKind::from_dir_name("PASS"), None);
    }

    #[test]
    fn test_fixture_kind_decodes_expectation() {
        assert_eq!(FixtureKind::AiFail.expected(), ExpectedVerdict::Fail);
        assert_eq!(FixtureKind::AiFail.category(), Category::AIReview);
        assert_eq!(FixtureKind::Pass.expected(), ExpectedVerdict::Pass);
        assert_eq!(FixtureKind::Pass.category(), Category::Manual);
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(Language::of_path(Path::new("c/pass/C-01-18_pointer_right.c")), Language::C);
        assert_eq!(Language::of_path(Path::new("x/Py-10-01_bare_except.py")), Language::Python);
        assert_eq!(Language::of_path(Path::new("README")), Language::Text);
    }

    #[test]
    fn test_case_builder() {
        let case = RuleCase::new("C-03-04", FixtureKind::Fail, "int camelCase;")
            .with_path("fail/C-03-04_camel_case.c")
            .with_description("camel_case");
        assert_eq!(case.rule_id.as_str(), "C-03-04");
        assert_eq!(case.expected_verdict, ExpectedVerdict::Fail);
        assert_eq!(case.language, Language::C);
        assert!(case.tool.is_none());
    }

    #[test]
    fn test_category_serializes_kebab_case() {
        let json = serde_json::to_string(&Category::AIReview).unwrap();
        assert_eq!(json, "\"ai-review\"");
        let json = serde_json::to_string(&Category::Manual).unwrap();
        assert_eq!(json, "\"manual\"");
    }
}
