//! Python style rules.

mod imports;
mod practices;
mod style;

use fc_core::Language;

use crate::RuleDef;

pub use imports::{check_no_wildcard_import, check_single_import};
pub use practices::{check_bare_except, check_mutable_defaults, check_with_open};
pub use style::{check_bracket_spacing, check_double_quotes, check_top_level_blank_lines};

/// Python rules, ordered by id.
pub fn rules() -> Vec<RuleDef> {
    vec![
        RuleDef::new(
            "Py-02-04",
            "two blank lines before top-level definitions",
            Language::Python,
            "Black, Flake8 (E302)",
            check_top_level_blank_lines,
        ),
        RuleDef::new(
            "Py-03-02",
            "one import per line",
            Language::Python,
            "isort, Flake8 (E401)",
            check_single_import,
        ),
        RuleDef::new(
            "Py-03-04",
            "no wildcard imports",
            Language::Python,
            "Flake8 (F403)",
            check_no_wildcard_import,
        ),
        RuleDef::new(
            "Py-05-01",
            "double-quoted strings",
            Language::Python,
            "Black",
            check_double_quotes,
        ),
        RuleDef::new(
            "Py-06-02",
            "no whitespace inside brackets",
            Language::Python,
            "Black, Flake8 (E201, E202)",
            check_bracket_spacing,
        ),
        RuleDef::new(
            "Py-08-05",
            "no mutable default arguments",
            Language::Python,
            "Flake8-bugbear (B006)",
            check_mutable_defaults,
        ),
        RuleDef::new(
            "Py-10-01",
            "specific exception types",
            Language::Python,
            "Flake8 (E722)",
            check_bare_except,
        ),
        RuleDef::new(
            "Py-11-01",
            "with statement for file handles",
            Language::Python,
            "Flake8 (resource management)",
            check_with_open,
        ),
    ]
}
