//! Import rules.

use std::sync::OnceLock;

use regex::Regex;

use crate::source::{mask_python, static_regex};
use crate::Violation;

static WILDCARD_RE: OnceLock<Regex> = OnceLock::new();

/// Check that each `import` statement names a single module.
///
/// `from pkg import a, b` is left to isort; only `import a, b` is reported.
pub fn check_single_import(code: &str) -> Vec<Violation> {
    let masked = mask_python(code);
    let mut violations = Vec::new();

    for (line_num, line) in masked.text.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("import ") && trimmed.contains(',') {
            violations.push(
                Violation::new("Py-03-02", "several modules imported on one line")
                    .at_line(line_num + 1),
            );
        }
    }

    violations
}

/// Check that no `from module import *` is used.
pub fn check_no_wildcard_import(code: &str) -> Vec<Violation> {
    let wildcard_re = static_regex(&WILDCARD_RE, r"^\s*from\s+[\w.]+\s+import\s+\*");

    let masked = mask_python(code);
    let mut violations = Vec::new();

    for (line_num, line) in masked.text.lines().enumerate() {
        if wildcard_re.is_match(line) {
            violations.push(Violation::new("Py-03-04", "wildcard import").at_line(line_num + 1));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_import() {
        let bad_code = "import os, sys, json\n\nimport requests\n";
        assert_eq!(check_single_import(bad_code).len(), 1);

        let good_code = "import os\nimport sys\nfrom pathlib import Path, PurePath\n";
        assert!(check_single_import(good_code).is_empty());
    }

    #[test]
    fn test_wildcard_import() {
        let bad_code = "from os.path import *\nfrom collections import *\n";
        assert_eq!(check_no_wildcard_import(bad_code).len(), 2);

        let good_code = "from os.path import join, dirname\n# from x import *\n";
        assert!(check_no_wildcard_import(good_code).is_empty());
    }
}
