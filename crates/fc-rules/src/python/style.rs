//! Layout and formatting rules (the part Black would rewrite).

use std::sync::OnceLock;

use regex::Regex;

use crate::source::{mask_python, static_regex};
use crate::Violation;

static OPEN_SPACE_RE: OnceLock<Regex> = OnceLock::new();
static CLOSE_SPACE_RE: OnceLock<Regex> = OnceLock::new();

/// Blank lines required before a top-level `def`/`class`.
const BLANK_LINES_TOP_LEVEL: usize = 2;

fn is_top_level_definition(line: &str) -> bool {
    line.starts_with("def ")
        || line.starts_with("async def ")
        || line.starts_with("class ")
        || line.starts_with('@')
}

/// Check that top-level definitions are preceded by two blank lines.
///
/// Comments directly above a definition belong to it. Definitions at the
/// start of the file and definitions directly under a decorator are
/// exempt.
pub fn check_top_level_blank_lines(code: &str) -> Vec<Violation> {
    let masked = mask_python(code);
    let masked_lines: Vec<&str> = masked.text.lines().collect();
    let lines: Vec<&str> = code.lines().collect();
    let mut violations = Vec::new();

    for (idx, line) in masked_lines.iter().enumerate() {
        if !is_top_level_definition(line) {
            continue;
        }

        let mut cursor = idx;
        while cursor > 0 && lines[cursor - 1].trim_start().starts_with('#') {
            cursor -= 1;
        }

        let mut blank_count = 0;
        while cursor > 0 && lines[cursor - 1].trim().is_empty() {
            blank_count += 1;
            cursor -= 1;
        }

        if cursor == 0 || lines[cursor - 1].starts_with('@') {
            continue;
        }

        if blank_count < BLANK_LINES_TOP_LEVEL {
            violations.push(
                Violation::new(
                    "Py-02-04",
                    format!(
                        "expected {} blank lines before top-level definition, found {}",
                        BLANK_LINES_TOP_LEVEL, blank_count
                    ),
                )
                .at_line(idx + 1),
            );
        }
    }

    violations
}

/// Check that strings use double quotes.
///
/// Single quotes are accepted when the text itself contains a double
/// quote, which is what Black does.
pub fn check_double_quotes(code: &str) -> Vec<Violation> {
    mask_python(code)
        .literals
        .into_iter()
        .filter(|lit| lit.quote == '\'' && !lit.body.contains('"'))
        .map(|lit| Violation::new("Py-05-01", "single-quoted string").at_line(lit.line))
        .collect()
}

/// Check that there is no whitespace right inside brackets.
pub fn check_bracket_spacing(code: &str) -> Vec<Violation> {
    let open_re = static_regex(&OPEN_SPACE_RE, r"[(\[{][ \t]+[^ \t]");
    let close_re = static_regex(&CLOSE_SPACE_RE, r"[^ \t][ \t]+[)\]}]");

    let masked = mask_python(code);
    let mut violations = Vec::new();

    for (line_num, line) in masked.text.lines().enumerate() {
        if open_re.is_match(line) {
            violations.push(
                Violation::new("Py-06-02", "whitespace after opening bracket").at_line(line_num + 1),
            );
        }
        if close_re.is_match(line) {
            violations.push(
                Violation::new("Py-06-02", "whitespace before closing bracket")
                    .at_line(line_num + 1),
            );
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_blank_lines() {
        let good_code = r#""""Module."""

import os


# Helper section
def first():
    return 1


@decorator
def second():
    return 2


class Third:
    def method(self):
        pass
"#;
        assert!(check_top_level_blank_lines(good_code).is_empty());

        let bad_code = "import os\n\nCONSTANT = 42\ndef first():\n    return 1\n\ndef second():\n    return 2\n";
        assert_eq!(check_top_level_blank_lines(bad_code).len(), 2);
    }

    #[test]
    fn test_definition_inside_docstring_ignored() {
        let code = "\"\"\"Usage:\ndef not_code():\n\"\"\"\n";
        assert!(check_top_level_blank_lines(code).is_empty());
    }

    #[test]
    fn test_double_quotes() {
        let good_code = "name = \"Alice\"\nhtml = '<div class=\"c\">'\n\"\"\"Doc.\"\"\"\n";
        assert!(check_double_quotes(good_code).is_empty());

        let bad_code = "name = 'Alice'\npath = 'usr'\n";
        assert_eq!(check_double_quotes(bad_code).len(), 2);
    }

    #[test]
    fn test_bracket_spacing() {
        let bad_code = "def process( data ):\n    return ( x + y )\n";
        assert_eq!(check_bracket_spacing(bad_code).len(), 4);

        let good_code = "def process(data):\n    items = [1, 2]\n    with (\n        open(p) as f,\n    ):\n        pass\n    text = \"( spaced )\"\n";
        assert!(check_bracket_spacing(good_code).is_empty());
    }
}
