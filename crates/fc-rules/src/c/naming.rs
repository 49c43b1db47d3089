//! C naming rules.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::source::{mask_c, static_regex};
use crate::Violation;

static IDENT_RE: OnceLock<Regex> = OnceLock::new();

/// Directives whose operands are paths or conditions, not names we own.
const SKIPPED_DIRECTIVES: [&str; 4] = ["include", "pragma", "line", "error"];

/// Whether an identifier mixes upper and lower case letters.
fn is_mixed_case(ident: &str) -> bool {
    let has_lower = ident.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = ident.chars().any(|c| c.is_ascii_uppercase());
    has_lower && has_upper
}

/// Check that identifiers are snake_case (macros and constants UPPER_SNAKE_CASE).
///
/// Every identifier outside comments, literals and `#include`-style
/// directives must be entirely lower case or entirely upper case.
/// camelCase and PascalCase are reported once per name.
pub fn check_snake_case(code: &str) -> Vec<Violation> {
    let ident_re = static_regex(&IDENT_RE, r"\b[A-Za-z_][A-Za-z0-9_]*\b");

    let masked = mask_c(code);
    let mut violations = Vec::new();
    let mut reported: HashSet<&str> = HashSet::new();

    for (line_num, line) in masked.lines().enumerate() {
        let trimmed = line.trim_start();
        if let Some(directive) = trimmed.strip_prefix('#') {
            let directive = directive.trim_start();
            if SKIPPED_DIRECTIVES.iter().any(|d| directive.starts_with(d)) {
                continue;
            }
        }

        for found in ident_re.find_iter(line) {
            let ident = found.as_str();
            if is_mixed_case(ident) && reported.insert(ident) {
                violations.push(
                    Violation::new("C-03-04", format!("identifier '{}' is not snake_case", ident))
                        .at_line(line_num + 1),
                );
            }
        }
    }

    violations
}
