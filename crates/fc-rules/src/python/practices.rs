//! Error handling and resource rules.

use std::sync::OnceLock;

use regex::Regex;

use crate::source::{mask_python, static_regex};
use crate::Violation;

static MUTABLE_DEFAULT_RE: OnceLock<Regex> = OnceLock::new();
static BARE_EXCEPT_RE: OnceLock<Regex> = OnceLock::new();
static ASSIGNED_OPEN_RE: OnceLock<Regex> = OnceLock::new();

/// Parameter lists of every `def`, with the line each starts on.
fn def_signatures(lines: &[&str]) -> Vec<(usize, String)> {
    let mut signatures = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if !(trimmed.starts_with("def ") || trimmed.starts_with("async def ")) {
            continue;
        }

        let mut depth = 0usize;
        let mut signature = String::new();
        let mut started = false;

        'scan: for text in &lines[idx..] {
            for ch in text.chars() {
                match ch {
                    '(' => {
                        depth += 1;
                        started = true;
                        if depth == 1 {
                            continue;
                        }
                    }
                    ')' if started => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            break 'scan;
                        }
                    }
                    _ => {}
                }
                if started {
                    signature.push(ch);
                }
            }
            signature.push('\n');
        }

        signatures.push((idx + 1, signature));
    }

    signatures
}

/// Check that no parameter defaults to a mutable literal.
pub fn check_mutable_defaults(code: &str) -> Vec<Violation> {
    let mutable_re = static_regex(
        &MUTABLE_DEFAULT_RE,
        r"=\s*(?:\[|\{|(?:list|dict|set)\(\s*\))",
    );

    let masked = mask_python(code);
    let lines: Vec<&str> = masked.text.lines().collect();

    def_signatures(&lines)
        .into_iter()
        .filter(|(_, signature)| mutable_re.is_match(signature))
        .map(|(line, _)| Violation::new("Py-08-05", "mutable default argument").at_line(line))
        .collect()
}

/// Check that every `except` names the exception it handles.
pub fn check_bare_except(code: &str) -> Vec<Violation> {
    let bare_re = static_regex(&BARE_EXCEPT_RE, r"^\s*except\s*:");

    let masked = mask_python(code);
    let mut violations = Vec::new();

    for (line_num, line) in masked.text.lines().enumerate() {
        if bare_re.is_match(line) {
            violations.push(Violation::new("Py-10-01", "bare except").at_line(line_num + 1));
        }
    }

    violations
}

/// Check that files are opened in a `with` statement rather than
/// assigned from `open()`.
pub fn check_with_open(code: &str) -> Vec<Violation> {
    let assigned_re = static_regex(&ASSIGNED_OPEN_RE, r"(?:^|[^=!<>])=\s*open\s*\(");

    let masked = mask_python(code);
    let mut violations = Vec::new();

    for (line_num, line) in masked.text.lines().enumerate() {
        if assigned_re.is_match(line) {
            violations.push(
                Violation::new("Py-11-01", "file handle assigned from open() outside with")
                    .at_line(line_num + 1),
            );
        }
    }

    violations
}
