//! Brace placement, indentation and declaration layout rules.

use std::sync::OnceLock;

use regex::Regex;

use crate::source::{indent_of, mask_c, static_regex};
use crate::Violation;

static SWITCH_RE: OnceLock<Regex> = OnceLock::new();
static LABEL_RE: OnceLock<Regex> = OnceLock::new();
static FN_DEF_RE: OnceLock<Regex> = OnceLock::new();
static POINTER_LEFT_RE: OnceLock<Regex> = OnceLock::new();

const TYPE_PATTERN: &str = r"(?:void|char|short|int|long|float|double|signed|unsigned|bool|FILE|[A-Za-z_]\w*_t|(?:struct|union|enum)[ \t]+[A-Za-z_]\w*)";

/// A control statement header: keyword, condition and what follows it.
#[derive(Debug)]
struct ControlHeader {
    keyword: &'static str,
    /// Line index the header starts on (0-indexed)
    line: usize,
    /// Line index the condition closes on
    end_line: usize,
    /// Text between the outer parentheses
    condition: String,
    /// Text after the header on its last line, macro continuation removed
    tail: String,
    /// Header line opens with `}`
    closes_block: bool,
}

impl ControlHeader {
    /// `} while (cond);` ending a do-while has no body of its own.
    fn is_do_while_end(&self) -> bool {
        self.keyword == "while" && (self.closes_block || self.tail.starts_with(';'))
    }
}

fn split_word(text: &str) -> (&str, &str) {
    let end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    text.split_at(end)
}

fn normalize_tail(tail: &str) -> String {
    tail.trim().trim_end_matches('\\').trim_end().to_string()
}

/// Scan a parenthesized condition that may span lines.
///
/// Returns the condition text, the closing line and the rest of that line.
fn scan_condition(lines: &[&str], line: usize, offset: usize) -> Option<(String, usize, String)> {
    let mut depth = 0usize;
    let mut condition = String::new();
    let mut current = line;
    let mut start = offset;

    while current < lines.len() {
        let text = lines[current];
        for (pos, ch) in text[start..].char_indices() {
            match ch {
                '(' => {
                    depth += 1;
                    if depth == 1 {
                        continue;
                    }
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        let tail = text[start + pos + 1..].to_string();
                        return Some((condition, current, tail));
                    }
                }
                _ => {}
            }
            condition.push(ch);
        }
        condition.push('\n');
        current += 1;
        start = 0;
    }

    None
}

fn header_with_condition(
    keyword: &'static str,
    lines: &[&str],
    idx: usize,
    after: &str,
    closes_block: bool,
) -> Option<ControlHeader> {
    let after = after.trim_start();
    if !after.starts_with('(') {
        return None;
    }
    let offset = lines[idx].len() - after.len();
    let (condition, end_line, tail) = scan_condition(lines, idx, offset)?;

    Some(ControlHeader {
        keyword,
        line: idx,
        end_line,
        condition,
        tail: normalize_tail(&tail),
        closes_block,
    })
}

fn control_headers(lines: &[&str]) -> Vec<ControlHeader> {
    let mut headers = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let mut rest = line.trim_start();
        let closes_block = rest.starts_with('}');
        if closes_block {
            rest = rest[1..].trim_start();
        }

        let (word, after) = split_word(rest);
        let header = match word {
            "if" => header_with_condition("if", lines, idx, after, closes_block),
            "for" => header_with_condition("for", lines, idx, after, closes_block),
            "while" => header_with_condition("while", lines, idx, after, closes_block),
            "switch" => header_with_condition("switch", lines, idx, after, closes_block),
            "else" => {
                let (next, after_if) = split_word(after.trim_start());
                if next == "if" {
                    header_with_condition("else if", lines, idx, after_if, closes_block)
                } else {
                    Some(ControlHeader {
                        keyword: "else",
                        line: idx,
                        end_line: idx,
                        condition: String::new(),
                        tail: normalize_tail(after),
                        closes_block,
                    })
                }
            }
            "do" => Some(ControlHeader {
                keyword: "do",
                line: idx,
                end_line: idx,
                condition: String::new(),
                tail: normalize_tail(after),
                closes_block,
            }),
            _ => None,
        };

        headers.extend(header);
    }

    headers
}

fn next_code_line<'a>(lines: &[&'a str], after: usize) -> Option<&'a str> {
    lines
        .iter()
        .skip(after + 1)
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
}

fn brace_delta(line: &str) -> i64 {
    let opens = line.chars().filter(|&c| c == '{').count() as i64;
    let closes = line.chars().filter(|&c| c == '}').count() as i64;
    opens - closes
}

/// Check that `case`/`default` labels sit at the indent of their `switch`.
pub fn check_switch_case_indent(code: &str) -> Vec<Violation> {
    let switch_re = static_regex(&SWITCH_RE, r"^switch\s*\(");
    let label_re = static_regex(&LABEL_RE, r"^(case\b[^:]*:|default\s*:)");

    let masked = mask_c(code);
    let mut violations = Vec::new();

    struct OpenSwitch {
        indent: String,
        body_depth: i64,
        entered: bool,
    }

    let mut open: Vec<OpenSwitch> = Vec::new();
    let mut depth: i64 = 0;

    for (line_num, line) in masked.lines().enumerate() {
        let trimmed = line.trim_start();

        if switch_re.is_match(trimmed) {
            open.push(OpenSwitch {
                indent: indent_of(line).to_string(),
                body_depth: depth + 1,
                entered: false,
            });
        } else if label_re.is_match(trimmed) {
            if let Some(current) = open.last() {
                if current.body_depth == depth && indent_of(line) != current.indent {
                    violations.push(
                        Violation::new(
                            "C-01-02",
                            "case label indented deeper than its switch",
                        )
                        .at_line(line_num + 1),
                    );
                }
            }
        }

        depth += brace_delta(line);

        while let Some(current) = open.last_mut() {
            if depth >= current.body_depth {
                current.entered = true;
                break;
            }
            if current.entered {
                open.pop();
            } else {
                break;
            }
        }
    }

    violations
}

/// Check that function definitions open their body on a new line.
pub fn check_function_brace_newline(code: &str) -> Vec<Violation> {
    let fn_def_re = static_regex(
        &FN_DEF_RE,
        r"^[A-Za-z_][\w \t\*]*?\b[A-Za-z_]\w*\s*\([^;]*\)\s*\{\s*$",
    );

    let masked = mask_c(code);
    let mut violations = Vec::new();
    let mut depth: i64 = 0;

    for (line_num, line) in masked.lines().enumerate() {
        let (first_word, _) = split_word(line);
        let is_control = matches!(
            first_word,
            "if" | "for" | "while" | "switch" | "else" | "do" | "return"
        );

        if depth == 0 && !is_control && fn_def_re.is_match(line) {
            violations.push(
                Violation::new("C-01-11", "function body brace on the signature line")
                    .at_line(line_num + 1),
            );
        }

        depth += brace_delta(line);
    }

    violations
}

/// Check that control statements open their brace on the header line.
pub fn check_control_brace_same_line(code: &str) -> Vec<Violation> {
    let masked = mask_c(code);
    let lines: Vec<&str> = masked.lines().collect();
    let mut violations = Vec::new();

    for header in control_headers(&lines) {
        if header.is_do_while_end() || !header.tail.is_empty() {
            continue;
        }
        if next_code_line(&lines, header.end_line).is_some_and(|l| l.starts_with('{')) {
            violations.push(
                Violation::new(
                    "C-01-12",
                    format!("`{}` brace placed on the following line", header.keyword),
                )
                .at_line(header.line + 1),
            );
        }
    }

    violations
}

/// Check that every control statement body is braced.
pub fn check_control_braces(code: &str) -> Vec<Violation> {
    let masked = mask_c(code);
    let lines: Vec<&str> = masked.lines().collect();
    let mut violations = Vec::new();

    for header in control_headers(&lines) {
        if header.is_do_while_end() {
            continue;
        }

        let braced = if header.tail.is_empty() {
            next_code_line(&lines, header.end_line).is_some_and(|l| l.starts_with('{'))
        } else {
            header.tail.starts_with('{') || header.tail.starts_with(';')
        };

        if !braced {
            violations.push(
                Violation::new(
                    "C-01-14",
                    format!("`{}` body without braces", header.keyword),
                )
                .at_line(header.line + 1),
            );
        }
    }

    violations
}

/// Whether a condition contains `=` used as assignment.
fn has_assignment(condition: &str) -> bool {
    let chars: Vec<char> = condition.chars().collect();
    chars.iter().enumerate().any(|(i, &c)| {
        if c != '=' {
            return false;
        }
        let prev = if i > 0 { chars[i - 1] } else { ' ' };
        let next = chars.get(i + 1).copied().unwrap_or(' ');
        !matches!(prev, '=' | '!' | '<' | '>') && next != '='
    })
}

/// Check that `if` conditions contain no assignment.
pub fn check_no_assignment_in_if(code: &str) -> Vec<Violation> {
    let masked = mask_c(code);
    let lines: Vec<&str> = masked.lines().collect();

    control_headers(&lines)
        .into_iter()
        .filter(|h| matches!(h.keyword, "if" | "else if") && has_assignment(&h.condition))
        .map(|h| {
            Violation::new("C-01-15", "assignment inside if condition").at_line(h.line + 1)
        })
        .collect()
}

/// Check that the pointer `*` binds to the variable (`int *p`, not `int* p`).
pub fn check_pointer_binds_right(code: &str) -> Vec<Violation> {
    let pointer_re = POINTER_LEFT_RE.get_or_init(|| {
        Regex::new(&format!(
            r"\b{}(?:\*+|[ \t]+\*+)[ \t]+[A-Za-z_]",
            TYPE_PATTERN
        ))
        .expect("Invalid regex")
    });

    let masked = mask_c(code);
    let mut violations = Vec::new();

    for (line_num, line) in masked.lines().enumerate() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        if pointer_re.is_match(line) {
            violations.push(
                Violation::new("C-01-18", "pointer `*` detached from the variable name")
                    .at_line(line_num + 1),
            );
        }
    }

    violations
}
