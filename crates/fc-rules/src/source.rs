//! Source masking.
//!
//! Most checks must not see the inside of comments or string literals.
//! Masking replaces those characters with spaces and keeps every newline
//! and every string delimiter, so line numbers stay valid.

use std::sync::OnceLock;

use regex::Regex;

/// Compile a constant pattern once.
pub(crate) fn static_regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("Invalid regex"))
}

/// Leading whitespace of a line.
pub(crate) fn indent_of(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn blank(c: char) -> char {
    if c == '\n' {
        '\n'
    } else {
        ' '
    }
}

#[derive(Clone, Copy)]
enum CState {
    Code,
    LineComment,
    BlockComment,
    Literal(char),
}

/// Mask C comments, string literals and character literals.
pub fn mask_c(source: &str) -> String {
    let mut masked = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut state = CState::Code;

    while let Some(c) = chars.next() {
        match state {
            CState::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    masked.push_str("  ");
                    state = CState::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    masked.push_str("  ");
                    state = CState::BlockComment;
                }
                '"' | '\'' => {
                    masked.push(c);
                    state = CState::Literal(c);
                }
                _ => masked.push(c),
            },
            CState::LineComment => {
                masked.push(blank(c));
                if c == '\n' {
                    state = CState::Code;
                }
            }
            CState::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    masked.push_str("  ");
                    state = CState::Code;
                } else {
                    masked.push(blank(c));
                }
            }
            CState::Literal(quote) => {
                if c == '\\' {
                    masked.push(' ');
                    if let Some(escaped) = chars.next() {
                        masked.push(blank(escaped));
                    }
                } else if c == quote {
                    masked.push(quote);
                    state = CState::Code;
                } else if c == '\n' {
                    // Unterminated literal ends at the line break.
                    masked.push('\n');
                    state = CState::Code;
                } else {
                    masked.push(' ');
                }
            }
        }
    }

    masked
}

/// A string literal found while masking Python source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    /// Line the literal starts on (1-indexed)
    pub line: usize,
    /// Quote character (`'` or `"`)
    pub quote: char,
    /// Whether the literal is triple-quoted
    pub triple: bool,
    /// Raw text between the delimiters, escapes untouched
    pub body: String,
}

/// Python source with comments and literal bodies masked.
#[derive(Debug, Clone)]
pub struct MaskedPython {
    /// Masked text, same line structure as the input
    pub text: String,
    /// Every string literal, in source order
    pub literals: Vec<StringLiteral>,
}

/// Mask Python comments and string literals, collecting the literals.
pub fn mask_python(source: &str) -> MaskedPython {
    let chars: Vec<char> = source.chars().collect();
    let mut text = String::with_capacity(source.len());
    let mut literals = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    text.push(' ');
                    i += 1;
                }
            }
            '"' | '\'' => {
                let triple = i + 2 < chars.len() && chars[i + 1] == c && chars[i + 2] == c;
                let delimiter_len = if triple { 3 } else { 1 };
                let start_line = line;
                let mut body = String::new();

                for _ in 0..delimiter_len {
                    text.push(c);
                }
                i += delimiter_len;

                while i < chars.len() {
                    let ch = chars[i];
                    if ch == '\\' && i + 1 < chars.len() {
                        let escaped = chars[i + 1];
                        body.push(ch);
                        body.push(escaped);
                        text.push(' ');
                        text.push(blank(escaped));
                        if escaped == '\n' {
                            line += 1;
                        }
                        i += 2;
                        continue;
                    }

                    let closes = ch == c
                        && (!triple
                            || (i + 2 < chars.len() && chars[i + 1] == c && chars[i + 2] == c));
                    if closes {
                        for _ in 0..delimiter_len {
                            text.push(c);
                        }
                        i += delimiter_len;
                        break;
                    }

                    if ch == '\n' {
                        if !triple {
                            // Unterminated; leave the newline to the outer loop.
                            break;
                        }
                        line += 1;
                    }

                    body.push(ch);
                    text.push(blank(ch));
                    i += 1;
                }

                literals.push(StringLiteral {
                    line: start_line,
                    quote: c,
                    triple,
                    body,
                });
            }
            '\n' => {
                line += 1;
                text.push('\n');
                i += 1;
            }
            _ => {
                text.push(c);
                i += 1;
            }
        }
    }

    MaskedPython { text, literals }
}
