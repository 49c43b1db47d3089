//! Macro hygiene rules.

use std::sync::OnceLock;

use regex::Regex;

use crate::source::{mask_c, static_regex};
use crate::Violation;

static DO_WHILE_RE: OnceLock<Regex> = OnceLock::new();
static IDENT_RE: OnceLock<Regex> = OnceLock::new();

/// A `#define`, continuation lines joined.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MacroDef {
    name: String,
    /// Parameter names for function-like macros
    params: Option<Vec<String>>,
    body: String,
    /// Line of the `#define` (1-indexed)
    line: usize,
}

fn leading_identifier(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    &text[..end]
}

/// Collect macro definitions from masked source.
fn macro_defs(masked: &str) -> Vec<MacroDef> {
    let lines: Vec<&str> = masked.lines().collect();
    let mut defs = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let start = idx;
        let trimmed = lines[idx].trim_start();
        idx += 1;

        let Some(directive) = trimmed.strip_prefix('#') else {
            continue;
        };
        let Some(rest) = directive.trim_start().strip_prefix("define") else {
            continue;
        };
        if !rest.starts_with(|c: char| c.is_whitespace()) {
            continue;
        }

        let mut logical = rest.trim_end().to_string();
        while logical.ends_with('\\') && idx < lines.len() {
            logical.pop();
            logical.push(' ');
            logical.push_str(lines[idx].trim());
            idx += 1;
        }
        let logical = logical.trim_end_matches('\\').trim();

        let name = leading_identifier(logical);
        if name.is_empty() {
            continue;
        }
        let after_name = &logical[name.len()..];

        let (params, body) = match after_name.strip_prefix('(') {
            Some(param_text) => match param_text.find(')') {
                Some(close) => {
                    let params = param_text[..close]
                        .split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty() && *p != "...")
                        .map(String::from)
                        .collect();
                    (Some(params), param_text[close + 1..].trim())
                }
                None => continue,
            },
            None => (None, after_name.trim()),
        };

        defs.push(MacroDef {
            name: name.to_string(),
            params,
            body: body.to_string(),
            line: start + 1,
        });
    }

    defs
}

/// Whether a macro body holds more than a single expression/statement.
fn is_multi_statement(body: &str) -> bool {
    let first = leading_identifier(body);
    body.matches(';').count() >= 2
        || body.starts_with('{')
        || matches!(first, "if" | "for" | "while" | "switch")
}

/// Check that multi-statement macros are wrapped in `do { ... } while (0)`.
pub fn check_macro_do_while(code: &str) -> Vec<Violation> {
    let do_while_re = static_regex(
        &DO_WHILE_RE,
        r"^do\s*\{.*\}\s*while\s*\(\s*0\s*\)\s*;?$",
    );

    macro_defs(&mask_c(code))
        .into_iter()
        .filter(|def| is_multi_statement(&def.body) && !do_while_re.is_match(&def.body))
        .map(|def| {
            Violation::new(
                "C-02-05",
                format!("macro '{}' has several statements without a do-while(0) wrapper", def.name),
            )
            .at_line(def.line)
        })
        .collect()
}

/// Check that every parameter use in a function-like macro body is
/// parenthesized (or a whole argument of a call).
pub fn check_macro_parentheses(code: &str) -> Vec<Violation> {
    let ident_re = static_regex(&IDENT_RE, r"[A-Za-z_][A-Za-z0-9_]*");
    let mut violations = Vec::new();

    for def in macro_defs(&mask_c(code)) {
        let Some(params) = &def.params else {
            continue;
        };

        for found in ident_re.find_iter(&def.body) {
            if !params.iter().any(|p| p == found.as_str()) {
                continue;
            }

            let before = def.body[..found.start()].trim_end();
            let after = def.body[found.end()..].trim_start();

            // Stringification and token pasting operate on the raw token.
            if before.ends_with('#') || after.starts_with("##") {
                continue;
            }

            let opened = before.ends_with('(') || before.ends_with(',');
            let closed = after.starts_with(')') || after.starts_with(',');
            if !(opened && closed) {
                violations.push(
                    Violation::new(
                        "C-02-08",
                        format!(
                            "argument '{}' of macro '{}' is not parenthesized",
                            found.as_str(),
                            def.name
                        ),
                    )
                    .at_line(def.line),
                );
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_defs_join_continuations() {
        let code = "#define SWAP(a, b) \\\n\tdo { \\\n\t\tint t = (a); \\\n\t} while (0)\n#define LIMIT 10\n";
        let defs = macro_defs(&mask_c(code));
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "SWAP");
        assert_eq!(defs[0].params, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(defs[0].body.starts_with("do {"));
        assert!(defs[0].body.ends_with("while (0)"));
        assert_eq!(defs[1].params, None);
        assert_eq!(defs[1].line, 5);
    }

    #[test]
    fn test_macro_do_while() {
        let bad_code = r#"
#define LOG_AND_RETURN(msg, val) \
    printf("%s\n", msg); \
    return val;

#define SAFE_FREE(p) \
    if (p) { \
        free(p); \
    }
"#;
        assert_eq!(check_macro_do_while(bad_code).len(), 2);

        let good_code = r#"
#define LOG_AND_RETURN(msg, val) \
    do { \
        printf("%s\n", msg); \
        return val; \
    } while (0)

#define SQUARE(x) ((x) * (x))
#define CALL(f) f();
"#;
        assert!(check_macro_do_while(good_code).is_empty());
    }

    #[test]
    fn test_macro_parentheses() {
        let good_code = r#"
#define SQUARE(x)        ((x) * (x))
#define MAX(a, b)        (((a) > (b)) ? (a) : (b))
#define PRINT(fmt, v)    printf(fmt, v)
#define NAME(x)          #x
#define GLUE(a, b)       a ## b
"#;
        assert!(check_macro_parentheses(good_code).is_empty());

        let bad_code = r#"
#define SQUARE(x)  x * x
#define ADD(a, b)  a + b
"#;
        // Every bare use is reported.
        assert_eq!(check_macro_parentheses(bad_code).len(), 4);
    }

    #[test]
    fn test_object_like_macro_ignored() {
        let code = "#define MAX_BUFFER_SIZE 1024\n#define ERROR_CODE -1\n";
        assert!(check_macro_parentheses(code).is_empty());
        assert!(check_macro_do_while(code).is_empty());
    }
}
