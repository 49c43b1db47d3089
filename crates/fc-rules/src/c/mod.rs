//! C style rules.
//!
//! Checks run on masked source: comments and literal contents are blanked
//! before scanning, so `/* camelCase */` or `"if (x = y)"` never trip a
//! rule.

mod layout;
mod macros;
mod naming;

use fc_core::Language;

use crate::RuleDef;

pub use layout::{
    check_control_brace_same_line, check_control_braces, check_function_brace_newline,
    check_no_assignment_in_if, check_pointer_binds_right, check_switch_case_indent,
};
pub use macros::{check_macro_do_while, check_macro_parentheses};
pub use naming::check_snake_case;

/// C rules, ordered by id.
pub fn rules() -> Vec<RuleDef> {
    vec![
        RuleDef::new(
            "C-01-02",
            "switch labels at switch indent",
            Language::C,
            "clang-format",
            check_switch_case_indent,
        ),
        RuleDef::new(
            "C-01-11",
            "function brace on its own line",
            Language::C,
            "clang-format",
            check_function_brace_newline,
        ),
        RuleDef::new(
            "C-01-12",
            "control brace on the same line",
            Language::C,
            "clang-format",
            check_control_brace_same_line,
        ),
        RuleDef::new(
            "C-01-14",
            "braces around control statement bodies",
            Language::C,
            "clang-tidy (readability-braces-around-statements)",
            check_control_braces,
        ),
        RuleDef::new(
            "C-01-15",
            "no assignment in if condition",
            Language::C,
            "clang-tidy (bugprone-assignment-in-if-condition)",
            check_no_assignment_in_if,
        ),
        RuleDef::new(
            "C-01-18",
            "pointer star on the variable side",
            Language::C,
            "clang-format",
            check_pointer_binds_right,
        ),
        RuleDef::new(
            "C-02-05",
            "multi-statement macros wrapped in do-while(0)",
            Language::C,
            "clang-tidy (bugprone-macro-parentheses)",
            check_macro_do_while,
        ),
        RuleDef::new(
            "C-02-08",
            "macro arguments parenthesized",
            Language::C,
            "clang-tidy (bugprone-macro-parentheses)",
            check_macro_parentheses,
        ),
        RuleDef::new(
            "C-03-04",
            "snake_case identifiers",
            Language::C,
            "clang-tidy (readability-identifier-naming)",
            check_snake_case,
        ),
    ]
}
