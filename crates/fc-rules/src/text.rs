//! Language-neutral text rules.
//!
//! These apply to any fixture regardless of extension.

use fc_core::Language;

use crate::{RuleDef, Violation};

/// Emoji and pictograph blocks.
const EMOJI_RANGES: [(u32, u32); 11] = [
    (0x1F1E6, 0x1F1FF), // regional indicators (flags)
    (0x1F300, 0x1F5FF),
    (0x1F600, 0x1F64F),
    (0x1F680, 0x1F6FF),
    (0x1F700, 0x1F77F),
    (0x1F780, 0x1F7FF),
    (0x1F800, 0x1F8FF),
    (0x1F900, 0x1F9FF),
    (0x1FA00, 0x1FAFF),
    (0x2600, 0x26FF), // misc symbols
    (0x2700, 0x27BF), // dingbats
];

/// Decorative symbols outside the blocks above.
const DECORATIVE_POINTS: [u32; 2] = [
    0x2B50, // white medium star
    0x200D, // zero width joiner
];

/// Text rules, ordered by id.
pub fn rules() -> Vec<RuleDef> {
    vec![
        RuleDef::new(
            "T-01-01",
            "no trailing whitespace",
            Language::Text,
            "trailing-whitespace",
            check_trailing_whitespace,
        ),
        RuleDef::new(
            "T-01-02",
            "no emoji or decorative symbols",
            Language::Text,
            "no-emoji",
            check_no_emoji,
        ),
    ]
}

/// Check that no line ends in spaces or tabs.
pub fn check_trailing_whitespace(code: &str) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (line_num, line) in code.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.ends_with(' ') || line.ends_with('\t') {
            violations.push(Violation::new("T-01-01", "trailing whitespace").at_line(line_num + 1));
        }
    }

    violations
}

/// Whether a character is an emoji or decorative symbol.
pub fn is_forbidden_char(ch: char) -> bool {
    let cp = ch as u32;

    // Variation selectors appear inside emoji sequences.
    if (0xFE00..=0xFE0F).contains(&cp) {
        return true;
    }

    EMOJI_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp)) || DECORATIVE_POINTS.contains(&cp)
}

/// Check that the text contains no emoji or decorative symbols.
pub fn check_no_emoji(code: &str) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (line_num, line) in code.lines().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            if is_forbidden_char(ch) {
                violations.push(
                    Violation::new(
                        "T-01-02",
                        format!("forbidden symbol U+{:04X} at column {}", ch as u32, col + 1),
                    )
                    .at_line(line_num + 1),
                );
            }
        }
    }

    violations
}
