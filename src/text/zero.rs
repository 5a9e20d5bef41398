use std::sync::LazyLock;

use regex::Regex;

static ALL_ZERO_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0+(?:\.0+)?$").expect("valid all-zero regex"));
static DIGIT_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digit run regex"));

/// True when the cell text spells a numeric zero such as `0`, `0.0`, `(0)` or
/// `0 %`. Commas, surrounding brackets and trailing percent signs are ignored.
pub fn is_zero_cell(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    if lowered.is_empty() {
        return false;
    }

    let without_commas = lowered.replace(',', "");
    let unwrapped = without_commas
        .trim_start_matches(|character: char| {
            matches!(character, '(' | '[' | '{') || character.is_whitespace()
        })
        .trim_end_matches(|character: char| {
            matches!(character, ')' | ']' | '}') || character.is_whitespace()
        });
    let value = unwrapped.trim_end_matches('%');

    if ALL_ZERO_REGEX.is_match(value) {
        return true;
    }

    let mut digit_runs = DIGIT_RUN_REGEX.find_iter(value).peekable();
    if digit_runs.peek().is_none() {
        return false;
    }
    if !digit_runs.all(|run| run.as_str().chars().all(|character| character == '0')) {
        return false;
    }

    // Zero-only digit runs that still do not parse, such as `0.0.0` or `0-0`,
    // are not zero. Non-ASCII digits never count as zero.
    let numeric = value
        .chars()
        .filter(|character| character.is_ascii_digit() || matches!(character, '.' | '-'))
        .collect::<String>();
    numeric
        .parse::<f64>()
        .map(|parsed| parsed == 0.0)
        .unwrap_or(false)
}
