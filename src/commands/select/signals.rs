use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::topics::QueryKeywords;

static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:Article|Art\.?|Clause|Section)\b|제\s*\d+\s*조|^\d+(?:\.\d+){0,3}\b")
        .expect("valid clause header regex")
});

/// Clause/section header markers: `Article`, `Art.`, `Clause`, `Section`,
/// `제 N 조`, or a leading outline number such as `4.2.1`.
pub fn has_header_marker(text: &str) -> bool {
    !text.is_empty() && HEADER_REGEX.is_match(text)
}

/// `(total occurrences, distinct keywords present)`, case-insensitive.
pub fn keyword_hits(text: &str, keywords: &[String]) -> (usize, usize) {
    if text.is_empty() {
        return (0, 0);
    }

    let lowered = text.to_lowercase();
    let total = keywords
        .iter()
        .map(|keyword| lowered.matches(keyword.to_lowercase().as_str()).count())
        .sum();

    let mut distinct = keywords
        .iter()
        .map(|keyword| keyword.to_lowercase())
        .collect::<Vec<String>>();
    distinct.sort();
    distinct.dedup();
    let unique = distinct
        .iter()
        .filter(|keyword| lowered.contains(keyword.as_str()))
        .count();

    (total, unique)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSignals {
    pub rank: usize,
    pub hits: usize,
    pub unique: usize,
    pub has_header: bool,
    pub core_present: bool,
    pub score: f64,
}

impl CandidateSignals {
    pub fn evaluate(text: &str, rank: usize, keywords: &QueryKeywords) -> Self {
        let (hits, unique) = keyword_hits(text, &keywords.general);
        let has_header = has_header_marker(text);
        let lowered = text.to_lowercase();
        let core_present = keywords
            .core
            .iter()
            .any(|core| lowered.contains(core.as_str()));

        Self {
            rank,
            hits,
            unique,
            has_header,
            core_present,
            score: relevance_score(has_header, core_present, unique, hits, rank),
        }
    }
}

/// Header and core terms dominate; distinct keywords weigh more than raw
/// occurrences; rank only breaks near-ties.
pub fn relevance_score(
    has_header: bool,
    core_present: bool,
    unique: usize,
    hits: usize,
    rank: usize,
) -> f64 {
    let header = if has_header { 3.0 } else { 0.0 };
    let core = if core_present { 2.0 } else { 0.0 };
    header + core + 1.5 * unique as f64 + 0.5 * hits as f64 + 0.5 / rank.max(1) as f64
}
