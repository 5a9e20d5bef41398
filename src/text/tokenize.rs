use std::sync::LazyLock;

use regex::Regex;

static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:\.\d+)*|[a-z]+|[가-힣]+").expect("valid token regex")
});

pub const KEYWORD_STOPWORDS: &[&str] = &[
    "and", "the", "of", "in", "to", "for", "on", "by", "with", "at", "from", "및", "과", "와",
    "또는", "또한",
];

/// Lowercases `text` and splits it into dotted numbers, Latin words and
/// Hangul words. Everything else is dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let lowered = text.to_lowercase();
    TOKEN_REGEX
        .find_iter(&lowered)
        .map(|token| token.as_str().to_string())
        .collect()
}

/// Keywords keep source order and duplicates.
pub fn extract_keywords(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|token| token != "0")
        .filter(|token| {
            KEYWORD_STOPWORDS
                .iter()
                .all(|stopword| stopword != token)
        })
        .filter(|token| {
            token.chars().count() >= 2
                || token.chars().any(|character| character.is_ascii_digit())
                || token.contains('.')
        })
        .collect()
}
