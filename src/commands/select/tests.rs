use std::cell::RefCell;

use anyhow::{Result, bail};

use super::*;
use crate::model::{FragmentMetadata, SearchHit};
use crate::store::{SearchFilter, SimilaritySearch};

fn hit(rank: usize, text: &str) -> SearchHit {
    SearchHit {
        text: text.to_string(),
        metadata: FragmentMetadata {
            document_id: "contract1.pdf".to_string(),
            page_number: Some(rank as i64),
            category: Some("contract".to_string()),
        },
        distance: rank as f64 * 0.01,
    }
}

const PERFECT_FORCE_MAJEURE: &str = "Article 12 Force Majeure. Neither party is liable for events \
beyond reasonable control, including any act of god.";

struct RecordingSearch {
    hits: Vec<SearchHit>,
    calls: RefCell<Vec<(String, usize, SearchFilter)>>,
}

impl SimilaritySearch for RecordingSearch {
    fn search(&self, query: &str, k: usize, filter: &SearchFilter) -> Result<Vec<SearchHit>> {
        self.calls
            .borrow_mut()
            .push((query.to_string(), k, filter.clone()));
        Ok(self.hits.iter().take(k).cloned().collect())
    }
}

struct FailingSearch;

impl SimilaritySearch for FailingSearch {
    fn search(&self, _query: &str, _k: usize, _filter: &SearchFilter) -> Result<Vec<SearchHit>> {
        bail!("vector index timed out")
    }
}

#[test]
fn recognised_topic_yields_general_and_core_keywords() {
    let keywords = QueryKeywords::for_question("Force Majeure 규정");
    assert_eq!(
        keywords.general,
        vec!["force majeure", "불가항력", "act of god", "beyond reasonable control"]
    );
    assert_eq!(keywords.core, vec!["force majeure", "불가항력"]);
}

#[test]
fn general_and_core_tables_keep_independent_precedence() {
    let keywords = QueryKeywords::for_question("Assignment 시 ROFR");
    assert_eq!(keywords.general[0], "assignment");
    assert_eq!(keywords.core, vec!["right of first refusal", "rofr"]);

    let keywords = QueryKeywords::for_question("계약변경(Amendment)");
    assert_eq!(keywords.general[0], "participating interest");
    assert_eq!(keywords.core, vec!["amendment"]);
}

#[test]
fn unrecognised_question_falls_back_to_whitespace_tokens() {
    let keywords = QueryKeywords::for_question("  Pipeline   Tariff ");
    assert_eq!(keywords.general, vec!["pipeline", "tariff"]);
    assert!(keywords.core.is_empty());
}

#[test]
fn every_default_question_resolves_core_keywords() {
    for question in DEFAULT_QUESTIONS {
        let keywords = QueryKeywords::for_question(question);
        assert!(!keywords.general.is_empty(), "no keywords for {question}");
        assert!(!keywords.core.is_empty(), "no core keywords for {question}");
    }
    assert_eq!(DEFAULT_QUESTIONS.len(), 30);
}

#[test]
fn expanded_query_appends_keywords_and_header_words() {
    let keywords = QueryKeywords::for_question("Insurance");
    let expanded = keywords.expanded_query("Insurance");
    assert!(expanded.starts_with("Insurance insurance insurer coverage"));
    assert!(expanded.ends_with("waiver of subrogation Clause Article Section"));
}

#[test]
fn header_marker_recognises_clause_headings() {
    for text in [
        "Article 5 Assignment",
        "see art. 12 for details",
        "CLAUSE 3 - Insurance",
        "Section 4.2",
        "제 3 조 (해지)",
        "제12조 불가항력",
        "1.2.3 Scope of work",
        "7 Confidentiality",
    ] {
        assert!(has_header_marker(text), "expected header: {text}");
    }

    for text in ["", "Particle physics", "2024년 계약", "The parties agree"] {
        assert!(!has_header_marker(text), "unexpected header: {text}");
    }
}

#[test]
fn keyword_hits_counts_occurrences_and_distinct_keywords() {
    let keywords = vec![
        "termination".to_string(),
        "terminate".to_string(),
        "해지".to_string(),
        "Termination".to_string(),
    ];
    let (hits, unique) = keyword_hits(
        "Termination: a party may terminate; termination notice",
        &keywords,
    );
    assert_eq!(hits, 5);
    assert_eq!(unique, 2);
    assert_eq!(keyword_hits("", &keywords), (0, 0));
}

#[test]
fn relevance_score_weights_each_signal() {
    assert!((relevance_score(true, true, 2, 3, 1) - 10.0).abs() < 1e-9);
    assert!((relevance_score(false, false, 0, 0, 4) - 0.125).abs() < 1e-9);
    assert!((relevance_score(false, true, 2, 2, 8) - 6.0625).abs() < 1e-9);
}

#[test]
fn candidate_signals_combine_keywords_header_and_core() {
    let keywords = QueryKeywords::for_question("Force Majeure 규정");
    let signals = CandidateSignals::evaluate(PERFECT_FORCE_MAJEURE, 1, &keywords);
    assert_eq!(signals.hits, 3);
    assert_eq!(signals.unique, 3);
    assert!(signals.has_header);
    assert!(signals.core_present);
    assert!((signals.score - 11.5).abs() < 1e-9);
}

#[test]
fn strong_candidate_is_accepted_with_parenthesised_preview() {
    let keywords = QueryKeywords::for_question("Force Majeure 규정");
    let hits = vec![hit(1, "Definitions and interpretation"), hit(2, PERFECT_FORCE_MAJEURE)];

    let selection = select_fragment(&keywords, &hits, &SelectorThresholds::default());
    assert!(selection.is_accepted());
    assert_eq!(selection.cell_text(), format!("({PERFECT_FORCE_MAJEURE})"));
    let Selection::Accepted { signals, .. } = selection else {
        panic!("expected acceptance");
    };
    assert_eq!(signals.rank, 2);
}

#[test]
fn perfect_candidate_at_rank_nine_is_rejected_by_rank_gate() {
    let keywords = QueryKeywords::for_question("Force Majeure 규정");
    let mut hits = (1..=8)
        .map(|rank| hit(rank, "Definitions and interpretation"))
        .collect::<Vec<SearchHit>>();
    hits.push(hit(9, PERFECT_FORCE_MAJEURE));

    let selection = select_fragment(&keywords, &hits, &SelectorThresholds::default());
    assert_eq!(selection.cell_text(), REJECTION_MARKER);
    let Selection::Rejected { cause, signals } = selection else {
        panic!("expected rejection");
    };
    assert_eq!(cause, RejectReason::RankTooLow { rank: 9 });
    let signals = signals.expect("best candidate signals");
    assert!(signals.has_header && signals.core_present);
}

#[test]
fn single_keyword_hit_is_always_rejected() {
    let keywords = QueryKeywords::for_question("Force Majeure 규정");
    let hits = vec![hit(1, "Article 7 Force Majeure")];

    let selection = select_fragment(&keywords, &hits, &SelectorThresholds::default());
    assert_eq!(
        selection,
        Selection::Rejected {
            cause: RejectReason::TooFewHits { hits: 1 },
            signals: Some(CandidateSignals::evaluate("Article 7 Force Majeure", 1, &keywords)),
        }
    );
}

#[test]
fn repeated_single_keyword_fails_unique_gate() {
    let keywords = QueryKeywords::for_question("Force Majeure 규정");
    let hits = vec![hit(1, "Article 7 Force Majeure. Force Majeure notice")];

    let selection = select_fragment(&keywords, &hits, &SelectorThresholds::default());
    let Selection::Rejected { cause, .. } = selection else {
        panic!("expected rejection");
    };
    assert_eq!(cause, RejectReason::TooFewUniqueKeywords { unique: 1 });
}

#[test]
fn candidate_without_header_or_core_is_rejected() {
    let keywords = QueryKeywords::for_question("pipeline tariff");
    let hits = vec![hit(1, "The pipeline tariff and pipeline capacity")];

    let selection = select_fragment(&keywords, &hits, &SelectorThresholds::default());
    let Selection::Rejected { cause, .. } = selection else {
        panic!("expected rejection");
    };
    assert_eq!(cause, RejectReason::NoHeaderOrCoreKeyword);
}

#[test]
fn score_gate_applies_with_retuned_threshold() {
    let keywords = QueryKeywords::for_question("Force Majeure 규정");
    let hits = vec![hit(1, PERFECT_FORCE_MAJEURE)];
    let thresholds = SelectorThresholds {
        min_score: 12.0,
        ..SelectorThresholds::default()
    };

    let selection = select_fragment(&keywords, &hits, &thresholds);
    let Selection::Rejected { cause, .. } = selection else {
        panic!("expected rejection");
    };
    assert_eq!(cause, RejectReason::ScoreBelowThreshold { score: 11.5 });
}

#[test]
fn empty_candidate_list_returns_rejection_marker() {
    let keywords = QueryKeywords::for_question("Insurance");
    let selection = select_fragment(&keywords, &[], &SelectorThresholds::default());
    assert_eq!(
        selection,
        Selection::Rejected {
            cause: RejectReason::NoCandidates,
            signals: None,
        }
    );
    assert_eq!(selection.cell_text(), "0");

    let blank_only = vec![hit(1, " \n "), hit(2, "")];
    let selection = select_fragment(&keywords, &blank_only, &SelectorThresholds::default());
    assert_eq!(selection.cell_text(), REJECTION_MARKER);
}

#[test]
fn blank_candidates_still_consume_rank_positions() {
    let keywords = QueryKeywords::for_question("Force Majeure 규정");
    let text = "Article 12\nForce Majeure\nact of god";
    let hits = vec![hit(1, "\n \n"), hit(2, text)];

    let selection = select_fragment(&keywords, &hits, &SelectorThresholds::default());
    let Selection::Accepted { preview, signals } = selection else {
        panic!("expected acceptance");
    };
    assert_eq!(signals.rank, 2);
    assert_eq!(preview, "(Article 12 Force Majeure act of god)");
}

#[test]
fn higher_score_at_later_rank_replaces_incumbent() {
    let keywords = QueryKeywords::for_question("Force Majeure 규정");
    let hits = vec![
        hit(1, "Article 7 Force Majeure and act of god"),
        hit(2, PERFECT_FORCE_MAJEURE),
    ];

    let selection = select_fragment(&keywords, &hits, &SelectorThresholds::default());
    let Selection::Accepted { signals, .. } = selection else {
        panic!("expected acceptance");
    };
    assert_eq!(signals.rank, 2);
}

#[test]
fn preview_truncates_by_characters_and_marks_ellipsis() {
    assert_eq!(preview_text("short", 180), "(short)");

    let long = "가".repeat(200);
    let preview = preview_text(&long, 180);
    assert!(preview.starts_with('('));
    assert!(preview.ends_with("...)"));
    assert_eq!(preview.chars().count(), 180 + 5);

    let exact = "a".repeat(180);
    assert_eq!(preview_text(&exact, 180), format!("({exact})"));
}

#[test]
fn pair_search_uses_expanded_query_and_document_filter() {
    let search = RecordingSearch {
        hits: vec![hit(1, PERFECT_FORCE_MAJEURE)],
        calls: RefCell::new(Vec::new()),
    };

    let selection = best_fragment_for_document(
        &search,
        "Force Majeure 규정",
        "contract1.pdf",
        DEFAULT_SEARCH_K,
        &SelectorThresholds::default(),
    )
    .expect("search should succeed");
    assert!(selection.is_accepted());

    let calls = search.calls.borrow();
    assert_eq!(calls.len(), 1);
    let (query, k, filter) = &calls[0];
    assert!(query.starts_with("Force Majeure 규정 force majeure 불가항력"));
    assert!(query.ends_with("Clause Article Section"));
    assert_eq!(*k, 16);
    assert_eq!(filter, &SearchFilter::for_document("contract1.pdf"));
}

#[test]
fn pair_search_failure_propagates_to_caller() {
    let error = best_fragment_for_document(
        &FailingSearch,
        "Insurance",
        "contract1.pdf",
        DEFAULT_SEARCH_K,
        &SelectorThresholds::default(),
    )
    .expect_err("search failure should propagate");
    assert!(error.to_string().contains("timed out"));
}
