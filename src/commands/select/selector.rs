use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use super::signals::CandidateSignals;
use super::topics::QueryKeywords;
use crate::model::SearchHit;
use crate::store::{SearchFilter, SimilaritySearch};

/// Cell value recorded when no fragment passes the gate.
pub const REJECTION_MARKER: &str = "0";
pub const DEFAULT_SEARCH_K: usize = 16;

/// Acceptance gate for the selected fragment. The defaults were tuned on the
/// contract corpus and may need re-tuning for other corpora.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectorThresholds {
    pub min_hits: usize,
    pub min_unique: usize,
    pub max_rank: usize,
    pub min_score: f64,
    pub preview_chars: usize,
}

impl Default for SelectorThresholds {
    fn default() -> Self {
        Self {
            min_hits: 2,
            min_unique: 2,
            max_rank: 8,
            min_score: 4.2,
            preview_chars: 180,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    NoCandidates,
    TooFewHits { hits: usize },
    TooFewUniqueKeywords { unique: usize },
    NoHeaderOrCoreKeyword,
    RankTooLow { rank: usize },
    ScoreBelowThreshold { score: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Selection {
    Accepted {
        preview: String,
        signals: CandidateSignals,
    },
    Rejected {
        cause: RejectReason,
        signals: Option<CandidateSignals>,
    },
}

impl Selection {
    fn rejected(cause: RejectReason, signals: Option<CandidateSignals>) -> Self {
        Self::Rejected { cause, signals }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Matrix cell text: the parenthesised preview or the rejection marker.
    pub fn cell_text(&self) -> &str {
        match self {
            Self::Accepted { preview, .. } => preview,
            Self::Rejected { .. } => REJECTION_MARKER,
        }
    }
}

/// Picks the highest-scoring fragment (earliest rank on ties) and applies
/// the acceptance gate. `hits` must be in rank order.
pub fn select_fragment(
    keywords: &QueryKeywords,
    hits: &[SearchHit],
    thresholds: &SelectorThresholds,
) -> Selection {
    let mut best: Option<(String, CandidateSignals)> = None;

    for (index, hit) in hits.iter().enumerate() {
        let text = hit.text.replace('\n', " ").trim().to_string();
        if text.is_empty() {
            continue;
        }

        let signals = CandidateSignals::evaluate(&text, index + 1, keywords);
        let replaces = best
            .as_ref()
            .is_none_or(|(_, incumbent)| signals.score > incumbent.score);
        if replaces {
            best = Some((text, signals));
        }
    }

    let Some((text, signals)) = best else {
        return Selection::rejected(RejectReason::NoCandidates, None);
    };

    let cause = if signals.hits < thresholds.min_hits {
        Some(RejectReason::TooFewHits { hits: signals.hits })
    } else if signals.unique < thresholds.min_unique {
        Some(RejectReason::TooFewUniqueKeywords {
            unique: signals.unique,
        })
    } else if !(signals.has_header || signals.core_present) {
        Some(RejectReason::NoHeaderOrCoreKeyword)
    } else if signals.rank > thresholds.max_rank {
        Some(RejectReason::RankTooLow { rank: signals.rank })
    } else if signals.score < thresholds.min_score {
        Some(RejectReason::ScoreBelowThreshold {
            score: signals.score,
        })
    } else {
        None
    };

    match cause {
        Some(cause) => Selection::rejected(cause, Some(signals)),
        None => Selection::Accepted {
            preview: preview_text(&text, thresholds.preview_chars),
            signals,
        },
    }
}

pub fn preview_text(text: &str, max_chars: usize) -> String {
    let truncated = text.chars().take(max_chars).collect::<String>();
    let ellipsis = if text.chars().count() > max_chars {
        "..."
    } else {
        ""
    };
    format!("({truncated}{ellipsis})")
}

/// One search for the pair, then selection. Search failures propagate so the
/// caller decides how a failed pair is recorded.
pub fn best_fragment_for_document(
    search: &dyn SimilaritySearch,
    question: &str,
    document_id: &str,
    k: usize,
    thresholds: &SelectorThresholds,
) -> Result<Selection> {
    let keywords = QueryKeywords::for_question(question);
    let expanded = keywords.expanded_query(question);
    let hits = search.search(&expanded, k, &SearchFilter::for_document(document_id))?;

    let selection = select_fragment(&keywords, &hits, thresholds);
    if let Selection::Rejected { cause, .. } = &selection {
        debug!(
            question,
            document_id,
            candidates = hits.len(),
            cause = ?cause,
            "no fragment accepted"
        );
    }

    Ok(selection)
}
