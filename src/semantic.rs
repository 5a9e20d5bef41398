//! Deterministic local embedding used by the fragment store.
//!
//! Fragments and queries are embedded with a signed feature-hashing model over
//! unigram and bigram features from [`crate::text::tokenize`], so Hangul and
//! Latin text share one vector space without an external model.

use serde::{Deserialize, Serialize};

use crate::text::tokenize;
use crate::util::sha256_hex;

pub const DEFAULT_MODEL_ID: &str = "hashed-bow-v1";
pub const DEFAULT_MODEL_NAME: &str = "local hashed bag-of-features";
pub const DEFAULT_EMBEDDING_DIM: usize = 384;
pub const DEFAULT_NORMALIZATION: &str = "l2";
pub const DEFAULT_BACKEND: &str = "local-hash-v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticModelConfig {
    pub model_id: String,
    pub model_name: String,
    pub dimensions: usize,
    pub normalization: String,
    pub backend: String,
}

pub fn resolve_model_config(model_id: &str) -> SemanticModelConfig {
    let trimmed = model_id.trim();
    let resolved_id = if trimmed.is_empty() {
        DEFAULT_MODEL_ID
    } else {
        trimmed
    };

    let model_name = if resolved_id == DEFAULT_MODEL_ID {
        DEFAULT_MODEL_NAME
    } else {
        resolved_id
    };

    SemanticModelConfig {
        model_id: resolved_id.to_string(),
        model_name: model_name.to_string(),
        dimensions: DEFAULT_EMBEDDING_DIM,
        normalization: DEFAULT_NORMALIZATION.to_string(),
        backend: DEFAULT_BACKEND.to_string(),
    }
}

pub fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}

pub fn fragment_payload_for_embedding(text: &str) -> Option<String> {
    let payload = normalize_whitespace(text);
    if payload.is_empty() {
        None
    } else {
        Some(payload)
    }
}

pub fn embedding_text_hash(payload: &str) -> String {
    sha256_hex(payload.as_bytes())
}

pub fn embed_text_local(payload: &str, dimensions: usize) -> Vec<f32> {
    let dims = dimensions.max(8);
    let mut vector = vec![0_f32; dims];
    let features = feature_tokens(payload);

    if features.is_empty() {
        return vector;
    }

    for feature in &features {
        let hash = stable_hash(feature);
        let index = (hash as usize) % dims;
        let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
        let weight = 1.0 + (((hash >> 48) & 0xFF) as f32 / 255.0);
        vector[index] += sign * weight;
    }

    normalize_vector(&mut vector);
    vector
}

pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f64 {
    if left.len() != right.len() || left.is_empty() {
        return 0.0;
    }

    left.iter()
        .zip(right.iter())
        .map(|(left_value, right_value)| f64::from(*left_value) * f64::from(*right_value))
        .sum::<f64>()
}

/// Smaller is closer; `0.0` for identical unit vectors.
pub fn cosine_distance(left: &[f32], right: &[f32]) -> f64 {
    1.0 - cosine_similarity(left, right)
}

pub fn encode_embedding_blob(values: &[f32]) -> Vec<u8> {
    let mut out = Vec::<u8>::with_capacity(values.len() * 4);
    for value in values {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

pub fn decode_embedding_blob(blob: &[u8], expected_dim: usize) -> Option<Vec<f32>> {
    if expected_dim == 0 || blob.len() != expected_dim.saturating_mul(4) {
        return None;
    }

    let out = blob
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect::<Vec<f32>>();

    (out.len() == expected_dim).then_some(out)
}

// FNV-1a, fixed so stored embeddings survive toolchain upgrades.
fn stable_hash(value: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    value.bytes().fold(OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(PRIME)
    })
}

fn feature_tokens(payload: &str) -> Vec<String> {
    let words = tokenize(payload);
    if words.is_empty() {
        return Vec::new();
    }

    let mut features = Vec::<String>::with_capacity(words.len() * 2);
    for (index, word) in words.iter().enumerate() {
        features.push(format!("w:{word}"));
        if let Some(next) = words.get(index + 1) {
            features.push(format!("b:{word}_{next}"));
        }
    }
    features
}

fn normalize_vector(values: &mut [f32]) {
    let squared_norm = values
        .iter()
        .map(|value| f64::from(*value) * f64::from(*value))
        .sum::<f64>();

    if squared_norm <= 0.0 {
        return;
    }

    let norm = squared_norm.sqrt() as f32;
    if norm == 0.0 {
        return;
    }

    for value in values {
        *value /= norm;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_payloads_have_zero_distance() {
        let left = embed_text_local("Force Majeure 불가항력 clause", DEFAULT_EMBEDDING_DIM);
        let right = embed_text_local("force  majeure 불가항력 CLAUSE", DEFAULT_EMBEDDING_DIM);
        assert!(cosine_distance(&left, &right).abs() < 1e-6);
    }

    #[test]
    fn overlapping_payloads_are_closer_than_unrelated_ones() {
        let query = embed_text_local("termination of the agreement", DEFAULT_EMBEDDING_DIM);
        let related = embed_text_local("Article 20 termination of this agreement", DEFAULT_EMBEDDING_DIM);
        let unrelated = embed_text_local("royalty rate and withholding tax", DEFAULT_EMBEDDING_DIM);
        assert!(cosine_distance(&query, &related) < cosine_distance(&query, &unrelated));
    }

    #[test]
    fn embedding_blob_round_trip_checks_dimension() {
        let vector = embed_text_local("audit rights", 16);
        let blob = encode_embedding_blob(&vector);
        assert_eq!(decode_embedding_blob(&blob, 16), Some(vector));
        assert_eq!(decode_embedding_blob(&blob, 8), None);
    }

    #[test]
    fn blank_payloads_are_not_embedded() {
        assert_eq!(fragment_payload_for_embedding(" \n\t "), None);
        assert_eq!(
            fragment_payload_for_embedding(" Article 5\n Insurance "),
            Some("Article 5 Insurance".to_string())
        );
    }
}
