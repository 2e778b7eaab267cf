//! Deterministic feature-hashing embedder.
//!
//! Each lowercase alphanumeric token is hashed with blake3 into one signed
//! bucket of the output vector, which is then L2-normalized. Identical text
//! always maps to the identical vector, and texts sharing vocabulary score
//! higher than unrelated ones. Used for tests and offline runs.

use crate::error::EmbedError;
use crate::provider::EmbeddingProvider;
use crate::{MINILM_DIMENSION, l2_normalize};

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(MINILM_DIMENSION)
    }
}

impl HashEmbedder {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    #[must_use]
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in tokens(text) {
            let hash = blake3::hash(token.as_bytes());
            let bytes = hash.as_bytes();
            let mut idx_bytes = [0u8; 8];
            idx_bytes.copy_from_slice(&bytes[..8]);
            #[expect(clippy::cast_possible_truncation)]
            let idx = (u64::from_le_bytes(idx_bytes) % self.dimension as u64) as usize;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }
        l2_normalize(&mut vector);
        vector
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        Ok(self.embed_sync(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn deterministic() {
        let e = HashEmbedder::default();
        assert_eq!(e.embed_sync("Pip was trembling"), e.embed_sync("Pip was trembling"));
    }

    #[test]
    fn default_dimension_matches_minilm() {
        let e = HashEmbedder::default();
        assert_eq!(e.embed_sync("hello").len(), 384);
        assert_eq!(e.dimension(), 384);
    }

    #[test]
    fn output_is_normalized() {
        let v = HashEmbedder::default().embed_sync("marking scheme for paper one");
        let norm = dot(&v, &v).sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn case_and_punctuation_insensitive() {
        let e = HashEmbedder::default();
        assert_eq!(e.embed_sync("Question, Paper!"), e.embed_sync("question paper"));
    }

    #[test]
    fn shared_vocabulary_scores_higher() {
        let e = HashEmbedder::default();
        let q = e.embed_sync("what evidence shows pip was trembling");
        let near = e.embed_sync("pip was trembling with cold and fear");
        let far = e.embed_sync("calculate the area of the triangle");
        assert!(dot(&q, &near) > dot(&q, &far));
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let v = HashEmbedder::new(8).embed_sync("  ,. ");
        assert_eq!(v, vec![0.0; 8]);
    }

    #[test]
    fn zero_dimension_clamped() {
        assert_eq!(HashEmbedder::new(0).dimension(), 1);
    }

    #[tokio::test]
    async fn async_embed_matches_sync() {
        let e = HashEmbedder::new(16);
        let v = e.embed("abc def").await.unwrap();
        assert_eq!(v, e.embed_sync("abc def"));
    }

    mod proptest_hash {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(300))]

            #[test]
            fn output_is_unit_or_zero(text in "\\PC{0,200}", dimension in 1usize..64) {
                let v = HashEmbedder::new(dimension).embed_sync(&text);
                prop_assert_eq!(v.len(), dimension);
                // Opposite-signed tokens can cancel in a bucket, so zero is allowed.
                let norm = dot(&v, &v).sqrt();
                prop_assert!(norm < 1e-6 || (norm - 1.0).abs() < 1e-4, "norm {norm}");
                if tokens(&text).next().is_none() {
                    prop_assert!(norm < 1e-6);
                }
            }
        }
    }
}
