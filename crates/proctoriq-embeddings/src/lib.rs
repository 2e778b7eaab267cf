//! Sentence embedding providers used for exam document indexing.

pub mod any;
#[cfg(feature = "candle")]
pub mod bert;
pub mod error;
pub mod hash;
pub mod provider;

pub use any::AnyEmbedder;
pub use error::EmbedError;
pub use provider::{EmbedFuture, EmbeddingProvider};

/// Output dimension of `sentence-transformers/all-MiniLM-L6-v2`.
pub const MINILM_DIMENSION: usize = 384;

/// Default sentence embedding model repository on the Hugging Face hub.
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Scale `vector` to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
