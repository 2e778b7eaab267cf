use std::future::Future;
use std::pin::Pin;

use crate::error::EmbedError;

/// Boxed embedding future, used where a provider is passed around as a closure.
pub type EmbedFuture = Pin<Box<dyn Future<Output = Result<Vec<f32>, EmbedError>> + Send>>;

pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text` into a fixed-length vector.
    ///
    /// # Errors
    ///
    /// Returns an error if tokenization or inference fails.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, EmbedError>> + Send;

    /// Length of every vector returned by [`EmbeddingProvider::embed`].
    fn dimension(&self) -> usize;

    fn name(&self) -> &str;
}
