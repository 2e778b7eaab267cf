#[cfg(feature = "candle")]
use crate::bert::BertEmbedder;
use crate::error::EmbedError;
use crate::hash::HashEmbedder;
use crate::provider::{EmbedFuture, EmbeddingProvider};

/// Generates a match over all `AnyEmbedder` variants, binding the inner provider
/// and evaluating the given expression for each arm.
macro_rules! delegate_embedder {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            #[cfg(feature = "candle")]
            AnyEmbedder::Bert($p) => $expr,
            AnyEmbedder::Hash($p) => $expr,
        }
    };
}

#[derive(Debug, Clone)]
pub enum AnyEmbedder {
    #[cfg(feature = "candle")]
    Bert(BertEmbedder),
    Hash(HashEmbedder),
}

impl AnyEmbedder {
    /// Return a cloneable closure that calls `embed()` on this provider.
    pub fn embed_fn(&self) -> impl Fn(&str) -> EmbedFuture + Send + Sync + use<> {
        let provider = std::sync::Arc::new(self.clone());
        move |text: &str| -> EmbedFuture {
            let p = std::sync::Arc::clone(&provider);
            let owned = text.to_owned();
            Box::pin(async move { p.embed(&owned).await })
        }
    }
}

impl EmbeddingProvider for AnyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        delegate_embedder!(self, |p| p.embed(text).await)
    }

    fn dimension(&self) -> usize {
        delegate_embedder!(self, |p| p.dimension())
    }

    fn name(&self) -> &str {
        delegate_embedder!(self, |p| p.name())
    }
}
