#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("Qdrant error: {0}")]
    Qdrant(#[from] Box<qdrant_client::QdrantError>),

    #[error("vector store error: {0}")]
    VectorStore(#[from] crate::vector_store::VectorStoreError),

    #[error("embedding error: {0}")]
    Embedding(#[from] proctoriq_embeddings::EmbedError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
