//! Exam document ingestion and semantic retrieval over a vector index.

pub mod document;
pub mod error;
pub mod in_memory_store;
pub mod index;
pub mod qdrant_ops;
pub mod retrieval;
pub mod vector_store;

pub use error::MemoryError;
pub use in_memory_store::InMemoryVectorStore;
pub use index::{EmbedFn, IdStrategy, IndexSettings, SearchHit, VectorIndex};
pub use qdrant_ops::QdrantOps;
pub use retrieval::{ExamRetriever, RetrievalConfig, or_empty};
pub use vector_store::{
    FieldCondition, FieldValue, Metric, ScoredVectorPoint, VectorFilter, VectorPoint, VectorStore,
    VectorStoreError,
};
