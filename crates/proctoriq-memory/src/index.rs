//! Embedding-aware client over a named vector collection.

use std::collections::HashMap;
use std::sync::Arc;

use proctoriq_embeddings::EmbedFuture;
use serde_json::json;
use uuid::Uuid;

use crate::document::types::{Chunk, DocumentMetadata, keys};
use crate::error::MemoryError;
use crate::vector_store::{Metric, VectorFilter, VectorPoint, VectorStore};

/// Points sent to the store per upsert request.
const UPSERT_BATCH: usize = 64;

pub type EmbedFn = Arc<dyn Fn(&str) -> EmbedFuture + Send + Sync>;

/// How point ids are derived at ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// Fresh UUID v4 per chunk; re-ingesting identical input adds duplicates.
    #[default]
    Random,
    /// UUID v5 over file path, chunk index and content hash; re-ingesting overwrites.
    ContentDerived,
}

#[derive(Debug, Clone)]
pub struct IndexSettings {
    pub name: String,
    pub dimension: u64,
    pub metric: Metric,
    pub id_strategy: IdStrategy,
}

/// One search result: the stored chunk and its similarity score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub chunk: Chunk,
}

#[derive(Clone)]
pub struct VectorIndex {
    store: Arc<dyn VectorStore>,
    settings: IndexSettings,
    embed_fn: EmbedFn,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl VectorIndex {
    pub fn new(store: Arc<dyn VectorStore>, settings: IndexSettings, embed_fn: EmbedFn) -> Self {
        Self {
            store,
            settings,
            embed_fn,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.settings.name
    }

    #[must_use]
    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    /// Create the collection if absent. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or rejects the collection.
    pub async fn ensure_index(&self) -> Result<(), MemoryError> {
        self.store
            .ensure_collection(
                &self.settings.name,
                self.settings.dimension,
                self.settings.metric,
            )
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the collection cannot be deleted.
    pub async fn delete_index(&self) -> Result<(), MemoryError> {
        self.store.delete_collection(&self.settings.name).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    pub async fn exists(&self) -> Result<bool, MemoryError> {
        Ok(self.store.collection_exists(&self.settings.name).await?)
    }

    /// # Errors
    ///
    /// Returns an error if the count request fails.
    pub async fn count(&self) -> Result<u64, MemoryError> {
        Ok(self.store.count(&self.settings.name).await?)
    }

    /// Embed and store every chunk. Returns the number of points written.
    ///
    /// No rollback: a failure part-way leaves earlier batches in the index.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding or the store upsert fails.
    pub async fn upsert(&self, chunks: &[Chunk]) -> Result<usize, MemoryError> {
        let mut written = 0;
        for batch in chunks.chunks(UPSERT_BATCH) {
            let mut points = Vec::with_capacity(batch.len());
            for chunk in batch {
                let vector = (self.embed_fn)(&chunk.content).await?;
                points.push(VectorPoint {
                    id: self.point_id(chunk),
                    vector,
                    payload: chunk_payload(chunk),
                });
            }
            self.store.upsert(&self.settings.name, points).await?;
            written += batch.len();
        }
        tracing::info!("upserted {written} chunks into {}", self.settings.name);
        Ok(written)
    }

    /// Nearest `k` chunks to `query` whose metadata satisfies `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding the query or the store search fails.
    pub async fn try_similarity_search(
        &self,
        query: &str,
        k: u64,
        filter: Option<VectorFilter>,
    ) -> Result<Vec<SearchHit>, MemoryError> {
        let vector = (self.embed_fn)(query).await?;
        let points = self
            .store
            .search(&self.settings.name, vector, k, filter)
            .await?;
        let hits: Vec<SearchHit> = points
            .into_iter()
            .filter_map(|p| {
                let Some(chunk) = chunk_from_payload(&p.payload) else {
                    tracing::warn!("skipping point {} with incomplete payload", p.id);
                    return None;
                };
                Some(SearchHit {
                    id: p.id,
                    score: p.score,
                    chunk,
                })
            })
            .collect();
        tracing::info!("found {} relevant chunks", hits.len());
        Ok(hits)
    }

    /// Like [`Self::try_similarity_search`], but logs failures and returns no hits.
    pub async fn similarity_search(
        &self,
        query: &str,
        k: u64,
        filter: Option<VectorFilter>,
    ) -> Vec<SearchHit> {
        match self.try_similarity_search(query, k, filter).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::error!("similarity search on {} failed: {e}", self.settings.name);
                Vec::new()
            }
        }
    }

    fn point_id(&self, chunk: &Chunk) -> String {
        match self.settings.id_strategy {
            IdStrategy::Random => Uuid::new_v4().to_string(),
            IdStrategy::ContentDerived => content_derived_id(chunk).to_string(),
        }
    }
}

fn content_derived_id(chunk: &Chunk) -> Uuid {
    let hash = blake3::hash(chunk.content.as_bytes());
    let name = format!(
        "{}:{}:{}",
        chunk.metadata.file_path,
        chunk.chunk_index,
        hash.to_hex()
    );
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

fn chunk_payload(chunk: &Chunk) -> HashMap<String, serde_json::Value> {
    let mut payload = chunk.metadata.to_payload();
    payload.insert(keys::CONTENT.to_owned(), json!(chunk.content));
    payload.insert(keys::CHUNK_INDEX.to_owned(), json!(chunk.chunk_index));
    payload
}

fn chunk_from_payload(payload: &HashMap<String, serde_json::Value>) -> Option<Chunk> {
    let content = payload.get(keys::CONTENT)?.as_str()?.to_owned();
    let chunk_index = payload
        .get(keys::CHUNK_INDEX)
        .and_then(serde_json::Value::as_u64)
        .and_then(|i| usize::try_from(i).ok())
        .unwrap_or(0);
    Some(Chunk {
        content,
        metadata: DocumentMetadata::from_payload(payload)?,
        chunk_index,
    })
}
