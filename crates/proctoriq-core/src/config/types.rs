use std::path::PathBuf;

use proctoriq_memory::Metric;
use proctoriq_memory::document::SplitterConfig;
use proctoriq_memory::RetrievalConfig;
use serde::{Deserialize, Serialize};

use crate::vault::Secret;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
    #[serde(default)]
    pub splitter: ChunkConfig,
    #[serde(default)]
    pub retrieval: SearchConfig,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

/// Embedding backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    #[default]
    Candle,
    Hash,
}

impl EmbeddingProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Candle => "candle",
            Self::Hash => "hash",
        }
    }
}

impl std::fmt::Display for EmbeddingProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_embedding_model() -> String {
    proctoriq_embeddings::DEFAULT_EMBEDDING_MODEL.into()
}

fn default_dimension() -> usize {
    proctoriq_embeddings::MINILM_DIMENSION
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProviderKind,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            model: default_embedding_model(),
            dimension: default_dimension(),
        }
    }
}

fn default_index_name() -> String {
    "proctoriq".into()
}

fn default_index_url() -> String {
    "http://localhost:6334".into()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct IndexConfig {
    #[serde(default = "default_index_name")]
    pub name: String,
    #[serde(default = "default_index_url")]
    pub url: String,
    #[serde(default)]
    pub metric: Metric,
    /// Derive point ids from content so re-ingestion overwrites instead of duplicating.
    #[serde(default)]
    pub deduplicate: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: default_index_name(),
            url: default_index_url(),
            metric: Metric::default(),
            deduplicate: false,
        }
    }
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("docs")
}

fn default_max_file_size() -> u64 {
    proctoriq_memory::document::DEFAULT_MAX_FILE_SIZE
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DocumentsConfig {
    #[serde(default = "default_docs_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            directory: default_docs_dir(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    100
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChunkConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_true")]
    pub sentence_aware: bool,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            sentence_aware: true,
        }
    }
}

impl From<&ChunkConfig> for SplitterConfig {
    fn from(c: &ChunkConfig) -> Self {
        Self {
            chunk_size: c.chunk_size,
            chunk_overlap: c.chunk_overlap,
            sentence_aware: c.sentence_aware,
        }
    }
}

fn default_limit() -> u64 {
    3
}

fn default_context_limit() -> u64 {
    5
}

fn default_snippet_chars() -> usize {
    300
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: u64,
    #[serde(default = "default_context_limit")]
    pub context_limit: u64,
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            context_limit: default_context_limit(),
            snippet_chars: default_snippet_chars(),
        }
    }
}

impl From<&SearchConfig> for RetrievalConfig {
    fn from(c: &SearchConfig) -> Self {
        Self {
            default_limit: c.default_limit,
            context_limit: c.context_limit,
            snippet_chars: c.snippet_chars,
        }
    }
}

#[derive(Debug, Default)]
pub struct ResolvedSecrets {
    pub qdrant_api_key: Option<Secret>,
}
