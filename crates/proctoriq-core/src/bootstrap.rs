//! Application bootstrap: config resolution, embedder and index construction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "candle")]
use anyhow::Context;
use anyhow::bail;
use proctoriq_embeddings::hash::HashEmbedder;
use proctoriq_embeddings::{AnyEmbedder, EmbeddingProvider};
use proctoriq_memory::document::{ExamDocumentLoader, IngestionPipeline, TextSplitter};
use proctoriq_memory::{
    ExamRetriever, IdStrategy, IndexSettings, QdrantOps, VectorIndex, VectorStore,
};

use crate::config::{Config, EmbeddingProviderKind};
use crate::vault::{EnvVaultProvider, VaultProvider};

pub struct AppBuilder {
    config: Config,
    config_path: PathBuf,
}

/// Fully wired components for one run.
pub struct App {
    pub loader: ExamDocumentLoader,
    pub pipeline: IngestionPipeline,
    pub retriever: ExamRetriever,
    pub index: VectorIndex,
    pub docs_dir: PathBuf,
}

impl AppBuilder {
    /// Resolve config from the CLI path, `PROCTORIQ_CONFIG` or the default location,
    /// then read secrets from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or a required secret is missing.
    pub async fn from_env(cli_config: Option<&Path>) -> anyhow::Result<Self> {
        Self::new(resolve_config_path(cli_config), &EnvVaultProvider).await
    }

    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded, fails validation, or a
    /// required secret is missing from `vault`.
    pub async fn new(config_path: PathBuf, vault: &dyn VaultProvider) -> anyhow::Result<Self> {
        let mut config = Config::load(&config_path)?;
        config.validate()?;
        config.resolve_secrets(vault).await?;
        tracing::info!("configuration loaded from {}", config_path.display());
        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded or its dimension differs
    /// from `embedding.dimension`.
    pub async fn build_embedder(&self) -> anyhow::Result<AnyEmbedder> {
        let embedder = create_embedder(&self.config).await?;
        let actual = embedder.dimension();
        if actual != self.config.embedding.dimension {
            bail!(
                "embedding model {} produces {actual}-dimensional vectors, config expects {}",
                embedder.name(),
                self.config.embedding.dimension
            );
        }
        tracing::info!(
            provider = %self.config.embedding.provider,
            dimension = actual,
            "embedding provider ready"
        );
        Ok(embedder)
    }

    /// # Errors
    ///
    /// Returns an error if the Qdrant client cannot be created.
    pub fn build_store(&self) -> anyhow::Result<Arc<dyn VectorStore>> {
        let api_key = self
            .config
            .secrets
            .qdrant_api_key
            .as_ref()
            .map(crate::vault::Secret::expose);
        let ops = QdrantOps::new(&self.config.index.url, api_key)
            .map_err(|e| anyhow::anyhow!("failed to create Qdrant client: {e}"))?;
        Ok(Arc::new(ops))
    }

    #[must_use]
    pub fn build_index(&self, store: Arc<dyn VectorStore>, embedder: &AnyEmbedder) -> VectorIndex {
        let id_strategy = if self.config.index.deduplicate {
            IdStrategy::ContentDerived
        } else {
            IdStrategy::Random
        };
        VectorIndex::new(
            store,
            IndexSettings {
                name: self.config.index.name.clone(),
                dimension: self.config.embedding.dimension as u64,
                metric: self.config.index.metric,
                id_strategy,
            },
            Arc::new(embedder.embed_fn()),
        )
    }

    #[must_use]
    pub fn build_loader(&self) -> ExamDocumentLoader {
        ExamDocumentLoader {
            max_file_size: self.config.documents.max_file_size,
        }
    }

    #[must_use]
    pub fn build_pipeline(&self, index: VectorIndex) -> IngestionPipeline {
        IngestionPipeline::new(TextSplitter::new((&self.config.splitter).into()), index)
    }

    #[must_use]
    pub fn build_retriever(&self, index: VectorIndex) -> ExamRetriever {
        ExamRetriever::new(index, (&self.config.retrieval).into())
    }

    /// Wire every component against the configured Qdrant endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedder or the Qdrant client cannot be created.
    pub async fn build(&self) -> anyhow::Result<App> {
        let embedder = self.build_embedder().await?;
        let store = self.build_store()?;
        Ok(self.assemble(store, &embedder))
    }

    /// Wire every component on top of an existing store.
    #[must_use]
    pub fn assemble(&self, store: Arc<dyn VectorStore>, embedder: &AnyEmbedder) -> App {
        let index = self.build_index(store, embedder);
        App {
            loader: self.build_loader(),
            pipeline: self.build_pipeline(index.clone()),
            retriever: self.build_retriever(index.clone()),
            index,
            docs_dir: self.config.documents.directory.clone(),
        }
    }
}

async fn create_embedder(config: &Config) -> anyhow::Result<AnyEmbedder> {
    match config.embedding.provider {
        EmbeddingProviderKind::Hash => Ok(AnyEmbedder::Hash(HashEmbedder::new(
            config.embedding.dimension,
        ))),
        #[cfg(feature = "candle")]
        EmbeddingProviderKind::Candle => {
            let model = config.embedding.model.clone();
            tracing::info!("loading embedding model {model}");
            let bert = tokio::task::spawn_blocking(move || {
                proctoriq_embeddings::bert::BertEmbedder::load(&model)
            })
            .await
            .context("embedding model loader panicked")?
            .with_context(|| {
                format!(
                    "failed to load embedding model {}",
                    config.embedding.model
                )
            })?;
            Ok(AnyEmbedder::Bert(bert))
        }
        #[cfg(not(feature = "candle"))]
        EmbeddingProviderKind::Candle => {
            bail!("candle embedding provider requires the `candle` feature")
        }
    }
}

/// Priority: CLI `--config` > `PROCTORIQ_CONFIG` env > `config/default.toml`.
pub fn resolve_config_path(cli: Option<&Path>) -> PathBuf {
    if let Some(path) = cli {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("PROCTORIQ_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}
