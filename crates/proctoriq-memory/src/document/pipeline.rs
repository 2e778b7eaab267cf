use std::path::Path;

use super::{Document, DocumentError, ExamDocumentLoader, TextSplitter};
use crate::index::VectorIndex;

/// Totals from one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
}

pub struct IngestionPipeline {
    splitter: TextSplitter,
    index: VectorIndex,
}

impl IngestionPipeline {
    #[must_use]
    pub fn new(splitter: TextSplitter, index: VectorIndex) -> Self {
        Self { splitter, index }
    }

    #[must_use]
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Ingest a document: split -> embed -> store. Returns chunk count.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding or storage fails.
    pub async fn ingest(&self, document: &Document) -> Result<usize, DocumentError> {
        let chunks = self.splitter.split_document(document);
        if chunks.is_empty() {
            return Ok(0);
        }
        Ok(self.index.upsert(&chunks).await?)
    }

    /// Split all documents and store the chunks in the index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be created, or embedding or storage fails.
    pub async fn ingest_all(&self, documents: &[Document]) -> Result<IngestReport, DocumentError> {
        self.index.ensure_index().await?;
        let chunks = self.splitter.split(documents);
        let stored = if chunks.is_empty() {
            0
        } else {
            self.index.upsert(&chunks).await?
        };
        tracing::info!(
            "ingested {} documents as {stored} chunks into {}",
            documents.len(),
            self.index.name()
        );
        Ok(IngestReport {
            documents: documents.len(),
            chunks: stored,
        })
    }

    /// # Errors
    ///
    /// Returns [`DocumentError::NoDocuments`] if nothing loadable is found,
    /// or an error if embedding or storage fails.
    pub async fn load_and_ingest(
        &self,
        loader: &ExamDocumentLoader,
        dir: &Path,
    ) -> Result<IngestReport, DocumentError> {
        let documents = loader.load_all(dir).await;
        if documents.is_empty() {
            return Err(DocumentError::NoDocuments(dir.to_path_buf()));
        }
        self.ingest_all(&documents).await
    }
}
