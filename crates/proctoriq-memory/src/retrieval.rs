//! Exam-aware retrieval on top of [`VectorIndex`].
//!
//! Every operation returns `Result`; callers that prefer the degrade-to-empty
//! behaviour wrap the call in [`or_empty`].

use crate::document::types::{DocumentType, keys};
use crate::error::MemoryError;
use crate::index::{SearchHit, VectorIndex};
use crate::vector_store::VectorFilter;

const QUESTION_PAPER_QUERY: &str = "question paper";
const MARKING_SCHEME_QUERY: &str = "marking scheme";
const STUDENT_ANSWER_QUERY: &str = "student answer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalConfig {
    /// Results returned by the per-type lookups.
    pub default_limit: u64,
    /// Results returned by free-text context search.
    pub context_limit: u64,
    /// Characters of chunk content kept by [`format_context`].
    pub snippet_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: 3,
            context_limit: 5,
            snippet_chars: 300,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExamRetriever {
    index: VectorIndex,
    config: RetrievalConfig,
}

impl ExamRetriever {
    #[must_use]
    pub fn new(index: VectorIndex, config: RetrievalConfig) -> Self {
        Self { index, config }
    }

    #[must_use]
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// # Errors
    ///
    /// Returns an error if embedding the query or the index search fails.
    pub async fn get_question_paper(&self, paper: &str) -> Result<Vec<SearchHit>, MemoryError> {
        self.search_typed(QUESTION_PAPER_QUERY, DocumentType::QuestionPaper, paper, None)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if embedding the query or the index search fails.
    pub async fn get_marking_scheme(&self, paper: &str) -> Result<Vec<SearchHit>, MemoryError> {
        self.search_typed(MARKING_SCHEME_QUERY, DocumentType::MarkingScheme, paper, None)
            .await
    }

    /// Student answers for `paper`, narrowed to one variation when given.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding the query or the index search fails.
    pub async fn get_student_answers(
        &self,
        paper: &str,
        variation: Option<&str>,
    ) -> Result<Vec<SearchHit>, MemoryError> {
        self.search_typed(
            STUDENT_ANSWER_QUERY,
            DocumentType::StudentAnswer,
            paper,
            variation,
        )
        .await
    }

    /// Chunks of any type relevant to `question`, optionally limited to one paper.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding the question or the index search fails.
    pub async fn search_relevant_context(
        &self,
        question: &str,
        paper: Option<&str>,
    ) -> Result<Vec<SearchHit>, MemoryError> {
        let filter = paper
            .filter(|p| !p.is_empty())
            .map(|p| VectorFilter::new().must_eq(keys::PAPER_NUMBER, p));
        self.index
            .try_similarity_search(question, self.config.context_limit, filter)
            .await
    }

    /// Run [`Self::search_relevant_context`] for each question, in order.
    ///
    /// # Errors
    ///
    /// Returns the first search failure.
    pub async fn search_batch_context(
        &self,
        questions: &[String],
        paper: Option<&str>,
    ) -> Result<Vec<(String, Vec<SearchHit>)>, MemoryError> {
        let mut results = Vec::with_capacity(questions.len());
        for question in questions {
            let hits = self.search_relevant_context(question, paper).await?;
            results.push((question.clone(), hits));
        }
        Ok(results)
    }

    async fn search_typed(
        &self,
        query: &str,
        doc_type: DocumentType,
        paper: &str,
        variation: Option<&str>,
    ) -> Result<Vec<SearchHit>, MemoryError> {
        // Empty values mean "not given" and add no condition.
        let mut filter = VectorFilter::new().must_eq(keys::TYPE, doc_type.as_str());
        if !paper.is_empty() {
            filter = filter.must_eq(keys::PAPER_NUMBER, paper);
        }
        if let Some(v) = variation.filter(|v| !v.is_empty()) {
            filter = filter.must_eq(keys::VARIATION, v);
        }
        self.index
            .try_similarity_search(query, self.config.default_limit, Some(filter))
            .await
    }
}

/// Render a hit as `[TYPE - filename]` followed by its leading content.
#[must_use]
pub fn format_context(hit: &SearchHit, max_chars: usize) -> String {
    let meta = &hit.chunk.metadata;
    let snippet: String = hit.chunk.content.chars().take(max_chars).collect();
    format!(
        "[{} - {}]\n{snippet}",
        meta.doc_type.as_str().to_uppercase(),
        meta.filename
    )
}

/// Collapse a failed retrieval into an empty result, logging the error.
pub fn or_empty<T>(result: Result<Vec<T>, MemoryError>, operation: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::error!("{operation} failed: {e}");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proctoriq_embeddings::hash::HashEmbedder;
    use proctoriq_embeddings::{EmbedFuture, EmbeddingProvider};

    use super::*;
    use crate::document::types::{Chunk, DocumentMetadata};
    use crate::in_memory_store::InMemoryVectorStore;
    use crate::index::{EmbedFn, IdStrategy, IndexSettings};
    use crate::vector_store::Metric;

    fn embed_fn() -> EmbedFn {
        let embedder = HashEmbedder::new(32);
        Arc::new(move |text: &str| -> EmbedFuture {
            let e = embedder.clone();
            let owned = text.to_owned();
            Box::pin(async move { e.embed(&owned).await })
        })
    }

    fn chunk(doc_type: DocumentType, paper: &str, variation: Option<&str>, content: &str) -> Chunk {
        let prefix = match doc_type {
            DocumentType::QuestionPaper => "SQP",
            DocumentType::MarkingScheme => "MS",
            DocumentType::StudentAnswer => "Student_Answer_Paper",
        };
        let filename = match variation {
            Some(v) => format!("{prefix}{paper}_{v}.txt"),
            None => format!("{prefix}{paper}.txt"),
        };
        Chunk {
            content: content.to_owned(),
            metadata: DocumentMetadata {
                doc_type,
                priority: doc_type.priority(),
                file_path: format!("docs/{filename}"),
                filename,
                paper_number: Some(paper.to_owned()),
                variation: variation.map(str::to_owned),
            },
            chunk_index: 0,
        }
    }

    async fn seeded() -> ExamRetriever {
        let index = VectorIndex::new(
            Arc::new(InMemoryVectorStore::new()),
            IndexSettings {
                name: "exams".into(),
                dimension: 32,
                metric: Metric::Cosine,
                id_strategy: IdStrategy::Random,
            },
            embed_fn(),
        );
        index.ensure_index().await.unwrap();
        index
            .upsert(&[
                chunk(DocumentType::QuestionPaper, "1", None, "Question paper one text"),
                chunk(DocumentType::QuestionPaper, "2", None, "Question paper two text"),
                chunk(DocumentType::MarkingScheme, "1", None, "Marking scheme for paper one"),
                chunk(DocumentType::StudentAnswer, "1", Some("Variation1"), "Pip was trembling"),
                chunk(DocumentType::StudentAnswer, "1", Some("Variation2"), "Pip was cold"),
                chunk(DocumentType::StudentAnswer, "2", Some("Variation1"), "Magwitch"),
            ])
            .await
            .unwrap();
        ExamRetriever::new(index, RetrievalConfig::default())
    }

    #[tokio::test]
    async fn question_paper_filtered_by_type_and_paper() {
        let retriever = seeded().await;
        let hits = retriever.get_question_paper("1").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits.iter().all(|h| {
            h.chunk.metadata.doc_type == DocumentType::QuestionPaper
                && h.chunk.metadata.paper_number.as_deref() == Some("1")
        }));
    }

    #[tokio::test]
    async fn marking_scheme_for_missing_paper_is_empty() {
        let retriever = seeded().await;
        assert!(retriever.get_marking_scheme("9").await.unwrap().is_empty());
        assert_eq!(retriever.get_marking_scheme("1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn student_answers_with_and_without_variation() {
        let retriever = seeded().await;
        let all = retriever.get_student_answers("1", None).await.unwrap();
        assert_eq!(all.len(), 2);

        let one = retriever
            .get_student_answers("1", Some("Variation1"))
            .await
            .unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].chunk.content, "Pip was trembling");
    }

    #[tokio::test]
    async fn context_search_respects_limit_and_paper() {
        let retriever = seeded().await;
        let unfiltered = retriever
            .search_relevant_context("Pip was trembling", None)
            .await
            .unwrap();
        assert_eq!(unfiltered.len(), 5);
        assert_eq!(unfiltered[0].chunk.content, "Pip was trembling");

        let paper_two = retriever
            .search_relevant_context("Pip was trembling", Some("2"))
            .await
            .unwrap();
        assert_eq!(paper_two.len(), 2);
        assert!(
            paper_two
                .iter()
                .all(|h| h.chunk.metadata.paper_number.as_deref() == Some("2"))
        );
    }

    #[tokio::test]
    async fn empty_filter_values_are_treated_as_absent() {
        let retriever = seeded().await;
        let answers = retriever.get_student_answers("1", Some("")).await.unwrap();
        assert_eq!(answers.len(), 2);

        let papers = retriever.get_question_paper("").await.unwrap();
        assert_eq!(papers.len(), 2);
        assert!(
            papers
                .iter()
                .all(|h| h.chunk.metadata.doc_type == DocumentType::QuestionPaper)
        );

        let context = retriever
            .search_relevant_context("Pip was trembling", Some(""))
            .await
            .unwrap();
        assert_eq!(context.len(), 5);
    }

    #[tokio::test]
    async fn batch_context_preserves_question_order() {
        let retriever = seeded().await;
        let questions = vec!["Magwitch".to_owned(), "Pip was cold".to_owned()];
        let results = retriever
            .search_batch_context(&questions, Some("1"))
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "Magwitch");
        assert_eq!(results[1].0, "Pip was cold");
        assert_eq!(results[1].1[0].chunk.content, "Pip was cold");
    }

    #[test]
    fn format_context_truncates_and_labels() {
        let hit = SearchHit {
            id: "1".into(),
            score: 0.9,
            chunk: chunk(DocumentType::MarkingScheme, "1", None, "abcdefghij"),
        };
        assert_eq!(
            format_context(&hit, 4),
            "[MARKING_SCHEME - MS1.txt]\nabcd"
        );
    }

    #[test]
    fn or_empty_swallows_errors() {
        let err: Result<Vec<u8>, MemoryError> = Err(MemoryError::Other("down".into()));
        assert!(or_empty(err, "test").is_empty());
        assert_eq!(or_empty(Ok(vec![1u8]), "test"), vec![1]);
    }
}
