//! Directory loader for exam documents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use super::{
    DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentMetadata, DocumentType,
    FilenamePattern,
};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: DocumentError,
}

/// Outcome of scanning one directory.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub documents: Vec<Document>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    #[must_use]
    pub fn counts_by_type(&self) -> BTreeMap<DocumentType, usize> {
        let mut counts = BTreeMap::new();
        for doc in &self.documents {
            *counts.entry(doc.metadata.doc_type).or_insert(0) += 1;
        }
        counts
    }
}

#[derive(Debug, Clone)]
pub struct ExamDocumentLoader {
    pub max_file_size: u64,
}

impl Default for ExamDocumentLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl ExamDocumentLoader {
    /// Load every recognized exam file in `dir`, never failing.
    ///
    /// A missing or unreadable directory yields an empty list; individual
    /// files that cannot be read are logged and skipped.
    pub async fn load_all(&self, dir: &Path) -> Vec<Document> {
        match self.scan(dir).await {
            Ok(report) => report.documents,
            Err(e) => {
                tracing::warn!("no exam documents loaded from {}: {e}", dir.display());
                Vec::new()
            }
        }
    }

    /// Scan `dir` for the three exam filename patterns.
    ///
    /// # Errors
    ///
    /// Returns an error only if the directory itself cannot be listed. Per-file
    /// failures are collected in [`LoadReport::failures`].
    pub async fn scan(&self, dir: &Path) -> Result<LoadReport, DocumentError> {
        if !tokio::fs::metadata(dir).await.is_ok_and(|m| m.is_dir()) {
            return Err(DocumentError::DirectoryNotFound(dir.to_path_buf()));
        }
        let names = list_file_names(dir).await?;

        let mut report = LoadReport::default();
        for pattern in FilenamePattern::ALL {
            for name in matching(&names, pattern) {
                let path = dir.join(name);
                match self.load_file(&path, pattern).await {
                    Ok(doc) => {
                        tracing::info!("loaded {name} ({})", doc.metadata.doc_type);
                        report.documents.push(doc);
                    }
                    Err(error) => {
                        tracing::error!("failed to load {name}: {error}");
                        report.failures.push(LoadFailure { path, error });
                    }
                }
            }
        }

        if report.documents.is_empty() {
            tracing::warn!("no exam documents found in {}", dir.display());
        } else {
            tracing::info!("total documents loaded: {}", report.documents.len());
            for (doc_type, count) in report.counts_by_type() {
                tracing::info!("  {doc_type}: {count} documents");
            }
        }
        Ok(report)
    }

    /// Read one file and attach the metadata implied by `pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name does not fit `pattern`, the file exceeds
    /// `max_file_size`, or it cannot be read as UTF-8.
    pub async fn load_file(
        &self,
        path: &Path,
        pattern: FilenamePattern,
    ) -> Result<Document, DocumentError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DocumentError::UnrecognizedFilename(path.display().to_string()))?;
        let parsed = pattern
            .parse(filename)
            .ok_or_else(|| DocumentError::UnrecognizedFilename(filename.to_owned()))?;

        let meta = tokio::fs::metadata(path).await?;
        if meta.len() > self.max_file_size {
            return Err(DocumentError::FileTooLarge(meta.len()));
        }
        let content = tokio::fs::read_to_string(path).await?;

        Ok(Document {
            content,
            metadata: DocumentMetadata {
                doc_type: parsed.doc_type,
                priority: parsed.doc_type.priority(),
                filename: filename.to_owned(),
                file_path: path.display().to_string(),
                paper_number: parsed.paper_number,
                variation: parsed.variation,
            },
        })
    }
}

async fn list_file_names(dir: &Path) -> Result<Vec<String>, DocumentError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await.is_ok_and(|t| t.is_file()) {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_owned());
        }
    }
    names.sort();
    Ok(names)
}

fn matching(names: &[String], pattern: FilenamePattern) -> impl Iterator<Item = &str> {
    let glob = Pattern::new(pattern.glob()).ok();
    names.iter().map(String::as_str).filter(move |name| {
        glob.as_ref()
            .is_some_and(|g| g.matches_with(name, MATCH_OPTIONS))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[tokio::test]
    async fn loads_all_three_patterns_with_metadata() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "SQP1.txt", "Question paper one");
        write(dir.path(), "MS1.txt", "Marking scheme one");
        write(dir.path(), "Student_Answer_Paper1_Variation1.txt", "Answer");

        let docs = ExamDocumentLoader::default().load_all(dir.path()).await;
        assert_eq!(docs.len(), 3);

        let qp = &docs[0].metadata;
        assert_eq!(qp.doc_type, DocumentType::QuestionPaper);
        assert_eq!(qp.filename, "SQP1.txt");
        assert_eq!(qp.paper_number.as_deref(), Some("1"));

        let ms = &docs[1].metadata;
        assert_eq!(ms.doc_type, DocumentType::MarkingScheme);

        let sa = &docs[2].metadata;
        assert_eq!(sa.doc_type, DocumentType::StudentAnswer);
        assert_eq!(sa.paper_number.as_deref(), Some("1"));
        assert_eq!(sa.variation.as_deref(), Some("Variation1"));
        assert!(sa.file_path.ends_with("Student_Answer_Paper1_Variation1.txt"));
    }

    #[tokio::test]
    async fn ignores_unmatched_and_wrong_case_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes.txt", "x");
        write(dir.path(), "sqp1.txt", "x");
        write(dir.path(), "SQP1.md", "x");
        std::fs::create_dir(dir.path().join("SQP9.txt")).unwrap();

        let docs = ExamDocumentLoader::default().load_all(dir.path()).await;
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn missing_directory_returns_empty() {
        let docs = ExamDocumentLoader::default()
            .load_all(Path::new("/nonexistent/exam/docs"))
            .await;
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn scan_missing_directory_errors() {
        let result = ExamDocumentLoader::default()
            .scan(Path::new("/nonexistent/exam/docs"))
            .await;
        assert!(matches!(result, Err(DocumentError::DirectoryNotFound(_))));
    }

    #[tokio::test]
    async fn empty_directory_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let docs = ExamDocumentLoader::default().load_all(dir.path()).await;
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn invalid_utf8_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "SQP1.txt", "valid");
        write(dir.path(), "MS1.txt", "valid");
        std::fs::write(dir.path().join("SQP2.txt"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();

        let report = ExamDocumentLoader::default().scan(dir.path()).await.unwrap();
        assert_eq!(report.documents.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("SQP2.txt"));
    }

    #[tokio::test]
    async fn oversized_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "SQP1.txt", "too big");
        let loader = ExamDocumentLoader { max_file_size: 1 };
        let report = loader.scan(dir.path()).await.unwrap();
        assert!(report.documents.is_empty());
        assert!(matches!(
            report.failures[0].error,
            DocumentError::FileTooLarge(_)
        ));
    }

    #[tokio::test]
    async fn lexical_order_within_pattern() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "SQP2.txt", "b");
        write(dir.path(), "SQP1.txt", "a");
        let docs = ExamDocumentLoader::default().load_all(dir.path()).await;
        assert_eq!(docs[0].metadata.filename, "SQP1.txt");
        assert_eq!(docs[1].metadata.filename, "SQP2.txt");
    }

    #[tokio::test]
    async fn counts_by_type() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "SQP1.txt", "a");
        write(dir.path(), "SQP2.txt", "b");
        write(dir.path(), "MS1.txt", "c");
        let report = ExamDocumentLoader::default().scan(dir.path()).await.unwrap();
        let counts = report.counts_by_type();
        assert_eq!(counts[&DocumentType::QuestionPaper], 2);
        assert_eq!(counts[&DocumentType::MarkingScheme], 1);
        assert!(!counts.contains_key(&DocumentType::StudentAnswer));
    }

    #[tokio::test]
    async fn bare_prefix_loads_without_paper_number() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "SQP.txt", "Unnumbered question paper");

        let docs = ExamDocumentLoader::default().load_all(dir.path()).await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].metadata.doc_type, DocumentType::QuestionPaper);
        assert_eq!(docs[0].metadata.filename, "SQP.txt");
        assert!(docs[0].metadata.paper_number.is_none());
        assert!(docs[0].metadata.variation.is_none());
    }

    #[tokio::test]
    async fn load_file_rejects_mismatched_pattern() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "MS1.txt", "c");
        let result = ExamDocumentLoader::default()
            .load_file(&dir.path().join("MS1.txt"), FilenamePattern::QuestionPaper)
            .await;
        assert!(matches!(result, Err(DocumentError::UnrecognizedFilename(_))));
    }
}
