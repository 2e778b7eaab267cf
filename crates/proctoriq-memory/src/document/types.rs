use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Payload keys under which document metadata is stored in the index.
pub mod keys {
    pub const TYPE: &str = "type";
    pub const PRIORITY: &str = "priority";
    pub const FILENAME: &str = "filename";
    pub const FILE_PATH: &str = "file_path";
    pub const PAPER_NUMBER: &str = "paper_number";
    pub const VARIATION: &str = "variation";
    pub const CONTENT: &str = "content";
    pub const CHUNK_INDEX: &str = "chunk_index";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    QuestionPaper,
    MarkingScheme,
    StudentAnswer,
}

impl DocumentType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuestionPaper => "question_paper",
            Self::MarkingScheme => "marking_scheme",
            Self::StudentAnswer => "student_answer",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "question_paper" => Some(Self::QuestionPaper),
            "marking_scheme" => Some(Self::MarkingScheme),
            "student_answer" => Some(Self::StudentAnswer),
            _ => None,
        }
    }

    #[must_use]
    pub fn priority(self) -> Priority {
        match self {
            Self::QuestionPaper | Self::MarkingScheme => Priority::High,
            Self::StudentAnswer => Priority::Medium,
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub doc_type: DocumentType,
    pub priority: Priority,
    pub filename: String,
    pub file_path: String,
    pub paper_number: Option<String>,
    pub variation: Option<String>,
}

impl DocumentMetadata {
    /// Flatten into index payload fields. Absent optional fields are omitted.
    #[must_use]
    pub fn to_payload(&self) -> HashMap<String, serde_json::Value> {
        let mut payload = HashMap::from([
            (keys::TYPE.to_owned(), self.doc_type.as_str().into()),
            (keys::PRIORITY.to_owned(), self.priority.as_str().into()),
            (keys::FILENAME.to_owned(), self.filename.clone().into()),
            (keys::FILE_PATH.to_owned(), self.file_path.clone().into()),
        ]);
        if let Some(ref n) = self.paper_number {
            payload.insert(keys::PAPER_NUMBER.to_owned(), n.clone().into());
        }
        if let Some(ref v) = self.variation {
            payload.insert(keys::VARIATION.to_owned(), v.clone().into());
        }
        payload
    }

    /// Rebuild metadata from index payload; `None` if a required field is missing.
    #[must_use]
    pub fn from_payload(payload: &HashMap<String, serde_json::Value>) -> Option<Self> {
        let text = |key: &str| payload.get(key).and_then(|v| v.as_str()).map(str::to_owned);
        let doc_type = DocumentType::parse(&text(keys::TYPE)?)?;
        let priority = text(keys::PRIORITY)
            .and_then(|p| Priority::parse(&p))
            .unwrap_or_else(|| doc_type.priority());
        Some(Self {
            doc_type,
            priority,
            filename: text(keys::FILENAME)?,
            file_path: text(keys::FILE_PATH).unwrap_or_default(),
            paper_number: text(keys::PAPER_NUMBER),
            variation: text(keys::VARIATION),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone)]
pub struct Chunk {
    pub content: String,
    pub metadata: DocumentMetadata,
    pub chunk_index: usize,
}
