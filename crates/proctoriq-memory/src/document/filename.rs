//! Exam filename conventions.
//!
//! Each recognized convention is one [`FilenamePattern`] variant; parsing a
//! name yields a [`ParsedFilename`] or `None` when the convention does not apply.

use super::types::DocumentType;

const SUFFIX: &str = ".txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenamePattern {
    /// `SQP<paper>.txt`
    QuestionPaper,
    /// `MS<paper>.txt`
    MarkingScheme,
    /// `Student_Answer_Paper<paper>[_<variation>].txt`
    StudentAnswer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    pub doc_type: DocumentType,
    pub paper_number: Option<String>,
    pub variation: Option<String>,
}

impl FilenamePattern {
    /// Scan order used by the loader.
    pub const ALL: [Self; 3] = [Self::QuestionPaper, Self::MarkingScheme, Self::StudentAnswer];

    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::QuestionPaper => "SQP",
            Self::MarkingScheme => "MS",
            Self::StudentAnswer => "Student_Answer_Paper",
        }
    }

    /// Case-sensitive glob matched against bare file names.
    #[must_use]
    pub fn glob(self) -> &'static str {
        match self {
            Self::QuestionPaper => "SQP*.txt",
            Self::MarkingScheme => "MS*.txt",
            Self::StudentAnswer => "Student_Answer_Paper*.txt",
        }
    }

    #[must_use]
    pub fn doc_type(self) -> DocumentType {
        match self {
            Self::QuestionPaper => DocumentType::QuestionPaper,
            Self::MarkingScheme => DocumentType::MarkingScheme,
            Self::StudentAnswer => DocumentType::StudentAnswer,
        }
    }

    #[must_use]
    pub fn parse(self, filename: &str) -> Option<ParsedFilename> {
        let stem = filename
            .strip_prefix(self.prefix())?
            .strip_suffix(SUFFIX)?;
        let (paper_number, variation) = match self {
            Self::QuestionPaper | Self::MarkingScheme => (non_empty(stem), None),
            Self::StudentAnswer => {
                let mut parts = stem.split('_');
                let paper = parts.next().and_then(non_empty);
                let variation = parts.next().and_then(non_empty);
                (paper, variation)
            }
        };
        Some(ParsedFilename {
            doc_type: self.doc_type(),
            paper_number,
            variation,
        })
    }

    /// First pattern that recognizes `filename`.
    #[must_use]
    pub fn detect(filename: &str) -> Option<(Self, ParsedFilename)> {
        Self::ALL
            .into_iter()
            .find_map(|p| p.parse(filename).map(|parsed| (p, parsed)))
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_owned())
    }
}
