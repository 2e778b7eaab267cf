pub mod error;
pub mod filename;
pub mod loader;
pub mod pipeline;
pub mod splitter;
pub mod types;

pub use error::DocumentError;
pub use filename::{FilenamePattern, ParsedFilename};
pub use loader::{ExamDocumentLoader, LoadFailure, LoadReport};
pub use pipeline::{IngestReport, IngestionPipeline};
pub use splitter::{SplitterConfig, TextSplitter};
pub use types::{Chunk, Document, DocumentMetadata, DocumentType, Priority};

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
