use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("filename does not follow a known exam naming pattern: {0}")]
    UnrecognizedFilename(String),

    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    #[error("no exam documents found in {}", .0.display())]
    NoDocuments(PathBuf),

    #[error("storage error: {0}")]
    Storage(#[from] crate::error::MemoryError),
}
