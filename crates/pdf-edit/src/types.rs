use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid page range: {0}")]
    InvalidRange(String),
    #[error("Page order must list every page exactly once: expected {expected} pages, got {actual}")]
    RangeMismatch { expected: usize, actual: usize },
    #[error("Merge needs at least two documents, got {count}")]
    InsufficientInputs { count: usize },
    #[error("Encryption error: {0}")]
    Encryption(String),
    #[error("Malformed document: {0}")]
    Malformed(String),
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}

pub type Result<T> = std::result::Result<T, EditError>;

/// Summary of a document as reported by the Info operation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentInfo {
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub encrypted: bool,
}

/// Metadata fields to write. `None` fields keep whatever the document
/// already has.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetadataUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

impl MetadataUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.subject.is_none()
    }
}
