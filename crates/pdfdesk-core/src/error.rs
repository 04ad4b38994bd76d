use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Not a PDF file: {0}")]
    NotPdf(String),

    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Invalid page range: {0}")]
    InvalidRange(String),

    #[error("Validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("No PDF loaded")]
    NoDocument,

    #[error("Index {index} out of bounds (length {len})")]
    OutOfBounds { index: usize, len: usize },

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DeskError {
    fn from(err: serde_json::Error) -> Self {
        DeskError::SerializationError(err.to_string())
    }
}
