#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to parse email: {0}")]
    Parse(String),

    #[error("No message body found")]
    NoBodyFound,

    #[error("Scratch space I/O error: {0}")]
    Scratch(#[from] std::io::Error),

    #[error("Image encoding failed: {0}")]
    Encode(String),
}
