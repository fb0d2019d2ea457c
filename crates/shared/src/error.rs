use thiserror::Error;

pub const SEARCH_FAILURE_PREFIX: &str = "Failed to perform image search";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Please select a valid image file")]
    InvalidFileType,
    #[error("Please select an image first")]
    MissingFile,
    #[error("{0}")]
    Transport(String),
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
    #[error("Invalid response format")]
    MalformedResponse,
    #[error("Response is not an array")]
    UnexpectedShape,
    #[error("Invalid match entry at index {index}: {reason}")]
    InvalidMatch { index: usize, reason: String },
}

impl SearchError {
    /// Errors raised before any request is built.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::InvalidFileType | Self::MissingFile)
    }

    /// Message shown to the user once a submission has settled with this error.
    pub fn submission_message(&self) -> String {
        if self.is_precondition() {
            self.to_string()
        } else {
            format!("{SEARCH_FAILURE_PREFIX}: {self}")
        }
    }
}
