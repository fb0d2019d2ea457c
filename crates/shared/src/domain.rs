use serde::{Deserialize, Serialize};

/// One candidate returned by the search service.
///
/// `similarity` is a 0–100 confidence value. It is carried as received and
/// never range-checked on the client. The service may omit `source_url` or
/// send it as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub similarity: f64,
    #[serde(default)]
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionTicket(pub u64);

impl SubmissionTicket {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for SubmissionTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
