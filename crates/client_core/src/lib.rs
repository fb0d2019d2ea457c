//! Client side of the face search service: image selection, the submission
//! lifecycle, the HTTP pipeline and the projection of results into cards.

pub mod config;
pub mod controller;
pub mod render;
pub mod search_client;
pub mod selection;
pub mod session;

pub use config::{load_settings, ClientSettings};
pub use controller::SearchController;
pub use render::{format_similarity, project_cards, render_text, ResultCard};
pub use search_client::{HttpSearchClient, SearchBackend};
pub use selection::{Preview, SelectedFile};
pub use session::{CompletionOutcome, PendingSearch, SearchSession, SearchStatus, Selection};
pub use shared::{domain::SearchResult, domain::SubmissionTicket, error::SearchError};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
