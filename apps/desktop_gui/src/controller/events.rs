//! Events reported by the backend worker to the UI thread.

use client_core::{SearchError, SearchResult, SubmissionTicket};

use crate::media::PreviewImage;

pub enum UiEvent {
    SearchFinished {
        ticket: SubmissionTicket,
        outcome: Result<Vec<SearchResult>, SearchError>,
    },
    ThumbnailLoaded {
        url: String,
        image: PreviewImage,
    },
    ThumbnailFailed {
        url: String,
        reason: String,
    },
    BackendFailed(String),
}
