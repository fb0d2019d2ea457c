//! Backend commands queued from UI to backend worker.

use client_core::{SelectedFile, SubmissionTicket};

pub enum BackendCommand {
    Search {
        ticket: SubmissionTicket,
        file: SelectedFile,
    },
    CancelSearch {
        ticket: SubmissionTicket,
    },
    FetchThumbnail {
        url: String,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Search { .. } => "search",
            BackendCommand::CancelSearch { .. } => "cancel_search",
            BackendCommand::FetchThumbnail { .. } => "fetch_thumbnail",
        }
    }
}
