//! Selection and submission lifecycle of one search form.
//!
//! The form state is a single [`SearchStatus`], so "loading" and "error" can
//! never be active together. Network I/O happens outside the session: a
//! submission hands out a [`PendingSearch`] and the caller reports back with
//! [`SearchSession::complete`]. Only the completion carrying the current
//! ticket is applied.

use shared::{
    domain::{SearchResult, SubmissionTicket},
    error::SearchError,
};
use tracing::{debug, info, warn};

use crate::selection::{Preview, SelectedFile};

#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    Idle,
    FileSelected,
    Submitting {
        ticket: SubmissionTicket,
    },
    Succeeded(Vec<SearchResult>),
    /// `retained` keeps results that were on screen when a selection was
    /// rejected; it is always empty after a failed submission.
    Failed {
        message: String,
        retained: Vec<SearchResult>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub file: SelectedFile,
    pub preview: Preview,
}

#[derive(Debug, Clone)]
pub struct PendingSearch {
    pub ticket: SubmissionTicket,
    pub file: SelectedFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Applied,
    /// The submission was cancelled or superseded; state was left alone.
    Stale,
}

#[derive(Debug)]
pub struct SearchSession {
    selection: Option<Selection>,
    status: SearchStatus,
    last_ticket: SubmissionTicket,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            selection: None,
            status: SearchStatus::Idle,
            last_ticket: SubmissionTicket(0),
        }
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selection.as_ref().map(|selection| &selection.file)
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.selection.as_ref().map(|selection| &selection.preview)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, SearchStatus::Submitting { .. })
    }

    pub fn in_flight(&self) -> Option<SubmissionTicket> {
        match self.status {
            SearchStatus::Submitting { ticket } => Some(ticket),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            SearchStatus::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        match &self.status {
            SearchStatus::Succeeded(results) => results,
            SearchStatus::Failed { retained, .. } => retained,
            _ => &[],
        }
    }

    pub fn can_submit(&self) -> bool {
        self.selection.is_some() && !self.is_loading()
    }

    /// Accepts `file` when its MIME type is `image/*`.
    ///
    /// A rejected file never replaces the current selection. An accepted file
    /// clears the error and results and supersedes any in-flight submission.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), SearchError> {
        if !file.is_image() {
            warn!(
                file_name = file.file_name(),
                mime_type = file.mime_type(),
                "search: rejected non-image selection"
            );
            if !self.is_loading() {
                self.status = SearchStatus::Failed {
                    message: SearchError::InvalidFileType.to_string(),
                    retained: self.take_results(),
                };
            }
            return Err(SearchError::InvalidFileType);
        }

        if let Some(ticket) = self.in_flight() {
            info!(%ticket, "search: in-flight submission superseded by new selection");
        }
        debug!(
            file_name = file.file_name(),
            size_bytes = file.size_bytes(),
            "search: image selected"
        );
        let preview = Preview::from_file(&file);
        self.selection = Some(Selection { file, preview });
        self.status = SearchStatus::FileSelected;
        Ok(())
    }

    /// Moves to `Submitting` and returns what the caller must upload.
    ///
    /// Submitting again while a request is outstanding supersedes it.
    pub fn begin_submission(&mut self) -> Result<PendingSearch, SearchError> {
        let Some(file) = self.selection.as_ref().map(|selection| selection.file.clone()) else {
            self.status = SearchStatus::Failed {
                message: SearchError::MissingFile.to_string(),
                retained: self.take_results(),
            };
            return Err(SearchError::MissingFile);
        };

        if let Some(ticket) = self.in_flight() {
            info!(%ticket, "search: in-flight submission superseded by resubmission");
        }
        let ticket = self.last_ticket.next();
        self.last_ticket = ticket;
        self.status = SearchStatus::Submitting { ticket };
        info!(%ticket, file_name = file.file_name(), "search: submission started");
        Ok(PendingSearch { ticket, file })
    }

    pub fn complete(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<Vec<SearchResult>, SearchError>,
    ) -> CompletionOutcome {
        if self.in_flight() != Some(ticket) {
            debug!(%ticket, "search: dropping stale completion");
            return CompletionOutcome::Stale;
        }

        self.status = match outcome {
            Ok(results) => {
                info!(%ticket, matches = results.len(), "search: submission succeeded");
                SearchStatus::Succeeded(results)
            }
            Err(err) => {
                warn!(%ticket, "search: submission failed: {err}");
                SearchStatus::Failed {
                    message: err.submission_message(),
                    retained: Vec::new(),
                }
            }
        };
        CompletionOutcome::Applied
    }

    /// Abandons the in-flight submission, if any, and returns its ticket.
    pub fn cancel(&mut self) -> Option<SubmissionTicket> {
        let ticket = self.in_flight()?;
        info!(%ticket, "search: submission cancelled");
        self.status = SearchStatus::FileSelected;
        Some(ticket)
    }

    fn take_results(&mut self) -> Vec<SearchResult> {
        match std::mem::replace(&mut self.status, SearchStatus::Idle) {
            SearchStatus::Succeeded(results) => results,
            SearchStatus::Failed { retained, .. } => retained,
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
