use std::sync::Arc;

use shared::{domain::SubmissionTicket, error::SearchError};
use tokio::sync::{Mutex, MutexGuard};

use crate::{
    search_client::SearchBackend,
    selection::SelectedFile,
    session::{CompletionOutcome, SearchSession},
};

/// Runs a [`SearchSession`] against a [`SearchBackend`] from async code.
///
/// The session lock is never held across the network call, so the form can
/// be inspected, cancelled or resubmitted while a request is in flight.
pub struct SearchController {
    session: Mutex<SearchSession>,
    backend: Arc<dyn SearchBackend>,
}

impl SearchController {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            session: Mutex::new(SearchSession::new()),
            backend,
        }
    }

    pub async fn session(&self) -> MutexGuard<'_, SearchSession> {
        self.session.lock().await
    }

    pub async fn select_file(&self, file: SelectedFile) -> Result<(), SearchError> {
        self.session.lock().await.select_file(file)
    }

    /// Submits the selected file and settles the session.
    ///
    /// Only precondition failures are returned as `Err`; pipeline failures
    /// are recorded in the session like successes.
    pub async fn submit(&self) -> Result<CompletionOutcome, SearchError> {
        let pending = self.session.lock().await.begin_submission()?;
        let outcome = self.backend.search(&pending.file).await;
        Ok(self.session.lock().await.complete(pending.ticket, outcome))
    }

    pub async fn cancel(&self) -> Option<SubmissionTicket> {
        self.session.lock().await.cancel()
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
