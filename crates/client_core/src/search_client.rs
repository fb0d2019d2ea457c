use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{
    domain::SearchResult,
    error::SearchError,
    protocol::{decode_search_response, UPLOAD_FIELD},
};
use tracing::{debug, info, warn};

use crate::{config::ClientSettings, selection::SelectedFile};

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, file: &SelectedFile) -> Result<Vec<SearchResult>, SearchError>;
}

/// Uploads one image per call as `multipart/form-data` and decodes the
/// match list from the response body.
#[derive(Debug, Clone)]
pub struct HttpSearchClient {
    http: Client,
    endpoint: String,
    request_timeout: Option<Duration>,
}

impl HttpSearchClient {
    pub fn new(settings: &ClientSettings) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .context("failed to build search HTTP client")?;
        Ok(Self::with_client(http, settings))
    }

    /// Uses a caller-provided client; its own timeout, if any, is not known
    /// here and is reported as a plain transport failure.
    pub fn with_client(http: Client, settings: &ClientSettings) -> Self {
        Self {
            http,
            endpoint: settings.endpoint.clone(),
            request_timeout: settings.request_timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> SearchError {
        match self.request_timeout {
            Some(timeout) if err.is_timeout() => SearchError::Timeout {
                seconds: timeout.as_secs(),
            },
            _ => SearchError::Transport(err.to_string()),
        }
    }
}

#[async_trait]
impl SearchBackend for HttpSearchClient {
    async fn search(&self, file: &SelectedFile) -> Result<Vec<SearchResult>, SearchError> {
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.file_name().to_string())
            .mime_str(file.mime_type())
            .map_err(|err| SearchError::Transport(err.to_string()))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        info!(
            endpoint = %self.endpoint,
            file_name = file.file_name(),
            size_bytes = file.size_bytes(),
            "search: uploading image"
        );
        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        // Status is informational only; error bodies go through the same decoding.
        let status = response.status();
        debug!(status = status.as_u16(), "search: response received");
        if !status.is_success() {
            warn!(status = status.as_u16(), "search: service answered with non-success status");
        }

        let body = response
            .text()
            .await
            .map_err(|err| self.transport_error(err))?;
        debug!(body_len = body.len(), "search: raw response read");

        let results = decode_search_response(&body).inspect_err(|err| {
            warn!(status = status.as_u16(), "search: response rejected: {err}");
        })?;
        info!(matches = results.len(), "search: response decoded");
        Ok(results)
    }
}

#[cfg(test)]
#[path = "tests/search_client_tests.rs"]
mod tests;
