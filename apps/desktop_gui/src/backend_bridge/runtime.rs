//! Runtime bridge between UI command queue and backend event intake.

use std::{collections::HashMap, sync::Arc, thread};

use client_core::{ClientSettings, HttpSearchClient, SearchBackend, SubmissionTicket};
use crossbeam_channel::{Receiver, Sender};
use reqwest::Client as HttpClient;
use tokio::task::JoinHandle;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::media::{decode_preview_image, PreviewImage};

pub const THUMBNAIL_MAX_DIMENSION: u32 = 400;

pub fn launch(
    settings: ClientSettings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::BackendFailed(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let search_client: Arc<dyn SearchBackend> = match HttpSearchClient::new(&settings) {
            Ok(client) => Arc::new(client),
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::BackendFailed(format!(
                    "backend worker startup failure: {err:#}"
                )));
                tracing::error!("failed to build search client: {err:#}");
                return;
            }
        };
        let thumbnail_client = match build_thumbnail_client(&settings) {
            Ok(client) => client,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::BackendFailed(format!(
                    "backend worker startup failure: failed to build thumbnail client: {err}"
                )));
                tracing::error!("failed to build thumbnail client: {err}");
                return;
            }
        };

        tracing::info!(endpoint = %settings.endpoint, "backend worker ready");
        runtime.block_on(async move {
            let mut searches: HashMap<SubmissionTicket, JoinHandle<()>> = HashMap::new();
            while let Ok(cmd) = cmd_rx.recv() {
                searches.retain(|_, task| !task.is_finished());
                match cmd {
                    BackendCommand::Search { ticket, file } => {
                        let search_client = search_client.clone();
                        let ui_tx = ui_tx.clone();
                        let task = tokio::spawn(async move {
                            let outcome = search_client.search(&file).await;
                            deliver_ui_event(&ui_tx, UiEvent::SearchFinished { ticket, outcome });
                        });
                        searches.insert(ticket, task);
                    }
                    BackendCommand::CancelSearch { ticket } => {
                        if let Some(task) = searches.remove(&ticket) {
                            task.abort();
                            tracing::debug!(%ticket, "aborted in-flight search");
                        }
                    }
                    BackendCommand::FetchThumbnail { url } => {
                        let http = thumbnail_client.clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let event = match fetch_thumbnail(&http, &url).await {
                                Ok(image) => UiEvent::ThumbnailLoaded { url, image },
                                Err(reason) => UiEvent::ThumbnailFailed { url, reason },
                            };
                            deliver_ui_event(&ui_tx, event);
                        });
                    }
                }
            }
            for (_, task) in searches {
                task.abort();
            }
            tracing::info!("backend worker stopped: command queue closed");
        });
    });
}

/// Thumbnail fetches share the search request timeout.
fn build_thumbnail_client(settings: &ClientSettings) -> reqwest::Result<HttpClient> {
    let mut builder = HttpClient::builder();
    if let Some(timeout) = settings.request_timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Waits for queue space: every search and thumbnail request must settle in the UI.
fn deliver_ui_event(ui_tx: &Sender<UiEvent>, event: UiEvent) -> bool {
    match ui_tx.send(event) {
        Ok(()) => true,
        Err(err) => {
            match err.into_inner() {
                UiEvent::SearchFinished { ticket, .. } => {
                    tracing::warn!(%ticket, "ui event queue closed before search finished");
                }
                UiEvent::ThumbnailLoaded { url, .. } | UiEvent::ThumbnailFailed { url, .. } => {
                    tracing::warn!(%url, "ui event queue closed before thumbnail settled");
                }
                UiEvent::BackendFailed(message) => {
                    tracing::warn!("ui event queue closed, dropping backend failure: {message}");
                }
            }
            false
        }
    }
}

async fn fetch_thumbnail(http: &HttpClient, url: &str) -> Result<PreviewImage, String> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|err| format!("failed to fetch image: {err}"))?
        .error_for_status()
        .map_err(|err| format!("image request failed: {err}"))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|err| format!("failed to read image body: {err}"))?;
    decode_preview_image(&bytes, THUMBNAIL_MAX_DIMENSION)
}
