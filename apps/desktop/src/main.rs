use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Result};
use clap::Parser;
use client_core::{
    load_settings, project_cards, render_text, HttpSearchClient, SearchController, SelectedFile,
};
use tracing_subscriber::EnvFilter;

/// Search the face search service for images similar to IMAGE.
#[derive(Parser, Debug)]
#[command(name = "face_search")]
struct Args {
    /// Overrides `endpoint` from face_search.toml and FACE_SEARCH_ENDPOINT.
    #[arg(long)]
    endpoint: Option<String>,
    /// Request timeout in seconds; 0 waits indefinitely.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Print the matches as JSON instead of a text gallery.
    #[arg(long)]
    json: bool,
    image: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(endpoint) = args.endpoint {
        settings = settings.with_endpoint(endpoint);
    }
    if let Some(secs) = args.timeout_secs {
        settings = settings.with_timeout_secs(secs);
    }
    settings.validate()?;
    tracing::debug!(?settings, "resolved client settings");

    let client = HttpSearchClient::new(&settings)?;
    let controller = SearchController::new(Arc::new(client));

    let file = SelectedFile::from_path(&args.image)?;
    if let Err(err) = controller.select_file(file).await {
        bail!("{err}");
    }
    if let Err(err) = controller.submit().await {
        bail!("{err}");
    }

    let session = controller.session().await;
    if let Some(message) = session.error() {
        bail!("{message}");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(session.results())?);
    } else if session.results().is_empty() {
        println!("No similar faces found.");
    } else {
        print!("{}", render_text(&project_cards(session.results())));
    }

    Ok(())
}
