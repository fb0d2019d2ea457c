use std::sync::Arc;

use anyhow::Result;
use axum::{http::StatusCode, routing::post, Router};
use tokio::net::TcpListener;

use super::*;

async fn spawn_static_search_server(body: &'static str) -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new().route(
        "/api/search",
        post(move || async move { (StatusCode::OK, body) }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}/api/search"))
}

fn controller_for(endpoint: String) -> SearchController {
    let settings = ClientSettings::default().with_endpoint(endpoint);
    let client = HttpSearchClient::new(&settings).expect("client");
    SearchController::new(Arc::new(client))
}

#[tokio::test]
async fn cat_png_search_renders_single_card() {
    let endpoint = spawn_static_search_server(
        r#"[{"url":"a.jpg","similarity":92.3,"source_url":"http://x/a"}]"#,
    )
    .await
    .expect("spawn server");
    let controller = controller_for(endpoint);

    controller
        .select_file(SelectedFile::new("cat.png", "image/png", b"meow".to_vec()))
        .await
        .expect("select");
    assert_eq!(
        controller.submit().await,
        Ok(CompletionOutcome::Applied)
    );

    let session = controller.session().await;
    assert!(!session.is_loading());
    assert!(session.error().is_none());
    let cards = project_cards(session.results());
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].badge, "92.3% Match");
    assert_eq!(cards[0].source_url.as_deref(), Some("http://x/a"));
    assert_eq!(cards[0].image_url, "a.jpg");
}

#[tokio::test]
async fn notes_pdf_selection_leaves_nothing_to_submit() {
    let controller = controller_for("http://127.0.0.1:9/api/search".to_string());

    assert_eq!(
        controller
            .select_file(SelectedFile::new(
                "notes.pdf",
                "application/pdf",
                b"%PDF".to_vec()
            ))
            .await,
        Err(SearchError::InvalidFileType)
    );

    let session = controller.session().await;
    assert_eq!(session.error(), Some("Please select a valid image file"));
    assert!(!session.can_submit());
}

#[tokio::test]
async fn invalid_json_body_surfaces_format_error() {
    let endpoint = spawn_static_search_server("not json{")
        .await
        .expect("spawn server");
    let controller = controller_for(endpoint);

    controller
        .select_file(SelectedFile::new("cat.png", "image/png", b"meow".to_vec()))
        .await
        .expect("select");
    controller.submit().await.expect("submitted");

    let session = controller.session().await;
    assert_eq!(
        session.error(),
        Some("Failed to perform image search: Invalid response format")
    );
    assert!(session.results().is_empty());
    assert!(!session.is_loading());
}

#[tokio::test]
async fn object_body_surfaces_not_an_array_error() {
    let endpoint = spawn_static_search_server(r#"{"url":"a.jpg"}"#)
        .await
        .expect("spawn server");
    let controller = controller_for(endpoint);

    controller
        .select_file(SelectedFile::new("cat.png", "image/png", b"meow".to_vec()))
        .await
        .expect("select");
    controller.submit().await.expect("submitted");

    let session = controller.session().await;
    assert_eq!(
        session.error(),
        Some("Failed to perform image search: Response is not an array")
    );
    assert!(session.results().is_empty());
}
