use std::{sync::Arc, time::Duration};

use anyhow::Result;
use axum::{extract::Multipart, extract::State, http::StatusCode, routing::post, Router};
use tokio::{net::TcpListener, sync::Mutex};

use super::*;

#[derive(Debug, Clone)]
struct CapturedField {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone)]
struct ServerState {
    status: StatusCode,
    body: &'static str,
    delay: Duration,
    fields: Arc<Mutex<Vec<CapturedField>>>,
}

async fn handle_search(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> (StatusCode, String) {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        state.fields.lock().await.push(CapturedField {
            name,
            file_name,
            content_type,
            bytes,
        });
    }
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (state.status, state.body.to_string())
}

async fn spawn_search_server(
    status: StatusCode,
    body: &'static str,
    delay: Duration,
) -> Result<(String, Arc<Mutex<Vec<CapturedField>>>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let fields = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
        status,
        body,
        delay,
        fields: fields.clone(),
    };
    let app = Router::new()
        .route("/api/search", post(handle_search))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/api/search"), fields))
}

fn client_for(endpoint: &str) -> HttpSearchClient {
    HttpSearchClient::new(&ClientSettings::default().with_endpoint(endpoint)).expect("client")
}

fn cat_png() -> SelectedFile {
    SelectedFile::new("cat.png", "image/png", b"\x89PNG cat".to_vec())
}

#[tokio::test]
async fn uploads_image_under_file_field_and_decodes_matches() {
    let (endpoint, fields) = spawn_search_server(
        StatusCode::OK,
        r#"[{"url":"a.jpg","similarity":92.3,"source_url":"http://x/a"},
            {"url":"b.jpg","similarity":88.0,"source_url":"http://x/b"}]"#,
        Duration::ZERO,
    )
    .await
    .expect("spawn server");

    let results = client_for(&endpoint)
        .search(&cat_png())
        .await
        .expect("search");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].url, "a.jpg");
    assert_eq!(results[0].similarity, 92.3);
    assert_eq!(results[1].source_url.as_deref(), Some("http://x/b"));

    let fields = fields.lock().await;
    assert_eq!(fields.len(), 1, "exactly one multipart field is sent");
    assert_eq!(fields[0].name, "file");
    assert_eq!(fields[0].file_name.as_deref(), Some("cat.png"));
    assert_eq!(fields[0].content_type.as_deref(), Some("image/png"));
    assert_eq!(fields[0].bytes, b"\x89PNG cat".to_vec());
}

#[tokio::test]
async fn non_json_body_is_invalid_response_format() {
    let (endpoint, _) = spawn_search_server(StatusCode::OK, "not json{", Duration::ZERO)
        .await
        .expect("spawn server");

    let err = client_for(&endpoint)
        .search(&cat_png())
        .await
        .expect_err("must fail");
    assert_eq!(err, SearchError::MalformedResponse);
}

#[tokio::test]
async fn error_status_body_is_decoded_not_status_checked() {
    let (endpoint, _) = spawn_search_server(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"detail":"No face detected in the image"}"#,
        Duration::ZERO,
    )
    .await
    .expect("spawn server");

    let err = client_for(&endpoint)
        .search(&cat_png())
        .await
        .expect_err("must fail");
    assert_eq!(err, SearchError::UnexpectedShape);
}

#[tokio::test]
async fn error_status_with_array_body_still_yields_results() {
    let (endpoint, _) = spawn_search_server(StatusCode::BAD_GATEWAY, "[]", Duration::ZERO)
        .await
        .expect("spawn server");

    let results = client_for(&endpoint)
        .search(&cat_png())
        .await
        .expect("search");
    assert!(results.is_empty());
}

#[tokio::test]
async fn unreachable_service_is_a_transport_failure() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = client_for(&format!("http://{addr}/api/search"))
        .search(&cat_png())
        .await
        .expect_err("must fail");
    assert!(matches!(err, SearchError::Transport(_)), "got {err:?}");
    assert!(err
        .submission_message()
        .starts_with("Failed to perform image search: "));
}

#[tokio::test]
async fn slow_service_hits_configured_timeout() {
    let (endpoint, _) = spawn_search_server(StatusCode::OK, "[]", Duration::from_secs(5))
        .await
        .expect("spawn server");
    let settings = ClientSettings::default()
        .with_endpoint(endpoint)
        .with_timeout_secs(1);

    let err = HttpSearchClient::new(&settings)
        .expect("client")
        .search(&cat_png())
        .await
        .expect_err("must time out");
    assert_eq!(err, SearchError::Timeout { seconds: 1 });
}
