#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use satprep_api::config::ServerConfig;
use satprep_api::router::build_app_router;
use satprep_api::state::AppState;
use satprep_core::image_key::{object_key_from_reference, DEFAULT_KEY_PREFIX};
use satprep_storage::{ImageLifecycle, MemoryObjectStore};

/// Public base URL the in-memory bucket hands out.
pub const BUCKET_URL: &str = "https://sat-assets.s3.us-east-1.amazonaws.com";

/// Boundary used for hand-built multipart bodies.
const BOUNDARY: &str = "----satprep-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
    }
}

/// Application under test with an in-memory bucket.
///
/// The store and lifecycle manager are shared with the router so tests can
/// inspect storage calls and wait for detached cleanups.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryObjectStore>,
    pub images: Arc<ImageLifecycle>,
}

impl TestApp {
    pub fn new(pool: PgPool) -> Self {
        let store = Arc::new(MemoryObjectStore::new(BUCKET_URL));
        let images = Arc::new(ImageLifecycle::new(store.clone(), "questions"));
        let state = AppState {
            pool,
            config: Arc::new(test_config()),
            images: Arc::clone(&images),
        };
        Self {
            state,
            store,
            images,
        }
    }

    /// A fresh router sharing this app's state.
    pub fn router(&self) -> Router {
        build_app_router(self.state.clone(), &test_config())
    }

    /// Wait for every detached image cleanup to finish.
    pub async fn settle(&self) {
        self.images.wait_for_cleanup().await;
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and a throwaway in-memory bucket.
pub fn build_test_app(pool: PgPool) -> Router {
    TestApp::new(pool).router()
}

/// A file part for [`send_multipart`].
pub struct FilePart<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

pub fn png(file_name: &str) -> FilePart<'_> {
    FilePart {
        file_name,
        content_type: "image/png",
        bytes: b"\x89PNG\r\n\x1a\nfake",
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Body::empty(), None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Body::empty(), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PATCH, uri, body).await
}

pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(
        app,
        method,
        uri,
        Body::from(body.to_string()),
        Some("application/json".to_string()),
    )
    .await
}

/// Send a `multipart/form-data` request with text fields and an optional file.
pub async fn send_multipart(
    app: Router,
    method: Method,
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<FilePart<'_>>,
) -> Response<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    send(
        app,
        method,
        uri,
        Body::from(body),
        Some(format!("multipart/form-data; boundary={BOUNDARY}")),
    )
    .await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Body,
    content_type: Option<String>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Object key for a location handed out by the in-memory bucket.
pub fn key_of(location: &str) -> String {
    assert!(
        location.starts_with(&format!("{BUCKET_URL}/questions/")),
        "'{location}' is not a question image URL"
    );
    object_key_from_reference(DEFAULT_KEY_PREFIX, location).unwrap()
}
