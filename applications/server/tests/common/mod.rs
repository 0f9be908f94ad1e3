//! Common test utilities and fixtures
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;
use tunebox_server::{
    create_router,
    services::{AuthService, FileStorage, UploadLimits},
    state::AppState,
};
use tunebox_storage::{MemoryStore, SqliteStore};

pub const BOUNDARY: &str = "tunebox-test-boundary";

/// Small cost keeps bcrypt fast in tests
pub fn create_test_auth_service() -> AuthService {
    AuthService::new("test-secret-key".to_string(), 1, 1, 4)
}

pub fn default_limits() -> UploadLimits {
    UploadLimits::new(
        1024 * 1024,
        vec![
            "audio/mpeg".to_string(),
            "audio/wav".to_string(),
            "audio/flac".to_string(),
            "image/png".to_string(),
        ],
    )
}

/// Router over real services, with uploads kept in a temp directory
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub uploads: TempDir,
    _db_dir: Option<TempDir>,
}

impl TestApp {
    /// Backed by the in-memory store
    pub async fn memory() -> Self {
        Self::memory_with_limits(default_limits()).await
    }

    pub async fn memory_with_limits(limits: UploadLimits) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::build(store, limits, None).await
    }

    /// Backed by a SQLite file with migrations applied
    pub async fn sqlite() -> Self {
        let db_dir = TempDir::new().unwrap();
        let db_url = format!("sqlite://{}", db_dir.path().join("test.db").display());
        let pool = tunebox_storage::create_pool(&db_url).await.unwrap();
        tunebox_storage::run_migrations(&pool).await.unwrap();

        let store = Arc::new(SqliteStore::new(pool));
        Self::build(store, default_limits(), Some(db_dir)).await
    }

    async fn build<S>(store: Arc<S>, limits: UploadLimits, db_dir: Option<TempDir>) -> Self
    where
        S: tunebox_core::UserStore
            + tunebox_core::SongStore
            + tunebox_core::PlaylistStore
            + 'static,
    {
        let uploads = TempDir::new().unwrap();
        let file_storage = FileStorage::new(uploads.path().to_path_buf());
        file_storage.initialize().await.unwrap();

        let state = AppState::from_store(
            store,
            Arc::new(create_test_auth_service()),
            Arc::new(file_storage),
            limits,
        );
        let router = create_router(state.clone(), &[]);

        Self {
            router,
            state,
            uploads,
            _db_dir: db_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    pub async fn send_raw(&self, request: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Register and sign in, returning an access token
    pub async fn signup_and_signin(&self, username: &str, password: &str) -> String {
        let email = format!("{username}@x.com");

        let (status, _) = self
            .send(json_request(
                "POST",
                "/signup",
                None,
                serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": password,
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "signup failed for {username}");

        let (status, body) = self
            .send(json_request(
                "POST",
                "/signin",
                None,
                serde_json::json!({ "email": email, "password": password }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "signin failed for {username}");

        body["access_token"].as_str().unwrap().to_string()
    }

    /// Upload a file and return the new song id
    pub async fn upload(&self, token: &str, title: &str, artist: &str, filename: &str, data: &[u8]) -> String {
        let (status, body) = self
            .send(upload_request(
                token,
                &[("title", title), ("artist", artist)],
                Some((filename, Some("audio/mpeg"), data)),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "upload failed: {body}");
        body["song_id"].as_str().unwrap().to_string()
    }

    pub async fn create_playlist(&self, token: &str, name: &str) -> String {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/playlists",
                Some(token),
                serde_json::json!({ "name": name }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    empty_request("GET", uri, token)
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Hand-built multipart/form-data body
pub fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, Option<&str>, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, Option<&str>, &[u8])>,
) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields, file)))
        .unwrap()
}
