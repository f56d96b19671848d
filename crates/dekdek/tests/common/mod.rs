//! Starts a real server on an ephemeral port over a temp directory.

#![allow(dead_code)]

use dekdek::http::{self, AppContext};
use dekdekapp::config::AppConfig;
use dekdekapp::init::initialize;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const ADMIN_PASSWORD: &str = "correct horse";

pub struct TestServer {
    pub base: String,
    pub client: Client,
    pub dir: TempDir,
}

fn config_in(root: &Path) -> AppConfig {
    AppConfig {
        bind: "127.0.0.1:0".into(),
        data_dir: root.join("data"),
        database_path: root.join("data").join("app.db"),
        upload_dir: root.join("uploads"),
        max_upload_bytes: 1024 * 1024,
        admin_username: "admin".into(),
        admin_email: "admin@dek-dek.com".into(),
        admin_password: ADMIN_PASSWORD.into(),
        log_filter: "warn".into(),
    }
}

/// Bind to port 0 and return a client for the actual address.
pub async fn start() -> TestServer {
    launch(None).await
}

/// Same as [`start`], with `books.json` already on disk.
pub async fn start_with_books(raw: &str) -> TestServer {
    launch(Some(raw)).await
}

async fn launch(books: Option<&str>) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    if let Some(raw) = books {
        std::fs::create_dir_all(&config.data_dir).unwrap();
        std::fs::write(config.data_dir.join("books.json"), raw).unwrap();
    }
    let api = initialize(&config).unwrap();
    let app = http::router(Arc::new(AppContext::new(api, config)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base: format!("http://{addr}"),
        client: Client::new(),
        dir,
    }
}

impl TestServer {
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(format!("{}{}", self.base, path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(format!("{}{}", self.base, path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(format!("{}{}", self.base, path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(format!("{}{}", self.base, path))
    }

    pub async fn login(&self) -> String {
        let resp = self
            .post("/api/admin/login")
            .json(&json!({ "username": "admin", "password": ADMIN_PASSWORD }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn register(&self, username: &str) -> i64 {
        let resp = self
            .post("/api/users")
            .json(&json!({ "username": username, "email": format!("{username}@example.com") }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        body["data"]["id"].as_i64().unwrap()
    }
}

/// Sends the request and returns status plus decoded envelope.
pub async fn call(request: RequestBuilder) -> (u16, Value) {
    let resp = request.send().await.unwrap();
    let status = resp.status().as_u16();
    let body: Value = resp.json().await.unwrap();
    (status, body)
}
