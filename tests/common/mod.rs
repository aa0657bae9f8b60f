#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use blog_api_rust::config::AppConfig;
use blog_api_rust::database::MemoryStore;
use blog_api_rust::{app, AppState};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    /// Registers a user and returns the response body
    pub async fn register(&self, username: &str, email: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "username": username, "email": email, "password": "password123" }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        Ok(res.json().await?)
    }

    /// Registers a user and returns its access token
    pub async fn access_token(&self, username: &str) -> Result<String> {
        let body = self.register(username, &format!("{}@example.com", username)).await?;
        Ok(body["accessToken"].as_str().context("missing accessToken")?.to_string())
    }

    /// Creates a post as the bearer of `token` and returns its id
    pub async fn create_post(&self, token: &str, title: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/posts"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "content": "Some content" }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create post failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["_id"].as_str().context("missing _id")?.to_string())
    }
}

/// Starts the API on a free port with a fresh in-memory store.
/// The server lives on the calling test's runtime.
pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(AppConfig::development()).await
}

pub async fn spawn_server_with(config: AppConfig) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let state = AppState::new(Arc::new(MemoryStore::new()), &config.security);
    let router = app(state, &config);
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test port")?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let server = TestServer {
        port,
        base_url,
        client: reqwest::Client::new(),
    };
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
