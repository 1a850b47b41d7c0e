#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

use template_backend::app::{self, AppState};
use template_backend::config::AppConfig;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fresh access/refresh pair signed with this server's secrets
    pub fn issue_pair(&self, user_id: &str) -> Result<template_backend::auth::TokenPair> {
        Ok(self.state.tokens.issue_pair(user_id)?)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub fn test_vars() -> HashMap<&'static str, String> {
    HashMap::from([
        ("APP_ENV", "test".to_string()),
        ("CORS_ORIGIN", "http://localhost:5173".to_string()),
        ("CLERK_PUBLISHABLE_KEY", "pk_test_integration".to_string()),
        ("CLERK_SECRET_KEY", "sk_test_integration".to_string()),
        ("JWT_SECRET", "integration-access-secret-0123456789".to_string()),
        ("REFRESH_TOKEN_SECRET", "integration-refresh-secret-0123456789".to_string()),
        ("DATABASE_URL", "postgres://localhost:5432/template_test".to_string()),
        ("LOG_LEVEL", "warn".to_string()),
    ])
}

/// Serve the API in-process on an unused port.
/// Each test runs on its own runtime, so each gets its own server.
pub async fn spawn_server(overrides: &[(&'static str, &str)]) -> Result<TestServer> {
    let mut vars = test_vars();
    for (key, value) in overrides {
        vars.insert(*key, value.to_string());
    }
    let config = AppConfig::from_lookup(|k| vars.get(k).cloned())?;

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let state = AppState::from_config(config).await?;
    let router = app::app(state.clone());

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], port)))
        .await
        .context("failed to bind test listener")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await;
    });

    let server = TestServer { port, base_url, state };
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Default store: the placeholder that fabricates users on read
pub async fn ensure_server() -> Result<TestServer> {
    spawn_server(&[]).await
}
