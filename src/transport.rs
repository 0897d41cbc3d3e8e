// src/transport.rs
//! Outbound call to the analysis service.
//!
//! The controller only needs "POST this body, give me status + text". Keeping that
//! behind a trait lets tests script responses and delays without a socket.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::model::WireRequest;

/// Raw response; classification happens in the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one JSON POST. Dropping the returned future aborts the call.
    async fn post_json(&self, url: &str, body: &WireRequest) -> Result<TransportResponse>;
    fn name(&self) -> &'static str;
}

/// reqwest-backed transport used outside of tests.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bank-sentiment-client/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .build()
            .context("building reqwest client")?;
        Ok(Self { http })
    }

    /// Reuse an existing client (shared connection pool).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: &WireRequest) -> Result<TransportResponse> {
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.context("reading response body")?;
        Ok(TransportResponse { status, body })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
