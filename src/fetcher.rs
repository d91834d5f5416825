use crate::config::ExtractorConfig;
use crate::error::{Result, TranscriptError};
use crate::models::CaptionPayload;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Status and body of a completed GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The network layer: a plain HTTP GET that surfaces status and body.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

pub struct ReqwestClient {
    client: reqwest::Client,
    delay_ms: u64,
}

impl ReqwestClient {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_str(&config.accept_language)
                .map_err(|e| TranscriptError::Config(format!("invalid accept_language: {}", e)))?,
        );

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| TranscriptError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            delay_ms: config.request_delay_ms,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TranscriptError::Http(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TranscriptError::Http(format!("Failed to read body of {}: {}", url, e)))?;

        Ok(HttpResponse { status, body })
    }
}

fn check_http_errors(response: &HttpResponse, url: &str) -> Result<()> {
    if !response.is_success() {
        warn!("Request to {} failed with status {}", url, response.status);
        return Err(TranscriptError::Fetch {
            status: response.status,
            url: url.to_string(),
        });
    }
    Ok(())
}

/// Retrieves watch-page markup and json3 caption payloads.
#[derive(Clone)]
pub struct CaptionPayloadFetcher {
    client: Arc<dyn HttpClient>,
}

impl CaptionPayloadFetcher {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }

    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        debug!("Fetching page markup from {}", url);
        let response = self.client.get(url).await?;
        check_http_errors(&response, url)?;
        Ok(response.body)
    }

    /// Fetch and decode a json3 payload. A body without an `events` list is malformed.
    pub async fn fetch(&self, url: &str) -> Result<CaptionPayload> {
        debug!("Fetching transcript from {}", url);
        let response = self.client.get(url).await?;
        check_http_errors(&response, url)?;

        let payload: CaptionPayload = serde_json::from_str(&response.body).map_err(|e| {
            TranscriptError::Parse(format!("Failed to parse json3 transcript: {}", e))
        })?;

        if payload.events.is_none() {
            return Err(TranscriptError::Parse(
                "json3 transcript has no events".to_string(),
            ));
        }

        Ok(payload)
    }
}
