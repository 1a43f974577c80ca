//! HTTP client for the merge service.

use super::{MergeResponse, MergeService};
use crate::config::MergeServiceConfig;
use crate::error::{ApiError, MergeError};
use crate::sequence::MergeRequest;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Route of the merge job on the backend.
pub const DEFAULT_MERGE_PATH: &str = "/api/jobs/video/merge";

#[derive(Debug, Clone)]
pub struct HttpMergeClient {
    http: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpMergeClient {
    pub fn new(http: Client, endpoint: String, api_token: Option<String>) -> Self {
        Self {
            http,
            endpoint,
            api_token,
        }
    }

    pub fn from_config(config: &MergeServiceConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("framemerge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::new(http, config.endpoint(), config.api_token.clone()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MergeService for HttpMergeClient {
    async fn submit(&self, request: &MergeRequest) -> Result<MergeResponse, MergeError> {
        debug!(endpoint = %self.endpoint, videos = request.len(), "Posting merge request");

        let mut builder = self.http.post(&self.endpoint).json(request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| MergeError::ServerError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| MergeError::ServerError(e.to_string()))?;

        interpret_response(status, &body)
    }
}

/// Map a merge service response to the merge outcome.
///
/// Non-2xx is a `ServerError` carrying the body's `error` field when present.
/// A 2xx body without a non-empty string `video_url` is malformed.
pub fn interpret_response(status: u16, body: &[u8]) -> Result<MergeResponse, MergeError> {
    if !(200..300).contains(&status) {
        return Err(MergeError::ServerError(server_error_message(status, body)));
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|_| MergeError::ServerResponseMalformed)?;
    value
        .get("video_url")
        .and_then(Value::as_str)
        .filter(|url| !url.trim().is_empty())
        .map(|url| MergeResponse {
            video_url: url.to_string(),
        })
        .ok_or(MergeError::ServerResponseMalformed)
}

fn server_error_message(status: u16, body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => value
            .get("error")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error! status: {}", status)),
        Err(_) => "Unknown error".to_string(),
    }
}
