// API client module: a small blocking HTTP client that talks to the
// EvasionHub obfuscation endpoint. One request per run, no retries; the
// status-code handling is folded into `ApiError` so callers only match.

use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

use crate::ui::format_time;

/// Fixed obfuscation endpoint.
pub const API_URL: &str = "https://evasionhub.com/obfuscate";
/// User-Agent the service expects from API clients.
pub const USER_AGENT: &str = "OSI API";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: API_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Request payload: the whole source file as one string.
#[derive(Serialize, Debug)]
pub struct ObfuscateRequest<'a> {
    pub code: &'a str,
}

/// Everything that can go wrong between sending the request and holding a
/// parsed JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("File too large - exceeds 2MB limit")]
    TooLarge,
    #[error("Rate limited - please try again later")]
    RateLimited,
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Request timed out after {}", format_time(.0.as_secs_f64()))]
    Timeout(Duration),
    #[error("Failed to connect to {0}")]
    ConnectionFailed(String),
    #[error("Invalid JSON response from server")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),
}

/// A raw HTTP reply with its transfer metadata. The status has not been
/// judged yet; [`ApiReply::into_json`] does that.
#[derive(Debug)]
pub struct ApiReply {
    pub status: StatusCode,
    pub elapsed: Duration,
    pub body: Vec<u8>,
}

impl ApiReply {
    pub fn response_bytes(&self) -> usize {
        self.body.len()
    }

    /// Map non-200 statuses to `ApiError` and parse a 200 body as JSON.
    pub fn into_json(self) -> Result<Value, ApiError> {
        match self.status {
            StatusCode::OK => {}
            StatusCode::PAYLOAD_TOO_LARGE => return Err(ApiError::TooLarge),
            StatusCode::TOO_MANY_REQUESTS => return Err(ApiError::RateLimited),
            other => {
                return Err(ApiError::Http {
                    status: other.as_u16(),
                    body: String::from_utf8_lossy(&self.body).into_owned(),
                })
            }
        }

        let body: Value = serde_json::from_slice(&self.body).map_err(ApiError::InvalidJson)?;
        trace!(%body, "response body");
        Ok(body)
    }
}

/// Blocking client bound to one endpoint.
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ApiError::Network)?;
        Ok(ApiClient { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// POST `code` to the endpoint and return whatever came back. Only
    /// transport failures (connect, timeout, I/O) are errors here.
    pub fn send(&self, code: &str) -> Result<ApiReply, ApiError> {
        let request = ObfuscateRequest { code };
        debug!(url = %self.config.api_url, bytes = code.len(), "sending obfuscation request");

        let start = Instant::now();
        let res = self
            .client
            .post(&self.config.api_url)
            .header(ACCEPT, "application/json")
            .json(&request)
            .send()
            .map_err(|e| self.classify(e))?;

        let status = res.status();
        let body = res.bytes().map_err(|e| self.classify(e))?.to_vec();
        let elapsed = start.elapsed();
        debug!(status = status.as_u16(), bytes = body.len(), ?elapsed, "received response");

        Ok(ApiReply {
            status,
            elapsed,
            body,
        })
    }

    /// [`send`](Self::send) followed by [`ApiReply::into_json`].
    pub fn obfuscate(&self, code: &str) -> Result<Value, ApiError> {
        self.send(code)?.into_json()
    }

    fn classify(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.config.timeout)
        } else if err.is_connect() {
            ApiError::ConnectionFailed(self.host())
        } else {
            ApiError::Network(err)
        }
    }

    /// Host part of the endpoint, or the whole URL if it does not parse.
    pub(crate) fn host(&self) -> String {
        reqwest::Url::parse(&self.config.api_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| self.config.api_url.clone())
    }
}

/// Size in bytes of the JSON body that [`ApiClient::obfuscate`] sends.
pub fn payload_size(code: &str) -> usize {
    serde_json::to_vec(&ObfuscateRequest { code })
        .map(|body| body.len())
        .unwrap_or(0)
}
