use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::state::{ErrorKind, FetchCause};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("PREDICT_API_URL")
            .ok()
            .map(|raw| raw.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = std::env::var("PREDICT_API_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);
        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Backend API client. Constructed explicitly with its configuration so
/// tests can point it at a double instead of patching globals.
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            base_url: config.base_url,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get_text(&self, path: &str) -> Result<String, ErrorKind> {
        read_response(self.client.get(self.url(path)).send())
    }

    pub fn post_json_text(&self, path: &str, body: &impl Serialize) -> Result<String, ErrorKind> {
        let payload = serde_json::to_string(body).map_err(|err| {
            ErrorKind::FetchFailed(FetchCause::RequestSetup(format!(
                "serialize request body: {err}"
            )))
        })?;
        read_response(
            self.client
                .post(self.url(path))
                .header(CONTENT_TYPE, "application/json")
                .body(payload)
                .send(),
        )
    }
}

fn read_response(sent: reqwest::Result<Response>) -> Result<String, ErrorKind> {
    let resp = sent.map_err(classify_transport_error)?;
    let status = resp.status();
    let body = resp.text().map_err(classify_transport_error)?;
    if !status.is_success() {
        return Err(ErrorKind::FetchFailed(FetchCause::HttpStatus {
            status: status.as_u16(),
            detail: extract_detail(&body),
        }));
    }
    Ok(body)
}

fn classify_transport_error(err: reqwest::Error) -> ErrorKind {
    let cause = if err.is_builder() {
        FetchCause::RequestSetup(err.to_string())
    } else {
        FetchCause::NoResponse(err.to_string())
    };
    ErrorKind::FetchFailed(cause)
}

/// Non-2xx bodies may carry a human-readable `detail` message.
fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value: Value = serde_json::from_str(trimmed).ok()?;
    value
        .get("detail")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Decodes a 2xx body. A schema mismatch on a successful response is a
/// validation problem, not a transport one.
pub fn decode_json<T: DeserializeOwned>(raw: &str) -> Result<T, ErrorKind> {
    serde_json::from_str(raw.trim())
        .map_err(|err| ErrorKind::Validation(format!("response schema mismatch: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_extracted_from_json_body() {
        assert_eq!(
            extract_detail(r#"{"detail":"Team stats not found"}"#).as_deref(),
            Some("Team stats not found")
        );
        assert_eq!(extract_detail("<html>boom</html>"), None);
        assert_eq!(extract_detail(""), None);
    }

    #[test]
    fn config_default_matches_local_backend() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }
}
