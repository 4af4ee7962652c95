//! HTTP utilities for ARM REST calls.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging: truncate long responses and strip
/// non-printable characters.
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        // Back off to a char boundary so multibyte text never splits mid-char.
        let mut cut = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Transport-level failures, classified just enough for the catalog layer to
/// turn them into the domain taxonomy.
#[derive(Debug, Error)]
pub enum ArmHttpError {
    #[error("resource not found")]
    NotFound,

    #[error("request rejected with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("response body was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP client wrapper for ARM API calls.
#[derive(Clone)]
pub struct ArmHttpClient {
    client: Client,
}

impl ArmHttpClient {
    pub fn new() -> Result<Self, ArmHttpError> {
        let client = Client::builder()
            .user_agent(concat!("azbp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    fn classify(status: StatusCode, body: String) -> ArmHttpError {
        if status == StatusCode::NOT_FOUND {
            ArmHttpError::NotFound
        } else {
            tracing::debug!("API error: {} - {}", status, sanitize_for_log(&body));
            ArmHttpError::Status { status, body: sanitize_for_log(&body) }
        }
    }

    /// Make a GET request against ARM.
    pub async fn get(&self, url: &str, token: &str) -> Result<Value, ArmHttpError> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).bearer_auth(token).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::classify(status, body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Make a PUT request against ARM.
    pub async fn put(&self, url: &str, token: &str, body: &Value) -> Result<Value, ArmHttpError> {
        tracing::debug!("PUT {}", url);

        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_body = response.text().await?;

        if !status.is_success() {
            return Err(Self::classify(status, response_body));
        }

        if response_body.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&response_body)?)
    }

    /// Make a DELETE request against ARM. `Ok(None)` when the service
    /// returned no body (202/204 responses do this routinely).
    pub async fn delete(&self, url: &str, token: &str) -> Result<Option<Value>, ArmHttpError> {
        tracing::debug!("DELETE {}", url);

        let response = self.client.delete(url).bearer_auth(token).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::classify(status, body));
        }

        if body.is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&body)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_truncates_and_strips() {
        let long = "x".repeat(500);
        let sanitized = sanitize_for_log(&long);
        assert!(sanitized.contains("truncated"));
        assert!(sanitized.len() < 300);

        assert_eq!(sanitize_for_log("ab\ncd\u{7}"), "abcd");
    }

    #[test]
    fn sanitize_truncates_multibyte_bodies_on_a_char_boundary() {
        // 100 three-byte chars puts the cutoff inside a character.
        let localized = "歩".repeat(100);
        let sanitized = sanitize_for_log(&localized);
        assert!(sanitized.contains("truncated, 300 bytes total"));
    }

    #[test]
    fn classify_separates_not_found() {
        assert!(matches!(
            ArmHttpClient::classify(StatusCode::NOT_FOUND, String::new()),
            ArmHttpError::NotFound
        ));
        assert!(matches!(
            ArmHttpClient::classify(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()),
            ArmHttpError::Status { .. }
        ));
    }
}
