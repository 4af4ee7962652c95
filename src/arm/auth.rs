//! Azure authentication
//!
//! Acquires ARM access tokens from the Azure CLI (`az account
//! get-access-token`), the same credentials `az` itself uses, and caches them
//! with an expiry buffer so a token about to lapse is never handed to a
//! request.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::RwLock;

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if the CLI response carries no usable expiry
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone)]
enum Provider {
    /// Shell out to the Azure CLI for the given resource audience.
    AzCli { resource: String },
    /// Fixed token, used by integration tests.
    Static(String),
}

/// Azure credentials holder with token caching.
#[derive(Clone)]
pub struct AzureCredentials {
    provider: Provider,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl AzureCredentials {
    /// Credentials backed by the Azure CLI, scoped to the given ARM endpoint.
    pub fn az_cli(resource: &str) -> Self {
        Self {
            provider: Provider::AzCli {
                resource: resource.to_string(),
            },
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Credentials with a fixed token and no refresh. For tests.
    pub fn static_token(token: &str) -> Self {
        Self {
            provider: Provider::Static(token.to_string()),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token for API calls, from cache when still valid.
    pub async fn get_token(&self) -> Result<String> {
        let resource = match &self.provider {
            Provider::Static(token) => return Ok(token.clone()),
            Provider::AzCli { resource } => resource.clone(),
        };

        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let (token, ttl) = fetch_cli_token(&resource).await?;
        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token)
    }

    /// Force refresh the token.
    pub async fn refresh_token(&self) -> Result<String> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }

        self.get_token().await
    }
}

/// Run `az account get-access-token` and pull out the token plus its
/// remaining lifetime.
async fn fetch_cli_token(resource: &str) -> Result<(String, Duration)> {
    let output = Command::new("az")
        .args([
            "account",
            "get-access-token",
            "--resource",
            resource,
            "--output",
            "json",
        ])
        .output()
        .await
        .context("Failed to run the Azure CLI. Is 'az' installed and on PATH?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "Azure CLI token acquisition failed. Run 'az login' first. ({})",
            stderr.trim()
        );
    }

    let body: Value =
        serde_json::from_slice(&output.stdout).context("Unexpected Azure CLI output")?;

    let token = body
        .get("accessToken")
        .and_then(|v| v.as_str())
        .context("Azure CLI response carried no accessToken")?
        .to_string();

    let ttl = body
        .get("expiresOn")
        .and_then(|v| v.as_str())
        .and_then(parse_expires_on)
        .unwrap_or(DEFAULT_TOKEN_TTL);

    Ok((token, ttl))
}

/// The CLI reports expiry as a local-time string like
/// `2024-06-01 12:34:56.000000`. Anything unparsable falls back to the
/// conservative default TTL.
fn parse_expires_on(raw: &str) -> Option<Duration> {
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").ok()?;
    let remaining = naive - Local::now().naive_local();
    remaining.to_std().ok()
}
