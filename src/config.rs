//! Configuration Management
//!
//! Handles persistent configuration storage for azbp.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::arm::catalog::DEFAULT_ENDPOINT;
use crate::blueprint::fanout::DEFAULT_CONCURRENCY;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default subscription for assignment operations
    #[serde(default)]
    pub subscription: Option<String>,
    /// Default management group for blueprint operations
    #[serde(default)]
    pub management_group: Option<String>,
    /// ARM endpoint override (sovereign clouds, local mocks)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Cap on concurrent management-group fetches
    #[serde(default)]
    pub fanout_limit: Option<usize>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("azbp").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Effective subscription (CLI > config > AZURE_SUBSCRIPTION_ID)
    pub fn effective_subscription(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| self.subscription.clone())
            .or_else(|| std::env::var("AZURE_SUBSCRIPTION_ID").ok())
    }

    /// Effective ARM endpoint (CLI > config > public cloud)
    pub fn effective_endpoint(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    /// Effective fan-out concurrency cap
    pub fn effective_fanout_limit(&self) -> usize {
        self.fanout_limit.unwrap_or(DEFAULT_CONCURRENCY).max(1)
    }
}
