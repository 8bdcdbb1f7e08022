// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// OAuth client id for the client-credentials grant.
    pub client_id: Option<String>,
    /// OAuth client secret for the client-credentials grant.
    pub client_secret: Option<String>,
    /// Override for the search API base URL (testing).
    pub api_base_url: Option<String>,
    /// Override for the token endpoint base URL (testing).
    pub auth_base_url: Option<String>,
    /// Minimum spacing between the starts of successive catalog calls.
    pub min_interval_ms: u64,
    /// Maximum number of in-flight catalog calls.
    pub max_concurrent: usize,
    /// Maximum candidates requested per search.
    pub search_limit: u32,
    pub request_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_base_url: None,
            auth_base_url: None,
            min_interval_ms: 666,
            max_concurrent: 1,
            search_limit: 20,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Recognized audio file extensions, compared case-insensitively.
    pub extensions: Vec<String>,
    pub follow_symlinks: bool,
    /// Bound on concurrently processed files ahead of the dispatcher.
    pub max_in_flight: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["flac".to_string(), "mp3".to_string(), "m4a".to_string()],
            follow_symlinks: false,
            max_in_flight: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub scan: ScanConfig,
    pub telemetry: TelemetryConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: SPOTCHECK_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("SPOTCHECK_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(target: "config", "configuration loaded");
    Ok(config)
}
