//! Configuration vault – reads/writes `waypost.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use waypost_runtime::{ForwarderConfig, LlmConfig, ServiceConfig, UnitIdentity};

/// Persisted configuration, one flat table in `waypost.toml`.
///
/// Every field has a default, so a partial (or missing) file works.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the persistent catalog store.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Volatile (L1) tier capacity.
    #[serde(default = "default_l1_max_size")]
    pub l1_max_size: usize,

    /// Volatile (L1) tier write-time TTL, seconds.
    #[serde(default = "default_l1_ttl_seconds")]
    pub l1_ttl_seconds: u64,

    /// Most-recent records preloaded into L1 on start and after sync.
    #[serde(default = "default_hot_items")]
    pub hot_items: usize,

    /// Top-priority promotions preloaded and served.
    #[serde(default = "default_hot_promotions")]
    pub hot_promotions: usize,

    /// Default result-list bound.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Identity labels stamped onto telemetry.
    #[serde(default = "default_unit_id")]
    pub unit_id: String,
    #[serde(default = "default_store_id")]
    pub store_id: String,
    #[serde(default = "default_zone_id")]
    pub zone_id: String,

    /// Analytics backend (the telemetry sink).
    #[serde(default)]
    pub analytics_enabled: bool,
    #[serde(default = "default_analytics_url")]
    pub analytics_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub analytics_api_key: String,
    #[serde(default = "default_event_batch_size")]
    pub event_batch_size: usize,
    #[serde(default = "default_event_batch_interval_s")]
    pub event_batch_interval_s: u64,

    /// LLM collaborator (phrasing of matched items).
    #[serde(default)]
    pub llm_enabled: bool,
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
}

fn default_db_path() -> String {
    "./data/waypost.db".to_string()
}
fn default_l1_max_size() -> usize {
    1000
}
fn default_l1_ttl_seconds() -> u64 {
    300
}
fn default_hot_items() -> usize {
    20
}
fn default_hot_promotions() -> usize {
    3
}
fn default_max_results() -> usize {
    5
}
fn default_unit_id() -> String {
    "WP-DEV-001".to_string()
}
fn default_store_id() -> String {
    "STORE-DEV".to_string()
}
fn default_zone_id() -> String {
    "ENTRANCE".to_string()
}
fn default_analytics_url() -> String {
    "http://localhost:9700/events/batch".to_string()
}
fn default_event_batch_size() -> usize {
    50
}
fn default_event_batch_interval_s() -> u64 {
    5
}
fn default_llm_base_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_llm_model() -> String {
    "llama3".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            l1_max_size: default_l1_max_size(),
            l1_ttl_seconds: default_l1_ttl_seconds(),
            hot_items: default_hot_items(),
            hot_promotions: default_hot_promotions(),
            max_results: default_max_results(),
            unit_id: default_unit_id(),
            store_id: default_store_id(),
            zone_id: default_zone_id(),
            analytics_enabled: false,
            analytics_url: default_analytics_url(),
            analytics_api_key: String::new(),
            event_batch_size: default_event_batch_size(),
            event_batch_interval_s: default_event_batch_interval_s(),
            llm_enabled: false,
            llm_base_url: default_llm_base_url(),
            llm_model: default_llm_model(),
        }
    }
}

impl Config {
    /// Translate into the runtime's configuration bundle.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            db_path: PathBuf::from(&self.db_path),
            l1_max_size: self.l1_max_size,
            l1_ttl: Duration::from_secs(self.l1_ttl_seconds),
            hot_items: self.hot_items,
            hot_promotions: self.hot_promotions,
            max_results: self.max_results,
            identity: UnitIdentity {
                unit_id: self.unit_id.clone(),
                store_id: self.store_id.clone(),
                zone_id: self.zone_id.clone(),
            },
            telemetry: ForwarderConfig {
                endpoint: self.analytics_url.clone(),
                api_key: self.analytics_api_key.clone(),
                batch_size: self.event_batch_size,
                flush_interval: Duration::from_secs(self.event_batch_interval_s),
                enabled: self.analytics_enabled,
                ..ForwarderConfig::default()
            },
            llm: self.llm_enabled.then(|| LlmConfig {
                base_url: self.llm_base_url.clone(),
                model: self.llm_model.clone(),
            }),
        }
    }
}

/// Return the config path: `$WAYPOST_CONFIG` or `./waypost.toml`.
pub fn config_path() -> PathBuf {
    std::env::var("WAYPOST_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("waypost.toml"))
}

/// Load the config file. `Ok(None)` when the file does not exist.
pub fn load() -> std::io::Result<Option<Config>> {
    load_from(&config_path())
}

/// Load from an explicit path. Extracted for testability without mutating
/// environment variables.
pub(crate) fn load_from(path: &std::path::Path) -> std::io::Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    let config = toml::from_str(&raw)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(Some(config))
}

/// Write the config file, creating parent directories as needed.
pub fn save(config: &Config) -> std::io::Result<()> {
    save_to(config, &config_path())
}

pub(crate) fn save_to(config: &Config, path: &std::path::Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let raw = toml::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(path, raw)
}
