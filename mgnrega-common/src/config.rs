//! Configuration loading
//!
//! Two-tier resolution: a TOML config file supplies the base values, then
//! environment variables override individual keys. Catalog and alias tables
//! ship with compiled defaults so a bare deployment can sync Jharkhand
//! without any config file at all.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default data.gov.in resource endpoint for district-level MGNREGA data
pub const DEFAULT_API_URL: &str =
    "https://api.data.gov.in/resource/ee03643a-ee4c-48c2-ac30-9f2ff26ab722";

/// Service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite database file path
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Upstream statistics API endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Upstream API key (required for live fetches)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Seconds between scheduled catalog sweeps
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,

    /// Per-request upstream timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Minimum interval between upstream requests in milliseconds
    #[serde(default = "default_upstream_min_interval_ms")]
    pub upstream_min_interval_ms: u64,

    /// State name -> district names swept by the scheduler
    #[serde(default = "default_catalog")]
    pub catalog: BTreeMap<String, Vec<String>>,

    /// Canonical district name -> known spelling variants
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, Vec<String>>,
}

fn default_port() -> u16 {
    5000
}

fn default_database_path() -> PathBuf {
    PathBuf::from("mgnrega.db")
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_sync_interval_secs() -> u64 {
    86400
}

fn default_request_timeout_secs() -> u64 {
    8
}

fn default_upstream_min_interval_ms() -> u64 {
    1000
}

/// Districts of Jharkhand as the upstream API spells them
fn default_catalog() -> BTreeMap<String, Vec<String>> {
    let districts = [
        "BOKARO",
        "CHATRA",
        "DEOGHAR",
        "DHANBAD",
        "DUMKA",
        "EAST SINGHBUM",
        "GARHWA",
        "GIRIDIH",
        "GODDA",
        "GUMLA",
        "HAZARIBAGH",
        "JAMTARA",
        "KHUNTI",
        "KODERMA",
        "LATEHAR",
        "LOHARDAGA",
        "PAKUR",
        "PALAMU",
        "RAMGARH",
        "RANCHI",
        "SAHEBGANJ",
        "SARAIKELA KHARSAWAN",
        "SIMDEGA",
        "WEST SINGHBHUM",
    ];

    let mut catalog = BTreeMap::new();
    catalog.insert(
        "JHARKHAND".to_string(),
        districts.iter().map(|d| d.to_string()).collect(),
    );
    catalog
}

/// Known spelling variants observed from upstream and user input.
/// Keys are the spellings the upstream API resolves; values are variants
/// that should converge onto the same stored record.
fn default_aliases() -> BTreeMap<String, Vec<String>> {
    let mut aliases = BTreeMap::new();
    aliases.insert(
        "EAST SINGHBUM".to_string(),
        vec!["PURBI SINGHBHUM".to_string(), "EAST SINGHBHUM".to_string()],
    );
    aliases.insert(
        "WEST SINGHBHUM".to_string(),
        vec!["PASHCHIMI SINGHBHUM".to_string(), "WEST SINGHBUM".to_string()],
    );
    aliases.insert(
        "SARAIKELA KHARSAWAN".to_string(),
        vec!["SERAIKELA KHARSAWAN".to_string(), "SERAIKELA".to_string()],
    );
    aliases.insert(
        "SAHEBGANJ".to_string(),
        vec!["SAHIBGANJ".to_string()],
    );
    aliases
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            database_path: default_database_path(),
            api_url: default_api_url(),
            api_key: None,
            sync_interval_secs: default_sync_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            upstream_min_interval_ms: default_upstream_min_interval_ms(),
            catalog: default_catalog(),
            aliases: default_aliases(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// Priority per key: environment variable, then TOML file, then the
    /// compiled default. A missing file is not an error; a file that exists
    /// but fails to parse is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let content = std::fs::read_to_string(p)?;
                let config: Config = toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("Parse {} failed: {}", p.display(), e)))?;
                info!("Configuration loaded from {}", p.display());
                config
            }
            Some(p) => {
                warn!("Config file {} not found, using defaults", p.display());
                Config::default()
            }
            None => Config::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `MGNREGA_*` environment overrides on top of the loaded values
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("MGNREGA_API_URL") {
            self.api_url = url;
        }
        if let Ok(key) = std::env::var("MGNREGA_API_KEY") {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(port) = std::env::var("MGNREGA_PORT") {
            match port.parse() {
                Ok(p) => self.port = p,
                Err(_) => warn!("Ignoring invalid MGNREGA_PORT: {}", port),
            }
        }
        if let Ok(db) = std::env::var("MGNREGA_DATABASE") {
            self.database_path = PathBuf::from(db);
        }
        if let Ok(secs) = std::env::var("MGNREGA_SYNC_INTERVAL_SECS") {
            match secs.parse() {
                Ok(s) => self.sync_interval_secs = s,
                Err(_) => warn!("Ignoring invalid MGNREGA_SYNC_INTERVAL_SECS: {}", secs),
            }
        }
    }

    /// Upstream API key, or a configuration error explaining how to set it
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "Upstream API key not configured. Set MGNREGA_API_KEY or \
                     api_key in the config file (obtain a key at \
                     https://data.gov.in)"
                        .to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_jharkhand_catalog() {
        let config = Config::default();
        let districts = config.catalog.get("JHARKHAND").unwrap();
        assert_eq!(districts.len(), 24);
        assert!(districts.contains(&"RANCHI".to_string()));
        assert!(districts.contains(&"EAST SINGHBUM".to_string()));
    }

    #[test]
    fn default_aliases_map_purbi_singhbhum() {
        let config = Config::default();
        let variants = config.aliases.get("EAST SINGHBUM").unwrap();
        assert!(variants.contains(&"PURBI SINGHBHUM".to_string()));
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            port = 8080
            api_key = "test-key"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.sync_interval_secs, 86400);
        assert!(!config.catalog.is_empty());
    }

    #[test]
    fn require_api_key_rejects_blank() {
        let mut config = Config::default();
        config.api_key = Some("   ".to_string());
        assert!(config.require_api_key().is_err());

        config.api_key = Some("k".to_string());
        assert_eq!(config.require_api_key().unwrap(), "k");
    }
}
