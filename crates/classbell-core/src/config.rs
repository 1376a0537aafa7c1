//! Classbell configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassbellConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for ClassbellConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            push: PushConfig::default(),
            scan: ScanConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl ClassbellConfig {
    /// Load config from the default path (~/.classbell/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::ClassbellError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| crate::error::ClassbellError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ClassbellError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Classbell home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".classbell")
    }
}

/// Document store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    ClassbellConfig::home_dir()
        .join("classbell.db")
        .to_string_lossy()
        .into_owned()
}

/// Push delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    /// HTTP send endpoint for the push collaborator.
    #[serde(default = "default_push_endpoint")]
    pub endpoint: String,
    /// Server key for the `Authorization: key=...` header. Empty disables
    /// real delivery (a recording transport is used instead).
    #[serde(default)]
    pub server_key: String,
    /// Icon URL embedded in every push payload.
    #[serde(default = "default_icon_url")]
    pub icon_url: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: bool_true(),
            endpoint: default_push_endpoint(),
            server_key: String::new(),
            icon_url: default_icon_url(),
        }
    }
}

fn default_push_endpoint() -> String {
    "https://fcm.googleapis.com/fcm/send".into()
}
fn default_icon_url() -> String {
    "/icons/icon-192.png".into()
}

/// Scheduled scan cadences and lookahead windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Deadline scan cadence, in hours.
    #[serde(default = "default_deadline_every_hours")]
    pub deadline_every_hours: u64,
    /// Deadline lookahead window, in hours.
    #[serde(default = "default_deadline_lookahead_hours")]
    pub deadline_lookahead_hours: i64,
    /// Class-start scan cadence, in minutes.
    #[serde(default = "default_class_start_every_mins")]
    pub class_start_every_mins: u64,
    /// Class-start lookahead window, in minutes.
    #[serde(default = "default_class_start_lookahead_mins")]
    pub class_start_lookahead_mins: i64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            deadline_every_hours: default_deadline_every_hours(),
            deadline_lookahead_hours: default_deadline_lookahead_hours(),
            class_start_every_mins: default_class_start_every_mins(),
            class_start_lookahead_mins: default_class_start_lookahead_mins(),
        }
    }
}

fn default_deadline_every_hours() -> u64 {
    1
}
fn default_deadline_lookahead_hours() -> i64 {
    24
}
fn default_class_start_every_mins() -> u64 {
    10
}
fn default_class_start_lookahead_mins() -> i64 {
    10
}

/// Trigger gateway bind address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8787
}

fn bool_true() -> bool {
    true
}
