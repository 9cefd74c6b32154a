//! Configuration handling for the form client

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::state::FormKind;

/// Default origin of the static site hosting the form relay
const DEFAULT_SITE_ORIGIN: &str = "http://localhost:8888";
/// Default base URL of the reservation API
const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";
/// Default bound on a single submission
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Which backend a form is submitted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Form-encoded POST to the site origin
    Relay,
    /// JSON POST to the reservation API
    ReserveApi,
}

/// User configuration for the form client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadConfig {
    /// Origin the form relay posts to
    pub site_origin: String,
    /// Base URL of the reservation API
    pub api_base_url: String,
    /// Seconds before an in-flight submission is failed
    pub timeout_secs: u64,
    /// Backend for the waitlist form
    pub waitlist_backend: Backend,
    /// Backend for the reservation form
    pub reservation_backend: Backend,
    /// Treat any completed relay request as success, whatever its status
    pub relay_accept_any_status: bool,
}

impl Default for LeadConfig {
    fn default() -> Self {
        Self {
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            waitlist_backend: Backend::Relay,
            reservation_backend: Backend::ReserveApi,
            relay_accept_any_status: false,
        }
    }
}

impl LeadConfig {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("app", "accessloop", "accessloop-tui")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: LeadConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Override fields from `ACCESSLOOP_*` variables
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(origin) = var("ACCESSLOOP_SITE_ORIGIN").filter(|v| !v.is_empty()) {
            self.site_origin = origin;
        }
        if let Some(url) = var("ACCESSLOOP_API_URL").filter(|v| !v.is_empty()) {
            self.api_base_url = url;
        }
        match var("ACCESSLOOP_TIMEOUT_SECS").map(|v| v.parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => self.timeout_secs = secs,
            Some(_) => tracing::warn!("ignoring invalid ACCESSLOOP_TIMEOUT_SECS"),
            None => {}
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    /// Bound on one submission; zero falls back to the default
    pub fn timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }

    /// Backend configured for a form
    pub fn backend_for(&self, kind: FormKind) -> Backend {
        match kind {
            FormKind::Waitlist => self.waitlist_backend,
            FormKind::Reservation => self.reservation_backend,
        }
    }
}
