// src/config/service.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::recs::consolidate::{DuplicatePolicy, DEFAULT_TOP_K};

pub const DEFAULT_SERVICE_CONFIG_PATH: &str = "config/service.toml";
pub const ENV_SERVICE_CONFIG_PATH: &str = "SERVICE_CONFIG_PATH";

pub const ENV_RECOMMENDER_URL: &str = "RECOMMENDER_URL";
pub const ENV_REGENERATION_URL: &str = "REGENERATION_URL";
pub const ENV_TOP_K: &str = "RECS_TOP_K";
pub const ENV_DUPLICATE_POLICY: &str = "RECS_DUPLICATE_POLICY";
pub const ENV_METRICS_ROUTE: &str = "METRICS_ROUTE";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 4;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the hybrid recommender. `None` = recommendations unavailable.
    pub recommender_url: Option<String>,
    /// Base URL of the regeneration worker. `None` = requests are only logged.
    pub regeneration_url: Option<String>,
    pub top_k: usize,
    pub duplicate_policy: DuplicatePolicy,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Expose `/metrics`.
    pub metrics_route: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            recommender_url: None,
            regeneration_url: None,
            top_k: DEFAULT_TOP_K,
            duplicate_policy: DuplicatePolicy::default(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            metrics_route: true,
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: ServiceConfig = toml::from_str(s).context("parsing service config")?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading service config from {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    /// Resolve the config file, then apply env overrides:
    /// 1) $SERVICE_CONFIG_PATH (must exist)
    /// 2) config/service.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_SERVICE_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_SERVICE_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            Self::load_from_file(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_SERVICE_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from_file(&default_p)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(v) = env::var(ENV_RECOMMENDER_URL) {
            self.recommender_url = Some(v);
        }
        if let Ok(v) = env::var(ENV_REGENERATION_URL) {
            self.regeneration_url = Some(v);
        }
        if let Ok(v) = env::var(ENV_TOP_K) {
            self.top_k = v
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TOP_K} must be a non-negative integer, got '{v}'"))?;
        }
        if let Ok(v) = env::var(ENV_DUPLICATE_POLICY) {
            self.duplicate_policy = v.parse().map_err(|e: String| anyhow!(e))?;
        }
        if let Ok(v) = env::var(ENV_METRICS_ROUTE) {
            self.metrics_route = matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        self.sanitize();
        Ok(())
    }

    fn sanitize(&mut self) {
        self.recommender_url = clean_url(self.recommender_url.take());
        self.regeneration_url = clean_url(self.regeneration_url.take());
        if self.top_k == 0 {
            self.top_k = DEFAULT_TOP_K;
        }
        if self.connect_timeout_secs == 0 {
            self.connect_timeout_secs = DEFAULT_CONNECT_TIMEOUT_SECS;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
    }
}

/// Trim whitespace and trailing slashes; empty means unset.
fn clean_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().trim_end_matches('/').to_string())
        .filter(|u| !u.is_empty())
}
