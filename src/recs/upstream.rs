// src/recs/upstream.rs
//! HTTP adapters for the external recommender and regeneration worker, plus
//! the fallbacks used when either endpoint is not configured.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use tracing::{info, warn};

use crate::config::service::ServiceConfig;
use crate::recs::error::{RecsError, RecsResult};
use crate::recs::orchestrator::FetchOrchestrator;
use crate::recs::types::{Recommender, RegenerationTrigger, UpstreamResult};

const USER_AGENT: &str = concat!("content-signals/", env!("CARGO_PKG_VERSION"));

fn build_http(connect_timeout: Duration, timeout: Duration) -> RecsResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(connect_timeout)
        .timeout(timeout)
        .build()
        .map_err(|source| RecsError::Transport {
            service: "http client",
            source,
        })
}

fn parse_base(url: &str) -> RecsResult<Url> {
    Url::parse(url).map_err(|e| RecsError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// `base` + path segments; each segment is percent-encoded.
fn endpoint(base: &Url, segments: &[&str]) -> RecsResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| RecsError::InvalidUrl {
            url: base.to_string(),
            reason: "cannot be a base".into(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// `GET {base}/recommendations/{user_id}/hybrid`
pub struct HttpRecommender {
    http: Client,
    base: Url,
}

impl HttpRecommender {
    pub fn new(base_url: &str, connect_timeout: Duration, timeout: Duration) -> RecsResult<Self> {
        Ok(Self {
            http: build_http(connect_timeout, timeout)?,
            base: parse_base(base_url)?,
        })
    }
}

#[async_trait::async_trait]
impl Recommender for HttpRecommender {
    async fn hybrid_recommendations(&self, user_id: &str) -> RecsResult<UpstreamResult> {
        const SERVICE: &str = "recommender";
        let url = endpoint(&self.base, &["recommendations", user_id, "hybrid"])?;

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| RecsError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RecsError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|source| RecsError::Transport {
            service: SERVICE,
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| RecsError::Decode {
            service: SERVICE,
            source,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// `POST {base}/refresh/{user_id}`; any 2xx counts as accepted.
pub struct HttpRegenerationTrigger {
    http: Client,
    base: Url,
}

impl HttpRegenerationTrigger {
    pub fn new(base_url: &str, connect_timeout: Duration, timeout: Duration) -> RecsResult<Self> {
        Ok(Self {
            http: build_http(connect_timeout, timeout)?,
            base: parse_base(base_url)?,
        })
    }
}

#[async_trait::async_trait]
impl RegenerationTrigger for HttpRegenerationTrigger {
    async fn regenerate(&self, user_id: &str) -> RecsResult<()> {
        const SERVICE: &str = "regeneration worker";
        let url = endpoint(&self.base, &["refresh", user_id])?;

        let resp = self
            .http
            .post(url)
            .send()
            .await
            .map_err(|source| RecsError::Transport {
                service: SERVICE,
                source,
            })?;

        if !resp.status().is_success() {
            return Err(RecsError::Status {
                service: SERVICE,
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Fails every call; used when no recommender URL is configured.
pub struct UnconfiguredRecommender;

#[async_trait::async_trait]
impl Recommender for UnconfiguredRecommender {
    async fn hybrid_recommendations(&self, _user_id: &str) -> RecsResult<UpstreamResult> {
        Err(RecsError::NotConfigured)
    }

    fn name(&self) -> &'static str {
        "unconfigured"
    }
}

/// Only logs the request; used when no regeneration URL is configured.
pub struct LogOnlyTrigger;

#[async_trait::async_trait]
impl RegenerationTrigger for LogOnlyTrigger {
    async fn regenerate(&self, user_id: &str) -> RecsResult<()> {
        warn!(target: "recs", user_id, "no regeneration worker configured; request dropped");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log-only"
    }
}

/// Wire the orchestrator from configuration.
pub fn orchestrator_from_config(cfg: &ServiceConfig) -> RecsResult<FetchOrchestrator> {
    let connect = Duration::from_secs(cfg.connect_timeout_secs);
    let timeout = Duration::from_secs(cfg.request_timeout_secs);

    let recommender: Arc<dyn Recommender> = match cfg.recommender_url.as_deref() {
        Some(url) => Arc::new(HttpRecommender::new(url, connect, timeout)?),
        None => Arc::new(UnconfiguredRecommender),
    };
    let trigger: Arc<dyn RegenerationTrigger> = match cfg.regeneration_url.as_deref() {
        Some(url) => Arc::new(HttpRegenerationTrigger::new(url, connect, timeout)?),
        None => Arc::new(LogOnlyTrigger),
    };

    info!(
        recommender = recommender.name(),
        trigger = trigger.name(),
        top_k = cfg.top_k,
        policy = ?cfg.duplicate_policy,
        "recommendation path wired"
    );

    Ok(FetchOrchestrator::new(recommender, trigger)
        .with_top_k(cfg.top_k)
        .with_duplicate_policy(cfg.duplicate_policy))
}
