//! Fetch orchestration: cache hit / cold start vs. cache miss.
//!
//! Per request, nothing persisted:
//! - upstream has `recommendations` (even empty) -> consolidate, answer now;
//! - upstream has none -> fire-and-forget regeneration, answer "generating".
//!
//! Regeneration runs on a detached tokio task. Its outcome is logged and
//! counted but never reaches the caller. There is no polling or retry here.

use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::recs::consolidate::{consolidate, DuplicatePolicy, RankedCandidate, DEFAULT_TOP_K};
use crate::recs::error::RecsResult;
use crate::recs::types::{Recommender, RegenerationTrigger};

pub const PENDING_MESSAGE: &str = "Background generation started. Try again in a few seconds.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationList {
    pub user_id: String,
    pub recommendations: Vec<RankedCandidate>,
    pub source: Option<String>,
    pub strategy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingNotice {
    pub user_id: String,
    pub status: &'static str,
    pub message: &'static str,
    pub source: &'static str,
}

impl PendingNotice {
    fn generating(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            status: "generating",
            message: PENDING_MESSAGE,
            source: "background",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueuedNotice {
    pub status: &'static str,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Ready(RecommendationList),
    Generating(PendingNotice),
}

pub struct FetchOrchestrator {
    recommender: Arc<dyn Recommender>,
    trigger: Arc<dyn RegenerationTrigger>,
    top_k: usize,
    policy: DuplicatePolicy,
}

impl FetchOrchestrator {
    pub fn new(recommender: Arc<dyn Recommender>, trigger: Arc<dyn RegenerationTrigger>) -> Self {
        Self {
            recommender,
            trigger,
            top_k: DEFAULT_TOP_K,
            policy: DuplicatePolicy::default(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub async fn fetch(&self, user_id: &str) -> RecsResult<FetchOutcome> {
        counter!("recs_fetch_total").increment(1);

        let result = match self.recommender.hybrid_recommendations(user_id).await {
            Ok(r) => r,
            Err(e) => {
                counter!("recs_upstream_errors_total").increment(1);
                warn!(
                    target: "recs",
                    user_id, recommender = self.recommender.name(), error = %e,
                    "recommender call failed"
                );
                return Err(e);
            }
        };

        match result.recommendations {
            Some(raw) => {
                counter!("recs_cache_hits_total").increment(1);
                let raw_len = raw.len();
                let ranked = consolidate(raw, self.top_k, self.policy);
                debug!(
                    target: "recs",
                    user_id, raw = raw_len, kept = ranked.len(),
                    source = ?result.source, strategy = ?result.strategy,
                    "consolidated upstream result"
                );
                Ok(FetchOutcome::Ready(RecommendationList {
                    user_id: user_id.to_string(),
                    recommendations: ranked,
                    source: result.source,
                    strategy: result.strategy,
                }))
            }
            None => {
                counter!("recs_cache_misses_total").increment(1);
                info!(target: "recs", user_id, "cache miss, regenerating in background");
                self.dispatch_regeneration(user_id);
                Ok(FetchOutcome::Generating(PendingNotice::generating(user_id)))
            }
        }
    }

    /// Manual refresh: always queues regeneration, whatever the cache holds.
    pub fn refresh(&self, user_id: &str) -> QueuedNotice {
        self.dispatch_regeneration(user_id);
        QueuedNotice {
            status: "queued",
            user_id: user_id.to_string(),
        }
    }

    fn dispatch_regeneration(&self, user_id: &str) {
        counter!("recs_regenerations_total").increment(1);
        let trigger = Arc::clone(&self.trigger);
        let user_id = user_id.to_string();
        // Detached: the handle is dropped, the request does not wait.
        tokio::spawn(async move {
            match trigger.regenerate(&user_id).await {
                Ok(()) => debug!(target: "recs", %user_id, trigger = trigger.name(), "regeneration done"),
                Err(e) => {
                    counter!("recs_regeneration_failures_total").increment(1);
                    warn!(
                        target: "recs",
                        %user_id, trigger = trigger.name(), error = %e,
                        "background regeneration failed"
                    );
                }
            }
        });
    }
}
