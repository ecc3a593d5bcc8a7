// src/recs/types.rs
use serde::{Deserialize, Serialize};

use crate::recs::consolidate::Candidate;
use crate::recs::error::RecsResult;

/// What the hybrid recommender hands back for one user.
///
/// `recommendations == None` (key absent or `null`) means cache miss.
/// `Some(vec![])` is a completed result that happens to be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamResult {
    #[serde(default)]
    pub recommendations: Option<Vec<Candidate>>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub strategy: Option<String>,
}

/// Read side: the external hybrid recommender.
#[async_trait::async_trait]
pub trait Recommender: Send + Sync {
    async fn hybrid_recommendations(&self, user_id: &str) -> RecsResult<UpstreamResult>;
    fn name(&self) -> &'static str;
}

/// Write side: asks the external executor to rebuild a user's recommendations.
/// Callers never consume a result beyond success/failure.
#[async_trait::async_trait]
pub trait RegenerationTrigger: Send + Sync {
    async fn regenerate(&self, user_id: &str) -> RecsResult<()>;
    fn name(&self) -> &'static str;
}
