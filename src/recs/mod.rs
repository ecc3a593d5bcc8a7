// src/recs/mod.rs
//! Recommendation path: consolidation of upstream candidates and the
//! fetch orchestrator deciding between "ready" and "generating".

pub mod consolidate;
pub mod error;
pub mod orchestrator;
pub mod types;
pub mod upstream;

pub use crate::recs::consolidate::{
    consolidate, Candidate, DuplicatePolicy, RankedCandidate, DEFAULT_TOP_K,
};
pub use crate::recs::error::{RecsError, RecsResult};
pub use crate::recs::orchestrator::{
    FetchOrchestrator, FetchOutcome, PendingNotice, QueuedNotice, RecommendationList,
};
pub use crate::recs::types::{Recommender, RegenerationTrigger, UpstreamResult};
