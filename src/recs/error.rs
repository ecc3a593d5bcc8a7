//! Error types for the recommendation path.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecsError {
    /// No recommender endpoint was configured for this deployment.
    #[error("recommender is not configured")]
    NotConfigured,

    #[error("invalid upstream url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("invalid {service} payload: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Free-form failure reported by a collaborator.
    #[error("{0}")]
    Upstream(String),
}

pub type RecsResult<T> = Result<T, RecsError>;
