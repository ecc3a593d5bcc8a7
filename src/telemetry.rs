// src/telemetry.rs
//! Tracing setup and anonymized dev logging helpers.

use sha2::{Digest, Sha256};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_DEV_LOG: &str = "SERVICE_DEV_LOG";

fn is_dev_env() -> bool {
    cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        )
}

// Dev logging gate: SERVICE_DEV_LOG=1 AND dev env (debug or SHUTTLE_ENV in {local,development,dev})
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    on && is_dev_env()
}

/// Enable compact tracing logs in development only.
/// Activation requires BOTH a dev environment and `SERVICE_DEV_LOG=1`.
/// A subscriber already installed by the host runtime is left in place.
pub fn enable_dev_tracing() {
    if !dev_logging_enabled() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("content_signals=debug,risk=info,recs=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

/// Short, stable id for a text so logs never carry the raw content.
pub(crate) fn anon_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub(crate) fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(|x| x.to_string()).collect()
}

/// Minimal, anonymized dev logger for scoring events.
pub(crate) fn dev_log_event(event: &str, text: &str, matched: &[String], score: f64) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(text);
    let matched_short = truncate_vec(matched, 5);
    info!(
        target: "risk",
        %id, %score, event,
        matched = ?matched_short
    );
}
