// tests/common/mod.rs
//
// Shared fakes and helpers for the HTTP-level tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use parking_lot::Mutex;
use serde_json::Value as Json;
use tokio::sync::mpsc;
use tower::ServiceExt as _; // for `oneshot`

use content_signals::api::{self, AppState};
use content_signals::recs::{
    FetchOrchestrator, RecsError, RecsResult, Recommender, RegenerationTrigger, UpstreamResult,
};

pub const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Recommender returning a canned result (or an error when `None`).
pub struct CannedRecommender {
    pub result: Option<UpstreamResult>,
    pub seen: Mutex<Vec<String>>,
}

impl CannedRecommender {
    pub fn new(result: Option<UpstreamResult>) -> Arc<Self> {
        Arc::new(Self {
            result,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait]
impl Recommender for CannedRecommender {
    async fn hybrid_recommendations(&self, user_id: &str) -> RecsResult<UpstreamResult> {
        self.seen.lock().push(user_id.to_string());
        self.result
            .clone()
            .ok_or_else(|| RecsError::Upstream("hybrid engine unavailable".into()))
    }
    fn name(&self) -> &'static str {
        "canned"
    }
}

/// Records every regeneration request and forwards it on a channel.
pub struct RecordingTrigger {
    pub calls: Mutex<Vec<String>>,
    tx: mpsc::UnboundedSender<String>,
}

impl RecordingTrigger {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                tx,
            }),
            rx,
        )
    }

    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait::async_trait]
impl RegenerationTrigger for RecordingTrigger {
    async fn regenerate(&self, user_id: &str) -> RecsResult<()> {
        self.calls.lock().push(user_id.to_string());
        let _ = self.tx.send(user_id.to_string());
        Ok(())
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Forwards each regeneration request on a channel, then fails it.
pub struct FailingTrigger {
    tx: mpsc::UnboundedSender<String>,
}

impl FailingTrigger {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait::async_trait]
impl RegenerationTrigger for FailingTrigger {
    async fn regenerate(&self, user_id: &str) -> RecsResult<()> {
        let _ = self.tx.send(user_id.to_string());
        Err(RecsError::Status {
            service: "regeneration",
            status: 503,
        })
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

pub fn router_with(
    recommender: Arc<dyn Recommender>,
    trigger: Arc<dyn RegenerationTrigger>,
) -> Router {
    api::router(AppState::new(FetchOrchestrator::new(recommender, trigger)))
}

/// Router whose recommender always misses; handy for risk-only tests.
pub fn risk_router() -> Router {
    let (trigger, _rx) = RecordingTrigger::new();
    router_with(CannedRecommender::new(Some(UpstreamResult::default())), trigger)
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Json) {
    let resp = app.clone().oneshot(req).await.expect("router response");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = if bytes.is_empty() {
        Json::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Json::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, v)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET")
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("build POST")
}

pub fn post_json(uri: &str, payload: &Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST json")
}

/// Wait for the next regeneration request, failing after 2s.
pub async fn next_regeneration(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("regeneration dispatched in time")
        .expect("channel open")
}
