use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::{counter, histogram};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::recs::{FetchOrchestrator, FetchOutcome, QueuedNotice};
use crate::risk::{CategoryScores, RiskReport, RiskScorer, ToxicityLabel};

pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
pub struct AppState {
    scorer: Arc<RiskScorer>,
    orchestrator: Arc<FetchOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: FetchOrchestrator) -> Self {
        Self {
            scorer: Arc::new(RiskScorer::new()),
            orchestrator: Arc::new(orchestrator),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/recommendations/{user_id}", get(get_recommendations))
        .route("/recommendations/refresh/{user_id}", post(manual_refresh))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Any failure surfaces as a 500 with the error text in `detail`.
pub struct ApiError(anyhow::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": self.0.to_string() })),
        )
            .into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": format!("Spam & Toxicity Detection API v{SERVICE_VERSION}"),
        "endpoints": {
            "POST /predict": "Score text for spam and toxicity",
            "GET /recommendations/{user_id}": "Ranked top-K recommendations",
            "POST /recommendations/refresh/{user_id}": "Queue background regeneration",
            "GET /health": "Service health",
        }
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "spam_detection": "rule-based (active)",
        "toxicity_detection": "rule-based (active)",
        "version": SERVICE_VERSION,
    }))
}

#[derive(serde::Deserialize)]
struct PredictReq {
    text: String,
}

#[derive(serde::Serialize)]
struct LabelProbsOut {
    spam: f64,
    not_spam: f64,
}

#[derive(serde::Serialize)]
struct KeywordAnalysisOut {
    keyword_count: usize,
    found_keywords: Vec<String>,
    rule_triggered: bool,
}

#[derive(serde::Serialize)]
struct SpamDetectionOut {
    score: f64,
    label_probs: LabelProbsOut,
    explain: Vec<String>,
    keyword_analysis: KeywordAnalysisOut,
}

#[derive(serde::Serialize)]
struct ToxicityDetectionOut {
    label: ToxicityLabel,
    toxicity_score: f64,
    confidence: f64,
    all_scores: CategoryScores,
    explain: Vec<String>,
    found_keywords: Vec<String>,
}

#[derive(serde::Serialize)]
struct PredictResp {
    spam_detection: SpamDetectionOut,
    toxicity_detection: ToxicityDetectionOut,
}

impl From<RiskReport> for PredictResp {
    fn from(r: RiskReport) -> Self {
        let spam = r.spam;
        let tox = r.toxicity;
        Self {
            spam_detection: SpamDetectionOut {
                score: spam.score,
                label_probs: LabelProbsOut {
                    spam: spam.label_probs.spam,
                    not_spam: spam.label_probs.not_spam,
                },
                keyword_analysis: KeywordAnalysisOut {
                    keyword_count: spam.matched_keywords.len(),
                    rule_triggered: spam.rule_triggered(),
                    found_keywords: spam.matched_keywords,
                },
                explain: spam.explain,
            },
            toxicity_detection: ToxicityDetectionOut {
                label: tox.label,
                toxicity_score: tox.score,
                confidence: tox.score,
                all_scores: tox.all_scores,
                explain: tox.explain,
                found_keywords: tox.matched_keywords,
            },
        }
    }
}

async fn predict(State(state): State<AppState>, Json(body): Json<PredictReq>) -> Json<PredictResp> {
    let started = Instant::now();
    let report = state.scorer.score_text(&body.text);

    counter!("risk_predictions_total").increment(1);
    if report.spam.score > 0.5 {
        counter!("risk_spam_flagged_total").increment(1);
    }
    if report.toxicity.label != ToxicityLabel::Safe {
        counter!("risk_toxicity_flagged_total", "label" => report.toxicity.label.as_str())
            .increment(1);
    }
    histogram!("risk_predict_duration_ms").record(started.elapsed().as_secs_f64() * 1000.0);

    Json(report.into())
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let out = match state.orchestrator.fetch(&user_id).await? {
        FetchOutcome::Ready(list) => (StatusCode::OK, Json(list)).into_response(),
        FetchOutcome::Generating(pending) => (StatusCode::ACCEPTED, Json(pending)).into_response(),
    };
    Ok(out)
}

async fn manual_refresh(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<QueuedNotice> {
    Json(state.orchestrator.refresh(&user_id))
}
