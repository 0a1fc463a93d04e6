use crate::infra::{score_sheet, AppState, SheetScoring, TemplateArg};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use perf_review::appraisals::{
    appraisal_router, AppraisalRepository, AppraisalService, RatingSheet,
};
use perf_review::error::AppError;
use perf_review::scoring::ScoreResult;
use serde::Deserialize;
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

/// Rating sheet posted as CSV text, scored without touching the store.
#[derive(Debug, Deserialize)]
pub(crate) struct SheetScoreRequest {
    pub(crate) sheet_csv: String,
    #[serde(default)]
    pub(crate) template: TemplateArg,
    #[serde(default)]
    pub(crate) feedback: Vec<f64>,
    #[serde(default)]
    pub(crate) formula: Option<String>,
}

pub(crate) fn with_appraisal_routes<R>(service: Arc<AppraisalService<R>>) -> axum::Router
where
    R: AppraisalRepository + 'static,
{
    appraisal_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/scores/sheet",
            axum::routing::post(sheet_score_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn sheet_score_endpoint(
    Json(payload): Json<SheetScoreRequest>,
) -> Result<Json<ScoreResult>, AppError> {
    let SheetScoreRequest {
        sheet_csv,
        template,
        feedback,
        formula,
    } = payload;

    let sheet = RatingSheet::from_reader(Cursor::new(sheet_csv.into_bytes()))?;
    let options = SheetScoring {
        template,
        feedback,
        formula,
    };
    Ok(Json(score_sheet(sheet, &options)?))
}
