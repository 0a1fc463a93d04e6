use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    AppraisalId, AppraisalRecord, CycleId, CycleRecord, FeedbackRecord, NewAppraisal, NewCycle,
    NewFeedback,
};
use super::repository::{AppraisalRepository, RepositoryError};
use super::service::{AppraisalService, AppraisalServiceError};
use crate::scoring::{calculate_all_scores, DomainError};

/// Router builder exposing cycle, appraisal, feedback, and scoring endpoints.
pub fn appraisal_router<R>(service: Arc<AppraisalService<R>>) -> Router
where
    R: AppraisalRepository + 'static,
{
    Router::new()
        .route("/api/v1/scores/calculate", post(calculate_handler))
        .route("/api/v1/cycles", post(create_cycle_handler::<R>))
        .route("/api/v1/cycles/:cycle_id/close", post(close_cycle_handler::<R>))
        .route("/api/v1/cycles/:cycle_id/report", get(cycle_report_handler::<R>))
        .route("/api/v1/appraisals", post(create_appraisal_handler::<R>))
        .route(
            "/api/v1/appraisals/:appraisal_id/feedback",
            post(record_feedback_handler::<R>),
        )
        .route(
            "/api/v1/appraisals/:appraisal_id/score",
            get(score_handler::<R>),
        )
        .route(
            "/api/v1/appraisals/:appraisal_id/submit",
            post(submit_handler::<R>),
        )
        .with_state(service)
}

/// Inputs for a one-off computation that touches no stored records.
#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub appraisal: AppraisalRecord,
    pub cycle: CycleRecord,
    #[serde(default)]
    pub feedback: Vec<FeedbackRecord>,
}

pub(crate) async fn calculate_handler(axum::Json(request): axum::Json<CalculateRequest>) -> Response {
    match calculate_all_scores(&request.appraisal, &request.cycle, &request.feedback) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => domain_error_response(&error),
    }
}

pub(crate) async fn create_cycle_handler<R>(
    State(service): State<Arc<AppraisalService<R>>>,
    axum::Json(new_cycle): axum::Json<NewCycle>,
) -> Response
where
    R: AppraisalRepository + 'static,
{
    match service.create_cycle(new_cycle) {
        Ok(cycle) => (StatusCode::CREATED, axum::Json(cycle)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn close_cycle_handler<R>(
    State(service): State<Arc<AppraisalService<R>>>,
    Path(cycle_id): Path<String>,
) -> Response
where
    R: AppraisalRepository + 'static,
{
    match service.close_cycle(&CycleId(cycle_id)) {
        Ok(cycle) => (StatusCode::OK, axum::Json(cycle)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn cycle_report_handler<R>(
    State(service): State<Arc<AppraisalService<R>>>,
    Path(cycle_id): Path<String>,
) -> Response
where
    R: AppraisalRepository + 'static,
{
    match service.cycle_report(&CycleId(cycle_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn create_appraisal_handler<R>(
    State(service): State<Arc<AppraisalService<R>>>,
    axum::Json(new_appraisal): axum::Json<NewAppraisal>,
) -> Response
where
    R: AppraisalRepository + 'static,
{
    match service.create_appraisal(new_appraisal) {
        Ok(appraisal) => (StatusCode::CREATED, axum::Json(appraisal)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn record_feedback_handler<R>(
    State(service): State<Arc<AppraisalService<R>>>,
    Path(appraisal_id): Path<String>,
    axum::Json(new_feedback): axum::Json<NewFeedback>,
) -> Response
where
    R: AppraisalRepository + 'static,
{
    match service.record_feedback(&AppraisalId(appraisal_id), new_feedback) {
        Ok(feedback) => (StatusCode::CREATED, axum::Json(feedback)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn score_handler<R>(
    State(service): State<Arc<AppraisalService<R>>>,
    Path(appraisal_id): Path<String>,
) -> Response
where
    R: AppraisalRepository + 'static,
{
    match service.score(&AppraisalId(appraisal_id)) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<AppraisalService<R>>>,
    Path(appraisal_id): Path<String>,
) -> Response
where
    R: AppraisalRepository + 'static,
{
    match service.submit(&AppraisalId(appraisal_id)) {
        Ok(appraisal) => (StatusCode::OK, axum::Json(appraisal)).into_response(),
        Err(error) => service_error_response(error),
    }
}

fn domain_error_response(error: &DomainError) -> Response {
    let payload = json!({
        "error": error.to_string(),
        "kind": error.kind(),
    });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

/// HTTP status for a service failure; shared with `AppError` responses.
pub(crate) fn service_error_status(error: &AppraisalServiceError) -> StatusCode {
    match error {
        AppraisalServiceError::Domain(_) => StatusCode::BAD_REQUEST,
        AppraisalServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AppraisalServiceError::Repository(RepositoryError::Conflict)
        | AppraisalServiceError::CycleClosed(_)
        | AppraisalServiceError::InvalidTransition { .. } => StatusCode::CONFLICT,
        AppraisalServiceError::InvalidCycleWindow => StatusCode::UNPROCESSABLE_ENTITY,
        AppraisalServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn service_error_response(error: AppraisalServiceError) -> Response {
    if let AppraisalServiceError::Domain(domain) = &error {
        return domain_error_response(domain);
    }
    let payload = json!({
        "error": error.to_string(),
    });
    (service_error_status(&error), axum::Json(payload)).into_response()
}
