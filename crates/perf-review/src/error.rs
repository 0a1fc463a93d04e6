use crate::appraisals::router::service_error_status;
use crate::appraisals::{AppraisalServiceError, RatingImportError};
use crate::config::ConfigError;
use crate::scoring::DomainError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Scoring(DomainError),
    Appraisal(AppraisalServiceError),
    Import(RatingImportError),
    InvalidRequest(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Scoring(err) => write!(f, "scoring error: {}", err),
            AppError::Appraisal(err) => write!(f, "appraisal error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::InvalidRequest(reason) => write!(f, "invalid request: {}", reason),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Appraisal(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::InvalidRequest(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Scoring(_) | AppError::Import(_) | AppError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Appraisal(err) => service_error_status(err),
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<DomainError> for AppError {
    fn from(value: DomainError) -> Self {
        Self::Scoring(value)
    }
}

impl From<AppraisalServiceError> for AppError {
    fn from(value: AppraisalServiceError) -> Self {
        Self::Appraisal(value)
    }
}

impl From<RatingImportError> for AppError {
    fn from(value: RatingImportError) -> Self {
        Self::Import(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appraisals::{AppraisalId, CycleId, RepositoryError};

    #[test]
    fn maps_errors_to_status_codes() {
        let scoring = AppError::from(DomainError::InvalidMaxScore {
            item_id: Some("kra-1".to_string()),
            max_score: 0.0,
        });
        assert_eq!(scoring.into_response().status(), StatusCode::BAD_REQUEST);

        let missing = AppError::from(AppraisalServiceError::Repository(RepositoryError::NotFound));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let transition = AppError::from(AppraisalServiceError::InvalidTransition {
            appraisal_id: AppraisalId("apr-000001".to_string()),
            status: crate::appraisals::AppraisalStatus::Completed,
        });
        assert_eq!(transition.into_response().status(), StatusCode::CONFLICT);

        let closed = AppError::from(AppraisalServiceError::CycleClosed(CycleId(
            "cycle-0001".to_string(),
        )));
        assert_eq!(closed.into_response().status(), StatusCode::CONFLICT);

        let window = AppError::from(AppraisalServiceError::InvalidCycleWindow);
        assert_eq!(
            window.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let outage = AppError::from(AppraisalServiceError::Repository(
            RepositoryError::Unavailable("database offline".to_string()),
        ));
        assert_eq!(
            outage.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let request = AppError::InvalidRequest("bad combination".to_string());
        assert_eq!(request.into_response().status(), StatusCode::BAD_REQUEST);

        let config = AppError::from(ConfigError::InvalidPort);
        assert_eq!(
            config.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn display_prefixes_the_source_layer() {
        let error = AppError::from(ConfigError::InvalidPort);
        assert_eq!(
            error.to_string(),
            "configuration error: APP_PORT must be a valid u16"
        );
    }
}
