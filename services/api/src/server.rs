use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_appraisal_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use perf_review::appraisals::{AppraisalService, InMemoryAppraisalRepository};
use perf_review::config::AppConfig;
use perf_review::error::AppError;
use perf_review::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryAppraisalRepository::default());
    let appraisal_service = Arc::new(AppraisalService::new(
        repository,
        config.scoring.defaults(),
    ));

    let app = with_appraisal_routes(appraisal_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        environment = config.environment.label(),
        %addr,
        goal_weight = config.scoring.weights.goal,
        missing_feedback = ?config.scoring.missing_feedback,
        "appraisal scoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
