use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::appraisals::domain::{AppraisalRecord, CycleRecord, CycleScoring, TemplateKind};
use crate::appraisals::router::{self, CalculateRequest};
use crate::appraisals::{AppraisalService, ScoringDefaults};

fn json_request(method: &str, uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).expect("payload encodes")))
        .expect("request builds")
}

fn stored_inputs() -> (CycleRecord, AppraisalRecord) {
    let (service, cycle, appraisal) = seeded_service();
    let appraisal = service.get_appraisal(&appraisal.id).expect("stored");
    (cycle, appraisal)
}

#[tokio::test]
async fn calculate_route_scores_posted_records() {
    let (cycle, appraisal) = stored_inputs();
    let (service, _) = build_service();
    let router = router_with_service(service);

    let payload = json!({
        "appraisal": appraisal,
        "cycle": cycle,
        "feedback": [],
    });
    let response = router
        .oneshot(json_request("POST", "/api/v1/scores/calculate", &payload))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["band"], "average");
    assert_eq!(body["scale"], "five_point");
    assert_eq!(body["is_weight_valid"], true);
    let final_score = body["final_score"].as_f64().expect("numeric score");
    assert!(close(final_score, 3.256));
}

#[tokio::test]
async fn calculate_handler_rejects_invalid_max_score() {
    let (cycle, mut appraisal) = stored_inputs();
    appraisal.kras[0].max_score = 0.0;

    let response = router::calculate_handler(axum::Json(CalculateRequest {
        appraisal,
        cycle,
        feedback: Vec::new(),
    }))
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "invalid-max-score");
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("kra-1"));
}

#[tokio::test]
async fn calculate_handler_rejects_unknown_formula_identifiers() {
    let (mut cycle, appraisal) = stored_inputs();
    cycle.scoring.formula = Some("bogus_score * 0.5".to_string());

    let response = router::calculate_handler(axum::Json(CalculateRequest {
        appraisal,
        cycle,
        feedback: Vec::new(),
    }))
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "invalid-formula");
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("bogus_score"));
    assert!(body.get("final_score").is_none());
}

#[tokio::test]
async fn calculate_route_rejects_deeply_nested_formulas() {
    let (cycle, appraisal) = stored_inputs();
    let (service, _) = build_service();
    let router = router_with_service(service);
    let formula = format!("{}goal_score{}", "(".repeat(200_000), ")".repeat(200_000));

    let mut payload = json!({
        "appraisal": appraisal,
        "cycle": cycle,
        "feedback": [],
    });
    payload["cycle"]["scoring"]["formula"] = Value::String(formula);
    let response = router
        .oneshot(json_request("POST", "/api/v1/scores/calculate", &payload))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "invalid-formula");
}

#[tokio::test]
async fn create_cycle_handler_rejects_formula_for_other_template() {
    let (service, _) = build_service();
    let mut cycle = new_cycle(TemplateKind::Merit);
    cycle.scoring = Some(CycleScoring {
        formula: Some("goal_score * 1".to_string()),
        ..CycleScoring::default()
    });

    let response = router::create_cycle_handler(State(Arc::new(service)), axum::Json(cycle)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "invalid-formula");
}

#[tokio::test]
async fn closed_cycle_rejects_new_appraisals() {
    let (service, cycle, _) = seeded_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/cycles/{}/close", cycle.id),
            &json!({}),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await["status"], "closed");

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/appraisals",
            &serde_json::to_value(new_appraisal(&cycle.id)).expect("encodes"),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn cycle_and_appraisal_routes_drive_the_workflow() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/cycles",
            &serde_json::to_value(new_cycle(TemplateKind::Standard)).expect("encodes"),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let cycle = read_json_body(response).await;
    let cycle_id = cycle["id"].as_str().expect("cycle id").to_string();

    let draft = new_appraisal(&crate::appraisals::CycleId(cycle_id.clone()));
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/appraisals",
            &serde_json::to_value(draft).expect("encodes"),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let appraisal = read_json_body(response).await;
    let appraisal_id = appraisal["id"].as_str().expect("appraisal id").to_string();

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/appraisals/{appraisal_id}/feedback"),
            &serde_json::to_value(new_feedback("mgr-7", 4.5)).expect("encodes"),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .clone()
        .oneshot(
            Request::get(format!("/api/v1/appraisals/{appraisal_id}/score"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let score = read_json_body(response).await;
    assert_eq!(score["band"], "good");
    let feedback = score["category_scores"]["feedback"]
        .as_f64()
        .expect("feedback category present");
    assert!(close(feedback, 4.5));

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/appraisals/{appraisal_id}/submit"),
            &json!({}),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await["status"], "submitted");

    let response = router
        .oneshot(
            Request::get(format!("/api/v1/cycles/{cycle_id}/report"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let report = read_json_body(response).await;
    assert_eq!(report["appraisal_count"], 1);
    assert_eq!(report["bands"][1]["count"], 1);
}

#[tokio::test]
async fn score_handler_returns_not_found_for_unknown_appraisal() {
    let (service, _) = build_service();

    let response = router::score_handler(State(Arc::new(service)), Path("apr-missing".to_string())).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submit_handler_returns_conflict_when_already_submitted() {
    let (service, _, appraisal) = seeded_service();
    let service = Arc::new(service);
    service.submit(&appraisal.id).expect("first submission");

    let response = router::submit_handler(State(service), Path(appraisal.id.0.clone())).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_cycle_handler_rejects_reversed_window() {
    let (service, _) = build_service();
    let mut cycle = new_cycle(TemplateKind::Standard);
    cycle.start_date = date(2026, 1, 1);

    let response = router::create_cycle_handler(State(Arc::new(service)), axum::Json(cycle)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn handlers_return_internal_error_on_repository_failure() {
    let service = Arc::new(AppraisalService::new(
        Arc::new(UnavailableRepository),
        ScoringDefaults::default(),
    ));

    let response = router::create_cycle_handler::<UnavailableRepository>(
        State(service),
        axum::Json(new_cycle(TemplateKind::Standard)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
