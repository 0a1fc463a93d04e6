use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::appraisals::domain::{
    AppraisalId, AppraisalRecord, CycleId, CycleRecord, CycleScoring, FeedbackRecord,
    FeedbackRelationship, NewAppraisal, NewCycle, NewFeedback, RatedItem, TemplateKind,
};
use crate::appraisals::repository::{
    AppraisalRepository, InMemoryAppraisalRepository, RepositoryError,
};
use crate::appraisals::{appraisal_router, AppraisalService, ScoringDefaults};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

pub(super) fn new_cycle(template: TemplateKind) -> NewCycle {
    NewCycle {
        name: "FY25 Annual Review".to_string(),
        template,
        start_date: date(2025, 1, 1),
        end_date: date(2025, 12, 31),
        scoring: None,
    }
}

pub(super) fn cycle_with_scoring(scoring: CycleScoring) -> NewCycle {
    NewCycle {
        scoring: Some(scoring),
        ..new_cycle(TemplateKind::Standard)
    }
}

/// Goal 4.26, self 3.5 on the five-point scale.
pub(super) fn new_appraisal(cycle_id: &CycleId) -> NewAppraisal {
    NewAppraisal {
        employee_id: "emp-42".to_string(),
        employee_name: "Jordan Lee".to_string(),
        cycle_id: cycle_id.clone(),
        kras: vec![
            RatedItem::new("kra-1", "Revenue growth", 40.0, 4.5, 5.0),
            RatedItem::new("kra-2", "Customer retention", 30.0, 4.0, 5.0),
            RatedItem::new("kra-3", "Team development", 30.0, 4.2, 5.0),
        ],
        self_ratings: vec![
            RatedItem::new("crit-1", "Ownership", 50.0, 4.0, 5.0),
            RatedItem::new("crit-2", "Collaboration", 50.0, 3.0, 5.0),
        ],
        kpis: Vec::new(),
        competencies: Vec::new(),
        culture: Vec::new(),
    }
}

/// KPI 89.2, competency 80, culture 75 on the percentage scale.
pub(super) fn new_merit_appraisal(cycle_id: &CycleId) -> NewAppraisal {
    NewAppraisal {
        kras: Vec::new(),
        self_ratings: Vec::new(),
        kpis: vec![
            RatedItem::new("kpi-1", "Quota attainment", 60.0, 92.0, 100.0),
            RatedItem::new("kpi-2", "Pipeline coverage", 40.0, 85.0, 100.0),
        ],
        competencies: vec![RatedItem::new("comp-1", "Negotiation", 100.0, 4.0, 5.0)],
        culture: vec![RatedItem::new("cult-1", "Lives the values", 100.0, 3.0, 4.0)],
        ..new_appraisal(cycle_id)
    }
}

pub(super) fn new_feedback(reviewer: &str, score: f64) -> NewFeedback {
    NewFeedback {
        reviewer_id: reviewer.to_string(),
        relationship: FeedbackRelationship::Peer,
        score,
        max_score: 5.0,
        weight: None,
        submitted_on: Some(date(2025, 11, 14)),
    }
}

pub(super) fn build_service() -> (
    AppraisalService<InMemoryAppraisalRepository>,
    Arc<InMemoryAppraisalRepository>,
) {
    let repository = Arc::new(InMemoryAppraisalRepository::default());
    let service = AppraisalService::new(repository.clone(), ScoringDefaults::default());
    (service, repository)
}

/// Active standard cycle with one draft appraisal and no feedback yet.
pub(super) fn seeded_service() -> (
    AppraisalService<InMemoryAppraisalRepository>,
    CycleRecord,
    AppraisalRecord,
) {
    let (service, _) = build_service();
    let cycle = service
        .create_cycle(new_cycle(TemplateKind::Standard))
        .expect("cycle opens");
    let appraisal = service
        .create_appraisal(new_appraisal(&cycle.id))
        .expect("appraisal created");
    (service, cycle, appraisal)
}

pub(super) struct UnavailableRepository;

impl AppraisalRepository for UnavailableRepository {
    fn insert_cycle(&self, _cycle: CycleRecord) -> Result<CycleRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_cycle(&self, _id: &CycleId) -> Result<Option<CycleRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_cycle(&self, _cycle: CycleRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_appraisal(
        &self,
        _appraisal: AppraisalRecord,
    ) -> Result<AppraisalRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_appraisal(&self, _appraisal: AppraisalRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_appraisal(
        &self,
        _id: &AppraisalId,
    ) -> Result<Option<AppraisalRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_appraisals(&self, _cycle_id: &CycleId) -> Result<Vec<AppraisalRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn add_feedback(&self, _feedback: FeedbackRecord) -> Result<FeedbackRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn feedback_for(&self, _id: &AppraisalId) -> Result<Vec<FeedbackRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: AppraisalService<InMemoryAppraisalRepository>,
) -> axum::Router {
    appraisal_router(Arc::new(service))
}
