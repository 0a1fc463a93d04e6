use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::domain::{
    AppraisalId, AppraisalRecord, AppraisalStatus, CycleId, CycleRecord, CycleScoring,
    CycleStatus, FeedbackId, FeedbackRecord, FeedbackStatus, NewAppraisal, NewCycle,
    NewFeedback,
};
use super::report::CycleReport;
use super::repository::{AppraisalRepository, RepositoryError};
use crate::scoring::{
    calculate_all_scores, cycle_formula, ensure_weight_total, normalize_rating, DomainError,
    GoalWeights, MissingCategoryPolicy, ScoreResult,
};

/// Scoring settings applied to cycles created without their own configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoringDefaults {
    pub weights: GoalWeights,
    pub missing_feedback: MissingCategoryPolicy,
}

impl ScoringDefaults {
    fn cycle_scoring(&self) -> CycleScoring {
        CycleScoring {
            weights: Some(self.weights),
            formula: None,
            missing_feedback: self.missing_feedback,
        }
    }
}

/// Service composing the repository with the scoring engine. Scores are recomputed from
/// stored inputs on every request.
pub struct AppraisalService<R> {
    repository: Arc<R>,
    defaults: ScoringDefaults,
    cycle_sequence: AtomicU64,
    appraisal_sequence: AtomicU64,
    feedback_sequence: AtomicU64,
}

impl<R> AppraisalService<R>
where
    R: AppraisalRepository + 'static,
{
    pub fn new(repository: Arc<R>, defaults: ScoringDefaults) -> Self {
        Self {
            repository,
            defaults,
            cycle_sequence: AtomicU64::new(1),
            appraisal_sequence: AtomicU64::new(1),
            feedback_sequence: AtomicU64::new(1),
        }
    }

    pub fn defaults(&self) -> &ScoringDefaults {
        &self.defaults
    }

    /// Open a cycle. Formulas and weights are validated up front so a broken cycle
    /// configuration never reaches scoring.
    pub fn create_cycle(&self, new_cycle: NewCycle) -> Result<CycleRecord, AppraisalServiceError> {
        if new_cycle.end_date < new_cycle.start_date {
            return Err(AppraisalServiceError::InvalidCycleWindow);
        }

        let scoring = new_cycle
            .scoring
            .unwrap_or_else(|| self.defaults.cycle_scoring());
        if let Some(source) = scoring.formula_source() {
            cycle_formula(source, new_cycle.template)?;
        }
        if let Some(weights) = &scoring.weights {
            weights.validate()?;
        }

        let id = CycleId(format!(
            "cycle-{:04}",
            self.cycle_sequence.fetch_add(1, Ordering::Relaxed)
        ));
        let cycle = CycleRecord {
            id,
            name: new_cycle.name,
            template: new_cycle.template,
            status: CycleStatus::Active,
            start_date: new_cycle.start_date,
            end_date: new_cycle.end_date,
            scoring,
        };

        let stored = self.repository.insert_cycle(cycle)?;
        info!(cycle_id = %stored.id, template = stored.template.label(), "appraisal cycle opened");
        Ok(stored)
    }

    pub fn get_cycle(&self, cycle_id: &CycleId) -> Result<CycleRecord, AppraisalServiceError> {
        let cycle = self
            .repository
            .fetch_cycle(cycle_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(cycle)
    }

    /// Close a cycle. Closed cycles accept no new appraisals or feedback; stored
    /// appraisals stay readable and reportable.
    pub fn close_cycle(&self, cycle_id: &CycleId) -> Result<CycleRecord, AppraisalServiceError> {
        let mut cycle = self.get_cycle(cycle_id)?;
        if cycle.status == CycleStatus::Closed {
            return Err(AppraisalServiceError::CycleClosed(cycle.id));
        }

        cycle.status = CycleStatus::Closed;
        self.repository.update_cycle(cycle.clone())?;
        info!(cycle_id = %cycle.id, "appraisal cycle closed");
        Ok(cycle)
    }

    pub fn create_appraisal(
        &self,
        new_appraisal: NewAppraisal,
    ) -> Result<AppraisalRecord, AppraisalServiceError> {
        let cycle = self.get_cycle(&new_appraisal.cycle_id)?;
        if cycle.status == CycleStatus::Closed {
            return Err(AppraisalServiceError::CycleClosed(cycle.id));
        }
        for item in new_appraisal.rated_items() {
            normalize_rating(item.score, item.max_score, 1.0).map_err(|_| {
                DomainError::InvalidMaxScore {
                    item_id: Some(item.id.clone()),
                    max_score: item.max_score,
                }
            })?;
        }

        let id = AppraisalId(format!(
            "apr-{:06}",
            self.appraisal_sequence.fetch_add(1, Ordering::Relaxed)
        ));
        let appraisal = AppraisalRecord {
            id,
            employee_id: new_appraisal.employee_id,
            employee_name: new_appraisal.employee_name,
            cycle_id: cycle.id,
            status: AppraisalStatus::Draft,
            kras: new_appraisal.kras,
            self_ratings: new_appraisal.self_ratings,
            kpis: new_appraisal.kpis,
            competencies: new_appraisal.competencies,
            culture: new_appraisal.culture,
        };

        let stored = self.repository.insert_appraisal(appraisal)?;
        info!(appraisal_id = %stored.id, cycle_id = %stored.cycle_id, "appraisal created");
        Ok(stored)
    }

    pub fn get_appraisal(
        &self,
        appraisal_id: &AppraisalId,
    ) -> Result<AppraisalRecord, AppraisalServiceError> {
        let appraisal = self
            .repository
            .fetch_appraisal(appraisal_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(appraisal)
    }

    /// Record a submitted 360-degree feedback entry.
    pub fn record_feedback(
        &self,
        appraisal_id: &AppraisalId,
        new_feedback: NewFeedback,
    ) -> Result<FeedbackRecord, AppraisalServiceError> {
        let appraisal = self.get_appraisal(appraisal_id)?;
        if appraisal.status != AppraisalStatus::Draft {
            return Err(AppraisalServiceError::InvalidTransition {
                appraisal_id: appraisal.id,
                status: appraisal.status,
            });
        }
        let cycle = self.get_cycle(&appraisal.cycle_id)?;
        if cycle.status == CycleStatus::Closed {
            return Err(AppraisalServiceError::CycleClosed(cycle.id));
        }
        normalize_rating(new_feedback.score, new_feedback.max_score, 1.0)?;

        let id = FeedbackId(format!(
            "fb-{:06}",
            self.feedback_sequence.fetch_add(1, Ordering::Relaxed)
        ));
        let feedback = FeedbackRecord {
            id,
            appraisal_id: appraisal.id,
            reviewer_id: new_feedback.reviewer_id,
            relationship: new_feedback.relationship,
            status: FeedbackStatus::Submitted,
            score: new_feedback.score,
            max_score: new_feedback.max_score,
            weight: new_feedback.weight,
            submitted_on: new_feedback.submitted_on,
        };

        let stored = self.repository.add_feedback(feedback)?;
        debug!(appraisal_id = %stored.appraisal_id, feedback_id = %stored.id, "feedback recorded");
        Ok(stored)
    }

    /// Recompute the appraisal's scores from its stored inputs.
    pub fn score(&self, appraisal_id: &AppraisalId) -> Result<ScoreResult, AppraisalServiceError> {
        let appraisal = self.get_appraisal(appraisal_id)?;
        let cycle = self.get_cycle(&appraisal.cycle_id)?;
        self.score_record(&appraisal, &cycle)
    }

    /// Move a draft to submitted. Blocked while any rated group's weights are off.
    pub fn submit(&self, appraisal_id: &AppraisalId) -> Result<AppraisalRecord, AppraisalServiceError> {
        let mut appraisal = self.get_appraisal(appraisal_id)?;
        if appraisal.status != AppraisalStatus::Draft {
            return Err(AppraisalServiceError::InvalidTransition {
                appraisal_id: appraisal.id,
                status: appraisal.status,
            });
        }

        let cycle = self.get_cycle(&appraisal.cycle_id)?;
        let result = self.score_record(&appraisal, &cycle)?;
        if let Some(entry) = result
            .invalid_groups()
            .find(|entry| !entry.is_pending_feedback())
        {
            ensure_weight_total(entry.group.kind, &entry.group.items)?;
        }

        appraisal.status = AppraisalStatus::Submitted;
        self.repository.update_appraisal(appraisal.clone())?;
        info!(
            appraisal_id = %appraisal.id,
            final_score = result.final_score,
            band = result.band.label(),
            "appraisal submitted"
        );
        Ok(appraisal)
    }

    /// Close out a submitted appraisal.
    pub fn complete(&self, appraisal_id: &AppraisalId) -> Result<AppraisalRecord, AppraisalServiceError> {
        let mut appraisal = self.get_appraisal(appraisal_id)?;
        if appraisal.status != AppraisalStatus::Submitted {
            return Err(AppraisalServiceError::InvalidTransition {
                appraisal_id: appraisal.id,
                status: appraisal.status,
            });
        }

        appraisal.status = AppraisalStatus::Completed;
        self.repository.update_appraisal(appraisal.clone())?;
        Ok(appraisal)
    }

    pub fn cycle_report(&self, cycle_id: &CycleId) -> Result<CycleReport, AppraisalServiceError> {
        let cycle = self.get_cycle(cycle_id)?;
        let mut results = Vec::new();
        for appraisal in self.repository.list_appraisals(cycle_id)? {
            let result = self.score_record(&appraisal, &cycle)?;
            results.push((appraisal.id, result));
        }

        Ok(CycleReport::build(cycle.id, cycle.template.scale(), &results))
    }

    fn score_record(
        &self,
        appraisal: &AppraisalRecord,
        cycle: &CycleRecord,
    ) -> Result<ScoreResult, AppraisalServiceError> {
        let feedback = self.repository.feedback_for(&appraisal.id)?;
        let result = calculate_all_scores(appraisal, cycle, &feedback)?;

        for entry in result
            .invalid_groups()
            .filter(|entry| !entry.is_pending_feedback())
        {
            warn!(
                appraisal_id = %appraisal.id,
                group = entry.group.kind.label(),
                total_weight = entry.aggregate.total_weight,
                "group weights do not total 100"
            );
        }
        debug!(
            appraisal_id = %appraisal.id,
            final_score = result.final_score,
            band = result.band.label(),
            "appraisal scored"
        );
        Ok(result)
    }
}

/// Error raised by the appraisal service.
#[derive(Debug, thiserror::Error)]
pub enum AppraisalServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("cycle end date precedes its start date")]
    InvalidCycleWindow,
    #[error("cycle {0} is closed")]
    CycleClosed(CycleId),
    #[error("appraisal {appraisal_id} cannot change state while {}", .status.label())]
    InvalidTransition {
        appraisal_id: AppraisalId,
        status: AppraisalStatus,
    },
}
