use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{AppraisalId, AppraisalRecord, CycleId, CycleRecord, FeedbackRecord};

/// Storage abstraction so the service can be exercised in isolation.
pub trait AppraisalRepository: Send + Sync {
    fn insert_cycle(&self, cycle: CycleRecord) -> Result<CycleRecord, RepositoryError>;
    fn fetch_cycle(&self, id: &CycleId) -> Result<Option<CycleRecord>, RepositoryError>;
    fn update_cycle(&self, cycle: CycleRecord) -> Result<(), RepositoryError>;
    fn insert_appraisal(
        &self,
        appraisal: AppraisalRecord,
    ) -> Result<AppraisalRecord, RepositoryError>;
    fn update_appraisal(&self, appraisal: AppraisalRecord) -> Result<(), RepositoryError>;
    fn fetch_appraisal(&self, id: &AppraisalId)
        -> Result<Option<AppraisalRecord>, RepositoryError>;
    fn list_appraisals(&self, cycle_id: &CycleId) -> Result<Vec<AppraisalRecord>, RepositoryError>;
    fn add_feedback(&self, feedback: FeedbackRecord) -> Result<FeedbackRecord, RepositoryError>;
    fn feedback_for(&self, id: &AppraisalId) -> Result<Vec<FeedbackRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
struct Tables {
    cycles: BTreeMap<CycleId, CycleRecord>,
    appraisals: BTreeMap<AppraisalId, AppraisalRecord>,
    feedback: BTreeMap<AppraisalId, Vec<FeedbackRecord>>,
}

/// Process-local store, constructed by the entry point and shared through `Arc`.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAppraisalRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryAppraisalRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl AppraisalRepository for InMemoryAppraisalRepository {
    fn insert_cycle(&self, cycle: CycleRecord) -> Result<CycleRecord, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.cycles.contains_key(&cycle.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.cycles.insert(cycle.id.clone(), cycle.clone());
        Ok(cycle)
    }

    fn fetch_cycle(&self, id: &CycleId) -> Result<Option<CycleRecord>, RepositoryError> {
        Ok(self.lock()?.cycles.get(id).cloned())
    }

    fn update_cycle(&self, cycle: CycleRecord) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        match tables.cycles.get_mut(&cycle.id) {
            Some(existing) => {
                *existing = cycle;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn insert_appraisal(
        &self,
        appraisal: AppraisalRecord,
    ) -> Result<AppraisalRecord, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.appraisals.contains_key(&appraisal.id) {
            return Err(RepositoryError::Conflict);
        }
        tables
            .appraisals
            .insert(appraisal.id.clone(), appraisal.clone());
        Ok(appraisal)
    }

    fn update_appraisal(&self, appraisal: AppraisalRecord) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        match tables.appraisals.get_mut(&appraisal.id) {
            Some(existing) => {
                *existing = appraisal;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_appraisal(
        &self,
        id: &AppraisalId,
    ) -> Result<Option<AppraisalRecord>, RepositoryError> {
        Ok(self.lock()?.appraisals.get(id).cloned())
    }

    fn list_appraisals(&self, cycle_id: &CycleId) -> Result<Vec<AppraisalRecord>, RepositoryError> {
        Ok(self
            .lock()?
            .appraisals
            .values()
            .filter(|appraisal| &appraisal.cycle_id == cycle_id)
            .cloned()
            .collect())
    }

    fn add_feedback(&self, feedback: FeedbackRecord) -> Result<FeedbackRecord, RepositoryError> {
        let mut tables = self.lock()?;
        let entries = tables
            .feedback
            .entry(feedback.appraisal_id.clone())
            .or_default();
        if entries.iter().any(|entry| entry.id == feedback.id) {
            return Err(RepositoryError::Conflict);
        }
        entries.push(feedback.clone());
        Ok(feedback)
    }

    fn feedback_for(&self, id: &AppraisalId) -> Result<Vec<FeedbackRecord>, RepositoryError> {
        Ok(self.lock()?.feedback.get(id).cloned().unwrap_or_default())
    }
}
