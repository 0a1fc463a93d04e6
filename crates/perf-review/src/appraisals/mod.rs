//! Appraisal cycles, appraisals, and 360-degree feedback wired to the scoring engine.
//!
//! Records hold raw inputs only. Every score view, submission check, and cycle report
//! is recomputed from those inputs through [`crate::scoring::calculate_all_scores`].

pub mod domain;
pub mod import;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AppraisalId, AppraisalRecord, AppraisalStatus, CycleId, CycleRecord, CycleScoring,
    CycleStatus, FeedbackId, FeedbackRecord, FeedbackRelationship, FeedbackStatus,
    NewAppraisal, NewCycle, NewFeedback, RatedItem, TemplateKind,
};
pub use import::{RatingImportError, RatingSheet};
pub use report::{BandCount, CycleReport};
pub use repository::{AppraisalRepository, InMemoryAppraisalRepository, RepositoryError};
pub use router::appraisal_router;
pub use service::{AppraisalService, AppraisalServiceError, ScoringDefaults};
