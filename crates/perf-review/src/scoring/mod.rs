//! Performance score aggregation engine.
//!
//! Three pure stages: the normalizer turns one rating into a weighted contribution, the
//! aggregator sums a group and checks its weights against 100, and the composite
//! calculator blends category totals into a final score and performance band.
//! [`calculate_all_scores`] runs the whole pipeline for one appraisal.

mod aggregator;
mod band;
mod composite;
mod engine;
mod error;
pub mod formula;
mod model;
mod normalizer;

pub use aggregator::{
    aggregate_group, ensure_weight_total, is_weight_total_valid, WEIGHT_TOLERANCE, WEIGHT_TOTAL,
};
pub use band::{BandThresholds, PerformanceBand, FIVE_POINT_THRESHOLDS, PERCENTAGE_THRESHOLDS};
pub use composite::{
    calculate_composite, CompositeScheme, CompositeScore, GoalWeights, MissingCategoryPolicy,
    COMPOSITE_WEIGHT_TOLERANCE, MERIT_COMPETENCY_WEIGHT, MERIT_CULTURE_WEIGHT, MERIT_KPI_WEIGHT,
};
pub use engine::calculate_all_scores;
pub(crate) use engine::cycle_formula;
pub use error::{DomainError, WeightScope};
pub use formula::{Formula, FormulaError};
pub use model::{
    Category, CategoryScores, GroupAggregate, GroupBreakdown, GroupKind, ItemScore,
    ScoreResult, ScoreScale, ScoredGroup, WeightedItem,
};
pub use normalizer::normalize_rating;
