use serde::{Deserialize, Serialize};

use super::band::PerformanceBand;
use super::error::{DomainError, WeightScope};
use super::formula::Formula;
use super::model::{Category, CategoryScores, ScoreScale};

/// Composite weights must sum to one within this tolerance.
pub const COMPOSITE_WEIGHT_TOLERANCE: f64 = 0.001;

pub const MERIT_KPI_WEIGHT: f64 = 0.4;
pub const MERIT_COMPETENCY_WEIGHT: f64 = 0.3;
pub const MERIT_CULTURE_WEIGHT: f64 = 0.3;

/// Weights for the goal/self/feedback appraisal scheme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalWeights {
    pub goal: f64,
    #[serde(rename = "self")]
    pub self_assessment: f64,
    pub feedback: f64,
}

impl Default for GoalWeights {
    fn default() -> Self {
        Self {
            goal: 0.6,
            self_assessment: 0.2,
            feedback: 0.2,
        }
    }
}

impl GoalWeights {
    pub fn new(goal: f64, self_assessment: f64, feedback: f64) -> Result<Self, DomainError> {
        let weights = Self {
            goal,
            self_assessment,
            feedback,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn total(&self) -> f64 {
        self.goal + self.self_assessment + self.feedback
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let entries = [self.goal, self.self_assessment, self.feedback];
        let total = self.total();
        if entries.iter().all(|weight| weight.is_finite() && *weight >= 0.0)
            && (total - 1.0).abs() < COMPOSITE_WEIGHT_TOLERANCE
        {
            Ok(())
        } else {
            Err(DomainError::InvalidWeightTotal {
                scope: WeightScope::Composite,
                total,
                expected: 1.0,
            })
        }
    }

    fn entries(&self) -> [(Category, f64); 3] {
        [
            (Category::Goal, self.goal),
            (Category::SelfAssessment, self.self_assessment),
            (Category::Feedback, self.feedback),
        ]
    }
}

/// What to do with a weighted category that has no inputs at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCategoryPolicy {
    /// The category scores zero and keeps its weight.
    #[default]
    CountAsZero,
    /// The category is dropped and the remaining weights are rescaled to sum to one.
    RedistributeWeight,
}

/// How category scores are blended into the final score.
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeScheme {
    /// Goal/self/feedback blend on the 0–5 scale.
    GoalSelfFeedback {
        weights: GoalWeights,
        missing: MissingCategoryPolicy,
    },
    /// Fixed 40/30/30 KPI/competency/culture blend on the 0–100 scale.
    KpiCompetencyCulture,
    /// Cycle-level override evaluated against the category scores.
    Formula { formula: Formula, scale: ScoreScale },
}

impl CompositeScheme {
    pub const fn scale(&self) -> ScoreScale {
        match self {
            CompositeScheme::GoalSelfFeedback { .. } => ScoreScale::FivePoint,
            CompositeScheme::KpiCompetencyCulture => ScoreScale::Percentage,
            CompositeScheme::Formula { scale, .. } => *scale,
        }
    }
}

/// Final score plus its band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub final_score: f64,
    pub scale: ScoreScale,
    pub band: PerformanceBand,
}

/// Combine category scores (already on the scheme's scale) into a final score.
///
/// Categories absent from `category_scores` count as zero, except under
/// [`MissingCategoryPolicy::RedistributeWeight`] where their weight moves to the
/// categories that are present. Formulas require every variable they reference.
pub fn calculate_composite(
    category_scores: &CategoryScores,
    scheme: &CompositeScheme,
) -> Result<CompositeScore, DomainError> {
    let final_score = match scheme {
        CompositeScheme::GoalSelfFeedback { weights, missing } => {
            weights.validate()?;
            blend_goal_scheme(category_scores, weights, *missing)
        }
        CompositeScheme::KpiCompetencyCulture => {
            let score = |category: Category| category_scores.get(&category).copied().unwrap_or(0.0);
            score(Category::Kpi) * MERIT_KPI_WEIGHT
                + score(Category::Competency) * MERIT_COMPETENCY_WEIGHT
                + score(Category::Culture) * MERIT_CULTURE_WEIGHT
        }
        CompositeScheme::Formula { formula, .. } => formula.evaluate(category_scores)?,
    };

    let scale = scheme.scale();
    Ok(CompositeScore {
        final_score,
        scale,
        band: PerformanceBand::classify(final_score, scale),
    })
}

fn blend_goal_scheme(
    category_scores: &CategoryScores,
    weights: &GoalWeights,
    missing: MissingCategoryPolicy,
) -> f64 {
    match missing {
        MissingCategoryPolicy::CountAsZero => weights
            .entries()
            .into_iter()
            .map(|(category, weight)| {
                category_scores.get(&category).copied().unwrap_or(0.0) * weight
            })
            .sum(),
        MissingCategoryPolicy::RedistributeWeight => {
            let present: Vec<(f64, f64)> = weights
                .entries()
                .into_iter()
                .filter_map(|(category, weight)| {
                    category_scores.get(&category).map(|score| (*score, weight))
                })
                .collect();
            let present_weight: f64 = present.iter().map(|(_, weight)| weight).sum();
            if present_weight <= 0.0 {
                return 0.0;
            }
            present
                .iter()
                .map(|(score, weight)| score * weight / present_weight)
                .sum()
        }
    }
}
