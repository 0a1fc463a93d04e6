use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::band::PerformanceBand;

/// One weight-bearing rating: a KRA, rating criterion, competency, culture item, or
/// feedback entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedItem {
    pub id: String,
    /// Percentage points, 0–100.
    pub weight: f64,
    pub raw_score: f64,
    pub max_score: f64,
}

impl WeightedItem {
    pub fn new(id: impl Into<String>, weight: f64, raw_score: f64, max_score: f64) -> Self {
        Self {
            id: id.into(),
            weight,
            raw_score,
            max_score,
        }
    }
}

/// Logical grouping of rated items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Kra,
    SelfRating,
    Feedback,
    Kpi,
    Competency,
    Culture,
}

impl GroupKind {
    pub const fn label(self) -> &'static str {
        match self {
            GroupKind::Kra => "KRA",
            GroupKind::SelfRating => "Self rating",
            GroupKind::Feedback => "Feedback",
            GroupKind::Kpi => "KPI achievement",
            GroupKind::Competency => "Competency",
            GroupKind::Culture => "Culture",
        }
    }

    /// Composite category fed by this group.
    pub const fn category(self) -> Category {
        match self {
            GroupKind::Kra => Category::Goal,
            GroupKind::SelfRating => Category::SelfAssessment,
            GroupKind::Feedback => Category::Feedback,
            GroupKind::Kpi => Category::Kpi,
            GroupKind::Competency => Category::Competency,
            GroupKind::Culture => Category::Culture,
        }
    }
}

/// Ordered items of a single kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredGroup {
    pub kind: GroupKind,
    pub items: Vec<WeightedItem>,
}

impl ScoredGroup {
    pub fn new(kind: GroupKind, items: Vec<WeightedItem>) -> Self {
        Self { kind, items }
    }
}

/// Category totals combined by the composite calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Goal,
    #[serde(rename = "self")]
    SelfAssessment,
    Feedback,
    Kpi,
    Competency,
    Culture,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Goal,
        Category::SelfAssessment,
        Category::Feedback,
        Category::Kpi,
        Category::Competency,
        Category::Culture,
    ];

    /// Identifier the category is bound to inside composite formulas.
    pub const fn variable_name(self) -> &'static str {
        match self {
            Category::Goal => "goal_score",
            Category::SelfAssessment => "self_score",
            Category::Feedback => "feedback_score",
            Category::Kpi => "kpi_score",
            Category::Competency => "competency_score",
            Category::Culture => "culture_score",
        }
    }

    pub fn from_variable_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.variable_name() == name)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Category::Goal => "Goal",
            Category::SelfAssessment => "Self assessment",
            Category::Feedback => "Feedback",
            Category::Kpi => "KPI achievement",
            Category::Competency => "Competency",
            Category::Culture => "Culture",
        }
    }
}

/// Category totals keyed by category, already rescaled onto the composite scale.
pub type CategoryScores = BTreeMap<Category, f64>;

/// Scale every category total is projected onto before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
    /// 0–5, used by the goal/self/feedback appraisal path.
    FivePoint,
    /// 0–100, used by the KPI merit path.
    Percentage,
}

impl ScoreScale {
    pub const fn max(self) -> f64 {
        match self {
            ScoreScale::FivePoint => 5.0,
            ScoreScale::Percentage => 100.0,
        }
    }

    /// Project a weight-point total (0–100) onto this scale.
    pub fn rescale(self, weight_points: f64) -> f64 {
        weight_points / super::aggregator::WEIGHT_TOTAL * self.max()
    }
}

/// Weighted contribution of one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemScore {
    pub id: String,
    pub weighted_score: f64,
}

/// Output of aggregating one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAggregate {
    /// Sum of weighted contributions in weight points (0–100 for valid groups).
    pub total_score: f64,
    pub total_weight: f64,
    pub is_weight_valid: bool,
    pub per_item: Vec<ItemScore>,
}

/// Per-group slice of a [`ScoreResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBreakdown {
    pub group: ScoredGroup,
    /// Group total rescaled onto the result's scale.
    pub category_score: f64,
    #[serde(flatten)]
    pub aggregate: GroupAggregate,
}

impl GroupBreakdown {
    /// Feedback group with no submitted entries yet.
    pub fn is_pending_feedback(&self) -> bool {
        self.group.kind == GroupKind::Feedback && self.group.items.is_empty()
    }
}

/// Full recomputation of an appraisal's scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub category_scores: CategoryScores,
    pub breakdown: Vec<GroupBreakdown>,
    pub final_score: f64,
    pub scale: ScoreScale,
    pub band: PerformanceBand,
    pub is_weight_valid: bool,
}

impl ScoreResult {
    pub fn group(&self, kind: GroupKind) -> Option<&GroupBreakdown> {
        self.breakdown.iter().find(|entry| entry.group.kind == kind)
    }

    /// Groups whose weights do not total 100.
    pub fn invalid_groups(&self) -> impl Iterator<Item = &GroupBreakdown> {
        self.breakdown
            .iter()
            .filter(|entry| !entry.aggregate.is_weight_valid)
    }
}
