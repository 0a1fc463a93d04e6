use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::scoring::{Category, GoalWeights, MissingCategoryPolicy, ScoreScale, WeightedItem};

/// Identifier wrapper for appraisals.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AppraisalId(pub String);

/// Identifier wrapper for appraisal cycles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CycleId(pub String);

/// Identifier wrapper for 360-degree feedback entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeedbackId(pub String);

impl fmt::Display for AppraisalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn default_max_score() -> f64 {
    5.0
}

/// A KRA, rating criterion, KPI, competency, or culture item as entered on a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedItem {
    pub id: String,
    pub title: String,
    pub weight: f64,
    /// Zero means not yet rated.
    #[serde(default)]
    pub score: f64,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
}

impl RatedItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        weight: f64,
        score: f64,
        max_score: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            weight,
            score,
            max_score,
        }
    }

    pub fn to_weighted(&self) -> WeightedItem {
        WeightedItem::new(self.id.clone(), self.weight, self.score, self.max_score)
    }
}

/// Appraisal template family, selecting the composite scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// KRA, self-rating, and feedback on the 0–5 scale.
    #[default]
    Standard,
    /// KPI achievement, competency, and culture on the 0–100 scale.
    Merit,
}

impl TemplateKind {
    pub const fn label(self) -> &'static str {
        match self {
            TemplateKind::Standard => "standard",
            TemplateKind::Merit => "merit",
        }
    }

    /// Categories a cycle of this template scores, in blend order.
    pub const fn categories(self) -> [Category; 3] {
        match self {
            TemplateKind::Standard => [Category::Goal, Category::SelfAssessment, Category::Feedback],
            TemplateKind::Merit => [Category::Kpi, Category::Competency, Category::Culture],
        }
    }

    pub const fn scale(self) -> ScoreScale {
        match self {
            TemplateKind::Standard => ScoreScale::FivePoint,
            TemplateKind::Merit => ScoreScale::Percentage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    Draft,
    Active,
    Closed,
}

impl CycleStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CycleStatus::Draft => "draft",
            CycleStatus::Active => "active",
            CycleStatus::Closed => "closed",
        }
    }
}

/// Cycle-level scoring configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleScoring {
    /// Goal/self/feedback weights; defaults to 60/20/20 when absent.
    #[serde(default)]
    pub weights: Option<GoalWeights>,
    /// Free-form override formula over the category variables.
    #[serde(default)]
    pub formula: Option<String>,
    #[serde(default)]
    pub missing_feedback: MissingCategoryPolicy,
}

impl CycleScoring {
    /// Formula text, ignoring blank strings left behind by forms.
    pub fn formula_source(&self) -> Option<&str> {
        self.formula
            .as_deref()
            .map(str::trim)
            .filter(|source| !source.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub id: CycleId,
    pub name: String,
    pub template: TemplateKind,
    pub status: CycleStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub scoring: CycleScoring,
}

/// Payload for opening a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCycle {
    pub name: String,
    #[serde(default)]
    pub template: TemplateKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Falls back to the configured scoring defaults.
    #[serde(default)]
    pub scoring: Option<CycleScoring>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppraisalStatus {
    Draft,
    Submitted,
    Completed,
}

impl AppraisalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AppraisalStatus::Draft => "draft",
            AppraisalStatus::Submitted => "submitted",
            AppraisalStatus::Completed => "completed",
        }
    }
}

/// Raw appraisal inputs. Scores are never stored here; they are recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppraisalRecord {
    pub id: AppraisalId,
    pub employee_id: String,
    pub employee_name: String,
    pub cycle_id: CycleId,
    pub status: AppraisalStatus,
    #[serde(default)]
    pub kras: Vec<RatedItem>,
    #[serde(default)]
    pub self_ratings: Vec<RatedItem>,
    #[serde(default)]
    pub kpis: Vec<RatedItem>,
    #[serde(default)]
    pub competencies: Vec<RatedItem>,
    #[serde(default)]
    pub culture: Vec<RatedItem>,
}

/// Payload for starting an appraisal inside a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppraisal {
    pub employee_id: String,
    pub employee_name: String,
    pub cycle_id: CycleId,
    #[serde(default)]
    pub kras: Vec<RatedItem>,
    #[serde(default)]
    pub self_ratings: Vec<RatedItem>,
    #[serde(default)]
    pub kpis: Vec<RatedItem>,
    #[serde(default)]
    pub competencies: Vec<RatedItem>,
    #[serde(default)]
    pub culture: Vec<RatedItem>,
}

impl NewAppraisal {
    /// Every rated item across all groups.
    pub fn rated_items(&self) -> impl Iterator<Item = &RatedItem> {
        self.kras
            .iter()
            .chain(&self.self_ratings)
            .chain(&self.kpis)
            .chain(&self.competencies)
            .chain(&self.culture)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackRelationship {
    Manager,
    Peer,
    DirectReport,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    Requested,
    Submitted,
    Declined,
}

impl FeedbackStatus {
    pub const fn label(self) -> &'static str {
        match self {
            FeedbackStatus::Requested => "requested",
            FeedbackStatus::Submitted => "submitted",
            FeedbackStatus::Declined => "declined",
        }
    }
}

/// One 360-degree feedback entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: FeedbackId,
    pub appraisal_id: AppraisalId,
    pub reviewer_id: String,
    pub relationship: FeedbackRelationship,
    pub status: FeedbackStatus,
    #[serde(default)]
    pub score: f64,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
    /// Explicit share of the feedback category; entries share it equally when no entry
    /// sets one.
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub submitted_on: Option<NaiveDate>,
}

/// Payload for recording feedback against an appraisal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeedback {
    pub reviewer_id: String,
    pub relationship: FeedbackRelationship,
    pub score: f64,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub submitted_on: Option<NaiveDate>,
}
