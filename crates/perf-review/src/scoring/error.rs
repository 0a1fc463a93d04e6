use super::formula::FormulaError;
use super::model::GroupKind;

/// Failures raised by the scoring engine.
///
/// Weight totals inside a group are reported through `is_weight_valid` during
/// aggregation; `InvalidWeightTotal` is only produced by the strict checks callers opt
/// into (submission gates, composite weight validation).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("{}", describe_max_score(.item_id, .max_score))]
    InvalidMaxScore {
        item_id: Option<String>,
        max_score: f64,
    },
    #[error("invalid formula: {0}")]
    InvalidFormula(#[from] FormulaError),
    #[error("{scope} weights total {total:.3}, expected {expected}")]
    InvalidWeightTotal {
        scope: WeightScope,
        total: f64,
        expected: f64,
    },
}

impl DomainError {
    /// Stable machine-readable kind, shared with API payloads.
    pub const fn kind(&self) -> &'static str {
        match self {
            DomainError::InvalidMaxScore { .. } => "invalid-max-score",
            DomainError::InvalidFormula(_) => "invalid-formula",
            DomainError::InvalidWeightTotal { .. } => "invalid-weight-total",
        }
    }
}

/// Where a weight-total violation was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightScope {
    Group(GroupKind),
    Composite,
}

impl std::fmt::Display for WeightScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightScope::Group(kind) => write!(f, "{} group", kind.label()),
            WeightScope::Composite => write!(f, "composite"),
        }
    }
}

fn describe_max_score(item_id: &Option<String>, max_score: &f64) -> String {
    match item_id {
        Some(id) => format!("item {id} has invalid max score {max_score}; must be greater than zero"),
        None => format!("invalid max score {max_score}; must be greater than zero"),
    }
}
