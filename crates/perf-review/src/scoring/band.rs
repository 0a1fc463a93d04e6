use serde::{Deserialize, Serialize};

use super::model::ScoreScale;

/// Lower bounds (inclusive) of each band on one scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandThresholds {
    pub excellent: f64,
    pub good: f64,
    pub average: f64,
}

pub const FIVE_POINT_THRESHOLDS: BandThresholds = BandThresholds {
    excellent: 4.5,
    good: 3.5,
    average: 2.5,
};

pub const PERCENTAGE_THRESHOLDS: BandThresholds = BandThresholds {
    excellent: 90.0,
    good: 80.0,
    average: 70.0,
};

impl BandThresholds {
    pub const fn for_scale(scale: ScoreScale) -> Self {
        match scale {
            ScoreScale::FivePoint => FIVE_POINT_THRESHOLDS,
            ScoreScale::Percentage => PERCENTAGE_THRESHOLDS,
        }
    }
}

/// Ordered performance tiers, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl PerformanceBand {
    pub const ORDERED: [PerformanceBand; 4] = [
        PerformanceBand::Excellent,
        PerformanceBand::Good,
        PerformanceBand::Average,
        PerformanceBand::NeedsImprovement,
    ];

    pub fn classify(score: f64, scale: ScoreScale) -> Self {
        let thresholds = BandThresholds::for_scale(scale);
        if score >= thresholds.excellent {
            PerformanceBand::Excellent
        } else if score >= thresholds.good {
            PerformanceBand::Good
        } else if score >= thresholds.average {
            PerformanceBand::Average
        } else {
            PerformanceBand::NeedsImprovement
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "Excellent",
            PerformanceBand::Good => "Good",
            PerformanceBand::Average => "Average",
            PerformanceBand::NeedsImprovement => "Needs Improvement",
        }
    }

    /// Severity colour token used by dashboard badges.
    pub const fn color_token(self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "success",
            PerformanceBand::Good => "info",
            PerformanceBand::Average => "warning",
            PerformanceBand::NeedsImprovement => "danger",
        }
    }
}
