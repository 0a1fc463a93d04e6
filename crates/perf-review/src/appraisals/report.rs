use serde::Serialize;

use super::domain::{AppraisalId, CycleId};
use crate::scoring::{PerformanceBand, ScoreResult, ScoreScale};

/// Headcount for one band in a cycle report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandCount {
    pub band: PerformanceBand,
    pub label: &'static str,
    pub color_token: &'static str,
    pub count: usize,
    /// Share of scored appraisals, 0–100.
    pub percentage: f64,
}

/// Dashboard summary of every appraisal in a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub cycle_id: CycleId,
    pub scale: ScoreScale,
    pub appraisal_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_final_score: Option<f64>,
    pub bands: Vec<BandCount>,
    pub invalid_weight_appraisals: Vec<AppraisalId>,
}

impl CycleReport {
    /// Summarize freshly computed results. Bands are always listed best first, including
    /// empty ones, so dashboards keep a stable layout.
    pub fn build(cycle_id: CycleId, scale: ScoreScale, results: &[(AppraisalId, ScoreResult)]) -> Self {
        let appraisal_count = results.len();
        let average_final_score = if appraisal_count == 0 {
            None
        } else {
            let total: f64 = results.iter().map(|(_, result)| result.final_score).sum();
            Some(total / appraisal_count as f64)
        };

        let bands = PerformanceBand::ORDERED
            .into_iter()
            .map(|band| {
                let count = results
                    .iter()
                    .filter(|(_, result)| result.band == band)
                    .count();
                let percentage = if appraisal_count == 0 {
                    0.0
                } else {
                    count as f64 / appraisal_count as f64 * 100.0
                };
                BandCount {
                    band,
                    label: band.label(),
                    color_token: band.color_token(),
                    count,
                    percentage,
                }
            })
            .collect();

        let invalid_weight_appraisals = results
            .iter()
            .filter(|(_, result)| !result.is_weight_valid)
            .map(|(id, _)| id.clone())
            .collect();

        Self {
            cycle_id,
            scale,
            appraisal_count,
            average_final_score,
            bands,
            invalid_weight_appraisals,
        }
    }

    pub fn count(&self, band: PerformanceBand) -> usize {
        self.bands
            .iter()
            .find(|entry| entry.band == band)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }
}
