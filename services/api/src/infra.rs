use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use metrics_exporter_prometheus::PrometheusHandle;
use perf_review::appraisals::{
    AppraisalId, AppraisalRecord, AppraisalStatus, CycleId, CycleRecord, CycleScoring,
    CycleStatus, FeedbackId, FeedbackRecord, FeedbackRelationship, FeedbackStatus, RatingSheet,
    TemplateKind,
};
use perf_review::error::AppError;
use perf_review::scoring::{calculate_all_scores, ScoreResult};
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum TemplateArg {
    #[default]
    Standard,
    Merit,
}

impl From<TemplateArg> for TemplateKind {
    fn from(value: TemplateArg) -> Self {
        match value {
            TemplateArg::Standard => TemplateKind::Standard,
            TemplateArg::Merit => TemplateKind::Merit,
        }
    }
}

/// Options for scoring a rating sheet outside any stored cycle.
#[derive(Debug, Clone, Default)]
pub(crate) struct SheetScoring {
    pub(crate) template: TemplateArg,
    pub(crate) feedback: Vec<f64>,
    pub(crate) formula: Option<String>,
}

/// Score a rating sheet against a throwaway cycle. Feedback scores are on the 0–5 scale
/// and share the feedback category equally; merit sheets take no feedback.
pub(crate) fn score_sheet(
    sheet: RatingSheet,
    options: &SheetScoring,
) -> Result<ScoreResult, AppError> {
    if options.template == TemplateArg::Merit && !options.feedback.is_empty() {
        return Err(AppError::InvalidRequest(
            "feedback scores only apply to the standard template".to_string(),
        ));
    }
    let today = Local::now().date_naive();
    let cycle = CycleRecord {
        id: CycleId("adhoc".to_string()),
        name: "Ad hoc scoring".to_string(),
        template: options.template.into(),
        status: CycleStatus::Active,
        start_date: today,
        end_date: today,
        scoring: CycleScoring {
            formula: options.formula.clone(),
            ..CycleScoring::default()
        },
    };
    let appraisal = AppraisalRecord {
        id: AppraisalId("adhoc".to_string()),
        employee_id: "adhoc".to_string(),
        employee_name: "Ad hoc".to_string(),
        cycle_id: cycle.id.clone(),
        status: AppraisalStatus::Draft,
        kras: sheet.kras,
        self_ratings: sheet.self_ratings,
        kpis: sheet.kpis,
        competencies: sheet.competencies,
        culture: sheet.culture,
    };
    let feedback: Vec<FeedbackRecord> = options
        .feedback
        .iter()
        .enumerate()
        .map(|(index, score)| FeedbackRecord {
            id: FeedbackId(format!("fb-{:06}", index + 1)),
            appraisal_id: appraisal.id.clone(),
            reviewer_id: format!("reviewer-{}", index + 1),
            relationship: FeedbackRelationship::Peer,
            status: FeedbackStatus::Submitted,
            score: *score,
            max_score: 5.0,
            weight: None,
            submitted_on: Some(today),
        })
        .collect();

    Ok(calculate_all_scores(&appraisal, &cycle, &feedback)?)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use perf_review::appraisals::RatedItem;
    use perf_review::scoring::PerformanceBand;

    fn sheet() -> RatingSheet {
        RatingSheet {
            kras: vec![
                RatedItem::new("kra-1", "Revenue growth", 40.0, 4.5, 5.0),
                RatedItem::new("kra-2", "Customer retention", 30.0, 4.0, 5.0),
                RatedItem::new("kra-3", "Team development", 30.0, 4.2, 5.0),
            ],
            self_ratings: vec![RatedItem::new("crit-1", "Ownership", 100.0, 3.5, 5.0)],
            ..RatingSheet::default()
        }
    }

    #[test]
    fn scores_sheet_with_feedback() {
        let options = SheetScoring {
            feedback: vec![4.0, 5.0],
            ..SheetScoring::default()
        };
        let result = score_sheet(sheet(), &options).expect("scores");
        assert!((result.final_score - 4.156).abs() < 1e-9);
        assert_eq!(result.band, PerformanceBand::Good);
    }

    #[test]
    fn surfaces_formula_errors() {
        let options = SheetScoring {
            formula: Some("bogus_score * 0.5".to_string()),
            ..SheetScoring::default()
        };
        assert!(matches!(
            score_sheet(sheet(), &options),
            Err(AppError::Scoring(_))
        ));
    }

    #[test]
    fn rejects_feedback_on_merit_sheets() {
        let options = SheetScoring {
            template: TemplateArg::Merit,
            feedback: vec![4.0],
            ..SheetScoring::default()
        };
        match score_sheet(RatingSheet::default(), &options) {
            Err(AppError::InvalidRequest(reason)) => assert!(reason.contains("standard")),
            other => panic!("expected invalid request, got {other:?}"),
        }
    }

    #[test]
    fn parse_date_reports_bad_input() {
        assert!(parse_date("2025-13-01").is_err());
        assert_eq!(
            parse_date(" 2025-01-31 ").expect("parses"),
            NaiveDate::from_ymd_opt(2025, 1, 31).expect("valid")
        );
    }
}
