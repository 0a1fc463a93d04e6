use crate::infra::{score_sheet, SheetScoring, TemplateArg};
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use perf_review::appraisals::{
    AppraisalService, CycleReport, CycleScoring, FeedbackRelationship,
    InMemoryAppraisalRepository, NewAppraisal, NewCycle, NewFeedback, RatedItem, RatingSheet,
    ScoringDefaults, TemplateKind,
};
use perf_review::error::AppError;
use perf_review::scoring::{MissingCategoryPolicy, ScoreResult};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// CSV rating sheet with Group, Item ID, Title, Weight, Score, Max Score columns
    #[arg(long)]
    pub(crate) sheet: PathBuf,
    /// 360-degree feedback score on the 0-5 scale (repeatable)
    #[arg(long)]
    pub(crate) feedback: Vec<f64>,
    /// Override formula, e.g. "(goal_score + self_score) / 2"
    #[arg(long)]
    pub(crate) formula: Option<String>,
    /// Appraisal template deciding which groups are scored
    #[arg(long, value_enum, default_value_t = TemplateArg::Standard)]
    pub(crate) template: TemplateArg,
    /// Print the full result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Cycle start date (YYYY-MM-DD). Defaults to January 1st of the current year.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) cycle_start: Option<NaiveDate>,
    /// Drop missing feedback from the blend instead of scoring it as zero.
    #[arg(long)]
    pub(crate) redistribute: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        sheet,
        feedback,
        formula,
        template,
        json,
    } = args;

    let sheet = RatingSheet::from_path(&sheet)?;
    let options = SheetScoring {
        template,
        feedback,
        formula,
    };
    let result = score_sheet(sheet, &options)?;

    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Score payload unavailable: {err}"),
        }
    } else {
        render_score(&result);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        cycle_start,
        redistribute,
    } = args;

    let start_date = cycle_start.unwrap_or_else(|| {
        let today = Local::now().date_naive();
        NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today)
    });
    let end_date = start_date
        .checked_add_signed(chrono::Duration::days(364))
        .unwrap_or(start_date);

    let service = AppraisalService::new(
        Arc::new(InMemoryAppraisalRepository::default()),
        ScoringDefaults::default(),
    );

    println!("Performance appraisal demo");
    let cycle = service.create_cycle(NewCycle {
        name: format!("FY{} Annual Review", start_date.year()),
        template: TemplateKind::Standard,
        start_date,
        end_date,
        scoring: Some(CycleScoring {
            missing_feedback: if redistribute {
                MissingCategoryPolicy::RedistributeWeight
            } else {
                MissingCategoryPolicy::CountAsZero
            },
            ..CycleScoring::default()
        }),
    })?;
    println!(
        "Cycle {} ({}) {} -> {}",
        cycle.id, cycle.name, cycle.start_date, cycle.end_date
    );

    let employees = [
        ("emp-101", "Avery Chen", [4.5, 4.0, 4.2], [4.0, 3.0], vec![4.0, 5.0]),
        ("emp-102", "Sam Patel", [3.5, 3.0, 4.0], [3.5, 3.5], vec![3.0]),
        ("emp-103", "Riley Moreno", [5.0, 4.5, 4.8], [4.5, 5.0], Vec::new()),
    ];

    for (employee_id, name, kra_scores, self_scores, feedback) in employees {
        let appraisal = service.create_appraisal(NewAppraisal {
            employee_id: employee_id.to_string(),
            employee_name: name.to_string(),
            cycle_id: cycle.id.clone(),
            kras: vec![
                RatedItem::new("kra-1", "Revenue growth", 40.0, kra_scores[0], 5.0),
                RatedItem::new("kra-2", "Customer retention", 30.0, kra_scores[1], 5.0),
                RatedItem::new("kra-3", "Team development", 30.0, kra_scores[2], 5.0),
            ],
            self_ratings: vec![
                RatedItem::new("crit-1", "Ownership", 50.0, self_scores[0], 5.0),
                RatedItem::new("crit-2", "Collaboration", 50.0, self_scores[1], 5.0),
            ],
            kpis: Vec::new(),
            competencies: Vec::new(),
            culture: Vec::new(),
        })?;

        for (index, score) in feedback.into_iter().enumerate() {
            service.record_feedback(
                &appraisal.id,
                NewFeedback {
                    reviewer_id: format!("{employee_id}-reviewer-{}", index + 1),
                    relationship: if index == 0 {
                        FeedbackRelationship::Manager
                    } else {
                        FeedbackRelationship::Peer
                    },
                    score,
                    max_score: 5.0,
                    weight: None,
                    submitted_on: Some(end_date),
                },
            )?;
        }

        let result = service.score(&appraisal.id)?;
        println!("\n{} ({}) -> appraisal {}", name, employee_id, appraisal.id);
        render_score(&result);

        match service.submit(&appraisal.id) {
            Ok(submitted) => println!("  Status: {}", submitted.status.label()),
            Err(err) => println!("  Submission blocked: {err}"),
        }
    }

    let report = service.cycle_report(&cycle.id)?;
    render_report(&report);
    Ok(())
}

pub(crate) fn render_score(result: &ScoreResult) {
    for entry in &result.breakdown {
        let validity = if entry.aggregate.is_weight_valid {
            "ok"
        } else if entry.is_pending_feedback() {
            "no submissions"
        } else {
            "weights off"
        };
        println!(
            "  - {}: {:.2} (weights {:.1}, {})",
            entry.group.kind.label(),
            entry.category_score,
            entry.aggregate.total_weight,
            validity
        );
    }
    println!(
        "  Final score: {:.2} / {} -> {}",
        result.final_score,
        result.scale.max(),
        result.band.label()
    );
    if !result.is_weight_valid {
        println!("  Warning: at least one rated group's weights do not total 100");
    }
}

pub(crate) fn render_report(report: &CycleReport) {
    println!("\nCycle report for {}", report.cycle_id);
    println!("- {} appraisals scored", report.appraisal_count);
    if let Some(average) = report.average_final_score {
        println!("- Average final score {:.2}", average);
    }
    for band in &report.bands {
        println!(
            "  - {} [{}]: {} ({:.0}%)",
            band.label, band.color_token, band.count, band.percentage
        );
    }
    if !report.invalid_weight_appraisals.is_empty() {
        let ids: Vec<String> = report
            .invalid_weight_appraisals
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("- Weight issues: {}", ids.join(", "));
    }
}
