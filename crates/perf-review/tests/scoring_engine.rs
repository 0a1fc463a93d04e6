use chrono::NaiveDate;
use perf_review::appraisals::{
    AppraisalId, AppraisalRecord, AppraisalStatus, CycleId, CycleRecord, CycleScoring,
    CycleStatus, FeedbackId, FeedbackRecord, FeedbackRelationship, FeedbackStatus, RatedItem,
    TemplateKind,
};
use perf_review::scoring::{
    aggregate_group, calculate_all_scores, calculate_composite, normalize_rating, Category,
    CategoryScores, CompositeScheme, DomainError, Formula, GroupKind, PerformanceBand,
    ScoreScale, WeightedItem,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn kra_items() -> Vec<WeightedItem> {
    vec![
        WeightedItem::new("kra-1", 40.0, 4.5, 5.0),
        WeightedItem::new("kra-2", 30.0, 4.0, 5.0),
        WeightedItem::new("kra-3", 30.0, 4.2, 5.0),
    ]
}

fn cycle(scoring: CycleScoring) -> CycleRecord {
    CycleRecord {
        id: CycleId("cycle-2025".to_string()),
        name: "FY25 Annual Review".to_string(),
        template: TemplateKind::Standard,
        status: CycleStatus::Active,
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid start"),
        end_date: NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid end"),
        scoring,
    }
}

fn appraisal() -> AppraisalRecord {
    AppraisalRecord {
        id: AppraisalId("apr-000001".to_string()),
        employee_id: "emp-42".to_string(),
        employee_name: "Jordan Lee".to_string(),
        cycle_id: CycleId("cycle-2025".to_string()),
        status: AppraisalStatus::Draft,
        kras: vec![
            RatedItem::new("kra-1", "Revenue growth", 40.0, 4.5, 5.0),
            RatedItem::new("kra-2", "Customer retention", 30.0, 4.0, 5.0),
            RatedItem::new("kra-3", "Team development", 30.0, 4.2, 5.0),
        ],
        self_ratings: vec![RatedItem::new("crit-1", "Ownership", 100.0, 3.0, 5.0)],
        kpis: Vec::new(),
        competencies: Vec::new(),
        culture: Vec::new(),
    }
}

fn feedback(score: f64) -> FeedbackRecord {
    FeedbackRecord {
        id: FeedbackId("fb-000001".to_string()),
        appraisal_id: AppraisalId("apr-000001".to_string()),
        reviewer_id: "mgr-7".to_string(),
        relationship: FeedbackRelationship::Manager,
        status: FeedbackStatus::Submitted,
        score,
        max_score: 5.0,
        weight: None,
        submitted_on: NaiveDate::from_ymd_opt(2025, 11, 14),
    }
}

#[test]
fn normalization_is_linear_in_score_and_weight() {
    for (raw, max, weight) in [(4.5, 5.0, 40.0), (3.0, 4.0, 25.0), (80.0, 100.0, 60.0)] {
        let single = normalize_rating(raw, max, weight).expect("valid max");
        assert!(close(single, raw / max * weight));

        let doubled_raw = normalize_rating(raw * 2.0, max, weight).expect("valid max");
        let doubled_weight = normalize_rating(raw, max, weight * 2.0).expect("valid max");
        assert!(close(doubled_raw, single * 2.0));
        assert!(close(doubled_weight, single * 2.0));
    }
}

#[test]
fn weight_perturbation_beyond_tolerance_flips_validity() {
    let items = kra_items();
    assert!(aggregate_group(&items).expect("aggregates").is_weight_valid);

    let mut heavier = items.clone();
    heavier[0].weight += 0.02;
    assert!(!aggregate_group(&heavier).expect("aggregates").is_weight_valid);

    let mut lighter = items;
    lighter[2].weight -= 0.02;
    assert!(!aggregate_group(&lighter).expect("aggregates").is_weight_valid);
}

#[test]
fn empty_group_aggregates_to_zero_and_invalid() {
    let aggregate = aggregate_group(&[]).expect("aggregates");
    assert_eq!(aggregate.total_score, 0.0);
    assert_eq!(aggregate.total_weight, 0.0);
    assert!(!aggregate.is_weight_valid);
}

#[test]
fn kra_example_produces_goal_score() {
    let aggregate = aggregate_group(&kra_items()).expect("aggregates");
    assert!(close(ScoreScale::FivePoint.rescale(aggregate.total_score), 4.26));
}

#[test]
fn band_boundary_is_inclusive() {
    assert_eq!(
        PerformanceBand::classify(4.5, ScoreScale::FivePoint),
        PerformanceBand::Excellent
    );
    assert_eq!(
        PerformanceBand::classify(4.499_999, ScoreScale::FivePoint),
        PerformanceBand::Good
    );
}

#[test]
fn weighted_formula_matches_reference_example() {
    let formula =
        Formula::parse("(goal_score * 0.6) + (self_score * 0.2) + (feedback_score * 0.2)")
            .expect("formula parses");
    let scores: CategoryScores = [
        (Category::Goal, 4.0),
        (Category::SelfAssessment, 3.0),
        (Category::Feedback, 5.0),
    ]
    .into_iter()
    .collect();

    let composite = calculate_composite(
        &scores,
        &CompositeScheme::Formula {
            formula,
            scale: ScoreScale::FivePoint,
        },
    )
    .expect("composite");
    assert!(close(composite.final_score, 4.0));
    assert_eq!(composite.band, PerformanceBand::Good);
}

#[test]
fn unknown_formula_identifiers_are_rejected() {
    let scoring = CycleScoring {
        formula: Some("bogus_score * 0.5".to_string()),
        ..CycleScoring::default()
    };

    match calculate_all_scores(&appraisal(), &cycle(scoring), &[feedback(4.0)]) {
        Err(error @ DomainError::InvalidFormula(_)) => {
            assert_eq!(error.kind(), "invalid-formula");
        }
        other => panic!("expected invalid formula, got {other:?}"),
    }
}

#[test]
fn recomputation_is_deterministic() {
    let appraisal = appraisal();
    let cycle = cycle(CycleScoring::default());
    let feedback = vec![feedback(4.0)];

    let first = calculate_all_scores(&appraisal, &cycle, &feedback).expect("scores");
    let second = calculate_all_scores(&appraisal, &cycle, &feedback).expect("scores");

    assert_eq!(first, second);
    assert_eq!(first.final_score.to_bits(), second.final_score.to_bits());
    assert!(close(first.group(GroupKind::Kra).expect("kra").category_score, 4.26));
}

#[test]
fn zero_max_score_is_fatal() {
    let mut appraisal = appraisal();
    appraisal.self_ratings[0].max_score = 0.0;

    let error = calculate_all_scores(&appraisal, &cycle(CycleScoring::default()), &[])
        .expect_err("zero max rejected");
    assert_eq!(error.kind(), "invalid-max-score");
}
