use super::aggregator::{aggregate_group, WEIGHT_TOTAL};
use super::composite::{calculate_composite, CompositeScheme, MissingCategoryPolicy};
use super::error::DomainError;
use super::formula::Formula;
use super::model::{
    CategoryScores, GroupBreakdown, GroupKind, ScoreResult, ScoredGroup, WeightedItem,
};
use crate::appraisals::domain::{
    AppraisalRecord, CycleRecord, FeedbackRecord, FeedbackStatus, RatedItem, TemplateKind,
};

/// Recompute every score for an appraisal from its raw records.
///
/// Standard cycles score KRA, self-rating, and feedback groups on the 0–5 scale; merit
/// cycles score KPI, competency, and culture groups on the 0–100 scale. A cycle formula,
/// when present, replaces the weighted blend.
pub fn calculate_all_scores(
    appraisal: &AppraisalRecord,
    cycle: &CycleRecord,
    feedback: &[FeedbackRecord],
) -> Result<ScoreResult, DomainError> {
    let formula = cycle
        .scoring
        .formula_source()
        .map(|source| cycle_formula(source, cycle.template))
        .transpose()?;

    let groups = match cycle.template {
        TemplateKind::Standard => vec![
            rated_group(GroupKind::Kra, &appraisal.kras),
            rated_group(GroupKind::SelfRating, &appraisal.self_ratings),
            ScoredGroup::new(GroupKind::Feedback, feedback_items(feedback)),
        ],
        TemplateKind::Merit => vec![
            rated_group(GroupKind::Kpi, &appraisal.kpis),
            rated_group(GroupKind::Competency, &appraisal.competencies),
            rated_group(GroupKind::Culture, &appraisal.culture),
        ],
    };

    let scheme = match (formula, cycle.template) {
        (Some(formula), template) => CompositeScheme::Formula {
            formula,
            scale: template.scale(),
        },
        (None, TemplateKind::Standard) => CompositeScheme::GoalSelfFeedback {
            weights: cycle.scoring.weights.unwrap_or_default(),
            missing: cycle.scoring.missing_feedback,
        },
        (None, TemplateKind::Merit) => CompositeScheme::KpiCompetencyCulture,
    };
    let scale = scheme.scale();
    let redistribute = matches!(
        scheme,
        CompositeScheme::GoalSelfFeedback {
            missing: MissingCategoryPolicy::RedistributeWeight,
            ..
        }
    );

    let mut category_scores = CategoryScores::new();
    let mut breakdown = Vec::with_capacity(groups.len());
    let mut is_weight_valid = true;

    for group in groups {
        let aggregate = aggregate_group(&group.items)?;
        let category_score = scale.rescale(aggregate.total_score);
        let entry = GroupBreakdown {
            group,
            category_score,
            aggregate,
        };

        // feedback nobody has submitted yet is not a weighting mistake
        if !entry.is_pending_feedback() {
            is_weight_valid &= entry.aggregate.is_weight_valid;
        }
        if !(entry.is_pending_feedback() && redistribute) {
            category_scores.insert(entry.group.kind.category(), category_score);
        }

        breakdown.push(entry);
    }

    let composite = calculate_composite(&category_scores, &scheme)?;

    Ok(ScoreResult {
        category_scores,
        breakdown,
        final_score: composite.final_score,
        scale: composite.scale,
        band: composite.band,
        is_weight_valid,
    })
}

/// Parse a cycle formula and check it only reads categories the template scores.
pub(crate) fn cycle_formula(source: &str, template: TemplateKind) -> Result<Formula, DomainError> {
    let formula = Formula::parse(source)?;
    formula.ensure_variables(&template.categories())?;
    Ok(formula)
}

fn rated_group(kind: GroupKind, items: &[RatedItem]) -> ScoredGroup {
    ScoredGroup::new(kind, items.iter().map(RatedItem::to_weighted).collect())
}

/// Submitted feedback as weighted items. Without explicit weights every entry takes an
/// equal share of the category.
fn feedback_items(feedback: &[FeedbackRecord]) -> Vec<WeightedItem> {
    let submitted: Vec<&FeedbackRecord> = feedback
        .iter()
        .filter(|entry| entry.status == FeedbackStatus::Submitted)
        .collect();
    if submitted.is_empty() {
        return Vec::new();
    }

    let weighted = submitted.iter().any(|entry| entry.weight.is_some());
    let equal_share = WEIGHT_TOTAL / submitted.len() as f64;

    submitted
        .into_iter()
        .map(|entry| {
            let weight = if weighted {
                entry.weight.unwrap_or(0.0)
            } else {
                equal_share
            };
            WeightedItem::new(entry.id.0.clone(), weight, entry.score, entry.max_score)
        })
        .collect()
}
