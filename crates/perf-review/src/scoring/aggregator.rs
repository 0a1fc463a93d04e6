use super::error::{DomainError, WeightScope};
use super::model::{GroupAggregate, GroupKind, ItemScore, WeightedItem};
use super::normalizer::normalize_item;

/// Item weights of a well-formed group add up to this many percentage points.
pub const WEIGHT_TOTAL: f64 = 100.0;
/// Allowed drift from [`WEIGHT_TOTAL`] before a group is flagged.
pub const WEIGHT_TOLERANCE: f64 = 0.01;

pub fn is_weight_total_valid(total_weight: f64) -> bool {
    (total_weight - WEIGHT_TOTAL).abs() < WEIGHT_TOLERANCE
}

/// Sum the weighted contributions of a group.
///
/// Weight mismatches never abort aggregation; they are surfaced through
/// `is_weight_valid` so in-progress forms can still render a score. An empty group
/// totals zero and is never weight-valid.
pub fn aggregate_group(items: &[WeightedItem]) -> Result<GroupAggregate, DomainError> {
    let mut per_item = Vec::with_capacity(items.len());
    let mut total_score = 0.0;
    let mut total_weight = 0.0;

    for item in items {
        let weighted_score = normalize_item(item)?;
        total_score += weighted_score;
        total_weight += item.weight;
        per_item.push(ItemScore {
            id: item.id.clone(),
            weighted_score,
        });
    }

    Ok(GroupAggregate {
        total_score,
        total_weight,
        is_weight_valid: is_weight_total_valid(total_weight),
        per_item,
    })
}

/// Strict variant of the weight check for callers that must block on a mismatch.
pub fn ensure_weight_total(kind: GroupKind, items: &[WeightedItem]) -> Result<(), DomainError> {
    let total: f64 = items.iter().map(|item| item.weight).sum();
    if is_weight_total_valid(total) {
        Ok(())
    } else {
        Err(DomainError::InvalidWeightTotal {
            scope: WeightScope::Group(kind),
            total,
            expected: WEIGHT_TOTAL,
        })
    }
}
