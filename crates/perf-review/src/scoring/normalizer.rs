use super::error::DomainError;
use super::model::WeightedItem;

/// Convert a raw rating into its weighted contribution: `(raw / max) * weight`.
///
/// A raw score of zero is an ungraded item and contributes nothing. The max score must
/// be a positive, finite number.
pub fn normalize_rating(raw_score: f64, max_score: f64, weight: f64) -> Result<f64, DomainError> {
    if !(max_score.is_finite() && max_score > 0.0) {
        return Err(DomainError::InvalidMaxScore {
            item_id: None,
            max_score,
        });
    }

    Ok((raw_score / max_score) * weight)
}

pub(crate) fn normalize_item(item: &WeightedItem) -> Result<f64, DomainError> {
    normalize_rating(item.raw_score, item.max_score, item.weight).map_err(|err| match err {
        DomainError::InvalidMaxScore { max_score, .. } => DomainError::InvalidMaxScore {
            item_id: Some(item.id.clone()),
            max_score,
        },
        other => other,
    })
}
