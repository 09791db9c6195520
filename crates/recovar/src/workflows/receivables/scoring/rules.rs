use super::config::ScoringConfig;
use super::ScoreComponent;
use crate::workflows::receivables::domain::{InvoiceRecord, ScoreFactor};
use chrono::NaiveDate;

/// Evaluates the weighted conditions for one invoice line. Only satisfied
/// conditions contribute a component; a missing date or amount makes its
/// condition false, never an error.
pub(crate) fn score_invoice(
    invoice: &InvoiceRecord,
    config: &ScoringConfig,
    as_of: NaiveDate,
) -> (Vec<ScoreComponent>, i16) {
    let mut components = Vec::new();
    let mut total_score: i16 = 0;

    if invoice.other_installments_paid {
        components.push(ScoreComponent {
            factor: ScoreFactor::OtherInstallmentsPaid,
            score: config.other_installments_weight,
            notes: "other installments of the same client are paid".to_string(),
        });
        total_score += config.other_installments_weight;
    }

    if !invoice.had_return {
        components.push(ScoreComponent {
            factor: ScoreFactor::NoReturn,
            score: config.no_return_weight,
            notes: "no goods were returned".to_string(),
        });
        total_score += config.no_return_weight;
    }

    if invoice
        .return_value
        .map(|value| value.is_zero())
        .unwrap_or(false)
    {
        components.push(ScoreComponent {
            factor: ScoreFactor::ZeroReturnValue,
            score: config.zero_return_value_weight,
            notes: "return value is zero".to_string(),
        });
        total_score += config.zero_return_value_weight;
    }

    let delivery_age = invoice
        .delivery_date
        .map(|delivered| (as_of - delivered).num_days());
    if let Some(age) = delivery_age {
        if age < config.recent_delivery_days {
            components.push(ScoreComponent {
                factor: ScoreFactor::RecentDelivery,
                score: config.recent_delivery_weight,
                notes: format!(
                    "delivered {age} days ago, within the {}-day window",
                    config.recent_delivery_days
                ),
            });
            total_score += config.recent_delivery_weight;
        }
    }

    let partial_return = invoice.had_return
        && matches!(
            (invoice.return_value, invoice.face_value),
            (Some(returned), Some(face)) if returned < face
        );
    if partial_return {
        components.push(ScoreComponent {
            factor: ScoreFactor::PartialReturn,
            score: config.partial_return_weight,
            notes: "return was partial, part of the delivery was kept".to_string(),
        });
        total_score += config.partial_return_weight;
    }

    (components, total_score)
}
