use serde::{Deserialize, Serialize};

/// Rubric configuration describing the recovery-score weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub other_installments_weight: i16,
    pub no_return_weight: i16,
    pub zero_return_value_weight: i16,
    pub recent_delivery_weight: i16,
    pub partial_return_weight: i16,
    pub recent_delivery_days: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            other_installments_weight: 3,
            no_return_weight: 2,
            zero_return_value_weight: 1,
            recent_delivery_weight: 2,
            partial_return_weight: 3,
            recent_delivery_days: 90,
        }
    }
}
