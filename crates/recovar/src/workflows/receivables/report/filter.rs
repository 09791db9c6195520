use crate::workflows::receivables::domain::ScoredInvoice;
use serde::{Deserialize, Serialize};

/// Inclusive recovery-score range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: i16,
    pub max: i16,
}

impl ScoreRange {
    pub fn contains(&self, score: i16) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

/// Inclusive debt-age range in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: i64,
    pub max: i64,
}

impl AgeRange {
    pub fn contains(&self, days: i64) -> bool {
        (self.min..=self.max).contains(&days)
    }
}

/// Filter selection coming from the presentation layer. Matching is the
/// conjunction of the supplied predicates; an empty or absent selection set
/// matches every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub responsibles: Vec<String>,
    #[serde(default)]
    pub banks: Vec<String>,
    #[serde(default)]
    pub score_range: Option<ScoreRange>,
    #[serde(default)]
    pub age_range: Option<AgeRange>,
}

impl FilterSpec {
    pub fn matches(&self, record: &ScoredInvoice) -> bool {
        if !self.responsibles.is_empty()
            && !self
                .responsibles
                .iter()
                .any(|responsible| responsible == &record.responsible)
        {
            return false;
        }

        if !self.banks.is_empty() && !self.banks.iter().any(|bank| bank == &record.bank) {
            return false;
        }

        if let Some(range) = self.score_range {
            if !range.contains(record.score) {
                return false;
            }
        }

        if let Some(range) = self.age_range {
            if !range.contains(record.debt_age_days) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::receivables::domain::AgeBand;
    use chrono::NaiveDate;

    fn record(responsible: &str, bank: &str, score: i16, age: i64) -> ScoredInvoice {
        ScoredInvoice {
            client_code: "C-001".to_string(),
            client_name: "Mercado Azul".to_string(),
            bank: bank.to_string(),
            responsible: responsible.to_string(),
            invoice_id: "8801".to_string(),
            face_value: None,
            return_value: None,
            delivery_date: None,
            due_date: NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid due date"),
            had_return: false,
            other_installments_paid: false,
            base_score: score,
            score,
            debt_age_days: age,
            age_band: AgeBand::for_days(age),
        }
    }

    #[test]
    fn empty_spec_matches_everything() {
        let spec = FilterSpec::default();
        assert!(spec.matches(&record("Ana", "Itaú", 0, 0)));
        assert!(spec.matches(&record("Rui", "Bradesco", 11, 400)));
    }

    #[test]
    fn predicates_combine_as_a_conjunction() {
        let spec = FilterSpec {
            responsibles: vec!["Ana".to_string()],
            banks: vec!["Itaú".to_string()],
            score_range: Some(ScoreRange { min: 5, max: 10 }),
            age_range: Some(AgeRange { min: 0, max: 90 }),
        };

        assert!(spec.matches(&record("Ana", "Itaú", 7, 30)));
        assert!(!spec.matches(&record("Rui", "Itaú", 7, 30)));
        assert!(!spec.matches(&record("Ana", "Bradesco", 7, 30)));
        assert!(!spec.matches(&record("Ana", "Itaú", 4, 30)));
        assert!(!spec.matches(&record("Ana", "Itaú", 7, 91)));
    }

    #[test]
    fn ranges_are_inclusive_on_both_ends() {
        let spec = FilterSpec {
            score_range: Some(ScoreRange { min: 5, max: 10 }),
            age_range: Some(AgeRange { min: 10, max: 20 }),
            ..FilterSpec::default()
        };

        assert!(spec.matches(&record("Ana", "Itaú", 5, 10)));
        assert!(spec.matches(&record("Ana", "Itaú", 10, 20)));
        assert!(!spec.matches(&record("Ana", "Itaú", 11, 15)));
        assert!(!spec.matches(&record("Ana", "Itaú", 7, 21)));
    }

    #[test]
    fn multiple_selected_values_match_any_of_them() {
        let spec = FilterSpec {
            banks: vec!["Itaú".to_string(), "Bradesco".to_string()],
            ..FilterSpec::default()
        };

        assert!(spec.matches(&record("Ana", "Itaú", 3, 5)));
        assert!(spec.matches(&record("Ana", "Bradesco", 3, 5)));
        assert!(!spec.matches(&record("Ana", "Santander", 3, 5)));
    }
}
