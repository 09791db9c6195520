mod config;
mod rules;

pub use config::ScoringConfig;

use super::domain::{AgeBand, InvoiceRecord, ScoreFactor, ScoredInvoice};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stateless engine that applies the scoring rubric to invoice lines.
///
/// `as_of` is always an explicit parameter so the engine stays deterministic;
/// it never reads the wall clock.
pub struct ScoreEngine {
    config: ScoringConfig,
}

impl ScoreEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Scores one invoice line. Returns `None` for lines outside the working
    /// set: a missing due date or a due date still in the future.
    pub fn score(&self, invoice: &InvoiceRecord, as_of: NaiveDate) -> Option<ScoringOutcome> {
        let due_date = invoice.due_date?;
        let debt_age_days = (as_of - due_date).num_days();
        if debt_age_days < 0 {
            return None;
        }

        let (components, base_score) = rules::score_invoice(invoice, &self.config, as_of);

        let record = ScoredInvoice {
            client_code: invoice.client_code.clone(),
            client_name: invoice.client_name.clone(),
            bank: invoice.bank.clone(),
            responsible: invoice.responsible.clone(),
            invoice_id: invoice.invoice_id.clone(),
            face_value: invoice.face_value,
            return_value: invoice.return_value,
            delivery_date: invoice.delivery_date,
            due_date,
            had_return: invoice.had_return,
            other_installments_paid: invoice.other_installments_paid,
            base_score,
            score: base_score,
            debt_age_days,
            age_band: AgeBand::for_days(debt_age_days),
        };

        Some(ScoringOutcome { record, components })
    }

    /// Builds the working set: every overdue line scored and banded, not-yet-due
    /// lines excluded here rather than hidden downstream.
    pub fn build_working_set(
        &self,
        invoices: &[InvoiceRecord],
        as_of: NaiveDate,
    ) -> Vec<ScoredInvoice> {
        invoices
            .iter()
            .filter_map(|invoice| self.score(invoice, as_of))
            .map(|outcome| outcome.record)
            .collect()
    }
}

/// Discrete contribution to a score, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub score: i16,
    pub notes: String,
}

/// Scoring output for a single invoice line: the working-set record plus the
/// component trail behind its base score.
#[derive(Debug, Clone)]
pub struct ScoringOutcome {
    pub record: ScoredInvoice,
    pub components: Vec<ScoreComponent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid as-of date")
    }

    fn invoice(due_days_ago: i64) -> InvoiceRecord {
        InvoiceRecord {
            client_code: "C-001".to_string(),
            client_name: "Mercado Azul".to_string(),
            bank: "Itaú".to_string(),
            responsible: "Ana".to_string(),
            invoice_id: "8801".to_string(),
            face_value: Some(Decimal::from_str("1000.00").expect("valid amount")),
            return_value: Some(Decimal::ZERO),
            delivery_date: Some(as_of() - chrono::Duration::days(10)),
            due_date: Some(as_of() - chrono::Duration::days(due_days_ago)),
            had_return: false,
            other_installments_paid: true,
        }
    }

    #[test]
    fn worked_example_scores_eight() {
        // paid 3 + no return 2 + zero return value 1 + recent delivery 2.
        let engine = ScoreEngine::new(ScoringConfig::default());
        let outcome = engine.score(&invoice(5), as_of()).expect("in working set");

        assert_eq!(outcome.record.base_score, 8);
        assert_eq!(outcome.record.score, 8);
        assert_eq!(outcome.components.len(), 4);
        assert!(outcome
            .components
            .iter()
            .any(|component| component.factor == ScoreFactor::RecentDelivery));
    }

    #[test]
    fn partial_return_awards_points_but_full_return_does_not() {
        let engine = ScoreEngine::new(ScoringConfig::default());

        let mut partial = invoice(5);
        partial.had_return = true;
        partial.return_value = Some(Decimal::from_str("400.00").expect("valid amount"));
        let outcome = engine.score(&partial, as_of()).expect("in working set");
        // partial return 3 + paid 3 + recent delivery 2; no-return and zero-value lost.
        assert_eq!(outcome.record.base_score, 8);
        assert!(outcome
            .components
            .iter()
            .any(|component| component.factor == ScoreFactor::PartialReturn));

        let mut full = invoice(5);
        full.had_return = true;
        full.return_value = full.face_value;
        let outcome = engine.score(&full, as_of()).expect("in working set");
        assert!(!outcome
            .components
            .iter()
            .any(|component| component.factor == ScoreFactor::PartialReturn));
    }

    #[test]
    fn missing_dates_and_amounts_make_conditions_false_not_errors() {
        let engine = ScoreEngine::new(ScoringConfig::default());

        let mut bare = invoice(5);
        bare.delivery_date = None;
        bare.return_value = None;
        bare.other_installments_paid = false;
        let outcome = engine.score(&bare, as_of()).expect("in working set");
        // Only the no-return condition holds.
        assert_eq!(outcome.record.base_score, 2);
    }

    #[test]
    fn base_score_stays_within_rubric_bounds() {
        let engine = ScoreEngine::new(ScoringConfig::default());

        let flags = [false, true];
        for had_return in flags {
            for paid in flags {
                for zero_return in flags {
                    for recent in flags {
                        let mut candidate = invoice(20);
                        candidate.had_return = had_return;
                        candidate.other_installments_paid = paid;
                        candidate.return_value = if zero_return {
                            Some(Decimal::ZERO)
                        } else {
                            Some(Decimal::from_str("400.00").expect("valid amount"))
                        };
                        candidate.delivery_date = if recent {
                            Some(as_of() - chrono::Duration::days(10))
                        } else {
                            Some(as_of() - chrono::Duration::days(120))
                        };

                        let outcome = engine
                            .score(&candidate, as_of())
                            .expect("in working set");
                        assert!(
                            (0..=11).contains(&outcome.record.base_score),
                            "base score {} out of bounds",
                            outcome.record.base_score
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn not_yet_due_and_undated_invoices_leave_the_working_set() {
        let engine = ScoreEngine::new(ScoringConfig::default());

        assert!(engine.score(&invoice(-3), as_of()).is_none());

        let mut undated = invoice(5);
        undated.due_date = None;
        assert!(engine.score(&undated, as_of()).is_none());

        // Due exactly today stays in.
        let outcome = engine.score(&invoice(0), as_of()).expect("due today is overdue age 0");
        assert_eq!(outcome.record.debt_age_days, 0);
        assert_eq!(outcome.record.age_band, AgeBand::UpTo15);
    }

    #[test]
    fn hundred_day_debt_lands_in_the_top_band() {
        let engine = ScoreEngine::new(ScoringConfig::default());
        let outcome = engine.score(&invoice(100), as_of()).expect("in working set");

        assert_eq!(outcome.record.debt_age_days, 100);
        assert_eq!(outcome.record.age_band, AgeBand::Above90);
    }

    #[test]
    fn working_set_keeps_only_overdue_lines() {
        let engine = ScoreEngine::new(ScoringConfig::default());
        let mut undated = invoice(5);
        undated.due_date = None;
        let invoices = vec![invoice(5), invoice(-10), undated, invoice(50)];

        let working_set = engine.build_working_set(&invoices, as_of());
        assert_eq!(working_set.len(), 2);
        assert!(working_set.iter().all(|record| record.debt_age_days >= 0));
    }
}
