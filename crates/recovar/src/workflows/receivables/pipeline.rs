use super::domain::{InvoiceRecord, PaymentEvent};
use super::history::HistoryLedger;
use super::report::{AgeRange, FilterSpec, RecoveryReport, ScoreRange};
use super::scoring::{ScoreEngine, ScoringConfig};
use chrono::NaiveDate;
use tracing::debug;

/// The recomputation pipeline: immutable source tables captured once, every
/// report derived from scratch against an explicit as-of date. The history
/// ledger is aggregated at construction and consulted as a plain lookup
/// afterwards.
pub struct RecoveryPipeline {
    invoices: Vec<InvoiceRecord>,
    ledger: HistoryLedger,
    engine: ScoreEngine,
}

impl RecoveryPipeline {
    pub fn new(
        invoices: Vec<InvoiceRecord>,
        history: Vec<PaymentEvent>,
        config: ScoringConfig,
    ) -> Self {
        Self {
            ledger: HistoryLedger::build(&history),
            engine: ScoreEngine::new(config),
            invoices,
        }
    }

    pub fn invoice_count(&self) -> usize {
        self.invoices.len()
    }

    pub fn has_history(&self) -> bool {
        !self.ledger.is_empty()
    }

    /// Runs score -> adjust -> filter -> aggregate and returns the report.
    pub fn report(&self, filter: &FilterSpec, as_of: NaiveDate) -> RecoveryReport {
        let mut working_set = self.engine.build_working_set(&self.invoices, as_of);
        self.ledger.apply(&mut working_set);

        let score_bounds = working_set
            .iter()
            .map(|record| record.score)
            .fold(None, |bounds: Option<ScoreRange>, score| match bounds {
                None => Some(ScoreRange {
                    min: score,
                    max: score,
                }),
                Some(range) => Some(ScoreRange {
                    min: range.min.min(score),
                    max: range.max.max(score),
                }),
            });
        let age_bounds = working_set
            .iter()
            .map(|record| record.debt_age_days)
            .fold(None, |bounds: Option<AgeRange>, days| match bounds {
                None => Some(AgeRange {
                    min: days,
                    max: days,
                }),
                Some(range) => Some(AgeRange {
                    min: range.min.min(days),
                    max: range.max.max(days),
                }),
            });

        let working_rows = working_set.len();
        let filtered: Vec<_> = working_set
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect();
        debug!(
            working_rows,
            filtered_rows = filtered.len(),
            %as_of,
            "recovery report computed"
        );

        RecoveryReport::build(filtered, as_of, score_bounds, age_bounds)
    }
}
