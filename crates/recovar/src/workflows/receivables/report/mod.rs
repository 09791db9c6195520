mod export;
mod filter;
mod summary;

pub mod views;

pub use export::{to_csv_string, write_csv};
pub use filter::{AgeRange, FilterSpec, ScoreRange};

use crate::workflows::receivables::domain::ScoredInvoice;
use chrono::NaiveDate;
use serde::Serialize;
use views::{ClientAggregate, PortfolioMetrics, ReportDistributions};

/// Full output of one pipeline run under a filter selection: the filtered
/// invoice table, the per-client roll-up, scalar metrics, chart-ready
/// distributions, and the unfiltered slider bounds.
#[derive(Debug, Clone, Serialize)]
pub struct RecoveryReport {
    pub as_of: NaiveDate,
    pub invoices: Vec<ScoredInvoice>,
    pub clients: Vec<ClientAggregate>,
    pub metrics: PortfolioMetrics,
    pub distributions: ReportDistributions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_bounds: Option<ScoreRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_bounds: Option<AgeRange>,
}

impl RecoveryReport {
    pub(crate) fn build(
        invoices: Vec<ScoredInvoice>,
        as_of: NaiveDate,
        score_bounds: Option<ScoreRange>,
        age_bounds: Option<AgeRange>,
    ) -> Self {
        let clients = summary::aggregate_clients(&invoices);
        let metrics = summary::portfolio_metrics(&invoices);
        let distributions = summary::distributions(&invoices);

        Self {
            as_of,
            invoices,
            clients,
            metrics,
            distributions,
            score_bounds,
            age_bounds,
        }
    }

    /// Flat-file rendering of the filtered invoice table.
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        export::to_csv_string(&self.invoices)
    }
}
