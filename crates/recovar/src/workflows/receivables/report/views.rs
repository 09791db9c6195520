use crate::workflows::receivables::domain::AgeBand;
use rust_decimal::Decimal;
use serde::Serialize;

/// Per-client roll-up of the filtered working set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientAggregate {
    pub client_code: String,
    pub client_name: String,
    pub total_face_value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_face_value: Option<Decimal>,
    pub total_return_value: Decimal,
    pub open_invoices: usize,
    pub mean_debt_age_days: f64,
    pub mean_score: f64,
    pub top_bank: String,
    pub any_return: bool,
}

/// Scalar metrics over the whole filtered set. Means over an empty set are
/// absent rather than NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioMetrics {
    pub distinct_clients: usize,
    pub total_pending: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_debt_age_days: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBucket {
    pub score: i16,
    pub invoices: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankTotal {
    pub bank: String,
    pub total_pending: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BandBucket {
    pub band: AgeBand,
    pub band_label: &'static str,
    pub invoices: usize,
}

/// Chart-ready distributions derived from the filtered set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDistributions {
    pub score_histogram: Vec<ScoreBucket>,
    pub bank_totals: Vec<BankTotal>,
    pub band_distribution: Vec<BandBucket>,
}
