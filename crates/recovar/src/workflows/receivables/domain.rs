use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Parsed invoice line from the receivables export, before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub client_code: String,
    pub client_name: String,
    pub bank: String,
    pub responsible: String,
    pub invoice_id: String,
    pub face_value: Option<Decimal>,
    pub return_value: Option<Decimal>,
    pub delivery_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub had_return: bool,
    pub other_installments_paid: bool,
}

/// Working-set record: an overdue invoice line with its derived columns.
///
/// Kept flat so the CSV export can serialize it directly with a header row
/// matching the field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredInvoice {
    pub client_code: String,
    pub client_name: String,
    pub bank: String,
    pub responsible: String,
    pub invoice_id: String,
    pub face_value: Option<Decimal>,
    pub return_value: Option<Decimal>,
    pub delivery_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    pub had_return: bool,
    pub other_installments_paid: bool,
    pub base_score: i16,
    pub score: i16,
    pub debt_age_days: i64,
    pub age_band: AgeBand,
}

/// Fixed debt-age bands. Boundary ages (15, 45, 90) fall in the lower band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "1 - 15 days")]
    UpTo15,
    #[serde(rename = "15 - 45 days")]
    UpTo45,
    #[serde(rename = "46 - 90 days")]
    UpTo90,
    #[serde(rename = "Above 91 days")]
    Above90,
}

impl AgeBand {
    pub const fn label(self) -> &'static str {
        match self {
            AgeBand::UpTo15 => "1 - 15 days",
            AgeBand::UpTo45 => "15 - 45 days",
            AgeBand::UpTo90 => "46 - 90 days",
            AgeBand::Above90 => "Above 91 days",
        }
    }

    pub const fn ordered() -> [AgeBand; 4] {
        [
            AgeBand::UpTo15,
            AgeBand::UpTo45,
            AgeBand::UpTo90,
            AgeBand::Above90,
        ]
    }

    /// Total over non-negative ages; first match wins.
    pub fn for_days(days: i64) -> AgeBand {
        if days <= 15 {
            AgeBand::UpTo15
        } else if days <= 45 {
            AgeBand::UpTo45
        } else if days <= 90 {
            AgeBand::UpTo90
        } else {
            AgeBand::Above90
        }
    }
}

/// Conditions permitted to contribute to the recovery score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreFactor {
    OtherInstallmentsPaid,
    NoReturn,
    ZeroReturnValue,
    RecentDelivery,
    PartialReturn,
}

/// Historical payment row from the optional history export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub client_code: String,
    pub client_name: String,
    pub due_date: NaiveDate,
    pub settlement_date: Option<NaiveDate>,
}

/// Punctuality classification of a settled or still-open payment.
///
/// The variant order doubles as the dominant-category tie-break priority:
/// when two categories count the same number of events, the earlier variant
/// wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunctualityCategory {
    Early,
    OnTime,
    EventualDelay,
    ChronicLate,
    Delinquent,
}

impl PunctualityCategory {
    pub const fn label(self) -> &'static str {
        match self {
            PunctualityCategory::Early => "Early",
            PunctualityCategory::OnTime => "On Time",
            PunctualityCategory::EventualDelay => "Eventual Delay",
            PunctualityCategory::ChronicLate => "Chronic Late",
            PunctualityCategory::Delinquent => "Delinquent",
        }
    }

    pub const fn ordered() -> [PunctualityCategory; 5] {
        [
            PunctualityCategory::Early,
            PunctualityCategory::OnTime,
            PunctualityCategory::EventualDelay,
            PunctualityCategory::ChronicLate,
            PunctualityCategory::Delinquent,
        ]
    }

    /// Fixed per-category offset applied to an invoice's base score.
    pub const fn score_adjustment(self) -> i16 {
        match self {
            PunctualityCategory::Early | PunctualityCategory::OnTime => 3,
            PunctualityCategory::EventualDelay => 1,
            PunctualityCategory::ChronicLate => -2,
            PunctualityCategory::Delinquent => -5,
        }
    }
}
