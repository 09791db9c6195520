use super::domain::{PaymentEvent, PunctualityCategory, ScoredInvoice};
use super::import::normalizer::normalize_client_key;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Classifies one payment event. The rules are ordered; the first match wins:
/// no settlement, settled before due, settled on the due date, settled at most
/// 15 days late, settled later than that.
pub fn classify(due_date: NaiveDate, settlement_date: Option<NaiveDate>) -> PunctualityCategory {
    let settled = match settlement_date {
        None => return PunctualityCategory::Delinquent,
        Some(date) => date,
    };

    if settled < due_date {
        PunctualityCategory::Early
    } else if settled == due_date {
        PunctualityCategory::OnTime
    } else if (settled - due_date).num_days() <= 15 {
        PunctualityCategory::EventualDelay
    } else {
        PunctualityCategory::ChronicLate
    }
}

/// Per-client event counts by punctuality category.
#[derive(Debug, Clone, Serialize)]
pub struct ClientHistorySummary {
    pub client_code: String,
    pub client_name: String,
    pub counts: BTreeMap<PunctualityCategory, usize>,
}

impl ClientHistorySummary {
    pub fn count(&self, category: PunctualityCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn total_events(&self) -> usize {
        self.counts.values().sum()
    }

    /// Category with the highest event count. Ties go to the earlier variant
    /// in the fixed enumeration order; zero events means no dominant category,
    /// never an arbitrary default.
    pub fn dominant(&self) -> Option<PunctualityCategory> {
        let mut dominant = None;
        let mut best = 0usize;

        for category in PunctualityCategory::ordered() {
            let count = self.count(category);
            if count > best {
                best = count;
                dominant = Some(category);
            }
        }

        dominant
    }
}

/// Payment history aggregated per client, built once per load and consulted
/// as a plain key lookup afterwards.
#[derive(Debug, Default)]
pub struct HistoryLedger {
    clients: HashMap<String, ClientHistorySummary>,
}

impl HistoryLedger {
    pub fn build(events: &[PaymentEvent]) -> Self {
        let mut clients: HashMap<String, ClientHistorySummary> = HashMap::new();

        for event in events {
            let key = normalize_client_key(&event.client_code);
            let summary = clients.entry(key).or_insert_with(|| ClientHistorySummary {
                client_code: event.client_code.clone(),
                client_name: event.client_name.clone(),
                counts: BTreeMap::new(),
            });
            *summary
                .counts
                .entry(classify(event.due_date, event.settlement_date))
                .or_insert(0) += 1;
        }

        Self { clients }
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn summary_for(&self, client_code: &str) -> Option<&ClientHistorySummary> {
        self.clients.get(&normalize_client_key(client_code))
    }

    pub fn dominant_for(&self, client_code: &str) -> Option<PunctualityCategory> {
        self.summary_for(client_code)
            .and_then(ClientHistorySummary::dominant)
    }

    /// Score offset for a client. Total over every client code: an unknown
    /// client (or one without a dominant category) adjusts by zero.
    pub fn adjustment_for(&self, client_code: &str) -> i16 {
        self.dominant_for(client_code)
            .map(PunctualityCategory::score_adjustment)
            .unwrap_or(0)
    }

    /// Applies the per-client adjustment on top of each base score.
    pub fn apply(&self, working_set: &mut [ScoredInvoice]) {
        for record in working_set {
            record.score = record.base_score + self.adjustment_for(&record.client_code);
        }
    }
}
