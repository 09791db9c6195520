use super::views::{
    BandBucket, BankTotal, ClientAggregate, PortfolioMetrics, ReportDistributions, ScoreBucket,
};
use crate::workflows::receivables::domain::{AgeBand, ScoredInvoice};
use crate::workflows::receivables::import::normalizer::normalize_client_key;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Groups the filtered set by client identity, one aggregate per distinct
/// client, emitted in first-encountered input order.
pub(crate) fn aggregate_clients(records: &[ScoredInvoice]) -> Vec<ClientAggregate> {
    let mut order: Vec<ClientAccumulator> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = normalize_client_key(&record.client_code);
        let slot = match index.get(&key) {
            Some(slot) => *slot,
            None => {
                index.insert(key, order.len());
                order.push(ClientAccumulator::new(record));
                order.len() - 1
            }
        };
        order[slot].push(record);
    }

    order.into_iter().map(ClientAccumulator::finish).collect()
}

pub(crate) fn portfolio_metrics(records: &[ScoredInvoice]) -> PortfolioMetrics {
    let distinct_clients = records
        .iter()
        .map(|record| normalize_client_key(&record.client_code))
        .collect::<std::collections::HashSet<_>>()
        .len();

    let total_pending: Decimal = records.iter().filter_map(|record| record.face_value).sum();

    let count = records.len();
    let (mean_score, mean_debt_age_days) = if count == 0 {
        (None, None)
    } else {
        let score_sum: i64 = records.iter().map(|record| i64::from(record.score)).sum();
        let age_sum: i64 = records.iter().map(|record| record.debt_age_days).sum();
        (
            Some(score_sum as f64 / count as f64),
            Some(age_sum as f64 / count as f64),
        )
    };

    PortfolioMetrics {
        distinct_clients,
        total_pending,
        mean_score,
        mean_debt_age_days,
    }
}

pub(crate) fn distributions(records: &[ScoredInvoice]) -> ReportDistributions {
    let mut score_counts: BTreeMap<i16, usize> = BTreeMap::new();
    let mut band_counts: HashMap<AgeBand, usize> = HashMap::new();
    let mut bank_order: Vec<BankTotal> = Vec::new();
    let mut bank_index: HashMap<String, usize> = HashMap::new();

    for record in records {
        *score_counts.entry(record.score).or_insert(0) += 1;
        *band_counts.entry(record.age_band).or_insert(0) += 1;

        let slot = match bank_index.get(&record.bank) {
            Some(slot) => *slot,
            None => {
                bank_index.insert(record.bank.clone(), bank_order.len());
                bank_order.push(BankTotal {
                    bank: record.bank.clone(),
                    total_pending: Decimal::ZERO,
                });
                bank_order.len() - 1
            }
        };
        if let Some(face_value) = record.face_value {
            bank_order[slot].total_pending += face_value;
        }
    }

    // Stable sort keeps first-encountered order on equal totals.
    bank_order.sort_by(|a, b| b.total_pending.cmp(&a.total_pending));

    let score_histogram = score_counts
        .into_iter()
        .map(|(score, invoices)| ScoreBucket { score, invoices })
        .collect();

    let band_distribution = AgeBand::ordered()
        .into_iter()
        .filter_map(|band| {
            band_counts.get(&band).map(|invoices| BandBucket {
                band,
                band_label: band.label(),
                invoices: *invoices,
            })
        })
        .collect();

    ReportDistributions {
        score_histogram,
        bank_totals: bank_order,
        band_distribution,
    }
}

struct ClientAccumulator {
    client_code: String,
    client_name: String,
    face_sum: Decimal,
    face_count: usize,
    return_sum: Decimal,
    invoices: usize,
    age_sum: i64,
    score_sum: i64,
    banks: Vec<(String, usize)>,
    any_return: bool,
}

impl ClientAccumulator {
    fn new(record: &ScoredInvoice) -> Self {
        Self {
            client_code: record.client_code.clone(),
            client_name: record.client_name.clone(),
            face_sum: Decimal::ZERO,
            face_count: 0,
            return_sum: Decimal::ZERO,
            invoices: 0,
            age_sum: 0,
            score_sum: 0,
            banks: Vec::new(),
            any_return: false,
        }
    }

    fn push(&mut self, record: &ScoredInvoice) {
        self.invoices += 1;
        self.age_sum += record.debt_age_days;
        self.score_sum += i64::from(record.score);
        self.any_return |= record.had_return;

        if let Some(face_value) = record.face_value {
            self.face_sum += face_value;
            self.face_count += 1;
        }
        if let Some(return_value) = record.return_value {
            self.return_sum += return_value;
        }

        match self
            .banks
            .iter_mut()
            .find(|(bank, _)| bank == &record.bank)
        {
            Some((_, count)) => *count += 1,
            None => self.banks.push((record.bank.clone(), 1)),
        }
    }

    fn finish(self) -> ClientAggregate {
        let mean_face_value = if self.face_count > 0 {
            Some(self.face_sum / Decimal::from(self.face_count as u64))
        } else {
            None
        };

        // Max count wins; the strictly-greater scan in first-encountered
        // order keeps the tie-break stable.
        let mut top_bank = String::new();
        let mut best = 0usize;
        for (bank, count) in &self.banks {
            if *count > best {
                best = *count;
                top_bank = bank.clone();
            }
        }

        ClientAggregate {
            mean_debt_age_days: self.age_sum as f64 / self.invoices as f64,
            mean_score: self.score_sum as f64 / self.invoices as f64,
            client_code: self.client_code,
            client_name: self.client_name,
            total_face_value: self.face_sum,
            mean_face_value,
            total_return_value: self.return_sum,
            open_invoices: self.invoices,
            top_bank,
            any_return: self.any_return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn record(code: &str, bank: &str, face: Option<&str>, score: i16, age: i64) -> ScoredInvoice {
        ScoredInvoice {
            client_code: code.to_string(),
            client_name: format!("Client {code}"),
            bank: bank.to_string(),
            responsible: "Ana".to_string(),
            invoice_id: "8801".to_string(),
            face_value: face.map(|value| Decimal::from_str(value).expect("valid amount")),
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
    fn one_aggregate_per_distinct_client_in_input_order() {
        let records = vec![
            record("C-002", "Itaú", Some("100.00"), 5, 10),
            record("C-001", "Itaú", Some("50.00"), 3, 20),
            record("C-002", "Bradesco", Some("200.00"), 7, 30),
        ];

        let aggregates = aggregate_clients(&records);
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[0].client_code, "C-002");
        assert_eq!(aggregates[1].client_code, "C-001");

        let invoice_total: usize = aggregates.iter().map(|aggregate| aggregate.open_invoices).sum();
        assert_eq!(invoice_total, records.len());
    }

    #[test]
    fn client_sums_and_means_are_computed_over_the_group() {
        let records = vec![
            record("C-001", "Itaú", Some("100.00"), 4, 10),
            record("C-001", "Itaú", Some("300.00"), 8, 30),
        ];

        let aggregates = aggregate_clients(&records);
        let aggregate = &aggregates[0];

        assert_eq!(
            aggregate.total_face_value,
            Decimal::from_str("400.00").unwrap()
        );
        assert_eq!(
            aggregate.mean_face_value,
            Some(Decimal::from_str("200.00").unwrap())
        );
        assert_eq!(aggregate.open_invoices, 2);
        assert_eq!(aggregate.mean_score, 6.0);
        assert_eq!(aggregate.mean_debt_age_days, 20.0);
    }

    #[test]
    fn null_amounts_are_skipped_not_poisoning_sums() {
        let records = vec![
            record("C-001", "Itaú", Some("100.00"), 4, 10),
            record("C-001", "Itaú", None, 8, 30),
        ];

        let aggregates = aggregate_clients(&records);
        assert_eq!(
            aggregates[0].total_face_value,
            Decimal::from_str("100.00").unwrap()
        );
        assert_eq!(
            aggregates[0].mean_face_value,
            Some(Decimal::from_str("100.00").unwrap())
        );

        let unpriced = vec![record("C-002", "Itaú", None, 4, 10)];
        let aggregates = aggregate_clients(&unpriced);
        assert_eq!(aggregates[0].total_face_value, Decimal::ZERO);
        assert_eq!(aggregates[0].mean_face_value, None);
    }

    #[test]
    fn top_bank_breaks_ties_by_first_encounter() {
        let records = vec![
            record("C-001", "Bradesco", Some("1.00"), 4, 10),
            record("C-001", "Itaú", Some("1.00"), 4, 10),
            record("C-001", "Itaú", Some("1.00"), 4, 10),
            record("C-001", "Bradesco", Some("1.00"), 4, 10),
        ];

        let aggregates = aggregate_clients(&records);
        assert_eq!(aggregates[0].top_bank, "Bradesco");
    }

    #[test]
    fn empty_set_metrics_report_absent_means_and_zero_totals() {
        let metrics = portfolio_metrics(&[]);

        assert_eq!(metrics.distinct_clients, 0);
        assert_eq!(metrics.total_pending, Decimal::ZERO);
        assert_eq!(metrics.mean_score, None);
        assert_eq!(metrics.mean_debt_age_days, None);
    }

    #[test]
    fn portfolio_metrics_cover_the_filtered_set() {
        let records = vec![
            record("C-001", "Itaú", Some("100.00"), 4, 10),
            record("C-002", "Bradesco", Some("300.00"), 8, 30),
            record("C-001", "Itaú", None, 6, 20),
        ];

        let metrics = portfolio_metrics(&records);
        assert_eq!(metrics.distinct_clients, 2);
        assert_eq!(metrics.total_pending, Decimal::from_str("400.00").unwrap());
        assert_eq!(metrics.mean_score, Some(6.0));
        assert_eq!(metrics.mean_debt_age_days, Some(20.0));
    }

    #[test]
    fn distributions_sort_scores_ascending_and_banks_by_amount() {
        let records = vec![
            record("C-001", "Itaú", Some("100.00"), 8, 10),
            record("C-002", "Bradesco", Some("500.00"), 4, 50),
            record("C-003", "Itaú", Some("150.00"), 8, 100),
        ];

        let distributions = distributions(&records);

        let scores: Vec<i16> = distributions
            .score_histogram
            .iter()
            .map(|bucket| bucket.score)
            .collect();
        assert_eq!(scores, vec![4, 8]);
        assert_eq!(distributions.score_histogram[1].invoices, 2);

        assert_eq!(distributions.bank_totals[0].bank, "Bradesco");
        assert_eq!(distributions.bank_totals[1].bank, "Itaú");
        assert_eq!(
            distributions.bank_totals[1].total_pending,
            Decimal::from_str("250.00").unwrap()
        );

        let bands: Vec<AgeBand> = distributions
            .band_distribution
            .iter()
            .map(|bucket| bucket.band)
            .collect();
        assert_eq!(bands, vec![AgeBand::UpTo15, AgeBand::UpTo90, AgeBand::Above90]);
    }
}
