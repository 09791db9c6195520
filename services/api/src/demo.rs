use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use recovar::error::AppError;
use recovar::workflows::receivables::domain::{InvoiceRecord, PaymentEvent};
use recovar::workflows::receivables::import::ReceivablesImporter;
use recovar::workflows::receivables::report::{AgeRange, FilterSpec, RecoveryReport, ScoreRange};
use recovar::workflows::receivables::scoring::{ScoreEngine, ScoringConfig};
use recovar::workflows::receivables::RecoveryPipeline;
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Receivables export (CSV)
    #[arg(long)]
    pub(crate) receivables: PathBuf,
    /// Optional payment-history export (CSV)
    #[arg(long)]
    pub(crate) history: Option<PathBuf>,
    /// Reference date for debt ages (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Keep only these responsible parties (repeatable)
    #[arg(long = "responsible")]
    pub(crate) responsibles: Vec<String>,
    /// Keep only these banks (repeatable)
    #[arg(long = "bank")]
    pub(crate) banks: Vec<String>,
    /// Lower bound of the recovery-score filter (inclusive)
    #[arg(long)]
    pub(crate) min_score: Option<i16>,
    /// Upper bound of the recovery-score filter (inclusive)
    #[arg(long)]
    pub(crate) max_score: Option<i16>,
    /// Lower bound of the debt-age filter in days (inclusive)
    #[arg(long)]
    pub(crate) min_age: Option<i64>,
    /// Upper bound of the debt-age filter in days (inclusive)
    #[arg(long)]
    pub(crate) max_age: Option<i64>,
    /// Print every invoice line of the filtered set
    #[arg(long)]
    pub(crate) list_invoices: bool,
    /// Write the filtered table as CSV to this path
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
}

impl ReportArgs {
    fn filter_spec(&self) -> FilterSpec {
        let score_range = (self.min_score.is_some() || self.max_score.is_some()).then(|| {
            ScoreRange {
                min: self.min_score.unwrap_or(i16::MIN),
                max: self.max_score.unwrap_or(i16::MAX),
            }
        });
        let age_range = (self.min_age.is_some() || self.max_age.is_some()).then(|| AgeRange {
            min: self.min_age.unwrap_or(0),
            max: self.max_age.unwrap_or(i64::MAX),
        });

        FilterSpec {
            responsibles: self.responsibles.clone(),
            banks: self.banks.clone(),
            score_range,
            age_range,
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for debt ages (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    let invoices = ReceivablesImporter::invoices_from_path(&args.receivables)?;
    let history = match &args.history {
        Some(path) => ReceivablesImporter::history_from_path(path)?,
        None => Vec::new(),
    };

    let pipeline = RecoveryPipeline::new(invoices, history, ScoringConfig::default());
    let report = pipeline.report(&args.filter_spec(), as_of);

    render_report(&report, pipeline.has_history(), args.list_invoices);

    if let Some(path) = &args.export {
        std::fs::write(path, report.to_csv()?)?;
        println!("\nFiltered table written to {}", path.display());
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    println!("Recovery report demo (built-in dataset)");
    let invoices = demo_invoices(as_of);
    let history = demo_history(as_of);

    let engine = ScoreEngine::new(ScoringConfig::default());
    if let Some(outcome) = engine.score(&invoices[0], as_of) {
        println!(
            "\nScore breakdown for invoice {} ({})",
            outcome.record.invoice_id, outcome.record.client_name
        );
        for component in &outcome.components {
            println!(
                "  - {:?}: +{} ({})",
                component.factor, component.score, component.notes
            );
        }
        println!("  Base score: {}", outcome.record.base_score);
    }

    let pipeline = RecoveryPipeline::new(invoices, history, ScoringConfig::default());
    let report = pipeline.report(&FilterSpec::default(), as_of);
    render_report(&report, pipeline.has_history(), true);

    Ok(())
}

fn render_report(report: &RecoveryReport, history_applied: bool, list_invoices: bool) {
    println!("\nRecovery report (as of {})", report.as_of);
    if history_applied {
        println!("Scores include payment-history adjustments");
    } else {
        println!("No payment history loaded, scores are unadjusted");
    }

    println!("\nPortfolio");
    println!("- Clients with open invoices: {}", report.metrics.distinct_clients);
    println!("- Total pending value: {}", report.metrics.total_pending);
    match report.metrics.mean_score {
        Some(mean) => println!("- Mean recovery score: {mean:.2}"),
        None => println!("- Mean recovery score: n/a (empty selection)"),
    }
    match report.metrics.mean_debt_age_days {
        Some(mean) => println!("- Mean debt age: {mean:.1} days"),
        None => println!("- Mean debt age: n/a (empty selection)"),
    }

    if let (Some(scores), Some(ages)) = (report.score_bounds, report.age_bounds) {
        println!(
            "- Working set ranges: score {}..={}, age {}..={} days",
            scores.min, scores.max, ages.min, ages.max
        );
    }

    if report.clients.is_empty() {
        println!("\nClients: none match the current filters");
    } else {
        println!("\nClients");
        for client in &report.clients {
            println!(
                "- {} {} | pending {} | {} invoices | mean score {:.2} | mean age {:.1}d | bank {}{}",
                client.client_code,
                client.client_name,
                client.total_face_value,
                client.open_invoices,
                client.mean_score,
                client.mean_debt_age_days,
                client.top_bank,
                if client.any_return { " | had returns" } else { "" }
            );
        }
    }

    if !report.distributions.band_distribution.is_empty() {
        println!("\nDebt age bands");
        for bucket in &report.distributions.band_distribution {
            println!("- {}: {} invoices", bucket.band_label, bucket.invoices);
        }
    }

    if !report.distributions.bank_totals.is_empty() {
        println!("\nPending value by bank");
        for bank in &report.distributions.bank_totals {
            println!("- {}: {}", bank.bank, bank.total_pending);
        }
    }

    if list_invoices {
        println!("\nInvoice lines");
        for invoice in &report.invoices {
            println!(
                "- {} | {} | due {} | {} days overdue ({}) | score {} (base {})",
                invoice.invoice_id,
                invoice.client_name,
                invoice.due_date,
                invoice.debt_age_days,
                invoice.age_band.label(),
                invoice.score,
                invoice.base_score
            );
        }
    }
}

fn demo_invoices(as_of: NaiveDate) -> Vec<InvoiceRecord> {
    let amount = |value: &str| Decimal::from_str_exact(value).ok();

    vec![
        InvoiceRecord {
            client_code: "C-101".to_string(),
            client_name: "Mercado Azul".to_string(),
            bank: "Itaú".to_string(),
            responsible: "Ana".to_string(),
            invoice_id: "NF-5001".to_string(),
            face_value: amount("1250.00"),
            return_value: amount("0"),
            delivery_date: Some(as_of - Duration::days(12)),
            due_date: Some(as_of - Duration::days(7)),
            had_return: false,
            other_installments_paid: true,
        },
        InvoiceRecord {
            client_code: "C-102".to_string(),
            client_name: "Loja Sul".to_string(),
            bank: "Bradesco".to_string(),
            responsible: "Rui".to_string(),
            invoice_id: "NF-5002".to_string(),
            face_value: amount("3400.00"),
            return_value: amount("900.00"),
            delivery_date: Some(as_of - Duration::days(130)),
            due_date: Some(as_of - Duration::days(95)),
            had_return: true,
            other_installments_paid: false,
        },
        InvoiceRecord {
            client_code: "C-103".to_string(),
            client_name: "Padaria Leste".to_string(),
            bank: "Itaú".to_string(),
            responsible: "Ana".to_string(),
            invoice_id: "NF-5003".to_string(),
            face_value: amount("480.00"),
            return_value: amount("0"),
            delivery_date: Some(as_of - Duration::days(40)),
            due_date: Some(as_of - Duration::days(30)),
            had_return: false,
            other_installments_paid: false,
        },
        // Not yet due; stays out of the working set.
        InvoiceRecord {
            client_code: "C-101".to_string(),
            client_name: "Mercado Azul".to_string(),
            bank: "Itaú".to_string(),
            responsible: "Ana".to_string(),
            invoice_id: "NF-5004".to_string(),
            face_value: amount("600.00"),
            return_value: amount("0"),
            delivery_date: Some(as_of - Duration::days(2)),
            due_date: Some(as_of + Duration::days(20)),
            had_return: false,
            other_installments_paid: true,
        },
    ]
}

fn demo_history(as_of: NaiveDate) -> Vec<PaymentEvent> {
    let event = |code: &str, name: &str, due_days_ago: i64, settle_offset: Option<i64>| {
        let due_date = as_of - Duration::days(due_days_ago);
        PaymentEvent {
            client_code: code.to_string(),
            client_name: name.to_string(),
            due_date,
            settlement_date: settle_offset.map(|days| due_date + Duration::days(days)),
        }
    };

    vec![
        event("C-101", "Mercado Azul", 200, Some(0)),
        event("C-101", "Mercado Azul", 170, Some(-3)),
        event("C-101", "Mercado Azul", 140, Some(0)),
        event("C-102", "Loja Sul", 210, None),
        event("C-102", "Loja Sul", 180, Some(40)),
        event("C-102", "Loja Sul", 150, None),
        event("C-103", "Padaria Leste", 190, Some(10)),
    ]
}
