mod parser;

pub(crate) mod normalizer;

use crate::workflows::receivables::domain::{InvoiceRecord, PaymentEvent};
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Which of the two tabular sources an import error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTable {
    Receivables,
    History,
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTable::Receivables => write!(f, "receivables"),
            SourceTable::History => write!(f, "payment history"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read {table} export: {source}")]
    Io {
        table: SourceTable,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {table} CSV data: {source}")]
    Csv {
        table: SourceTable,
        #[source]
        source: csv::Error,
    },
    #[error("{table} export is missing required column '{column}'")]
    MissingColumn {
        table: SourceTable,
        column: &'static str,
    },
}

/// Loads the two spreadsheet exports into validated tables.
///
/// Header validation is strict (a missing required column aborts the import),
/// cell validation is lenient (unparseable dates and amounts become `None`).
pub struct ReceivablesImporter;

impl ReceivablesImporter {
    pub fn invoices_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<InvoiceRecord>, ImportError> {
        let file = std::fs::File::open(path).map_err(|source| ImportError::Io {
            table: SourceTable::Receivables,
            source,
        })?;
        Self::invoices_from_reader(file)
    }

    pub fn invoices_from_reader<R: Read>(reader: R) -> Result<Vec<InvoiceRecord>, ImportError> {
        let records = parser::parse_invoices(reader)?;
        info!(rows = records.len(), "receivables export loaded");
        Ok(records)
    }

    pub fn history_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<PaymentEvent>, ImportError> {
        let file = std::fs::File::open(path).map_err(|source| ImportError::Io {
            table: SourceTable::History,
            source,
        })?;
        Self::history_from_reader(file)
    }

    pub fn history_from_reader<R: Read>(reader: R) -> Result<Vec<PaymentEvent>, ImportError> {
        let (events, dropped) = parser::parse_history(reader)?;
        if dropped > 0 {
            warn!(dropped, "history rows without a parseable due date were skipped");
        }
        info!(rows = events.len(), "payment history export loaded");
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::io::Cursor;
    use std::str::FromStr;

    const INVOICE_HEADER: &str = "Cód. Cliente,Cliente,Banco,Responsável,NFe,Vlr Título,Vlr Devolução,Dt. Entrega,Dt Venc,Teve Devolução?,Outras parc. pagas";

    fn invoice_csv(rows: &[&str]) -> String {
        let mut csv = String::from(INVOICE_HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        csv.push('\n');
        csv
    }

    #[test]
    fn parse_date_supports_iso_day_first_and_rfc3339() {
        let iso = parser::parse_date_for_tests("2024-02-29").expect("iso date");
        assert_eq!(iso, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let day_first = parser::parse_date_for_tests("29/02/2024").expect("day-first date");
        assert_eq!(day_first, iso);

        let rfc = parser::parse_date_for_tests("2024-02-29T10:30:00Z").expect("rfc3339");
        assert_eq!(rfc, iso);

        assert!(parser::parse_date_for_tests("  ").is_none());
        assert!(parser::parse_date_for_tests("31/02/2024").is_none());
        assert!(parser::parse_date_for_tests("not-a-date").is_none());
    }

    #[test]
    fn parse_amount_accepts_plain_and_comma_decimal_forms() {
        let plain = parser::parse_amount_for_tests("1234.56").expect("plain decimal");
        assert_eq!(plain, Decimal::from_str("1234.56").unwrap());

        let brazilian = parser::parse_amount_for_tests("R$ 1.234,56").expect("comma decimal");
        assert_eq!(brazilian, Decimal::from_str("1234.56").unwrap());

        assert!(parser::parse_amount_for_tests("").is_none());
        assert!(parser::parse_amount_for_tests("n/a").is_none());
    }

    #[test]
    fn parse_yes_no_is_case_insensitive_and_defaults_to_no() {
        assert!(parser::parse_yes_no_for_tests("Sim"));
        assert!(parser::parse_yes_no_for_tests(" SIM "));
        assert!(!parser::parse_yes_no_for_tests("Não"));
        assert!(!parser::parse_yes_no_for_tests(""));
        assert!(!parser::parse_yes_no_for_tests("talvez"));
    }

    #[test]
    fn normalize_client_key_strips_marks_and_case() {
        let normalized = normalizer::normalize_for_tests("\u{feff} C-104  Norte ");
        assert_eq!(normalized, "c-104 norte");
    }

    #[test]
    fn invoice_rows_degrade_malformed_cells_to_none() {
        let csv = invoice_csv(&[
            "C-001,Mercado Azul,Itaú,Ana,8801,1000.00,0,2025-03-01,2025-03-20,Não,Sim",
            "C-002,Loja Sul,Bradesco,Rui,8802,oops,,bad-date,,Sim,Não",
        ]);

        let records = ReceivablesImporter::invoices_from_reader(Cursor::new(csv))
            .expect("import succeeds despite malformed cells");
        assert_eq!(records.len(), 2);

        let clean = &records[0];
        assert_eq!(clean.face_value, Some(Decimal::from_str("1000.00").unwrap()));
        assert_eq!(
            clean.due_date,
            Some(NaiveDate::from_ymd_opt(2025, 3, 20).unwrap())
        );
        assert!(clean.other_installments_paid);
        assert!(!clean.had_return);

        let degraded = &records[1];
        assert!(degraded.face_value.is_none());
        assert!(degraded.return_value.is_none());
        assert!(degraded.delivery_date.is_none());
        assert!(degraded.due_date.is_none());
        assert!(degraded.had_return);
    }

    #[test]
    fn missing_required_column_is_fatal_and_names_the_column() {
        let csv = "Cód. Cliente,Cliente,Banco,NFe\nC-001,Mercado Azul,Itaú,8801\n";
        let error = ReceivablesImporter::invoices_from_reader(Cursor::new(csv))
            .expect_err("missing column rejected");

        match error {
            ImportError::MissingColumn { table, column } => {
                assert_eq!(table, SourceTable::Receivables);
                assert_eq!(column, "Responsável");
            }
            other => panic!("expected missing column error, got {other:?}"),
        }
    }

    #[test]
    fn history_rows_without_due_date_are_dropped() {
        let csv = "Cód. Cliente,Cliente,Dt Venc,Dt Baixa\n\
C-001,Mercado Azul,2025-01-10,2025-01-12\n\
C-001,Mercado Azul,,2025-02-01\n\
C-002,Loja Sul,2025-01-15,\n";

        let events = ReceivablesImporter::history_from_reader(Cursor::new(csv))
            .expect("history import succeeds");
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].settlement_date,
            Some(NaiveDate::from_ymd_opt(2025, 1, 12).unwrap())
        );
        assert!(events[1].settlement_date.is_none());
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error = ReceivablesImporter::invoices_from_path("./does-not-exist.csv")
            .expect_err("expected io error");

        match error {
            ImportError::Io { table, .. } => assert_eq!(table, SourceTable::Receivables),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
