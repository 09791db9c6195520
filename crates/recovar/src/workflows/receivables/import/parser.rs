use super::{ImportError, SourceTable};
use crate::workflows::receivables::domain::{InvoiceRecord, PaymentEvent};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::str::FromStr;

pub(crate) const INVOICE_COLUMNS: &[&str] = &[
    "Cód. Cliente",
    "Cliente",
    "Banco",
    "Responsável",
    "NFe",
    "Vlr Título",
    "Vlr Devolução",
    "Dt. Entrega",
    "Dt Venc",
    "Teve Devolução?",
    "Outras parc. pagas",
];

pub(crate) const HISTORY_COLUMNS: &[&str] = &["Cód. Cliente", "Cliente", "Dt Venc", "Dt Baixa"];

pub(crate) fn parse_invoices<R: Read>(reader: R) -> Result<Vec<InvoiceRecord>, ImportError> {
    let table = SourceTable::Receivables;
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    ensure_columns(table, &mut csv_reader, INVOICE_COLUMNS)?;

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<InvoiceRow>() {
        let row = row.map_err(|source| ImportError::Csv { table, source })?;
        records.push(row.into_record());
    }

    Ok(records)
}

/// Parses the optional payment-history export. Rows without a parseable due
/// date cannot be classified and are dropped; the second tuple element counts
/// them so the caller can report the loss.
pub(crate) fn parse_history<R: Read>(
    reader: R,
) -> Result<(Vec<PaymentEvent>, usize), ImportError> {
    let table = SourceTable::History;
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    ensure_columns(table, &mut csv_reader, HISTORY_COLUMNS)?;

    let mut events = Vec::new();
    let mut dropped = 0usize;
    for row in csv_reader.deserialize::<HistoryRow>() {
        let row = row.map_err(|source| ImportError::Csv { table, source })?;
        match row.into_event() {
            Some(event) => events.push(event),
            None => dropped += 1,
        }
    }

    Ok((events, dropped))
}

fn ensure_columns<R: Read>(
    table: SourceTable,
    reader: &mut csv::Reader<R>,
    required: &'static [&'static str],
) -> Result<(), ImportError> {
    let headers = reader
        .headers()
        .map_err(|source| ImportError::Csv { table, source })?;

    for column in required {
        if !headers.iter().any(|header| header == *column) {
            return Err(ImportError::MissingColumn { table, column });
        }
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct InvoiceRow {
    #[serde(rename = "Cód. Cliente")]
    client_code: String,
    #[serde(rename = "Cliente")]
    client_name: String,
    #[serde(rename = "Banco")]
    bank: String,
    #[serde(rename = "Responsável")]
    responsible: String,
    #[serde(rename = "NFe")]
    invoice_id: String,
    #[serde(rename = "Vlr Título", default, deserialize_with = "empty_string_as_none")]
    face_value: Option<String>,
    #[serde(
        rename = "Vlr Devolução",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    return_value: Option<String>,
    #[serde(rename = "Dt. Entrega", default, deserialize_with = "empty_string_as_none")]
    delivery_date: Option<String>,
    #[serde(rename = "Dt Venc", default, deserialize_with = "empty_string_as_none")]
    due_date: Option<String>,
    #[serde(rename = "Teve Devolução?", default)]
    had_return: String,
    #[serde(rename = "Outras parc. pagas", default)]
    other_installments_paid: String,
}

impl InvoiceRow {
    fn into_record(self) -> InvoiceRecord {
        InvoiceRecord {
            face_value: self.face_value.as_deref().and_then(parse_amount),
            return_value: self.return_value.as_deref().and_then(parse_amount),
            delivery_date: self.delivery_date.as_deref().and_then(parse_date),
            due_date: self.due_date.as_deref().and_then(parse_date),
            had_return: parse_yes_no(&self.had_return),
            other_installments_paid: parse_yes_no(&self.other_installments_paid),
            client_code: self.client_code,
            client_name: self.client_name,
            bank: self.bank,
            responsible: self.responsible,
            invoice_id: self.invoice_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryRow {
    #[serde(rename = "Cód. Cliente")]
    client_code: String,
    #[serde(rename = "Cliente")]
    client_name: String,
    #[serde(rename = "Dt Venc", default, deserialize_with = "empty_string_as_none")]
    due_date: Option<String>,
    #[serde(rename = "Dt Baixa", default, deserialize_with = "empty_string_as_none")]
    settlement_date: Option<String>,
}

impl HistoryRow {
    fn into_event(self) -> Option<PaymentEvent> {
        let due_date = self.due_date.as_deref().and_then(parse_date)?;

        Some(PaymentEvent {
            settlement_date: self.settlement_date.as_deref().and_then(parse_date),
            due_date,
            client_code: self.client_code,
            client_name: self.client_name,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    // Brazilian locale exports write dates day-first.
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y") {
        return Some(date);
    }

    None
}

fn parse_amount(value: &str) -> Option<Decimal> {
    let trimmed = value.trim().trim_start_matches("R$").trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(amount) = Decimal::from_str(trimmed) {
        return Some(amount);
    }

    // "1.234,56" style: thousands dots, comma decimal separator.
    if trimmed.contains(',') {
        let reshaped = trimmed.replace('.', "").replace(',', ".");
        if let Ok(amount) = Decimal::from_str(&reshaped) {
            return Some(amount);
        }
    }

    None
}

fn parse_yes_no(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "sim" | "s" | "yes" | "y"
    )
}

#[cfg(test)]
pub(crate) fn parse_date_for_tests(value: &str) -> Option<NaiveDate> {
    parse_date(value)
}

#[cfg(test)]
pub(crate) fn parse_amount_for_tests(value: &str) -> Option<Decimal> {
    parse_amount(value)
}

#[cfg(test)]
pub(crate) fn parse_yes_no_for_tests(value: &str) -> bool {
    parse_yes_no(value)
}
