use crate::workflows::receivables::domain::ScoredInvoice;
use std::io::Write;

/// Header row matching the `ScoredInvoice` field names, derived columns
/// included. Written explicitly so an empty filtered set still produces a
/// valid export.
const HEADER: &[&str] = &[
    "client_code",
    "client_name",
    "bank",
    "responsible",
    "invoice_id",
    "face_value",
    "return_value",
    "delivery_date",
    "due_date",
    "had_return",
    "other_installments_paid",
    "base_score",
    "score",
    "debt_age_days",
    "age_band",
];

/// Serializes the filtered working set as UTF-8 delimited text.
pub fn write_csv<W: Write>(records: &[ScoredInvoice], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(HEADER)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Convenience wrapper returning the export as an owned UTF-8 string.
pub fn to_csv_string(records: &[ScoredInvoice]) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_csv(records, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}
