/// Canonical join key for client identity. Spreadsheet exports carry BOM and
/// zero-width characters on the first column and inconsistent spacing inside
/// codes, so the invoice and history tables are joined on the normalized form.
pub(crate) fn normalize_client_key(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

#[cfg(test)]
pub(crate) fn normalize_for_tests(value: &str) -> String {
    normalize_client_key(value)
}
