use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use recovar::config::DataConfig;
use recovar::error::AppError;
use recovar::workflows::receivables::import::ReceivablesImporter;
use recovar::workflows::receivables::scoring::ScoringConfig;
use recovar::workflows::receivables::RecoveryPipeline;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads both spreadsheet exports and builds the pipeline. Runs once at
/// startup; the request path never touches the filesystem.
pub(crate) fn load_pipeline(data: &DataConfig) -> Result<RecoveryPipeline, AppError> {
    let invoices = ReceivablesImporter::invoices_from_path(&data.receivables_path)?;

    let history = match &data.history_path {
        Some(path) => ReceivablesImporter::history_from_path(path)?,
        None => {
            info!("no payment history configured, score adjustments disabled");
            Vec::new()
        }
    };

    Ok(RecoveryPipeline::new(
        invoices,
        history,
        ScoringConfig::default(),
    ))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
