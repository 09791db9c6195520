use crate::infra::{deserialize_optional_date, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use recovar::error::AppError;
use recovar::workflows::receivables::domain::ScoredInvoice;
use recovar::workflows::receivables::report::views::{
    ClientAggregate, PortfolioMetrics, ReportDistributions,
};
use recovar::workflows::receivables::report::{AgeRange, FilterSpec, ScoreRange};
use recovar::workflows::receivables::RecoveryPipeline;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecoveryReportRequest {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) responsibles: Vec<String>,
    #[serde(default)]
    pub(crate) banks: Vec<String>,
    #[serde(default)]
    pub(crate) score_range: Option<ScoreRange>,
    #[serde(default)]
    pub(crate) age_range: Option<AgeRange>,
    #[serde(default)]
    pub(crate) include_invoices: bool,
}

impl RecoveryReportRequest {
    fn filter_spec(&self) -> FilterSpec {
        FilterSpec {
            responsibles: self.responsibles.clone(),
            banks: self.banks.clone(),
            score_range: self.score_range,
            age_range: self.age_range,
        }
    }

    fn resolved_as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RecoveryReportResponse {
    pub(crate) as_of: NaiveDate,
    pub(crate) history_applied: bool,
    pub(crate) metrics: PortfolioMetrics,
    pub(crate) clients: Vec<ClientAggregate>,
    pub(crate) distributions: ReportDistributions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) score_bounds: Option<ScoreRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) age_bounds: Option<AgeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) invoices: Option<Vec<ScoredInvoice>>,
}

pub(crate) fn recovery_routes(pipeline: Arc<RecoveryPipeline>) -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/recovery/report",
            axum::routing::post(recovery_report_endpoint),
        )
        .route(
            "/api/v1/recovery/export",
            axum::routing::post(recovery_export_endpoint),
        )
        .layer(Extension(pipeline))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn recovery_report_endpoint(
    Extension(pipeline): Extension<Arc<RecoveryPipeline>>,
    Json(payload): Json<RecoveryReportRequest>,
) -> Result<Json<RecoveryReportResponse>, AppError> {
    let as_of = payload.resolved_as_of();
    let report = pipeline.report(&payload.filter_spec(), as_of);

    Ok(Json(RecoveryReportResponse {
        as_of,
        history_applied: pipeline.has_history(),
        metrics: report.metrics,
        clients: report.clients,
        distributions: report.distributions,
        score_bounds: report.score_bounds,
        age_bounds: report.age_bounds,
        invoices: payload.include_invoices.then_some(report.invoices),
    }))
}

pub(crate) async fn recovery_export_endpoint(
    Extension(pipeline): Extension<Arc<RecoveryPipeline>>,
    Json(payload): Json<RecoveryReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let as_of = payload.resolved_as_of();
    let report = pipeline.report(&payload.filter_spec(), as_of);
    let csv = report.to_csv()?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"recovery_report.csv\"",
            ),
        ],
        csv,
    ))
}
