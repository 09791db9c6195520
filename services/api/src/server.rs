use crate::cli::ServeArgs;
use crate::infra::{load_pipeline, AppState};
use crate::routes::recovery_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use recovar::config::AppConfig;
use recovar::error::AppError;
use recovar::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    // Both exports load before the listener binds; requests never wait on I/O.
    let pipeline = Arc::new(load_pipeline(&config.data)?);
    info!(
        invoices = pipeline.invoice_count(),
        history = pipeline.has_history(),
        "recovery pipeline ready"
    );

    let app = recovery_routes(pipeline)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "recovery reporting service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
