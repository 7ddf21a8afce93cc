use crate::cli::ServeArgs;
use crate::infra::{seed_store, AppState};
use crate::routes::with_atlas_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Datelike, Local};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use trust_atlas::config::AppConfig;
use trust_atlas::engine::TrustMetricsService;
use trust_atlas::error::AppError;
use trust_atlas::telemetry;

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

    let store = Arc::new(seed_store().map_err(|err| {
        AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    })?);
    // The engine's only clock dependency: the year used by the confidence
    // classifier, fixed once at startup. ATLAS_CURRENT_YEAR pins it for
    // deterministic runs.
    let current_year = config
        .engine
        .current_year_override
        .unwrap_or_else(|| Local::now().year());
    let service = Arc::new(TrustMetricsService::new(store, current_year));

    let app = with_atlas_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, current_year, "trust atlas aggregation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
