use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_dashboard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use sigma::config::AppConfig;
use sigma::error::AppError;
use sigma::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let ciaf = Arc::new(config.ciaf.clone());
    let app_state = AppState::new(readiness_flag.clone(), prometheus_handle, ciaf.clone());

    let app = with_dashboard_routes(ciaf)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        triple_failure_factor = config.ciaf.triple_failure_factor,
        "surveillance analytics service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
