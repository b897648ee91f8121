use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState};
use crate::routes::with_triage_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use uw_triage::config::AppConfig;
use uw_triage::error::AppError;
use uw_triage::telemetry;
use uw_triage::workflows::triage::SqliteTriageStore;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(database_url) = args.database_url.take() {
        config.storage.database_url = database_url;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = SqliteTriageStore::connect(&config.storage.database_url).await?;
    let service = build_service(
        Arc::new(store),
        config.dataset.csv_path.clone(),
        &config.mail,
    );
    if config.mail.smtp.is_none() {
        info!("SMTP credentials not set; triage emails will be skipped");
    }

    let app = with_triage_routes(service)
        .layer(Extension(app_state))
        .layer(CorsLayer::permissive())
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "underwriting triage service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
