use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryInspectionRepository};
use crate::routes::with_report_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use inspection_ai::config::AppConfig;
use inspection_ai::error::AppError;
use inspection_ai::telemetry;
use inspection_ai::workflows::inspection::{InspectionEvaluator, InspectionWorkflow};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

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

    let repository = Arc::new(InMemoryInspectionRepository::seeded());
    match repository.accounts() {
        Ok(accounts) => {
            for (id, account) in accounts {
                debug!(%id, email = %account.email, name = %account.name, role = account.role.label(), "seeded account");
            }
        }
        Err(err) => warn!(error = %err, "could not list seeded accounts"),
    }

    let evaluator = InspectionEvaluator::from_config(&config.evaluator);
    let evaluator_strategy = evaluator.strategy_label();
    let workflow = Arc::new(InspectionWorkflow::new(repository, evaluator));

    let app = with_report_routes(workflow)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, evaluator = evaluator_strategy, "inspection report service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
