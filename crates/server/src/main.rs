use anyhow::Result;
use axum::serve;
use balance_core::{
    config::AppConfig,
    metrics::{MetricsCollector, MetricsSink, NoopMetrics},
    proxy::ProxyEngine,
    upstream::{health::HealthMonitor, EndpointRegistry, HttpClient},
};
use server::{create_app, AppState};
use std::{sync::Arc, time::Duration};
use tokio::{signal, sync::broadcast, task::JoinHandle};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Graceful shutdown timeout in seconds.
/// After this timeout, in-flight requests are abandoned and the process exits.
const GRACEFUL_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Initializes the logging system based on the configuration.
///
/// `RUST_LOG` takes precedence over `logging.level`.
fn init_logging(config: &AppConfig) {
    let level = config.logging.level.as_str();
    let filter = EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,balance_core={level},server={level}")));

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer().json();
        registry.with(fmt_layer).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false);
        registry.with(fmt_layer).init();
    }
}

/// Container for initialized core services.
struct CoreServices {
    proxy_engine: Arc<ProxyEngine>,
    health_monitor: HealthMonitor,
    metrics_collector: Option<Arc<MetricsCollector>>,
}

fn init_core_services(config: &AppConfig) -> Result<CoreServices> {
    let metrics_collector = config.metrics.enabled.then(|| Arc::new(MetricsCollector::new()));
    let metrics: Arc<dyn MetricsSink> = match &metrics_collector {
        Some(collector) => collector.clone(),
        None => Arc::new(NoopMetrics),
    };

    let http_client = Arc::new(
        HttpClient::new().map_err(|e| anyhow::anyhow!("HTTP client initialization failed: {e}"))?,
    );

    let registry = Arc::new(
        EndpointRegistry::new(config.to_endpoint_configs(), http_client, metrics.clone())
            .map_err(|e| anyhow::anyhow!("Endpoint registry initialization failed: {e}"))?,
    );
    for status in registry.list_all() {
        info!(
            endpoint = %status.endpoint.name(),
            timeout_secs = status.endpoint.config().timeout.as_secs(),
            "configured Ethereum client"
        );
    }

    let health_monitor = HealthMonitor::new(registry.clone(), metrics.clone())
        .with_check_interval(config.health_check_interval())
        .with_probe_timeout(config.probe_timeout());

    let proxy_engine = Arc::new(ProxyEngine::new(registry, metrics));

    Ok(CoreServices { proxy_engine, health_monitor, metrics_collector })
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("Configuration load failed: {e}"))?;
    config.validate().map_err(|e| anyhow::anyhow!("Configuration validation failed: {e}"))?;

    init_logging(&config);
    info!("Starting balance proxy");
    debug!(
        endpoints_count = config.endpoints.len(),
        bind_port = config.server.bind_port,
        metrics_enabled = config.metrics.enabled,
        "Configuration loaded"
    );

    let services = init_core_services(&config)?;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let health_handle = services.health_monitor.start_with_shutdown(shutdown_tx.subscribe());

    let app = create_app(AppState {
        proxy_engine: services.proxy_engine,
        metrics: services.metrics_collector,
        request_timeout: config.request_timeout(),
    });

    let addr = config.socket_addr().map_err(|e| anyhow::anyhow!(e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "HTTP server listening");

    let mut server_shutdown_rx = shutdown_tx.subscribe();
    let mut server_handle: JoinHandle<std::io::Result<()>> = tokio::spawn(async move {
        serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown_rx.recv().await;
            })
            .await
    });

    tokio::select! {
        () = shutdown_signal() => {}
        result = &mut server_handle => {
            report_server_exit(result);
            let _ = shutdown_tx.send(());
            let _ = health_handle.await;
            return Ok(());
        }
    }

    let _ = shutdown_tx.send(());

    let graceful = Duration::from_secs(GRACEFUL_SHUTDOWN_TIMEOUT_SECS);
    match tokio::time::timeout(graceful, &mut server_handle).await {
        Ok(result) => report_server_exit(result),
        Err(_) => {
            warn!(
                timeout_secs = GRACEFUL_SHUTDOWN_TIMEOUT_SECS,
                "graceful shutdown timed out, abandoning in-flight requests"
            );
            server_handle.abort();
        }
    }

    if let Err(e) = health_handle.await {
        error!(error = %e, "health monitor task failed");
    }
    info!("Server shutdown complete");

    Ok(())
}

fn report_server_exit(result: Result<std::io::Result<()>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Server error occurred"),
        Err(e) => error!(error = %e, "Server task failed"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(
                error = %e,
                "Failed to install Ctrl+C handler"
            );
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(
                    error = %e,
                    "Failed to install signal handler"
                );

                () = std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!(
        "Shutdown signal received, starting graceful shutdown (timeout: {}s)",
        GRACEFUL_SHUTDOWN_TIMEOUT_SECS
    );
}
