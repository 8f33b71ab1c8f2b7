use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use runbook_api::config::ServiceConfig;
use runbook_api::router::build_app_router;
use runbook_api::state::AppState;
use runbook_kube::{KubectlExecutor, KubectlResolver};
use runbook_tracking::TrackingClient;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runbook_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServiceConfig::from_env();
    tracing::info!(
        scripts_path = %config.scripts_path,
        namespace = %config.namespace,
        selector = %config.pod_label_selector,
        tracking = config.tracking_url.is_some(),
        "Loaded service configuration"
    );

    // --- Startup permission self-check ---
    // Refuse to serve without the cluster permissions execution needs.
    if let Err(err) = runbook_kube::access::check_permissions(&config.namespace).await {
        tracing::error!(error = %err, "Startup permission check failed");
        std::process::exit(1);
    }
    tracing::info!(namespace = %config.namespace, "Cluster permission check passed");

    // --- App state ---
    let state = AppState {
        resolver: Arc::new(KubectlResolver::new()),
        executor: Arc::new(KubectlExecutor::new(Duration::from_secs(
            config.exec_timeout_secs,
        ))),
        tracker: Arc::new(TrackingClient::new(config.tracking_url.clone())),
        config: Arc::new(config.clone()),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server shuts
/// down cleanly whether stopped interactively or by a process manager
/// (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
