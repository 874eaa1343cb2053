use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use scribe_api::config::{llm_settings_from_env, DatabaseConfig, ServerConfig};
use scribe_api::router::build_app_router;
use scribe_api::state::AppState;
use scribe_db::PgStore;
use scribe_llm::GenerationClient;
use scribe_pipeline::{ArtifactService, Stores};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    let db_config = DatabaseConfig::from_env();
    let llm_settings = llm_settings_from_env();

    // --- Database ---
    let pool = scribe_db::create_pool(
        &db_config.url,
        db_config.max_connections,
        db_config.acquire_timeout,
    )
    .await
    .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    scribe_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    if db_config.run_migrations {
        scribe_db::run_migrations(&pool)
            .await
            .expect("Failed to apply database migrations");
        tracing::info!("Database migrations applied");
    }

    // --- Generation client ---
    let llm = GenerationClient::from_settings(&llm_settings)
        .expect("Failed to initialise generation client");
    tracing::info!(
        mode = ?llm_settings.mode,
        providers = ?llm.configured_providers(),
        timeout_secs = llm_settings.timeout.as_secs(),
        max_retries = llm_settings.max_retries,
        "Generation client ready",
    );

    // --- App state ---
    let store = Arc::new(PgStore::new(pool));
    let service = ArtifactService::new(Stores::shared(store.clone()), Arc::new(llm));
    let state = AppState {
        service: Arc::new(service),
        health: store,
        config: Arc::new(config.clone()),
    };

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

    let (drain_tx, drain_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                drain_rx.await.ok();
            })
            .await
    });

    let signal = shutdown_signal().await;
    tracing::info!(signal, "Shutting down; draining in-flight requests");
    let _ = drain_tx.send(());

    // --- Drain ---
    let drain_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    match tokio::time::timeout(drain_timeout, server).await {
        Ok(Ok(Ok(()))) => tracing::info!("Graceful shutdown complete"),
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "Server error"),
        Ok(Err(e)) => tracing::error!(error = %e, "Server task failed"),
        Err(_) => tracing::warn!(
            timeout_secs = config.shutdown_timeout_secs,
            "In-flight requests did not drain in time; exiting",
        ),
    }
}

/// `LOG_FORMAT=json` switches to JSON lines; the filter comes from `RUST_LOG`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "scribe_api=debug,scribe_pipeline=debug,scribe_llm=info,tower_http=debug".into()
    });
    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Resolve on SIGINT or (Unix) SIGTERM, naming the signal received.
async fn shutdown_signal() -> &'static str {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    }
}
