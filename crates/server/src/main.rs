//! Voice Coach Server Entry Point

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use voice_coach_config::{load_settings, Settings};
use voice_coach_core::RecordSink;
use voice_coach_persistence::ScyllaConfig;
use voice_coach_server::{create_router, init_metrics, AppState, ServerError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Priority: env vars > config/{env}.* > config/default.* > defaults
    let env = std::env::var("VOICE_COACH_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => {
            // Tracing not yet initialized, use eprintln for early logging
            eprintln!(
                "Loaded configuration from files (env: {})",
                env.as_deref().unwrap_or("default")
            );
            settings
        },
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        },
    };

    init_tracing(&config);

    tracing::info!("Starting Voice Coach Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        config_path = env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    let metrics_handle = if config.observability.metrics_enabled {
        init_metrics()
    } else {
        None
    };

    // Optionally initialize ScyllaDB persistence
    let state = if config.persistence.enabled {
        tracing::info!("Initializing ScyllaDB record store...");
        match init_persistence(&config).await {
            Ok(store) => {
                tracing::info!(
                    hosts = ?config.persistence.scylla_hosts,
                    keyspace = %config.persistence.keyspace,
                    "ScyllaDB record store initialized"
                );
                AppState::with_record_sink(config.clone(), store)
            },
            Err(e) => {
                tracing::error!("Failed to initialize ScyllaDB: {}. Falling back to in-memory.", e);
                AppState::new(config.clone())
            },
        }
    } else {
        tracing::info!("Persistence disabled, using in-memory record store");
        AppState::new(config.clone())
    }
    .with_metrics(metrics_handle);

    tracing::info!(
        durable_records = state.registry.is_durable(),
        gateway_ready = state.gateway.is_some(),
        max_sessions = config.session.max_sessions,
        "Initialized application state"
    );

    // Create router
    let app = create_router(state);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!(ws_path = %config.server.ws_path, "Listening on {}", addr);

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

/// Initialize tracing
fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("voice_coach={},tower_http=debug", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}

/// Connect the durable record store
async fn init_persistence(config: &Settings) -> Result<Arc<dyn RecordSink>, ServerError> {
    let store = voice_coach_persistence::init(ScyllaConfig::from(&config.persistence)).await?;
    Ok(Arc::new(store))
}
