use crate::config::Config;
use crate::error::ShuffleError;
use crate::handlers::{health_check, shuffle, AppState, SharedState};
use crate::history::{HistoryStore, JsonFileHistory};
use crate::middleware::logging_middleware;
use crate::shuffle::ShuffleGenerator;
use crate::validation::RequestValidator;
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the router around already-constructed state.
pub fn create_app(state: SharedState) -> Router {
    Router::new()
        .route("/shuffle", post(shuffle))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(logging_middleware)),
        )
}

pub struct Server {
    app: Router,
    bind_address: String,
}

impl Server {
    pub fn new(config: Config) -> Result<Self, ShuffleError> {
        let history = JsonFileHistory::new(config.history_path()?);
        history.ensure_exists()?;
        tracing::info!("Shuffle history at {}", history.path().display());

        let history: Arc<dyn HistoryStore> = Arc::new(history);
        let state = AppState::new(
            ShuffleGenerator::new(config.seed),
            RequestValidator::new(config.max_playlist_size),
            history,
        )
        .with_structured_internal_errors(config.structured_internal_errors);

        Ok(Self {
            app: create_app(Arc::new(state)),
            bind_address: config.bind_address,
        })
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = tokio::net::TcpListener::bind(&self.bind_address).await?;

        tracing::info!("Shuffle server listening on {}", self.bind_address);
        tracing::info!("Health check available at /health");

        axum::serve(
            listener,
            self.app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
