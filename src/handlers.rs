use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use std::io;
use std::sync::Arc;

use crate::error::ShuffleError;
use crate::health::HealthChecker;
use crate::history::HistoryStore;
use crate::response::ShuffleResponse;
use crate::shuffle::ShuffleGenerator;
use crate::validation::RequestValidator;

/// Shared application state
pub type SharedState = Arc<AppState>;

/// Application state containing the generator, validator and history store
pub struct AppState {
    pub generator: ShuffleGenerator,
    pub validator: RequestValidator,
    pub history: Arc<dyn HistoryStore>,
    pub health: HealthChecker,
    pub structured_internal_errors: bool,
}

impl AppState {
    pub fn new(
        generator: ShuffleGenerator,
        validator: RequestValidator,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            generator,
            validator,
            health: HealthChecker::new(Arc::clone(&history)),
            history,
            structured_internal_errors: false,
        }
    }

    pub fn with_structured_internal_errors(mut self, enabled: bool) -> Self {
        self.structured_internal_errors = enabled;
        self
    }
}

/// Shuffle a playlist of `random_nums` tracks and record the result
pub async fn shuffle(State(state): State<SharedState>, body: Bytes) -> Response {
    match run_shuffle(&state, &body).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.to_response(state.structured_internal_errors),
    }
}

async fn run_shuffle(state: &SharedState, body: &[u8]) -> Result<ShuffleResponse, ShuffleError> {
    let payload = RequestValidator::parse_body(body)?;
    let request = state.validator.validate_shuffle_request(payload.as_ref())?;

    if !request.service_type.is_implemented() {
        tracing::debug!(service_type = %request.service_type, "Rejected unsupported shuffle type");
        return Err(ShuffleError::InvalidShuffleType);
    }

    let shuffled_sequence = state
        .generator
        .generate(request.service_type, request.random_nums)?;

    let history = Arc::clone(&state.history);
    let entry = shuffled_sequence.clone();
    tokio::task::spawn_blocking(move || history.append(&entry))
        .await
        .map_err(|e| ShuffleError::Io(io::Error::other(e)))??;

    tracing::debug!(
        random_nums = request.random_nums,
        service_type = %request.service_type,
        "Shuffled playlist"
    );

    Ok(ShuffleResponse::new(shuffled_sequence))
}

/// Health check endpoint
pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.health.check_health())
}
