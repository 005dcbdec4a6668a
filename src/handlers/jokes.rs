use axum::{
    Json,
    body::Bytes,
    extract::{ConnectInfo, State},
    http::StatusCode,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::metrics::{
    JOKES_SERVED, JOKES_WRITTEN, RATE_LIMITED, REQUEST_LATENCY, REQUEST_TOTAL, VISITORS_TRACKED,
};
use crate::models::{Joke, NewJoke, WriteRequest};
use crate::state::AppState;

// Rate limit key - peer IP only, so reconnecting from a new port shares the bucket
pub fn client_key(addr: &SocketAddr) -> String {
    addr.ip().to_string()
}

// GET /random - not rate limited
pub async fn random_handler(State(state): State<Arc<AppState>>) -> Result<Json<Joke>, ApiError> {
    REQUEST_TOTAL.inc();
    let start_time = Instant::now();

    let joke = state
        .store
        .random()
        .await
        .inspect_err(|e| error!("Error getting joke: {}", e))?
        .ok_or(ApiError::NotFound)?;

    JOKES_SERVED.inc();
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    Ok(Json(joke))
}

// POST /write - throttled per client before the body is even parsed
pub async fn write_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    body: Bytes,
) -> Result<(StatusCode, Json<Joke>), ApiError> {
    REQUEST_TOTAL.inc();

    let client = client_key(&addr);
    let admitted = state.rate_limiter.admit(&client);
    VISITORS_TRACKED.set(state.rate_limiter.len() as f64);
    if !admitted {
        RATE_LIMITED.inc();
        warn!(client = %client, "Rate limit exceeded");
        return Err(ApiError::RateLimited);
    }

    let start_time = Instant::now();

    let payload: WriteRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadJson(e.to_string()))?;
    let new_joke = NewJoke::parse(payload)?;

    let joke = state
        .store
        .insert(new_joke)
        .await
        .inspect_err(|e| error!("Error saving joke: {}", e))?;

    JOKES_WRITTEN.inc();
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    info!(id = joke.id, client = %client, "Stored joke");

    Ok((StatusCode::CREATED, Json(joke)))
}
