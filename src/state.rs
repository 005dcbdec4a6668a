use std::sync::Arc;
use crate::rate_limit::RateLimiter;
use crate::store::JokeStore;
// app's shared state

pub struct AppState {
    pub store: Arc<dyn JokeStore>,
    pub rate_limiter: Arc<RateLimiter>, // shared with the sweeper task
}

impl AppState {
    pub fn new(store: Arc<dyn JokeStore>, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            store,
            rate_limiter,
        }
    }
}
