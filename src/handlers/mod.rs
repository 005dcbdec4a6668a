mod health;
mod jokes;
mod metrics;

pub use health::health_handler;
pub use jokes::{client_key, random_handler, write_handler};
pub use metrics::metrics_handler;
