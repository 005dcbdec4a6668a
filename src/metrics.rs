use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("jokes_requests_total", "Total number of joke requests").unwrap();
    pub static ref JOKES_SERVED: Counter =
        register_counter!("jokes_served_total", "Random jokes returned to clients").unwrap();
    pub static ref JOKES_WRITTEN: Counter =
        register_counter!("jokes_written_total", "Jokes stored through the write endpoint").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("jokes_rate_limited_total", "Write requests rejected by the rate limiter").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "jokes_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
    pub static ref VISITORS_TRACKED: Gauge =
        register_gauge!("jokes_visitors_tracked", "Current number of rate limited visitors").unwrap();
    pub static ref VISITORS_EVICTED: Counter =
        register_counter!("jokes_visitors_evicted_total", "Idle visitors removed by the sweeper").unwrap();
}
