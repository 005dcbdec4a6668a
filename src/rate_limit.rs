use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval_at;
use tracing::{debug, info};

use crate::metrics::{VISITORS_EVICTED, VISITORS_TRACKED};

// Rate limit settings shared by every visitor bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    pub burst: u32,             // bucket capacity
    pub per_second: f64,        // refill rate
    pub sweep_interval: Duration,
    pub idle_timeout: Duration, // visitors idle longer than this get evicted
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst: 3,
            per_second: 1.0,
            sweep_interval: Duration::from_secs(60),
            idle_timeout: Duration::from_secs(180),
        }
    }
}

/// Continuously refilling token bucket.
///
/// Tokens accumulate at `per_second` since the last refill and never exceed
/// `capacity`. A take either removes one whole token or fails immediately.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    capacity: f64,
    per_second: f64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    // New buckets start full
    pub fn new(capacity: u32, per_second: f64, now: Instant) -> Self {
        Self {
            capacity: f64::from(capacity),
            per_second,
            tokens: f64::from(capacity),
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * self.per_second).min(self.capacity);
        self.last_refill = self.last_refill.max(now);
    }

    pub fn try_take(&mut self, now: Instant) -> bool {
        self.refill(now);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return true;
        }
        false
    }

    pub fn available(&mut self, now: Instant) -> f64 {
        self.refill(now);
        self.tokens
    }
}

// Visitor entry - one bucket per client plus when we last heard from it
#[derive(Debug)]
struct Visitor {
    bucket: TokenBucket,
    last_seen: Instant,
}

/// Per-client token-bucket registry.
///
/// Entries are created on first sight of a client and dropped by
/// [`RateLimiter::sweep`] once idle for longer than the configured timeout.
pub struct RateLimiter {
    visitors: DashMap<String, Visitor>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            visitors: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn admit(&self, client_id: &str) -> bool {
        self.admit_at(client_id, Instant::now())
    }

    // Entry lookup, insert and token take all happen under the entry's shard lock
    pub fn admit_at(&self, client_id: &str, now: Instant) -> bool {
        let mut visitor = self
            .visitors
            .entry(client_id.to_string())
            .or_insert_with(|| Visitor {
                bucket: TokenBucket::new(self.config.burst, self.config.per_second, now),
                last_seen: now,
            });

        visitor.last_seen = visitor.last_seen.max(now);
        visitor.bucket.try_take(now)
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    // Drop visitors idle for longer than the timeout, returns how many went away
    pub fn sweep_at(&self, now: Instant) -> usize {
        let idle_timeout = self.config.idle_timeout;
        let mut evicted = 0;
        self.visitors.retain(|_, visitor| {
            let keep = now.saturating_duration_since(visitor.last_seen) <= idle_timeout;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    pub fn contains(&self, client_id: &str) -> bool {
        self.visitors.contains_key(client_id)
    }
}

// Background sweeper - evicts idle visitors every sweep interval until shutdown resolves
pub async fn run_sweeper<F>(limiter: Arc<RateLimiter>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let period = limiter.config().sweep_interval;
    let mut interval = interval_at(tokio::time::Instant::now() + period, period);
    tokio::pin!(shutdown);

    info!(
        interval = ?period,
        idle_timeout = ?limiter.config().idle_timeout,
        "visitor sweeper started"
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("visitor sweeper stopped");
                return;
            }
            _ = interval.tick() => {
                let evicted = limiter.sweep();
                VISITORS_EVICTED.inc_by(evicted as f64);
                VISITORS_TRACKED.set(limiter.len() as f64);
                if evicted > 0 {
                    debug!(evicted, remaining = limiter.len(), "evicted idle visitors");
                }
            }
        }
    }
}
