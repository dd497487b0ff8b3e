//! Prometheus metrics (lock-free atomics, zero allocation on hot path).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Traffic ---
    pub tx_total: AtomicU64,
    pub tx_success: AtomicU64,
    pub tx_error: AtomicU64,
    pub batch_items: AtomicU64,

    // --- Latency (μs, updated via CAS) ---
    pub tx_duration_us_sum: AtomicU64,
    pub tx_duration_us_max: AtomicU64,

    // --- Upstream ---
    pub provider_errors: AtomicU64,
    pub rpc_errors: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            tx_total: AtomicU64::new(0),
            tx_success: AtomicU64::new(0),
            tx_error: AtomicU64::new(0),
            batch_items: AtomicU64::new(0),
            tx_duration_us_sum: AtomicU64::new(0),
            tx_duration_us_max: AtomicU64::new(0),
            provider_errors: AtomicU64::new(0),
            rpc_errors: AtomicU64::new(0),
        }
    }

    pub fn record_tx_duration(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.tx_duration_us_sum.fetch_add(us, Ordering::Relaxed);
        // CAS loop for max tracking
        let mut cur = self.tx_duration_us_max.load(Ordering::Relaxed);
        while us > cur {
            match self.tx_duration_us_max.compare_exchange_weak(
                cur,
                us,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let tx_total = self.tx_total.load(Ordering::Relaxed);
        let tx_success = self.tx_success.load(Ordering::Relaxed);
        let tx_error = self.tx_error.load(Ordering::Relaxed);
        let batch_items = self.batch_items.load(Ordering::Relaxed);
        let tx_dur_sum = self.tx_duration_us_sum.load(Ordering::Relaxed);
        let tx_dur_max = self.tx_duration_us_max.swap(0, Ordering::Relaxed);
        let provider_errors = self.provider_errors.load(Ordering::Relaxed);
        let rpc_errors = self.rpc_errors.load(Ordering::Relaxed);

        // Convert μs to seconds for Prometheus conventions
        let tx_dur_sum_s = tx_dur_sum as f64 / 1_000_000.0;
        let tx_dur_max_s = tx_dur_max as f64 / 1_000_000.0;

        format!(
            "\
# HELP relay_tx_total Total submission requests received.\n\
# TYPE relay_tx_total counter\n\
relay_tx_total {tx_total}\n\
# HELP relay_tx_success_total Successful submissions.\n\
# TYPE relay_tx_success_total counter\n\
relay_tx_success_total {tx_success}\n\
# HELP relay_tx_error_total Failed submissions.\n\
# TYPE relay_tx_error_total counter\n\
relay_tx_error_total {tx_error}\n\
# HELP relay_batch_items_total Individual transactions relayed in batches.\n\
# TYPE relay_batch_items_total counter\n\
relay_batch_items_total {batch_items}\n\
# HELP relay_tx_duration_seconds_sum Total handler time (seconds).\n\
# TYPE relay_tx_duration_seconds_sum counter\n\
relay_tx_duration_seconds_sum {tx_dur_sum_s:.6}\n\
# HELP relay_tx_duration_seconds_max Max handler time since last scrape (seconds).\n\
# TYPE relay_tx_duration_seconds_max gauge\n\
relay_tx_duration_seconds_max {tx_dur_max_s:.6}\n\
# HELP relay_provider_errors_total Provider rejections and transport failures.\n\
# TYPE relay_provider_errors_total counter\n\
relay_provider_errors_total {provider_errors}\n\
# HELP relay_rpc_errors_total Solana RPC errors.\n\
# TYPE relay_rpc_errors_total counter\n\
relay_rpc_errors_total {rpc_errors}\n"
        )
    }
}
