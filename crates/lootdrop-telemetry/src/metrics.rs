//! Prometheus metrics for the LootDrop relay.
//!
//! All metrics follow the naming convention: `lootdrop_<area>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: admissions, proof failures, relay attempts and outcomes
//! - **Gauge**: Unknown backlog, relays in flight
//! - **Histogram**: end-to-end relay latency

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // ADMISSION METRICS (LD-01, LD-03)
    // =========================================================================

    /// Admission decisions by outcome
    pub static ref ADMISSIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("lootdrop_admission_decisions_total", "Claim admission decisions"),
        &["decision"]  // accepted, bad_proof, no_such_campaign, already_claimed, ...
    ).expect("metric creation failed");

    /// Proof verification failures by kind
    pub static ref PROOF_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("lootdrop_proof_failures_total", "Rejected proofs of visit"),
        &["kind"]  // malformed_signature, verification_failed, stale, tag_mismatch, ...
    ).expect("metric creation failed");

    // =========================================================================
    // RELAY METRICS (LD-04)
    // =========================================================================

    /// Ledger submissions attempted, including retries
    pub static ref RELAY_ATTEMPTS: IntCounter = IntCounter::new(
        "lootdrop_relay_attempts_total",
        "Ledger submission attempts"
    ).expect("metric creation failed");

    /// Terminal relay outcomes
    pub static ref RELAY_OUTCOMES: IntCounterVec = IntCounterVec::new(
        Opts::new("lootdrop_relay_outcomes_total", "Relay outcomes written to claim records"),
        &["outcome"]  // confirmed, rejected, unknown
    ).expect("metric creation failed");

    /// Reservations rolled back after a definitive rejection
    pub static ref RESERVATIONS_RELEASED: IntCounter = IntCounter::new(
        "lootdrop_reservations_released_total",
        "Reservations released after ledger rejection"
    ).expect("metric creation failed");

    /// Claim records awaiting reconciliation
    pub static ref UNKNOWN_BACKLOG: IntGauge = IntGauge::new(
        "lootdrop_relay_unknown_backlog",
        "Claim records in Unknown state"
    ).expect("metric creation failed");

    /// Relays currently holding an in-flight permit
    pub static ref RELAYS_IN_FLIGHT: IntGauge = IntGauge::new(
        "lootdrop_relays_in_flight",
        "Relays currently submitting to the ledger"
    ).expect("metric creation failed");

    /// Time from dequeue to terminal outcome
    pub static ref RELAY_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "lootdrop_relay_duration_seconds",
            "Time from dequeue to relay outcome"
        ).buckets(exponential_buckets(0.005, 2.0, 14).expect("valid buckets"))
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already registered collectors are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(ADMISSIONS.clone()),
        Box::new(PROOF_FAILURES.clone()),
        Box::new(RELAY_ATTEMPTS.clone()),
        Box::new(RELAY_OUTCOMES.clone()),
        Box::new(RESERVATIONS_RELEASED.clone()),
        Box::new(UNKNOWN_BACKLOG.clone()),
        Box::new(RELAYS_IN_FLIGHT.clone()),
        Box::new(RELAY_LATENCY.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_text() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
