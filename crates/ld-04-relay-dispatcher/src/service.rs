//! # Relay Dispatcher Service
//!
//! Consumes reservations from admission and drives each to an outcome.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ld_03_claim_admission::{
    AdmissionError, ClaimAdmissionApi, RelayQueue, RelayQueueError, RelayResolution, Reservation,
};
use lootdrop_telemetry::metrics::{RELAYS_IN_FLIGHT, RELAY_ATTEMPTS, RELAY_LATENCY};
use parking_lot::Mutex;
use shared_types::{RelayOutcome, ReservationRef};
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::domain::entities::{DrainReport, LedgerResponse};
use crate::domain::retry::RetryPolicy;
use crate::ports::outbound::LedgerClient;

/// Dispatcher configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatcherConfig {
    pub retry: RetryPolicy,
    /// Concurrent ledger submissions.
    pub max_in_flight: usize,
    /// How long shutdown waits for in-flight relays.
    pub drain_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            max_in_flight: 64,
            drain_timeout: Duration::from_secs(15),
        }
    }
}

/// Sending half handed to admission.
#[derive(Debug, Clone)]
pub struct RelayHandle {
    tx: mpsc::UnboundedSender<Reservation>,
}

impl RelayQueue for RelayHandle {
    fn enqueue(&self, reservation: Reservation) -> Result<(), RelayQueueError> {
        self.tx.send(reservation).map_err(|_| RelayQueueError::Closed)
    }
}

/// One unit of the in-flight gauge, released on drop so aborted relays
/// give it back too.
struct InFlightGauge;

impl InFlightGauge {
    fn acquire() -> Self {
        RELAYS_IN_FLIGHT.inc();
        Self
    }
}

impl Drop for InFlightGauge {
    fn drop(&mut self) {
        RELAYS_IN_FLIGHT.dec();
    }
}

/// Relay dispatcher.
pub struct RelayDispatcher {
    admission: Arc<dyn ClaimAdmissionApi>,
    client: Arc<dyn LedgerClient>,
    config: DispatcherConfig,
    permits: Arc<Semaphore>,
    /// Relays spawned by the worker loop that have not finished.
    worker_relays: Mutex<HashSet<ReservationRef>>,
}

impl RelayDispatcher {
    pub fn new(
        admission: Arc<dyn ClaimAdmissionApi>,
        client: Arc<dyn LedgerClient>,
        config: DispatcherConfig,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_in_flight.max(1)));
        Self {
            admission,
            client,
            config,
            permits,
            worker_relays: Mutex::new(HashSet::new()),
        }
    }

    /// Queue pair connecting admission to [`RelayDispatcher::run`].
    pub fn channel() -> (RelayHandle, mpsc::UnboundedReceiver<Reservation>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (RelayHandle { tx }, rx)
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Worker-spawned relays still running. Direct [`RelayDispatcher::relay`]
    /// calls are not counted.
    pub fn in_flight(&self) -> usize {
        self.worker_relays.lock().len()
    }

    /// Worker loop. Returns once shutdown is signalled (or every sender is
    /// dropped) and the drain has finished.
    pub async fn run(
        self: Arc<Self>,
        mut rx: mpsc::UnboundedReceiver<Reservation>,
        mut shutdown: watch::Receiver<bool>,
    ) -> DrainReport {
        let mut tasks: JoinSet<()> = JoinSet::new();
        let mut completed = 0usize;
        info!(max_in_flight = self.config.max_in_flight, "[ld-04] relay dispatcher started");

        while !*shutdown.borrow() {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "[ld-04] relay task failed");
                    }
                    completed += 1;
                }
                msg = rx.recv() => match msg {
                    Some(reservation) => self.spawn_relay(&mut tasks, reservation),
                    None => break,
                },
            }
        }

        // Stop intake; reservations already accepted are still relayed.
        rx.close();
        while let Ok(reservation) = rx.try_recv() {
            self.spawn_relay(&mut tasks, reservation);
        }

        let report = self.drain(tasks, completed).await;
        info!(
            completed = report.completed,
            abandoned = report.abandoned,
            "[ld-04] relay dispatcher stopped"
        );
        report
    }

    fn spawn_relay(self: &Arc<Self>, tasks: &mut JoinSet<()>, reservation: Reservation) {
        let reference = reservation.reference.clone();
        if !self.worker_relays.lock().insert(reference.clone()) {
            debug!(reservation = %reference, "[ld-04] relay already in flight");
            return;
        }
        let this = Arc::clone(self);
        tasks.spawn(async move {
            this.relay(reservation).await;
            this.worker_relays.lock().remove(&reference);
        });
    }

    async fn drain(&self, mut tasks: JoinSet<()>, mut completed: usize) -> DrainReport {
        let deadline = tokio::time::sleep(self.config.drain_timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => break,
                joined = tasks.join_next() => match joined {
                    Some(_) => completed += 1,
                    None => break,
                },
            }
        }

        tasks.abort_all();
        while tasks.join_next().await.is_some() {}

        // Only aborted tasks are left in the set.
        let abandoned: Vec<ReservationRef> = self.worker_relays.lock().drain().collect();
        for reference in &abandoned {
            warn!(reservation = %reference, "[ld-04] relay cut off by shutdown");
            self.apply(reference, RelayResolution::Unknown, 0);
        }

        DrainReport {
            completed,
            abandoned: abandoned.len(),
        }
    }

    /// Relay one reservation to an outcome and settle it.
    ///
    /// Used by the worker for fresh reservations and by reconciliation for
    /// references the ledger never saw.
    pub async fn relay(&self, reservation: Reservation) -> RelayOutcome {
        let reference = reservation.reference.clone();
        let _permit = match self.permits.clone().acquire_owned().await {
            Ok(p) => p,
            Err(_) => return self.apply(&reference, RelayResolution::Unknown, 0),
        };
        let _gauge = InFlightGauge::acquire();
        let started = Instant::now();

        let (resolution, attempts) = self.submit_with_retry(&reservation).await;
        let outcome = self.apply(&reference, resolution, attempts);

        RELAY_LATENCY.observe(started.elapsed().as_secs_f64());
        outcome
    }

    async fn submit_with_retry(&self, reservation: &Reservation) -> (RelayResolution, u32) {
        let policy = &self.config.retry;
        let reference = &reservation.reference;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            RELAY_ATTEMPTS.inc();

            match tokio::time::timeout(policy.attempt_timeout, self.client.submit(reservation)).await {
                Ok(Ok(LedgerResponse::Confirmed(tx))) => {
                    return (RelayResolution::Confirmed(tx), attempt);
                }
                Ok(Ok(LedgerResponse::Rejected(reason))) => {
                    return (RelayResolution::Rejected(reason), attempt);
                }
                Ok(Err(e)) => {
                    debug!(reservation = %reference, attempt, error = %e, kind = e.kind(), "[ld-04] transient ledger failure");
                }
                Err(_) => {
                    debug!(reservation = %reference, attempt, "[ld-04] ledger attempt timed out");
                }
            }

            if !policy.should_retry(attempt) {
                warn!(reservation = %reference, attempts = attempt, "[ld-04] retry ceiling reached");
                return (RelayResolution::Unknown, attempt);
            }
            tokio::time::sleep(policy.delay_for(attempt)).await;
        }
    }

    /// Settle and report the record's resulting outcome.
    fn apply(&self, reference: &ReservationRef, resolution: RelayResolution, attempts: u32) -> RelayOutcome {
        let wanted = resolution.outcome();
        match self.admission.settle(reference, resolution, attempts) {
            Ok(record) => record.outcome,
            Err(AdmissionError::InvalidTransition { from, .. }) => {
                // Reconciliation or an earlier relay already moved it.
                debug!(reservation = %reference, current = %from, wanted = %wanted, "[ld-04] settle skipped");
                from
            }
            Err(e) => {
                error!(reservation = %reference, error = %e, "[ld-04] settle failed");
                wanted
            }
        }
    }
}
