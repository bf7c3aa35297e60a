//! # Reconciliation Job
//!
//! Periodically resolves claim records left Unknown by the dispatcher.

use std::sync::Arc;
use std::time::Duration;

use ld_03_claim_admission::{ClaimAdmissionApi, RelayResolution, Reservation};
use shared_types::RelayOutcome;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::entities::{LedgerStatus, ReconcileReport};
use crate::ports::outbound::LedgerClient;
use crate::service::RelayDispatcher;

pub struct Reconciler {
    admission: Arc<dyn ClaimAdmissionApi>,
    client: Arc<dyn LedgerClient>,
    dispatcher: Arc<RelayDispatcher>,
    interval: Duration,
}

impl Reconciler {
    pub fn new(
        admission: Arc<dyn ClaimAdmissionApi>,
        client: Arc<dyn LedgerClient>,
        dispatcher: Arc<RelayDispatcher>,
        interval: Duration,
    ) -> Self {
        Self {
            admission,
            client,
            dispatcher,
            interval,
        }
    }

    /// Run passes every `interval` until shutdown is signalled, abandoning
    /// a pass that is still running at that point.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(interval_secs = self.interval.as_secs(), "[ld-04] reconciler started");

        while !*shutdown.borrow() {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    // Shutdown cuts a pass short; unfinished records stay Unknown.
                    let report = tokio::select! {
                        report = self.reconcile_once() => report,
                        _ = shutdown.changed() => {
                            info!("[ld-04] reconciliation pass interrupted by shutdown");
                            break;
                        }
                    };
                    if report.examined > 0 {
                        info!(
                            examined = report.examined,
                            confirmed = report.confirmed,
                            rejected = report.rejected,
                            resubmitted = report.resubmitted,
                            unresolved = report.unresolved,
                            "[ld-04] reconciliation pass"
                        );
                    }
                }
            }
        }
        info!("[ld-04] reconciler stopped");
    }

    /// One pass over every Unknown record.
    pub async fn reconcile_once(&self) -> ReconcileReport {
        let unresolved = self.admission.unresolved();
        let mut report = ReconcileReport {
            examined: unresolved.len(),
            ..ReconcileReport::default()
        };
        let timeout = self.dispatcher.config().retry.attempt_timeout;

        for record in unresolved {
            let reference = record.reservation.clone();
            let status = match tokio::time::timeout(timeout, self.client.query_status(&reference)).await {
                Ok(Ok(status)) => status,
                Ok(Err(e)) => {
                    debug!(reservation = %reference, error = %e, "[ld-04] status query failed, retrying next pass");
                    report.unresolved += 1;
                    continue;
                }
                Err(_) => {
                    debug!(reservation = %reference, "[ld-04] status query timed out, retrying next pass");
                    report.unresolved += 1;
                    continue;
                }
            };

            let outcome = match status {
                LedgerStatus::Confirmed(tx) => self.settle(&reference, RelayResolution::Confirmed(tx)),
                LedgerStatus::Rejected(reason) => {
                    self.settle(&reference, RelayResolution::Rejected(reason))
                }
                LedgerStatus::NotFound => {
                    report.resubmitted += 1;
                    self.dispatcher
                        .relay(Reservation {
                            reference: reference.clone(),
                            claimant: record.claimant,
                            amount: record.amount,
                        })
                        .await
                }
            };

            match outcome {
                RelayOutcome::Confirmed => report.confirmed += 1,
                RelayOutcome::Rejected => report.rejected += 1,
                RelayOutcome::Unknown | RelayOutcome::Pending => report.unresolved += 1,
            }
        }
        report
    }

    fn settle(&self, reference: &shared_types::ReservationRef, resolution: RelayResolution) -> RelayOutcome {
        let wanted = resolution.outcome();
        match self.admission.settle(reference, resolution, 0) {
            Ok(record) => record.outcome,
            Err(e) => {
                warn!(reservation = %reference, error = %e, "[ld-04] reconciliation settle failed");
                self.admission
                    .record(reference)
                    .map(|r| r.outcome)
                    .unwrap_or(wanted)
            }
        }
    }
}
