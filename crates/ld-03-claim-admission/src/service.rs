//! # Claim Admission Service
//!
//! Implements `ClaimAdmissionApi` over the proof verifier, the campaign
//! ledger and the claim log.

use std::sync::Arc;

use ld_01_proof_verification::{ProofVerificationApi, VerifiedProof};
use ld_02_campaign_ledger::{CampaignLedger, CampaignLedgerApi, LedgerError};
use lootdrop_telemetry::metrics::{
    ADMISSIONS, PROOF_FAILURES, RELAY_OUTCOMES, RESERVATIONS_RELEASED, UNKNOWN_BACKLOG,
};
use shared_types::{
    Campaign, CampaignId, ClaimRecord, RelayOutcome, ReservationRef, Timestamp, WalletId,
};
use tracing::{debug, error, info, warn};

use crate::domain::claim_log::ClaimLog;
use crate::domain::entities::{
    ClaimDecision, ClaimRequest, RejectReason, RelayResolution, Reservation,
};
use crate::domain::errors::AdmissionError;
use crate::ports::inbound::ClaimAdmissionApi;
use crate::ports::outbound::RelayQueue;

/// Claim admission state machine.
pub struct AdmissionService {
    verifier: Arc<dyn ProofVerificationApi>,
    ledger: Arc<CampaignLedger>,
    log: Arc<ClaimLog>,
    relay: Arc<dyn RelayQueue>,
}

impl AdmissionService {
    pub fn new(
        verifier: Arc<dyn ProofVerificationApi>,
        ledger: Arc<CampaignLedger>,
        log: Arc<ClaimLog>,
        relay: Arc<dyn RelayQueue>,
    ) -> Self {
        Self {
            verifier,
            ledger,
            log,
            relay,
        }
    }

    pub fn claim_log(&self) -> &Arc<ClaimLog> {
        &self.log
    }

    pub fn ledger(&self) -> &Arc<CampaignLedger> {
        &self.ledger
    }

    fn decide(&self, campaign_id: &CampaignId, claimant: &WalletId, decision: ClaimDecision) -> ClaimDecision {
        ADMISSIONS.with_label_values(&[decision.label()]).inc();
        match &decision {
            ClaimDecision::Accepted(reference) => {
                info!(reservation = %reference, claimant = %claimant, "[ld-03] claim accepted");
            }
            ClaimDecision::Rejected(reason) => {
                debug!(campaign_id = %campaign_id, claimant = %claimant, reason = %reason, "[ld-03] claim rejected");
            }
        }
        decision
    }

    /// Tie a verified proof to the campaign it is being redeemed against.
    ///
    /// Returns the metric label of the failed check.
    fn check_binding(
        &self,
        proof: &VerifiedProof,
        campaign: &Campaign,
        now: Timestamp,
    ) -> Result<(), &'static str> {
        if proof.tag != campaign.tag_pubkey {
            return Err("tag_mismatch");
        }
        if proof.onchain_id != campaign.onchain_id {
            return Err("campaign_mismatch");
        }
        self.verifier.check_fresh(proof, now).map_err(|e| e.kind())
    }

    /// Steps 3 and 4 under the campaign lock.
    fn reserve(&self, campaign_id: &CampaignId, claimant: WalletId) -> Result<Reservation, RejectReason> {
        let log = &self.log;
        let reserved = self.ledger.with_slot(campaign_id, |slot, now| {
            if slot.has_claimed(&claimant) {
                return Err(RejectReason::AlreadyClaimed);
            }
            slot.compare_and_reserve(now)?;

            let amount = slot.campaign().reward_per_claim;
            let sequence = slot.admit_claimant(claimant);
            let reference = ReservationRef::new(campaign_id.clone(), sequence);

            if let Err(e) = log.append(ClaimRecord::pending(reference.clone(), claimant, amount, now)) {
                // log and slot disagree on sequence numbers
                slot.release(&claimant, now);
                error!(reservation = %reference, error = %e, "[ld-03] claim log rejected new record");
                return Err(RejectReason::Unavailable);
            }

            Ok(Reservation {
                reference,
                claimant,
                amount,
            })
        });

        match reserved {
            Ok(result) => result,
            Err(LedgerError::NotFound(_)) => Err(RejectReason::NoSuchCampaign),
            Err(e) => {
                warn!(campaign_id = %campaign_id, error = %e, "[ld-03] campaign slot unavailable");
                Err(RejectReason::Unavailable)
            }
        }
    }
}

impl ClaimAdmissionApi for AdmissionService {
    fn admit(&self, request: &ClaimRequest) -> ClaimDecision {
        let campaign_id = &request.campaign_id;
        let claimant = request.proof.claimant;

        // 1. Verify
        let verified = match self.verifier.verify(&request.proof) {
            Ok(v) => v,
            Err(e) => {
                PROOF_FAILURES.with_label_values(&[e.kind()]).inc();
                return self.decide(campaign_id, &claimant, ClaimDecision::Rejected(RejectReason::BadProof));
            }
        };

        // 2. Lookup and bind
        let campaign = match self.ledger.get(campaign_id) {
            Ok(c) => c,
            Err(e) => {
                let reason = match e {
                    LedgerError::NotFound(_) => RejectReason::NoSuchCampaign,
                    e => {
                        warn!(campaign_id = %campaign_id, error = %e, "[ld-03] campaign lookup failed");
                        RejectReason::Unavailable
                    }
                };
                return self.decide(campaign_id, &claimant, ClaimDecision::Rejected(reason));
            }
        };
        if let Err(kind) = self.check_binding(&verified, &campaign, self.ledger.now()) {
            PROOF_FAILURES.with_label_values(&[kind]).inc();
            return self.decide(campaign_id, &claimant, ClaimDecision::Rejected(RejectReason::BadProof));
        }

        // 3-4. Uniqueness and reservation
        let reservation = match self.reserve(campaign_id, verified.claimant) {
            Ok(r) => r,
            Err(reason) => {
                return self.decide(campaign_id, &claimant, ClaimDecision::Rejected(reason));
            }
        };

        let reference = reservation.reference.clone();
        if let Err(e) = self.relay.enqueue(reservation) {
            warn!(reservation = %reference, error = %e, "[ld-03] relay queue unavailable, parking for reconciliation");
            if let Err(e) = self.settle(&reference, RelayResolution::Unknown, 0) {
                error!(reservation = %reference, error = %e, "[ld-03] could not park reservation");
            }
        }

        self.decide(campaign_id, &claimant, ClaimDecision::Accepted(reference))
    }

    fn settle(
        &self,
        reference: &ReservationRef,
        resolution: RelayResolution,
        attempts: u32,
    ) -> Result<ClaimRecord, AdmissionError> {
        let next = resolution.outcome();
        let log = &self.log;

        let (record, previous) = self.ledger.with_slot(&reference.campaign_id, |slot, now| {
            log.update(reference, |record| {
                let from = record.outcome;
                // A repeated Unknown only adds the attempts of the failed resubmission.
                if from == RelayOutcome::Unknown && next == RelayOutcome::Unknown {
                    record.relay_attempts = record.relay_attempts.saturating_add(attempts);
                    return Ok((record.clone(), from));
                }
                if !from.can_transition_to(next) {
                    return Err(AdmissionError::InvalidTransition {
                        reference: reference.clone(),
                        from,
                        to: next,
                    });
                }
                record.outcome = next;
                record.relay_attempts = record.relay_attempts.saturating_add(attempts);
                match &resolution {
                    RelayResolution::Confirmed(tx) => {
                        record.tx_ref = Some(tx.clone());
                        record.resolved_at = Some(now);
                    }
                    RelayResolution::Rejected(reason) => {
                        record.rejection_reason = Some(reason.clone());
                        record.resolved_at = Some(now);
                        slot.release(&record.claimant, now);
                    }
                    RelayResolution::Unknown => {}
                }
                Ok((record.clone(), from))
            })
            .ok_or_else(|| AdmissionError::UnknownReservation(reference.clone()))?
        })??;

        if previous == next {
            debug!(reservation = %reference, attempts = record.relay_attempts, "[ld-03] claim still unknown");
            return Ok(record);
        }

        RELAY_OUTCOMES.with_label_values(&[next.as_str()]).inc();
        if next == RelayOutcome::Unknown {
            UNKNOWN_BACKLOG.inc();
        }
        if previous == RelayOutcome::Unknown {
            UNKNOWN_BACKLOG.dec();
        }

        match &resolution {
            RelayResolution::Confirmed(tx) => {
                info!(reservation = %reference, tx = %tx, attempts = record.relay_attempts, "[ld-03] claim confirmed");
            }
            RelayResolution::Rejected(reason) => {
                RESERVATIONS_RELEASED.inc();
                warn!(reservation = %reference, reason = %reason, "[ld-03] claim rejected by ledger, slot released");
            }
            RelayResolution::Unknown => {
                warn!(reservation = %reference, attempts = record.relay_attempts, "[ld-03] claim outcome unknown, awaiting reconciliation");
            }
        }
        Ok(record)
    }

    fn unresolved(&self) -> Vec<ClaimRecord> {
        self.log.with_outcome(RelayOutcome::Unknown)
    }

    fn record(&self, reference: &ReservationRef) -> Option<ClaimRecord> {
        self.log.get(reference)
    }

    fn find(&self, campaign: &CampaignId, claimant: &WalletId) -> Option<ClaimRecord> {
        self.log.find(campaign, claimant)
    }
}
