//! Simulated Ledger Adapter
//!
//! In-process stand-in for the on-chain program. Holds per-campaign escrow,
//! pays each reservation reference at most once, and can be scripted to
//! misbehave for tests and local runs.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ld_03_claim_admission::Reservation;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use shared_types::{CampaignId, Lamports, ReservationRef, TxRef, WalletId};
use tracing::debug;

use crate::domain::entities::{LedgerResponse, LedgerStatus};
use crate::domain::errors::LedgerClientError;
use crate::ports::outbound::LedgerClient;

/// Scripted misbehaviour for the next submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerFault {
    /// Fail without touching state.
    Fail(LedgerClientError),
    /// Apply the payout, then report a timeout.
    LostAck,
    /// Never answer.
    Stall,
}

#[derive(Debug, Clone)]
struct Payout {
    tx: TxRef,
    claimant: WalletId,
    amount: Lamports,
}

#[derive(Debug, Default)]
struct Book {
    escrow: HashMap<CampaignId, Lamports>,
    payouts: HashMap<ReservationRef, Payout>,
    rejections: HashMap<ReservationRef, String>,
}

/// In-memory ledger with idempotent payouts.
#[derive(Debug, Default)]
pub struct SimulatedLedger {
    book: Mutex<Book>,
    faults: Mutex<VecDeque<LedgerFault>>,
    query_faults: Mutex<VecDeque<LedgerClientError>>,
    latency: Mutex<Duration>,
    submissions: AtomicUsize,
}

impl SimulatedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deposit escrow for a campaign.
    pub fn fund(&self, campaign: &CampaignId, lamports: Lamports) {
        let mut book = self.book.lock();
        let balance = book.escrow.entry(campaign.clone()).or_default();
        *balance = balance.saturating_add(lamports);
    }

    pub fn escrow(&self, campaign: &CampaignId) -> Lamports {
        self.book.lock().escrow.get(campaign).copied().unwrap_or(0)
    }

    /// Number of distinct references paid.
    pub fn payout_count(&self) -> usize {
        self.book.lock().payouts.len()
    }

    /// Total submissions received, including duplicates and faulted ones.
    pub fn submission_count(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    /// Queue faults for the next submissions, in order.
    pub fn script(&self, faults: impl IntoIterator<Item = LedgerFault>) {
        self.faults.lock().extend(faults);
    }

    /// Queue transient failures for the next status queries.
    pub fn script_queries(&self, errors: impl IntoIterator<Item = LedgerClientError>) {
        self.query_faults.lock().extend(errors);
    }

    fn tx_for(reference: &ReservationRef) -> TxRef {
        let digest = Sha256::digest(reference.to_string().as_bytes());
        TxRef(format!("sim{}", hex::encode(&digest[..16])))
    }

    /// Apply a payout once per reference.
    fn apply(&self, reservation: &Reservation) -> LedgerResponse {
        let mut book = self.book.lock();
        let reference = &reservation.reference;

        if let Some(payout) = book.payouts.get(reference) {
            return LedgerResponse::Confirmed(payout.tx.clone());
        }
        if let Some(reason) = book.rejections.get(reference) {
            return LedgerResponse::Rejected(reason.clone());
        }

        let escrow = book
            .escrow
            .get(reservation.campaign_id())
            .copied()
            .unwrap_or(0);
        if escrow < reservation.amount {
            let reason = format!(
                "insufficient escrow: {} < {}",
                escrow, reservation.amount
            );
            book.rejections.insert(reference.clone(), reason.clone());
            return LedgerResponse::Rejected(reason);
        }

        book.escrow
            .insert(reservation.campaign_id().clone(), escrow - reservation.amount);
        let tx = Self::tx_for(reference);
        book.payouts.insert(
            reference.clone(),
            Payout {
                tx: tx.clone(),
                claimant: reservation.claimant,
                amount: reservation.amount,
            },
        );
        LedgerResponse::Confirmed(tx)
    }

    /// Lamports received by a wallet across all references.
    pub fn balance_of(&self, wallet: &WalletId) -> Lamports {
        self.book
            .lock()
            .payouts
            .values()
            .filter(|p| &p.claimant == wallet)
            .map(|p| p.amount)
            .sum()
    }
}

#[async_trait]
impl LedgerClient for SimulatedLedger {
    async fn submit(&self, reservation: &Reservation) -> Result<LedgerResponse, LedgerClientError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);

        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let fault = self.faults.lock().pop_front();
        match fault {
            Some(LedgerFault::Fail(e)) => {
                debug!(reservation = %reservation.reference, error = %e, "[ld-04] simulated fault");
                Err(e)
            }
            Some(LedgerFault::LostAck) => {
                self.apply(reservation);
                Err(LedgerClientError::Timeout)
            }
            Some(LedgerFault::Stall) => {
                std::future::pending::<()>().await;
                Err(LedgerClientError::Timeout)
            }
            None => Ok(self.apply(reservation)),
        }
    }

    async fn query_status(
        &self,
        reference: &ReservationRef,
    ) -> Result<LedgerStatus, LedgerClientError> {
        if let Some(e) = self.query_faults.lock().pop_front() {
            return Err(e);
        }
        let book = self.book.lock();
        if let Some(payout) = book.payouts.get(reference) {
            return Ok(LedgerStatus::Confirmed(payout.tx.clone()));
        }
        if let Some(reason) = book.rejections.get(reference) {
            return Ok(LedgerStatus::Rejected(reason.clone()));
        }
        Ok(LedgerStatus::NotFound)
    }
}
