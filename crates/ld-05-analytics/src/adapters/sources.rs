//! Read sources backed by the live campaign ledger and claim log.

use ld_02_campaign_ledger::{CampaignLedger, CampaignLedgerApi};
use ld_03_claim_admission::ClaimLog;
use shared_types::{Campaign, ClaimRecord};

use crate::ports::outbound::{CampaignCatalog, ClaimHistory};

impl CampaignCatalog for CampaignLedger {
    fn campaigns(&self) -> Vec<Campaign> {
        self.list()
    }
}

impl ClaimHistory for ClaimLog {
    fn claims(&self) -> Vec<ClaimRecord> {
        self.snapshot()
    }
}
