use std::collections::BTreeSet;

use dimension_core::records::ProducerInfo;
use dimension_core::types::{AccountName, BlockTimestamp};
use dimension_state::ChainHost;
use tracing::info;

/// Stands in for the consensus layer during a replay: logs each call and
/// keeps the resulting producer set and consensus mode.
#[derive(Debug, Default)]
pub struct TracingHost {
    pub elected: BTreeSet<AccountName>,
    pub schedule: Vec<AccountName>,
    pub consensus_type: u8,
}

impl ChainHost for TracingHost {
    fn update_elected_producers(&mut self, timestamp: BlockTimestamp, candidates: &[ProducerInfo]) {
        self.schedule = candidates.iter().map(|p| p.owner.clone()).collect();
        info!(slot = timestamp.slot, size = self.schedule.len(), "producer schedule published");
    }

    fn add_elected_producer(&mut self, account: &AccountName) {
        self.elected.insert(account.clone());
        info!(%account, "producer elected");
    }

    fn remove_elected_producer(&mut self, account: &AccountName) {
        self.elected.remove(account);
        info!(%account, "producer removed");
    }

    fn set_consensus_type(&mut self, consensus_type: u8) {
        self.consensus_type = consensus_type;
        info!(consensus_type, "consensus mode switched");
    }
}
