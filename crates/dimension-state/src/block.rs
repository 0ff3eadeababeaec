//! Block-production hook: unpaid-block accounting, schedule refresh and
//! name-auction closing.

use dimension_core::constants::{
    NAME_BID_MIN_AGE_US, NAME_CLOSE_ACTIVATION_DAYS, NAME_CLOSE_INTERVAL_SLOTS,
    SCHEDULE_UPDATE_INTERVAL_SLOTS, USECONDS_PER_DAY,
};
use dimension_core::error::DimensionError;
use dimension_core::records::ProducerInfo;
use dimension_core::types::{AccountName, BlockTimestamp, ChainTime};
use tracing::{debug, info};

use crate::engine::{StagedMutations, SystemEngine};
use crate::host::{ChainHost, HostCall, TokenLedger};

impl<H: ChainHost, L: TokenLedger> SystemEngine<H, L> {
    pub(crate) fn on_block(
        &self,
        staged: &mut StagedMutations,
        timestamp: BlockTimestamp,
        producer: &AccountName,
        now: ChainTime,
    ) -> Result<(), DimensionError> {
        // Rewards and schedule updates stay dormant until the chain is bootstrapped.
        if staged.global.hook_dormant() {
            debug!(slot = timestamp.slot, "block hook dormant");
            return Ok(());
        }

        if staged.global.last_pervote_bucket_fill == 0 {
            staged.global.last_pervote_bucket_fill = now.micros();
            info!(at = now.micros(), "block pay accounting started");
        }

        // Bootstrap producers may have no registry entry.
        if let Some(mut prod) = self.db.get_producer(producer)? {
            prod.unpaid_blocks += 1;
            staged.global.total_unpaid_blocks += 1;
            staged.producers.push(prod);
        }

        if timestamp.slots_since(staged.global.last_producer_schedule_update)
            > SCHEDULE_UPDATE_INTERVAL_SLOTS
        {
            let candidates = self.schedule_candidates()?;
            debug!(slot = timestamp.slot, candidates = candidates.len(), "refreshing producer schedule");
            staged.host_calls.push(HostCall::UpdateSchedule { timestamp, candidates });
            staged.global.last_producer_schedule_update = timestamp;

            if timestamp.slots_since(staged.global.last_name_close) > NAME_CLOSE_INTERVAL_SLOTS {
                self.close_name_auction(staged, timestamp, now)?;
            }
        }
        Ok(())
    }

    /// Active producers, highest vote weight first, capped at the schedule size.
    fn schedule_candidates(&self) -> Result<Vec<ProducerInfo>, DimensionError> {
        Ok(self
            .db
            .producers_by_votes()?
            .into_iter()
            .filter(ProducerInfo::is_active)
            .take(self.params.max_schedule_size)
            .collect())
    }

    /// Close the highest open bid once it has aged a day and stake activation
    /// is more than two weeks old.
    fn close_name_auction(
        &self,
        staged: &mut StagedMutations,
        timestamp: BlockTimestamp,
        now: ChainTime,
    ) -> Result<(), DimensionError> {
        let Some(mut highest) = self.db.highest_name_bid()? else {
            return Ok(());
        };

        let now_us = now.micros();
        let activated_at = staged.global.thresh_activated_stake_time;
        let bid_aged = highest.last_bid_time < now_us.saturating_sub(NAME_BID_MIN_AGE_US);
        let activation_matured = activated_at > 0
            && now_us.saturating_sub(activated_at) > NAME_CLOSE_ACTIVATION_DAYS * USECONDS_PER_DAY;

        if highest.is_open() && bid_aged && activation_matured {
            highest.high_bid = -highest.high_bid;
            staged.global.last_name_close = timestamp;
            info!(name = %highest.newname, bidder = %highest.high_bidder, "name auction closed");
            staged.name_bids.push(highest);
        }
        Ok(())
    }
}
