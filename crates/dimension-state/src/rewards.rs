use dimension_core::constants::{BLOCK_PAY_MEMO, CLAIM_INTERVAL_US, MIN_PROPOSAL_STAKE};
use dimension_core::error::DimensionError;
use dimension_core::types::{AccountName, ChainTime};
use tracing::info;

use crate::engine::{StagedMutations, SystemEngine};
use crate::host::{ChainHost, TokenLedger, Transfer};

impl<H: ChainHost, L: TokenLedger> SystemEngine<H, L> {
    /// Pay out a producer's unpaid blocks. At most one claim per day.
    pub(crate) fn claim_rewards(
        &self,
        staged: &mut StagedMutations,
        owner: &AccountName,
        now: ChainTime,
    ) -> Result<(), DimensionError> {
        let mut prod = self
            .db
            .get_producer(owner)?
            .ok_or_else(|| DimensionError::UnknownProducer(owner.clone()))?;
        if !prod.is_active() {
            return Err(DimensionError::ProducerKeyInactive(owner.clone()));
        }

        let global = &mut staged.global;
        if !global.is_activated() {
            return Err(DimensionError::ChainNotActivated {
                have: global.total_proposal_stake,
                need: MIN_PROPOSAL_STAKE,
            });
        }

        let ct = now.micros();
        if ct.saturating_sub(prod.last_claim_time) <= CLAIM_INTERVAL_US {
            return Err(DimensionError::AlreadyClaimedToday {
                next_claim_after: prod.last_claim_time.saturating_add(CLAIM_INTERVAL_US),
            });
        }

        let unpaid = prod.unpaid_blocks;
        let pay = if global.total_unpaid_blocks > 0 {
            global.reward_pre_block.saturating_mul(unpaid as i64)
        } else {
            0
        };

        global.perblock_bucket -= pay;
        global.total_unpaid_blocks = global.total_unpaid_blocks.saturating_sub(unpaid);
        prod.unpaid_blocks = 0;
        prod.last_claim_time = ct;
        staged.producers.push(prod);

        if pay > 0 {
            staged.transfers.push(Transfer {
                from: self.params.block_pay_escrow.clone(),
                to: owner.clone(),
                amount: pay,
                memo: BLOCK_PAY_MEMO.to_string(),
            });
        }

        info!(%owner, blocks = unpaid, pay, "rewards claimed");
        Ok(())
    }
}
