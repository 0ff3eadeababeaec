use dimension_core::constants::{STAKE_GNODE_MEMO, UNSTAKE_GNODE_MEMO};
use dimension_core::error::DimensionError;
use dimension_core::records::GovernanceNodeInfo;
use dimension_core::types::{AccountName, ChainTime, PublicKey};
use tracing::info;

use crate::engine::{StagedMutations, SystemEngine};
use crate::host::{ChainHost, TokenLedger, Transfer};

impl<H: ChainHost, L: TokenLedger> SystemEngine<H, L> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn stake_to_gnode(
        &self,
        staged: &mut StagedMutations,
        payer: &AccountName,
        owner: &AccountName,
        producer_key: &PublicKey,
        url: &str,
        location: u16,
        now: ChainTime,
    ) -> Result<(), DimensionError> {
        if self.db.gnode_exists(owner)? {
            return Err(DimensionError::GovernanceNodeExists(owner.clone()));
        }

        let fee = staged.global.stake_to_gnode_fee;
        if fee > 0 {
            staged.transfers.push(Transfer {
                from: payer.clone(),
                to: self.params.stake_escrow.clone(),
                amount: fee,
                memo: STAKE_GNODE_MEMO.to_string(),
            });
        }

        staged.gnodes.push(GovernanceNodeInfo {
            owner: owner.clone(),
            payer: payer.clone(),
            bp_staked: fee,
            stake_time: now.secs(),
            is_bp: false,
            status: 0,
            producer_key: producer_key.clone(),
            url: url.to_string(),
            location,
        });

        info!(%owner, %payer, staked = fee, "governance node staked");
        Ok(())
    }

    pub(crate) fn unstake_gnode(
        &self,
        staged: &mut StagedMutations,
        owner: &AccountName,
        now: ChainTime,
    ) -> Result<(), DimensionError> {
        let node = self
            .db
            .get_gnode(owner)?
            .ok_or_else(|| DimensionError::NotGovernanceNode(owner.clone()))?;
        if node.is_bp {
            return Err(DimensionError::NodeIsProducer(owner.clone()));
        }

        // Stake backing a proposal still in its vote window stays locked.
        if let Some(open) = self
            .db
            .proposals_voting_after(now.secs())?
            .into_iter()
            .find(|p| p.involves(owner))
        {
            return Err(DimensionError::NodeHasOpenProposal {
                account: owner.clone(),
                proposal_id: open.id,
            });
        }

        if node.bp_staked > 0 {
            staged.transfers.push(Transfer {
                from: self.params.stake_escrow.clone(),
                to: node.payer.clone(),
                amount: node.bp_staked,
                memo: UNSTAKE_GNODE_MEMO.to_string(),
            });
        }
        staged.erased_gnodes.push(owner.clone());

        info!(%owner, payer = %node.payer, refund = node.bp_staked, "governance node unstaked");
        Ok(())
    }

    pub(crate) fn update_gnode(
        &self,
        staged: &mut StagedMutations,
        owner: &AccountName,
        producer_key: &PublicKey,
        url: &str,
        location: u16,
    ) -> Result<(), DimensionError> {
        let mut node = self
            .db
            .get_gnode(owner)?
            .ok_or_else(|| DimensionError::NotGovernanceNode(owner.clone()))?;
        if node.is_bp {
            return Err(DimensionError::NodeIsProducer(owner.clone()));
        }

        node.producer_key = producer_key.clone();
        node.url = url.to_string();
        node.location = location;
        staged.gnodes.push(node);
        Ok(())
    }
}
