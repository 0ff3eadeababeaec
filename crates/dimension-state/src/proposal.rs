//! Proposal lifecycle: creation with a fee, and exactly-once execution
//! after the vote window.

use dimension_core::constants::{BOOTSTRAP_PRODUCER_LIMIT, CONSENSUS_TYPES, NEW_PROPOSAL_MEMO};
use dimension_core::error::DimensionError;
use dimension_core::records::{ProposalInfo, ProposalType};
use dimension_core::types::{AccountName, ChainTime, ProposalId};
use tracing::info;

use crate::engine::{StagedMutations, SystemEngine};
use crate::host::{ChainHost, HostCall, TokenLedger, Transfer};

impl<H: ChainHost, L: TokenLedger> SystemEngine<H, L> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_proposal(
        &self,
        staged: &mut StagedMutations,
        owner: &AccountName,
        account: &AccountName,
        block_height: u32,
        proposal_type: ProposalType,
        consensus_type: i64,
        now: ChainTime,
    ) -> Result<(), DimensionError> {
        if !self.db.gnode_exists(owner)? {
            return Err(DimensionError::NotGovernanceNode(owner.clone()));
        }

        match proposal_type {
            // Producers nominate themselves only.
            ProposalType::AddProducer if account != owner => {
                return Err(DimensionError::SelfNominationRequired {
                    owner: owner.clone(),
                    account: account.clone(),
                });
            }
            ProposalType::SwitchConsensus if !CONSENSUS_TYPES.contains(&consensus_type) => {
                return Err(DimensionError::InvalidConsensusType(consensus_type));
            }
            _ => {}
        }

        let fee = staged.global.new_proposal_fee;
        if fee > 0 {
            staged.transfers.push(Transfer {
                from: owner.clone(),
                to: self.params.proposal_escrow.clone(),
                amount: fee,
                memo: NEW_PROPOSAL_MEMO.to_string(),
            });
        }

        let id = self.db.next_proposal_id()?;
        let start_time = now.secs();
        let vote_end_time = start_time.saturating_add(self.params.vote_window_secs);
        let exec_end_time = vote_end_time.saturating_add(self.params.exec_window_secs);

        staged.proposals.push(ProposalInfo {
            id,
            owner: owner.clone(),
            account: account.clone(),
            start_time,
            vote_end_time,
            exec_end_time,
            block_height,
            proposal_type,
            consensus_type,
            total_yeas: 0,
            total_nays: 0,
            is_satisfy: false,
            is_exec: false,
            exec_time: 0,
            total_staked: 0,
        });
        staged.global.proposal_num += 1;

        info!(id, %owner, %account, kind = proposal_type.code(), vote_end_time, "proposal created");
        Ok(())
    }

    pub(crate) fn exec_proposal(
        &self,
        staged: &mut StagedMutations,
        owner: &AccountName,
        proposal_id: ProposalId,
        now: ChainTime,
    ) -> Result<(), DimensionError> {
        if !self.db.gnode_exists(owner)? {
            return Err(DimensionError::NotGovernanceNode(owner.clone()));
        }

        let mut prop = self
            .db
            .get_proposal(proposal_id)?
            .ok_or(DimensionError::ProposalNotFound(proposal_id))?;

        let now_secs = now.secs();
        // While the producer set is small, proposals may execute immediately.
        if self.db.producer_count() > BOOTSTRAP_PRODUCER_LIMIT && now_secs <= prop.vote_end_time {
            return Err(DimensionError::VoteWindowOpen { ends_at: prop.vote_end_time });
        }
        if now_secs >= prop.exec_end_time {
            return Err(DimensionError::ExecutionWindowExpired { ended_at: prop.exec_end_time });
        }
        if prop.is_exec {
            return Err(DimensionError::ProposalAlreadyExecuted(proposal_id));
        }

        if prop.passes(&staged.global) {
            prop.is_satisfy = true;
            self.enact(staged, &prop)?;
        }

        prop.is_exec = true;
        prop.exec_time = now_secs;
        prop.total_staked = staged.global.total_proposal_stake;

        info!(
            id = proposal_id,
            executor = %owner,
            passed = prop.is_satisfy,
            net = %prop.net_approval(),
            "proposal executed"
        );
        staged.proposals.push(prop);
        Ok(())
    }

    /// Apply a passing proposal's effect.
    fn enact(&self, staged: &mut StagedMutations, prop: &ProposalInfo) -> Result<(), DimensionError> {
        match prop.proposal_type {
            ProposalType::AddProducer => {
                let mut node = self
                    .db
                    .get_gnode(&prop.account)?
                    .ok_or_else(|| DimensionError::GovernanceNodeMissing(prop.account.clone()))?;
                node.is_bp = true;
                staged.global.producer_num += 1;
                staged.host_calls.push(HostCall::AddProducer(prop.account.clone()));
                staged.gnodes.push(node);
            }
            ProposalType::RemoveProducer => {
                let mut node = self
                    .db
                    .get_gnode(&prop.account)?
                    .ok_or_else(|| DimensionError::GovernanceNodeMissing(prop.account.clone()))?;
                node.is_bp = false;
                staged.global.producer_num = staged.global.producer_num.saturating_sub(1);
                staged.host_calls.push(HostCall::RemoveProducer(prop.account.clone()));
                staged.gnodes.push(node);
            }
            ProposalType::SwitchConsensus => {
                let consensus_type = u8::try_from(prop.consensus_type)
                    .map_err(|_| DimensionError::InvalidConsensusType(prop.consensus_type))?;
                staged.global.consensus_type = consensus_type;
                staged.host_calls.push(HostCall::SetConsensus(consensus_type));
            }
        }
        Ok(())
    }
}
