use serde::{Deserialize, Serialize};

use crate::constants::{MIN_PRODUCER_SIZE, MIN_PROPOSAL_STAKE, PASS_THRESHOLD_DIVISOR};
use crate::error::DimensionError;
use crate::types::{AccountName, Amount, BlockTimestamp, ProposalId, PublicKey, Timestamp};

// ── GlobalState ───────────────────────────────────────────────────────────────

/// Chain-wide counters and thresholds. One record per chain.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalState {
    /// Stake backing governance; drives activation and the pass threshold.
    pub total_proposal_stake: Amount,
    /// Elected producers, maintained by add/remove proposals.
    pub producer_num: u32,
    /// Blocks produced by registered producers and not yet claimed.
    pub total_unpaid_blocks: u64,
    /// Accrued block pay not yet claimed.
    pub perblock_bucket: Amount,
    /// Pay per unpaid block.
    pub reward_pre_block: Amount,
    /// Microseconds; zero until the hook first activates.
    pub last_pervote_bucket_fill: u64,
    pub last_producer_schedule_update: BlockTimestamp,
    pub last_name_close: BlockTimestamp,
    /// Microseconds at which activation stake was first crossed; zero if never.
    pub thresh_activated_stake_time: u64,
    pub new_proposal_fee: Amount,
    pub stake_to_gnode_fee: Amount,
    pub proposal_num: u64,
    /// Current consensus mode (0, 1 or 2).
    #[serde(default)]
    pub consensus_type: u8,
}

impl GlobalState {
    /// True once governance stake has reached the activation minimum.
    pub fn is_activated(&self) -> bool {
        self.total_proposal_stake >= MIN_PROPOSAL_STAKE
    }

    /// The block hook does nothing until the chain is activated and enough
    /// producers are elected.
    pub fn hook_dormant(&self) -> bool {
        !self.is_activated() || self.producer_num < MIN_PRODUCER_SIZE
    }

    /// Net approval a proposal must strictly exceed to pass.
    pub fn pass_threshold(&self) -> i128 {
        (self.total_proposal_stake / PASS_THRESHOLD_DIVISOR) as i128
    }
}

// ── ProducerInfo ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProducerInfo {
    pub owner: AccountName,
    /// Vote weight used to rank schedule candidates.
    pub total_votes: u64,
    /// Empty when the producer has been deactivated.
    pub producer_key: PublicKey,
    pub unpaid_blocks: u64,
    /// Microseconds.
    pub last_claim_time: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub location: u16,
}

impl ProducerInfo {
    pub fn new(owner: AccountName, producer_key: PublicKey, total_votes: u64) -> Self {
        Self {
            owner,
            total_votes,
            producer_key,
            unpaid_blocks: 0,
            last_claim_time: 0,
            url: String::new(),
            location: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.producer_key.is_empty()
    }
}

// ── GovernanceNodeInfo ────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GovernanceNodeInfo {
    pub owner: AccountName,
    /// Account that funded the stake and receives the refund.
    pub payer: AccountName,
    pub bp_staked: Amount,
    pub stake_time: Timestamp,
    /// Currently an elected producer. Elected nodes cannot unstake or update.
    pub is_bp: bool,
    pub status: u8,
    pub producer_key: PublicKey,
    pub url: String,
    pub location: u16,
}

// ── ProposalInfo ──────────────────────────────────────────────────────────────

/// What an executed, passing proposal does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ProposalType {
    AddProducer,
    RemoveProducer,
    SwitchConsensus,
}

impl ProposalType {
    pub fn code(self) -> i64 {
        match self {
            ProposalType::AddProducer => 1,
            ProposalType::RemoveProducer => 2,
            ProposalType::SwitchConsensus => 3,
        }
    }
}

impl TryFrom<i64> for ProposalType {
    type Error = DimensionError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ProposalType::AddProducer),
            2 => Ok(ProposalType::RemoveProducer),
            3 => Ok(ProposalType::SwitchConsensus),
            other => Err(DimensionError::InvalidProposalType(other)),
        }
    }
}

impl From<ProposalType> for i64 {
    fn from(t: ProposalType) -> Self {
        t.code()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposalInfo {
    pub id: ProposalId,
    pub owner: AccountName,
    /// Subject of an add/remove proposal; ignored by consensus switches.
    pub account: AccountName,
    pub start_time: Timestamp,
    pub vote_end_time: Timestamp,
    pub exec_end_time: Timestamp,
    /// Informational snapshot supplied by the proposer.
    pub block_height: u32,
    pub proposal_type: ProposalType,
    pub consensus_type: i64,
    pub total_yeas: i64,
    pub total_nays: i64,
    pub is_satisfy: bool,
    pub is_exec: bool,
    pub exec_time: Timestamp,
    /// Governance stake snapshot taken at execution.
    pub total_staked: Amount,
}

impl ProposalInfo {
    /// Yeas minus nays, widened so extreme tallies cannot overflow.
    pub fn net_approval(&self) -> i128 {
        self.total_yeas as i128 - self.total_nays as i128
    }

    /// Strict supermajority: net approval above a tenth of total stake.
    pub fn passes(&self, global: &GlobalState) -> bool {
        self.net_approval() > global.pass_threshold()
    }

    pub fn vote_open(&self, now: Timestamp) -> bool {
        now < self.vote_end_time
    }

    pub fn involves(&self, account: &AccountName) -> bool {
        self.owner == *account || self.account == *account
    }
}

// ── NameBid ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NameBid {
    pub newname: AccountName,
    pub high_bidder: AccountName,
    /// Positive while the auction is open; negated once closed.
    pub high_bid: Amount,
    /// Microseconds.
    pub last_bid_time: u64,
}

impl NameBid {
    pub fn is_open(&self) -> bool {
        self.high_bid > 0
    }
}
