use serde::{Deserialize, Serialize};

use crate::types::{AccountName, BlockTimestamp, ProposalId, PublicKey};
use crate::records::ProposalType;

// ── Action ────────────────────────────────────────────────────────────────────

/// Every entry point of the system contract is one of these variants.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Action {
    /// Per-block accounting hook. Authorized by the system account only.
    OnBlock {
        timestamp: BlockTimestamp,
        producer: AccountName,
    },

    // ── Proposals ────────────────────────────────────────────────────────────

    /// Open a governance proposal. `account` is the add/remove subject and
    /// must equal `owner` for `AddProducer`.
    NewProposal {
        owner: AccountName,
        account: AccountName,
        block_height: u32,
        proposal_type: ProposalType,
        consensus_type: i64,
    },

    /// Execute a tallied proposal. Any governance node may call this.
    ExecProposal {
        owner: AccountName,
        proposal_id: ProposalId,
    },

    // ── Governance nodes ─────────────────────────────────────────────────────

    /// Lock the stake fee from `payer` and register `owner` as a governance node.
    StakeToGnode {
        payer: AccountName,
        owner: AccountName,
        producer_key: PublicKey,
        url: String,
        location: u16,
    },

    /// Deregister and refund the stake to the original payer.
    UnstakeGnode {
        owner: AccountName,
    },

    UpdateGnode {
        owner: AccountName,
        producer_key: PublicKey,
        url: String,
        location: u16,
    },

    // ── Rewards ──────────────────────────────────────────────────────────────

    /// Pay out the producer's unpaid blocks, at most once per day.
    ClaimRewards {
        owner: AccountName,
    },
}

impl Action {
    /// Contract-level action name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::OnBlock { .. } => "onblock",
            Action::NewProposal { .. } => "newproposal",
            Action::ExecProposal { .. } => "execproposal",
            Action::StakeToGnode { .. } => "staketognode",
            Action::UnstakeGnode { .. } => "unstakegnode",
            Action::UpdateGnode { .. } => "updategnode",
            Action::ClaimRewards { .. } => "claimrewards",
        }
    }
}

// ── Transaction ───────────────────────────────────────────────────────────────

/// One action together with the accounts whose signatures the host has
/// already verified for the enclosing transaction.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub authorizations: Vec<AccountName>,
    pub action: Action,
}

impl Transaction {
    /// Build a transaction signed by a single account.
    pub fn signed_by(signer: AccountName, action: Action) -> Self {
        Self { authorizations: vec![signer], action }
    }

    pub fn is_authorized_by(&self, account: &AccountName) -> bool {
        self.authorizations.contains(account)
    }
}
