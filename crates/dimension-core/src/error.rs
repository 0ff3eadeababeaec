use thiserror::Error;

use crate::types::{AccountName, Amount, ProposalId, Timestamp};

/// Broad failure classes. Every variant aborts the enclosing transaction;
/// the class only tells the caller why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required signature was not supplied.
    Authorization,
    /// The action is not permitted in the current state.
    Precondition,
    /// A record the action depends on does not exist.
    Referential,
    /// The token ledger refused a transfer.
    External,
    /// Storage, encoding or setup failures.
    Storage,
}

#[derive(Debug, Error)]
pub enum DimensionError {
    // ── Authorization ────────────────────────────────────────────────────────
    #[error("missing required authority of {0}")]
    MissingAuthority(AccountName),

    // ── Proposals ────────────────────────────────────────────────────────────
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("proposal {0} has already been executed")]
    ProposalAlreadyExecuted(ProposalId),

    #[error("proposal vote window still open (ends at {ends_at})")]
    VoteWindowOpen { ends_at: Timestamp },

    #[error("proposal execution window elapsed at {ended_at}")]
    ExecutionWindowExpired { ended_at: Timestamp },

    #[error("type 1 proposals may only nominate the proposer; {owner} named {account}")]
    SelfNominationRequired { owner: AccountName, account: AccountName },

    #[error("consensus_type must be one of 0, 1, 2; got {0}")]
    InvalidConsensusType(i64),

    #[error("unknown proposal type {0}")]
    InvalidProposalType(i64),

    // ── Governance nodes ─────────────────────────────────────────────────────
    #[error("{0} is not a governance node")]
    NotGovernanceNode(AccountName),

    #[error("{0} is already a governance node")]
    GovernanceNodeExists(AccountName),

    #[error("{0} is an elected producer")]
    NodeIsProducer(AccountName),

    #[error("{account} is referenced by open proposal {proposal_id}")]
    NodeHasOpenProposal { account: AccountName, proposal_id: ProposalId },

    #[error("proposal subject {0} is no longer a governance node")]
    GovernanceNodeMissing(AccountName),

    // ── Rewards ──────────────────────────────────────────────────────────────
    #[error("producer {0} not found")]
    UnknownProducer(AccountName),

    #[error("producer {0} does not have an active key")]
    ProducerKeyInactive(AccountName),

    #[error("chain not activated: proposal stake {have}, need at least {need}")]
    ChainNotActivated { have: Amount, need: Amount },

    #[error("already claimed rewards within past day (next claim after {next_claim_after} µs)")]
    AlreadyClaimedToday { next_claim_after: u64 },

    // ── Token ledger ─────────────────────────────────────────────────────────
    #[error("insufficient funds in {account}: need {need}, have {have}")]
    InsufficientFunds { account: AccountName, need: Amount, have: Amount },

    #[error("transfer amount must be positive, got {0}")]
    InvalidTransferAmount(Amount),

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("invalid account name {0:?}")]
    InvalidAccountName(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("genesis already applied")]
    GenesisAlreadyApplied,

    #[error("global state not initialised; apply genesis first")]
    NotInitialised,
}

impl DimensionError {
    pub fn kind(&self) -> ErrorKind {
        use DimensionError::*;
        match self {
            MissingAuthority(_) => ErrorKind::Authorization,

            ProposalNotFound(_)
            | ProposalAlreadyExecuted(_)
            | VoteWindowOpen { .. }
            | ExecutionWindowExpired { .. }
            | SelfNominationRequired { .. }
            | InvalidConsensusType(_)
            | InvalidProposalType(_)
            | NotGovernanceNode(_)
            | GovernanceNodeExists(_)
            | NodeIsProducer(_)
            | NodeHasOpenProposal { .. }
            | ProducerKeyInactive(_)
            | ChainNotActivated { .. }
            | AlreadyClaimedToday { .. } => ErrorKind::Precondition,

            GovernanceNodeMissing(_) | UnknownProducer(_) => ErrorKind::Referential,

            InsufficientFunds { .. } | InvalidTransferAmount(_) => ErrorKind::External,

            InvalidAccountName(_)
            | InvalidPublicKey(_)
            | Serialization(_)
            | Storage(_)
            | InvalidConfig(_)
            | GenesisAlreadyApplied
            | NotInitialised => ErrorKind::Storage,
        }
    }
}
