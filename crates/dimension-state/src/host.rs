//! Interfaces to the collaborators the system contract calls out to: the
//! token contract and the host's consensus layer. Both are invoked only
//! after a transaction has been fully validated, so an implementation never
//! sees calls from a transaction that is later rolled back.

use std::collections::BTreeMap;

use dimension_core::error::DimensionError;
use dimension_core::records::ProducerInfo;
use dimension_core::types::{AccountName, Amount, BlockTimestamp};

// ── Token transfers ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: AccountName,
    pub to: AccountName,
    pub amount: Amount,
    pub memo: String,
}

/// The external token contract.
pub trait TokenLedger {
    /// Move `amount` from `transfer.from` to `transfer.to`. Must either apply
    /// completely or fail without effect.
    fn transfer(&mut self, transfer: &Transfer) -> Result<(), DimensionError>;
}

/// Balance map standing in for the token contract in tests and replays.
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    balances: BTreeMap<AccountName, Amount>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balances(balances: impl IntoIterator<Item = (AccountName, Amount)>) -> Self {
        Self { balances: balances.into_iter().collect() }
    }

    pub fn credit(&mut self, account: &AccountName, amount: Amount) {
        *self.balances.entry(account.clone()).or_default() += amount;
    }

    pub fn balance_of(&self, account: &AccountName) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn balances(&self) -> impl Iterator<Item = (&AccountName, &Amount)> {
        self.balances.iter()
    }
}

impl TokenLedger for MemoryLedger {
    fn transfer(&mut self, transfer: &Transfer) -> Result<(), DimensionError> {
        if transfer.amount <= 0 {
            return Err(DimensionError::InvalidTransferAmount(transfer.amount));
        }
        let have = self.balance_of(&transfer.from);
        if have < transfer.amount {
            return Err(DimensionError::InsufficientFunds {
                account: transfer.from.clone(),
                need: transfer.amount,
                have,
            });
        }
        self.balances.insert(transfer.from.clone(), have - transfer.amount);
        self.credit(&transfer.to, transfer.amount);
        Ok(())
    }
}

// ── Consensus layer ───────────────────────────────────────────────────────────

/// The host routines that publish producer-set and consensus changes.
pub trait ChainHost {
    /// Recompute and publish the active schedule. `candidates` are the active
    /// registered producers, highest vote weight first.
    fn update_elected_producers(&mut self, timestamp: BlockTimestamp, candidates: &[ProducerInfo]);

    fn add_elected_producer(&mut self, account: &AccountName);

    fn remove_elected_producer(&mut self, account: &AccountName);

    fn set_consensus_type(&mut self, consensus_type: u8);
}

/// A host call staged by a handler and issued at commit.
#[derive(Clone, Debug, PartialEq)]
pub enum HostCall {
    UpdateSchedule {
        timestamp: BlockTimestamp,
        candidates: Vec<ProducerInfo>,
    },
    AddProducer(AccountName),
    RemoveProducer(AccountName),
    SetConsensus(u8),
}

impl HostCall {
    pub fn dispatch<H: ChainHost + ?Sized>(&self, host: &mut H) {
        match self {
            HostCall::UpdateSchedule { timestamp, candidates } => {
                host.update_elected_producers(*timestamp, candidates)
            }
            HostCall::AddProducer(account) => host.add_elected_producer(account),
            HostCall::RemoveProducer(account) => host.remove_elected_producer(account),
            HostCall::SetConsensus(consensus_type) => host.set_consensus_type(*consensus_type),
        }
    }
}

/// Records every call it receives.
#[derive(Clone, Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
}

impl RecordingHost {
    pub fn schedule_updates(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HostCall::UpdateSchedule { .. }))
            .count()
    }
}

impl ChainHost for RecordingHost {
    fn update_elected_producers(&mut self, timestamp: BlockTimestamp, candidates: &[ProducerInfo]) {
        self.calls.push(HostCall::UpdateSchedule { timestamp, candidates: candidates.to_vec() });
    }

    fn add_elected_producer(&mut self, account: &AccountName) {
        self.calls.push(HostCall::AddProducer(account.clone()));
    }

    fn remove_elected_producer(&mut self, account: &AccountName) {
        self.calls.push(HostCall::RemoveProducer(account.clone()));
    }

    fn set_consensus_type(&mut self, consensus_type: u8) {
        self.calls.push(HostCall::SetConsensus(consensus_type));
    }
}
