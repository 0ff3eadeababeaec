//! Shared fixture for handler tests.

use std::sync::Arc;

use dimension_core::config::SystemParams;
use dimension_core::constants::{DEFAULT_NEW_PROPOSAL_FEE, DEFAULT_STAKE_TO_GNODE_FEE, USECONDS_PER_DAY};
use dimension_core::error::DimensionError;
use dimension_core::records::{GlobalState, GovernanceNodeInfo, ProducerInfo};
use dimension_core::transaction::{Action, Transaction};
use dimension_core::types::{AccountName, Amount, BlockTimestamp, ChainTime, ProposalId, PublicKey};

use crate::db::StateDb;
use crate::engine::SystemEngine;
use crate::host::{MemoryLedger, RecordingHost};

pub(crate) const START_SECS: u32 = 1_700_000_000;
pub(crate) const REWARD_PER_BLOCK: Amount = 100;
pub(crate) const PRODUCERS: [&str; 7] = ["proda", "prodb", "prodc", "prodd", "prode", "prodf", "prodg"];

pub(crate) fn name(s: &str) -> AccountName {
    AccountName::new(s).unwrap()
}

pub(crate) struct Fixture {
    pub engine: SystemEngine<RecordingHost, MemoryLedger>,
    pub now: ChainTime,
}

impl Fixture {
    /// A chain past activation: 1,000,000 proposal stake, seven active
    /// producers, governance nodes alice / bob / carol, funded escrows.
    pub fn activated() -> Self {
        let now = ChainTime::from_secs(START_SECS);
        let global = GlobalState {
            total_proposal_stake: 1_000_000,
            producer_num: PRODUCERS.len() as u32,
            perblock_bucket: 1_000_000_000,
            reward_pre_block: REWARD_PER_BLOCK,
            last_producer_schedule_update: BlockTimestamp::from_chain_time(now),
            last_name_close: BlockTimestamp::from_chain_time(now),
            thresh_activated_stake_time: now.micros() - 30 * USECONDS_PER_DAY,
            new_proposal_fee: DEFAULT_NEW_PROPOSAL_FEE,
            stake_to_gnode_fee: DEFAULT_STAKE_TO_GNODE_FEE,
            ..Default::default()
        };
        let fx = Self::with_global(global, now);
        for (i, p) in PRODUCERS.iter().enumerate() {
            fx.register_producer(p, 1_000 * (i as u64 + 1));
        }
        for owner in ["alice", "bob", "carol"] {
            fx.seed_gnode(owner);
        }
        fx
    }

    /// Fresh chain: zero stake, no producers.
    pub fn bootstrap() -> Self {
        Self::with_global(GlobalState::default(), ChainTime::from_secs(START_SECS))
    }

    fn with_global(global: GlobalState, now: ChainTime) -> Self {
        let db = Arc::new(StateDb::open_temporary().unwrap());
        db.put_global(&global).unwrap();
        let params = SystemParams::default();
        let ledger = MemoryLedger::with_balances([
            (name("alice"), 1_000_000),
            (name("bob"), 1_000_000),
            (name("carol"), 1_000_000),
            (name("dave"), 1_000_000),
            (params.stake_escrow.clone(), 3 * DEFAULT_STAKE_TO_GNODE_FEE),
            (params.block_pay_escrow.clone(), 1_000_000_000),
        ]);
        let engine = SystemEngine::new(db, params, RecordingHost::default(), ledger);
        Self { engine, now }
    }

    pub fn register_producer(&self, owner: &str, votes: u64) {
        let producer = ProducerInfo::new(name(owner), PublicKey(vec![0x02, votes as u8]), votes);
        self.engine.db.put_producer(&producer).unwrap();
    }

    pub fn seed_gnode(&self, owner: &str) {
        self.engine
            .db
            .put_gnode(&GovernanceNodeInfo {
                owner: name(owner),
                payer: name(owner),
                bp_staked: DEFAULT_STAKE_TO_GNODE_FEE,
                stake_time: START_SECS - 100,
                is_bp: false,
                status: 0,
                producer_key: PublicKey(vec![0x03]),
                url: format!("https://{owner}.example"),
                location: 0,
            })
            .unwrap();
    }

    pub fn slot(&self) -> BlockTimestamp {
        BlockTimestamp::from_chain_time(self.now)
    }

    pub fn advance_secs(&mut self, secs: u32) {
        self.now = self.now.plus_micros(secs as u64 * 1_000_000);
    }

    pub fn apply(&mut self, signer: &str, action: Action) -> Result<(), DimensionError> {
        let tx = Transaction::signed_by(name(signer), action);
        self.engine.apply(&tx, self.now)
    }

    /// Produce one block at the current time.
    pub fn block(&mut self, producer: &str) -> Result<(), DimensionError> {
        let system = self.engine.params.system_account.clone();
        let tx = Transaction::signed_by(
            system,
            Action::OnBlock { timestamp: self.slot(), producer: name(producer) },
        );
        self.engine.apply(&tx, self.now)
    }

    pub fn global(&self) -> GlobalState {
        self.engine.db.global().unwrap()
    }

    pub fn update_global(&self, f: impl FnOnce(&mut GlobalState)) {
        let mut g = self.global();
        f(&mut g);
        self.engine.db.put_global(&g).unwrap();
    }

    /// Stand-in for the external voting action.
    pub fn set_tally(&self, id: ProposalId, yeas: i64, nays: i64) {
        let mut p = self.engine.db.get_proposal(id).unwrap().unwrap();
        p.total_yeas = yeas;
        p.total_nays = nays;
        self.engine.db.put_proposal(&p).unwrap();
    }

    pub fn balance(&self, account: &str) -> Amount {
        self.engine.ledger.balance_of(&name(account))
    }
}
