//! dimension-genesis
//!
//! Seeds an empty `StateDb` with the chain's founding state, writing tables
//! directly rather than through the transaction engine: genesis records have
//! no authorizing signer and move no tokens.
//!
//! Applied exactly once. A database that already holds a global state record
//! is refused.

pub mod params;

pub use params::{GenesisGnode, GenesisParams, GenesisProducer};

use dimension_core::constants::MIN_PROPOSAL_STAKE;
use dimension_core::error::DimensionError;
use dimension_core::records::{GlobalState, GovernanceNodeInfo, ProducerInfo};
use dimension_core::types::{BlockTimestamp, ChainTime, Timestamp};
use dimension_state::{MemoryLedger, StateDb};
use tracing::info;

/// What genesis wrote, for logging and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct GenesisSummary {
    pub producers: usize,
    pub gnodes: usize,
    pub name_bids: usize,
    pub state_digest: String,
}

/// Apply the genesis state to an empty `StateDb`.
pub fn apply_genesis(db: &StateDb, params: &GenesisParams) -> Result<GenesisSummary, DimensionError> {
    params.validate()?;
    if db.is_initialised()? {
        return Err(DimensionError::GenesisAlreadyApplied);
    }
    info!(genesis_time_us = params.genesis_time_us, "applying genesis state");

    let genesis_time = ChainTime::from_micros(params.genesis_time_us);
    let genesis_slot = BlockTimestamp::from_chain_time(genesis_time);

    // ── 1. Producer registry ─────────────────────────────────────────────────
    for p in &params.producers {
        let mut producer = ProducerInfo::new(p.owner.clone(), p.producer_key.clone(), p.total_votes);
        producer.url = p.url.clone();
        producer.location = p.location;
        db.put_producer(&producer)?;
    }
    info!(count = params.producers.len(), "genesis: producers registered");

    // ── 2. Governance nodes ──────────────────────────────────────────────────
    for g in &params.gnodes {
        db.put_gnode(&GovernanceNodeInfo {
            owner: g.owner.clone(),
            payer: g.payer.clone().unwrap_or_else(|| g.owner.clone()),
            bp_staked: params.stake_to_gnode_fee,
            stake_time: genesis_time.secs(),
            is_bp: g.is_bp,
            status: 0,
            producer_key: g.producer_key.clone(),
            url: g.url.clone(),
            location: g.location,
        })?;
    }
    info!(count = params.gnodes.len(), "genesis: governance nodes staked");

    // ── 3. Name bids ─────────────────────────────────────────────────────────
    for bid in &params.name_bids {
        db.put_name_bid(bid)?;
    }
    if !params.name_bids.is_empty() {
        info!(count = params.name_bids.len(), "genesis: name bids seeded");
    }

    // ── 4. Global state ──────────────────────────────────────────────────────
    let thresh_activated_stake_time = match params.thresh_activated_stake_time_us {
        Some(t) => t,
        None if params.total_proposal_stake >= MIN_PROPOSAL_STAKE => params.genesis_time_us,
        None => 0,
    };
    let global = GlobalState {
        total_proposal_stake: params.total_proposal_stake,
        producer_num: params.producer_num.unwrap_or(params.producers.len() as u32),
        total_unpaid_blocks: 0,
        perblock_bucket: params.perblock_bucket,
        reward_pre_block: params.reward_pre_block,
        last_pervote_bucket_fill: 0,
        last_producer_schedule_update: genesis_slot,
        last_name_close: genesis_slot,
        thresh_activated_stake_time,
        new_proposal_fee: params.new_proposal_fee,
        stake_to_gnode_fee: params.stake_to_gnode_fee,
        proposal_num: 0,
        consensus_type: params.consensus_type,
    };
    // Written last: its presence marks the database as initialised.
    db.put_global(&global)?;
    db.flush()?;

    let summary = GenesisSummary {
        producers: params.producers.len(),
        gnodes: params.gnodes.len(),
        name_bids: params.name_bids.len(),
        state_digest: db.state_digest()?,
    };
    info!(
        activated = global.is_activated(),
        producer_num = global.producer_num,
        digest = %summary.state_digest,
        "genesis state committed"
    );
    Ok(summary)
}

/// Token ledger matching the genesis balances.
pub fn genesis_ledger(params: &GenesisParams) -> MemoryLedger {
    MemoryLedger::with_balances(params.opening_balances())
}

/// Genesis time in whole seconds.
pub fn genesis_secs(params: &GenesisParams) -> Timestamp {
    ChainTime::from_micros(params.genesis_time_us).secs()
}
