use std::collections::BTreeMap;
use std::path::Path;

use dimension_core::config::SystemParams;
use dimension_core::constants::{DEFAULT_NEW_PROPOSAL_FEE, DEFAULT_STAKE_TO_GNODE_FEE};
use dimension_core::error::DimensionError;
use dimension_core::records::NameBid;
use dimension_core::types::{AccountName, Amount, PublicKey};
use serde::{Deserialize, Serialize};

/// Everything needed to bring up a chain: starting global values, the
/// producer registry, pre-staked governance nodes, open name bids and
/// token balances.
///
/// Only `genesis_time_us` is required; every other field has a default so a
/// test chain can be described in a few lines of JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisParams {
    /// Chain time (µs) the schedule-update and name-close slots start from.
    pub genesis_time_us: u64,

    #[serde(default)]
    pub system: SystemParams,

    #[serde(default)]
    pub total_proposal_stake: Amount,
    /// When the activation stake was crossed. Defaults to `genesis_time_us`
    /// if the initial stake is already past the minimum.
    #[serde(default)]
    pub thresh_activated_stake_time_us: Option<u64>,
    /// Defaults to the number of registered producers.
    #[serde(default)]
    pub producer_num: Option<u32>,
    #[serde(default)]
    pub perblock_bucket: Amount,
    #[serde(default)]
    pub reward_pre_block: Amount,
    #[serde(default = "default_new_proposal_fee")]
    pub new_proposal_fee: Amount,
    #[serde(default = "default_stake_to_gnode_fee")]
    pub stake_to_gnode_fee: Amount,
    #[serde(default)]
    pub consensus_type: u8,

    #[serde(default)]
    pub producers: Vec<GenesisProducer>,
    #[serde(default)]
    pub gnodes: Vec<GenesisGnode>,
    #[serde(default)]
    pub name_bids: Vec<NameBid>,
    /// Opening token balances. Escrows backing seeded governance nodes are
    /// credited on top of these.
    #[serde(default)]
    pub balances: BTreeMap<AccountName, Amount>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisProducer {
    pub owner: AccountName,
    pub producer_key: PublicKey,
    #[serde(default)]
    pub total_votes: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub location: u16,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisGnode {
    pub owner: AccountName,
    /// Refund recipient; defaults to the owner.
    #[serde(default)]
    pub payer: Option<AccountName>,
    #[serde(default)]
    pub producer_key: PublicKey,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub location: u16,
    #[serde(default)]
    pub is_bp: bool,
}

fn default_new_proposal_fee() -> Amount {
    DEFAULT_NEW_PROPOSAL_FEE
}

fn default_stake_to_gnode_fee() -> Amount {
    DEFAULT_STAKE_TO_GNODE_FEE
}

impl GenesisParams {
    pub fn from_json(json: &str) -> Result<Self, DimensionError> {
        let params: Self =
            serde_json::from_str(json).map_err(|e| DimensionError::Serialization(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn load(path: &Path) -> Result<Self, DimensionError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| DimensionError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), DimensionError> {
        self.system.validate()?;
        if self.total_proposal_stake < 0 || self.perblock_bucket < 0 || self.reward_pre_block < 0 {
            return Err(DimensionError::InvalidConfig("stake, bucket and reward must be non-negative".into()));
        }
        if self.new_proposal_fee < 0 || self.stake_to_gnode_fee < 0 {
            return Err(DimensionError::InvalidConfig("fees must be non-negative".into()));
        }
        if let Some((account, _)) = self.balances.iter().find(|(_, amount)| **amount < 0) {
            return Err(DimensionError::InvalidConfig(format!("negative balance for {account}")));
        }
        if self.name_bids.iter().any(|b| b.high_bid == 0) {
            return Err(DimensionError::InvalidConfig("name bids must be non-zero".into()));
        }
        Ok(())
    }

    /// Opening ledger balances, with the stake escrow holding every seeded
    /// governance node's stake so that unstaking can refund it.
    pub fn opening_balances(&self) -> BTreeMap<AccountName, Amount> {
        let mut balances = self.balances.clone();
        let locked = self.stake_to_gnode_fee * self.gnodes.len() as Amount;
        if locked > 0 {
            *balances.entry(self.system.stake_escrow.clone()).or_default() += locked;
        }
        balances
    }
}
