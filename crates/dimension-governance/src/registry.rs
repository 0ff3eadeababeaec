use dimension_core::error::DimensionError;
use dimension_core::records::GovernanceNodeInfo;
use dimension_core::types::{AccountName, Amount};
use dimension_state::StateDb;

/// Read-only view of the governance-node table.
pub struct GovernanceRegistry<'a> {
    db: &'a StateDb,
}

impl<'a> GovernanceRegistry<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    pub fn get(&self, owner: &AccountName) -> Result<Option<GovernanceNodeInfo>, DimensionError> {
        self.db.get_gnode(owner)
    }

    pub fn is_registered(&self, owner: &AccountName) -> Result<bool, DimensionError> {
        self.db.gnode_exists(owner)
    }

    /// Locked stake, or zero for accounts that are not governance nodes.
    pub fn stake_of(&self, owner: &AccountName) -> Result<Amount, DimensionError> {
        Ok(self.db.get_gnode(owner)?.map(|n| n.bp_staked).unwrap_or(0))
    }

    pub fn is_producer(&self, owner: &AccountName) -> Result<bool, DimensionError> {
        Ok(self.db.get_gnode(owner)?.map(|n| n.is_bp).unwrap_or(false))
    }

    /// All nodes in account-name order.
    pub fn nodes(&self) -> Result<Vec<GovernanceNodeInfo>, DimensionError> {
        self.db.gnodes()
    }

    pub fn elected(&self) -> Result<Vec<AccountName>, DimensionError> {
        Ok(self.nodes()?.into_iter().filter(|n| n.is_bp).map(|n| n.owner).collect())
    }

    pub fn total_staked(&self) -> Result<Amount, DimensionError> {
        Ok(self.nodes()?.iter().map(|n| n.bp_staked).sum())
    }

    pub fn describe(&self, owner: &AccountName) -> Result<String, DimensionError> {
        let Some(n) = self.db.get_gnode(owner)? else {
            return Ok(format!("{owner}: not a governance node"));
        };
        let role = if n.is_bp { "elected producer" } else { "candidate" };
        let url = if n.url.is_empty() { "-" } else { n.url.as_str() };
        Ok(format!(
            "{} | {} | staked {} (paid by {}) since {} | key {} | {} | location {}",
            n.owner,
            role,
            n.bp_staked,
            n.payer,
            n.stake_time,
            n.producer_key.to_hex(),
            url,
            n.location
        ))
    }
}
