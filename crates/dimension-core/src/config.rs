use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BLOCK_PAY_ESCROW, DEFAULT_PROPOSAL_ESCROW, DEFAULT_STAKE_ESCROW,
    DEFAULT_SYSTEM_ACCOUNT, MAX_SCHEDULE_SIZE, PROPOSAL_EXEC_WINDOW_SECS,
    PROPOSAL_VOTE_WINDOW_SECS,
};
use crate::error::DimensionError;
use crate::types::AccountName;

/// Deployment parameters of the system contract. Every field has a default,
/// so a JSON file only needs to name what it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemParams {
    /// Account the host uses to invoke the block hook.
    pub system_account: AccountName,
    /// Receives `newproposal` fees.
    pub proposal_escrow: AccountName,
    /// Holds governance-node stakes until unstaked.
    pub stake_escrow: AccountName,
    /// Pays producer rewards.
    pub block_pay_escrow: AccountName,
    pub vote_window_secs: u32,
    pub exec_window_secs: u32,
    pub max_schedule_size: usize,
}

impl Default for SystemParams {
    fn default() -> Self {
        Self {
            system_account: builtin(DEFAULT_SYSTEM_ACCOUNT),
            proposal_escrow: builtin(DEFAULT_PROPOSAL_ESCROW),
            stake_escrow: builtin(DEFAULT_STAKE_ESCROW),
            block_pay_escrow: builtin(DEFAULT_BLOCK_PAY_ESCROW),
            vote_window_secs: PROPOSAL_VOTE_WINDOW_SECS,
            exec_window_secs: PROPOSAL_EXEC_WINDOW_SECS,
            max_schedule_size: MAX_SCHEDULE_SIZE,
        }
    }
}

impl SystemParams {
    pub fn from_json(json: &str) -> Result<Self, DimensionError> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| DimensionError::Serialization(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Both proposal windows must be non-empty so that
    /// `start_time < vote_end_time < exec_end_time` holds.
    pub fn validate(&self) -> Result<(), DimensionError> {
        if self.vote_window_secs == 0 {
            return Err(DimensionError::InvalidConfig("vote_window_secs must be positive".into()));
        }
        if self.exec_window_secs == 0 {
            return Err(DimensionError::InvalidConfig("exec_window_secs must be positive".into()));
        }
        Ok(())
    }
}

fn builtin(name: &str) -> AccountName {
    AccountName::new(name).expect("built-in account names are valid")
}
