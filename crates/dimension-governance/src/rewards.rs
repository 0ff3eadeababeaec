use dimension_core::constants::CLAIM_INTERVAL_US;
use dimension_core::error::DimensionError;
use dimension_core::types::{AccountName, Amount, ChainTime};
use dimension_state::StateDb;

/// Producer pay estimates. Uses the same formula as the claim handler.
pub struct RewardQuery<'a> {
    db: &'a StateDb,
}

impl<'a> RewardQuery<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    /// What a claim would pay right now, ignoring the once-per-day limit.
    pub fn claimable(&self, owner: &AccountName) -> Result<Amount, DimensionError> {
        let prod = self
            .db
            .get_producer(owner)?
            .ok_or_else(|| DimensionError::UnknownProducer(owner.clone()))?;
        let global = self.db.global()?;
        if global.total_unpaid_blocks == 0 {
            return Ok(0);
        }
        Ok(global.reward_pre_block.saturating_mul(prod.unpaid_blocks as i64))
    }

    /// Earliest chain time (µs) at which the next claim is accepted.
    pub fn next_claim_time(&self, owner: &AccountName) -> Result<ChainTime, DimensionError> {
        let prod = self
            .db
            .get_producer(owner)?
            .ok_or_else(|| DimensionError::UnknownProducer(owner.clone()))?;
        Ok(ChainTime::from_micros(prod.last_claim_time).plus_micros(CLAIM_INTERVAL_US + 1))
    }

    pub fn can_claim(&self, owner: &AccountName, now: ChainTime) -> Result<bool, DimensionError> {
        let Some(prod) = self.db.get_producer(owner)? else {
            return Ok(false);
        };
        if !prod.is_active() || !self.db.global()?.is_activated() {
            return Ok(false);
        }
        Ok(now >= self.next_claim_time(owner)?)
    }

    pub fn describe(&self, owner: &AccountName, now: ChainTime) -> Result<String, DimensionError> {
        let prod = self
            .db
            .get_producer(owner)?
            .ok_or_else(|| DimensionError::UnknownProducer(owner.clone()))?;
        let pay = self.claimable(owner)?;
        let when = if self.can_claim(owner, now)? {
            "claim now".to_string()
        } else {
            let wait = self.next_claim_time(owner)?.micros().saturating_sub(now.micros());
            format!("next claim in {}s", wait.div_ceil(1_000_000))
        };
        Ok(format!(
            "Producer {} | {} unpaid blocks | {} claimable | {}",
            prod.owner, prod.unpaid_blocks, pay, when
        ))
    }
}
