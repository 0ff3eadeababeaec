//! Replay scripts: a time-ordered list of transactions and block runs.
//!
//! ```json
//! { "steps": [
//!   { "at": "2025-06-15T12:00:00Z", "blocks": { "producers": ["bpa", "bpb"], "count": 480 } },
//!   { "at": "2025-06-15T12:05:00Z", "tx": { "signers": ["alice"],
//!       "action": { "StakeToGnode": { "payer": "alice", "owner": "alice",
//!                   "producer_key": "02ab", "url": "", "location": 0 } } } }
//! ] }
//! ```

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dimension_core::transaction::{Action, Transaction};
use dimension_core::types::{AccountName, BlockTimestamp, ChainTime};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Step {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: StepKind,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Tx(ScriptTx),
    /// `count` consecutive blocks, one per slot, producers taking turns.
    Blocks(BlockRun),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScriptTx {
    pub signers: Vec<AccountName>,
    pub action: Action,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockRun {
    pub producers: Vec<AccountName>,
    pub count: u32,
}

/// One transaction ready to apply.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedTx {
    pub at: ChainTime,
    pub tx: Transaction,
}

impl Script {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("parsing replay script JSON")
    }

    /// Flatten into individual transactions. Block runs are signed by
    /// `system` and spaced one slot apart. Chain time may not go backwards.
    pub fn expand(&self, system: &AccountName) -> anyhow::Result<Vec<TimedTx>> {
        let mut out = Vec::new();
        let mut clock = ChainTime::default();

        for (i, step) in self.steps.iter().enumerate() {
            let at = chain_time(step.at).with_context(|| format!("step {i}"))?;
            if at < clock {
                bail!("step {i} at {} is earlier than the previous step", step.at);
            }

            match &step.kind {
                StepKind::Tx(stx) => {
                    out.push(TimedTx {
                        at,
                        tx: Transaction { authorizations: stx.signers.clone(), action: stx.action.clone() },
                    });
                    clock = at;
                }
                StepKind::Blocks(run) => {
                    if run.producers.is_empty() {
                        bail!("step {i}: block run needs at least one producer");
                    }
                    let first = BlockTimestamp::from_chain_time(at);
                    for n in 0..run.count {
                        let timestamp = BlockTimestamp::new(first.slot.saturating_add(n));
                        let producer = &run.producers[n as usize % run.producers.len()];
                        clock = timestamp.to_chain_time().max(at);
                        out.push(TimedTx {
                            at: clock,
                            tx: Transaction::signed_by(
                                system.clone(),
                                Action::OnBlock { timestamp, producer: producer.clone() },
                            ),
                        });
                    }
                }
            }
        }
        Ok(out)
    }
}

fn chain_time(at: DateTime<Utc>) -> anyhow::Result<ChainTime> {
    let us = u64::try_from(at.timestamp_micros()).context("chain time before the Unix epoch")?;
    Ok(ChainTime::from_micros(us))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimension_core::constants::BLOCK_INTERVAL_MS;

    fn name(s: &str) -> AccountName {
        AccountName::new(s).unwrap()
    }

    #[test]
    fn block_runs_expand_one_per_slot() {
        let script = Script::from_json(
            r#"{ "steps": [
                { "at": "2025-06-15T12:00:00Z", "blocks": { "producers": ["bpa", "bpb"], "count": 3 } },
                { "at": "2025-06-15T12:00:05Z", "tx": { "signers": ["bpa"], "action": { "ClaimRewards": { "owner": "bpa" } } } }
            ] }"#,
        )
        .unwrap();
        let txs = script.expand(&name("dimension")).unwrap();
        assert_eq!(txs.len(), 4);

        let producers: Vec<_> = txs[..3]
            .iter()
            .map(|t| match &t.tx.action {
                Action::OnBlock { producer, .. } => producer.to_string(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(producers, ["bpa", "bpb", "bpa"]);
        assert_eq!(txs[1].at.micros() - txs[0].at.micros(), BLOCK_INTERVAL_MS * 1_000);
        assert!(txs[0].tx.is_authorized_by(&name("dimension")));
        assert!(txs[3].tx.is_authorized_by(&name("bpa")));
    }

    #[test]
    fn time_may_not_go_backwards() {
        let script = Script::from_json(
            r#"{ "steps": [
                { "at": "2025-06-15T12:00:00Z", "tx": { "signers": ["bpa"], "action": { "ClaimRewards": { "owner": "bpa" } } } },
                { "at": "2025-06-15T11:59:59Z", "tx": { "signers": ["bpa"], "action": { "ClaimRewards": { "owner": "bpa" } } } }
            ] }"#,
        )
        .unwrap();
        let err = script.expand(&name("dimension")).unwrap_err();
        assert!(err.to_string().contains("earlier"), "{err}");
    }
}
