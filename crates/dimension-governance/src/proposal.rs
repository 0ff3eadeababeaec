use std::fmt;

use dimension_core::constants::BOOTSTRAP_PRODUCER_LIMIT;
use dimension_core::error::DimensionError;
use dimension_core::records::{ProposalInfo, ProposalType};
use dimension_core::types::{ProposalId, Timestamp};
use dimension_state::StateDb;
use serde::Serialize;

/// Where a proposal is in its lifecycle at a given time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ProposalStatus {
    /// Vote window still open.
    Voting,
    /// Vote window closed, execution window open, not yet executed.
    Executable,
    /// Never executed and the execution window has closed.
    Expired,
    Passed,
    Failed,
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProposalStatus::Voting => "voting",
            ProposalStatus::Executable => "executable",
            ProposalStatus::Expired => "expired",
            ProposalStatus::Passed => "passed",
            ProposalStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Query helpers for governance proposals.
pub struct ProposalQuery<'a> {
    db: &'a StateDb,
}

impl<'a> ProposalQuery<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    pub fn get(&self, id: ProposalId) -> Result<Option<ProposalInfo>, DimensionError> {
        self.db.get_proposal(id)
    }

    pub fn status(&self, id: ProposalId, now: Timestamp) -> Result<ProposalStatus, DimensionError> {
        Ok(status_of(&self.require(id)?, now))
    }

    /// Mirrors the engine's `execproposal` time checks, including the
    /// small-producer-set relaxation of the vote window.
    pub fn can_execute(&self, id: ProposalId, now: Timestamp) -> Result<bool, DimensionError> {
        let p = self.require(id)?;
        if p.is_exec || now >= p.exec_end_time {
            return Ok(false);
        }
        Ok(self.db.producer_count() <= BOOTSTRAP_PRODUCER_LIMIT || now > p.vote_end_time)
    }

    /// Whether the current tally clears the pass threshold against today's stake.
    pub fn would_pass(&self, id: ProposalId) -> Result<bool, DimensionError> {
        let p = self.require(id)?;
        Ok(p.passes(&self.db.global()?))
    }

    /// Proposals whose vote window has not elapsed, earliest deadline first.
    pub fn open_proposals(&self, now: Timestamp) -> Result<Vec<ProposalInfo>, DimensionError> {
        self.db.proposals_voting_after(now)
    }

    pub fn describe(&self, id: ProposalId, now: Timestamp) -> Result<String, DimensionError> {
        let p = self.require(id)?;
        let subject = match p.proposal_type {
            ProposalType::AddProducer => format!("add producer {}", p.account),
            ProposalType::RemoveProducer => format!("remove producer {}", p.account),
            ProposalType::SwitchConsensus => format!("switch consensus to {}", p.consensus_type),
        };

        let timing = match status_of(&p, now) {
            ProposalStatus::Voting => {
                let hours = (p.vote_end_time - now) / 3_600;
                format!("voting, closes in {hours}h")
            }
            ProposalStatus::Executable => {
                let hours = (p.exec_end_time - now) / 3_600;
                format!("executable for {hours}h more")
            }
            ProposalStatus::Expired => format!("expired at {}", p.exec_end_time),
            ProposalStatus::Passed => format!("passed, executed at {}", p.exec_time),
            ProposalStatus::Failed => format!("failed, executed at {}", p.exec_time),
        };

        Ok(format!(
            "Proposal #{} by {} | {} | yeas {} / nays {} | {}",
            p.id, p.owner, subject, p.total_yeas, p.total_nays, timing
        ))
    }

    fn require(&self, id: ProposalId) -> Result<ProposalInfo, DimensionError> {
        self.db.get_proposal(id)?.ok_or(DimensionError::ProposalNotFound(id))
    }
}

fn status_of(p: &ProposalInfo, now: Timestamp) -> ProposalStatus {
    if p.is_exec {
        if p.is_satisfy {
            ProposalStatus::Passed
        } else {
            ProposalStatus::Failed
        }
    } else if now >= p.exec_end_time {
        ProposalStatus::Expired
    } else if p.vote_open(now) {
        ProposalStatus::Voting
    } else {
        ProposalStatus::Executable
    }
}
