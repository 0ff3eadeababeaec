use std::sync::Arc;

use dimension_core::config::SystemParams;
use dimension_core::error::DimensionError;
use dimension_core::records::{GlobalState, GovernanceNodeInfo, NameBid, ProducerInfo, ProposalInfo};
use dimension_core::transaction::{Action, Transaction};
use dimension_core::types::{AccountName, ChainTime};
use tracing::{debug, info};

use crate::db::StateDb;
use crate::host::{ChainHost, HostCall, TokenLedger, Transfer};

// ── Staged mutations ──────────────────────────────────────────────────────────

/// All effects of one action, applied only after the handler succeeds.
pub(crate) struct StagedMutations {
    pub global: GlobalState,
    pub producers: Vec<ProducerInfo>,
    pub gnodes: Vec<GovernanceNodeInfo>,
    pub erased_gnodes: Vec<AccountName>,
    pub proposals: Vec<ProposalInfo>,
    pub name_bids: Vec<NameBid>,
    pub transfers: Vec<Transfer>,
    pub host_calls: Vec<HostCall>,
}

impl StagedMutations {
    fn new(global: GlobalState) -> Self {
        Self {
            global,
            producers: Vec::new(),
            gnodes: Vec::new(),
            erased_gnodes: Vec::new(),
            proposals: Vec::new(),
            name_bids: Vec::new(),
            transfers: Vec::new(),
            host_calls: Vec::new(),
        }
    }
}

// ── SystemEngine ──────────────────────────────────────────────────────────────

/// The system contract.
///
/// Applies one transaction at a time against the state database. Each
/// `apply` call is atomic: either every effect is committed (tables, token
/// transfers, host calls) or none is.
pub struct SystemEngine<H, L> {
    pub db: Arc<StateDb>,
    pub params: SystemParams,
    pub host: H,
    pub ledger: L,
}

impl<H: ChainHost, L: TokenLedger> SystemEngine<H, L> {
    pub fn new(db: Arc<StateDb>, params: SystemParams, host: H, ledger: L) -> Self {
        Self { db, params, host, ledger }
    }

    /// Validate and apply a transaction at chain time `now`.
    pub fn apply(&mut self, tx: &Transaction, now: ChainTime) -> Result<(), DimensionError> {
        let global = self.db.global()?;
        let mut staged = StagedMutations::new(global.clone());

        self.dispatch(tx, now, &mut staged)?;
        self.commit(staged, &global)?;

        info!(action = tx.action.name(), "applied transaction");
        Ok(())
    }

    // ── Action dispatch ───────────────────────────────────────────────────────

    fn dispatch(
        &self,
        tx: &Transaction,
        now: ChainTime,
        staged: &mut StagedMutations,
    ) -> Result<(), DimensionError> {
        match &tx.action {
            Action::OnBlock { timestamp, producer } => {
                require_auth(tx, &self.params.system_account)?;
                self.on_block(staged, *timestamp, producer, now)
            }

            Action::NewProposal { owner, account, block_height, proposal_type, consensus_type } => {
                require_auth(tx, owner)?;
                self.new_proposal(staged, owner, account, *block_height, *proposal_type, *consensus_type, now)
            }

            Action::ExecProposal { owner, proposal_id } => {
                require_auth(tx, owner)?;
                self.exec_proposal(staged, owner, *proposal_id, now)
            }

            Action::StakeToGnode { payer, owner, producer_key, url, location } => {
                require_auth(tx, payer)?;
                self.stake_to_gnode(staged, payer, owner, producer_key, url, *location, now)
            }

            Action::UnstakeGnode { owner } => {
                require_auth(tx, owner)?;
                self.unstake_gnode(staged, owner, now)
            }

            Action::UpdateGnode { owner, producer_key, url, location } => {
                require_auth(tx, owner)?;
                self.update_gnode(staged, owner, producer_key, url, *location)
            }

            Action::ClaimRewards { owner } => {
                require_auth(tx, owner)?;
                self.claim_rewards(staged, owner, now)
            }
        }
    }

    // ── Commit ────────────────────────────────────────────────────────────────

    fn commit(&mut self, staged: StagedMutations, original: &GlobalState) -> Result<(), DimensionError> {
        // Transfers go first: a refused transfer aborts before any table write.
        // No action stages more than one.
        for transfer in &staged.transfers {
            self.ledger.transfer(transfer)?;
            debug!(
                from = %transfer.from,
                to = %transfer.to,
                amount = transfer.amount,
                memo = %transfer.memo,
                "token transfer"
            );
        }

        if staged.global != *original {
            self.db.put_global(&staged.global)?;
        }
        for producer in &staged.producers {
            self.db.put_producer(producer)?;
        }
        for node in &staged.gnodes {
            self.db.put_gnode(node)?;
        }
        for owner in &staged.erased_gnodes {
            self.db.erase_gnode(owner)?;
        }
        for proposal in &staged.proposals {
            self.db.put_proposal(proposal)?;
        }
        for bid in &staged.name_bids {
            self.db.put_name_bid(bid)?;
        }

        for call in &staged.host_calls {
            call.dispatch(&mut self.host);
        }
        Ok(())
    }
}

/// The host has verified signatures; this only checks that `account` is
/// among the signers.
pub(crate) fn require_auth(tx: &Transaction, account: &AccountName) -> Result<(), DimensionError> {
    if tx.is_authorized_by(account) {
        Ok(())
    } else {
        Err(DimensionError::MissingAuthority(account.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{name, Fixture};
    use dimension_core::error::ErrorKind;
    use dimension_core::types::PublicKey;

    #[test]
    fn missing_signature_is_authorization_failure() {
        let mut fx = Fixture::activated();
        let tx = Transaction::signed_by(
            name("mallory"),
            Action::ClaimRewards { owner: name("proda") },
        );
        let err = fx.engine.apply(&tx, fx.now).unwrap_err();
        assert!(matches!(&err, DimensionError::MissingAuthority(a) if *a == name("proda")));
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn onblock_requires_system_account() {
        let mut fx = Fixture::activated();
        let before = fx.engine.db.state_digest().unwrap();
        let tx = Transaction::signed_by(
            name("proda"),
            Action::OnBlock { timestamp: fx.slot(), producer: name("proda") },
        );
        let err = fx.engine.apply(&tx, fx.now).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(fx.engine.db.state_digest().unwrap(), before);
    }

    #[test]
    fn apply_before_genesis_fails() {
        let db = Arc::new(StateDb::open_temporary().unwrap());
        let mut engine = SystemEngine::new(
            db,
            SystemParams::default(),
            crate::host::RecordingHost::default(),
            crate::host::MemoryLedger::new(),
        );
        let tx = Transaction::signed_by(name("alice"), Action::UnstakeGnode { owner: name("alice") });
        assert!(matches!(
            engine.apply(&tx, ChainTime::from_secs(1)),
            Err(DimensionError::NotInitialised)
        ));
    }

    #[test]
    fn refused_transfer_rolls_back_everything() {
        let mut fx = Fixture::activated();
        // "broke" has no balance to pay the stake fee.
        let before = fx.engine.db.state_digest().unwrap();
        let tx = Transaction::signed_by(
            name("broke"),
            Action::StakeToGnode {
                payer: name("broke"),
                owner: name("broke"),
                producer_key: PublicKey(vec![7]),
                url: String::new(),
                location: 0,
            },
        );
        let err = fx.engine.apply(&tx, fx.now).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::External);
        assert!(!fx.engine.db.gnode_exists(&name("broke")).unwrap());
        assert_eq!(fx.engine.db.state_digest().unwrap(), before);
    }
}
