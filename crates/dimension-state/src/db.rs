use dimension_core::error::DimensionError;
use dimension_core::records::{GlobalState, GovernanceNodeInfo, NameBid, ProducerInfo, ProposalInfo};
use dimension_core::types::{AccountName, Amount, ProposalId, Timestamp};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;
use std::path::Path;

const GLOBAL_KEY: &[u8] = b"global";

/// Persistent system-contract tables backed by sled.
///
/// Named trees (analogous to contract tables):
///   global              — "global"            → bincode(GlobalState)
///   producers           — account bytes       → bincode(ProducerInfo)
///   gnodes              — account bytes       → bincode(GovernanceNodeInfo)
///   proposals           — id (u64 BE)         → bincode(ProposalInfo)
///   namebids            — name bytes          → bincode(NameBid)
///
/// Secondary indices map an order-preserving sort key to the primary key:
///   producers_by_votes  — !votes BE ‖ account  (highest vote weight first)
///   proposals_by_vend   — vote_end BE ‖ id     (earliest vote end first)
///   namebids_by_amount  — !bid ‖ name          (highest bid first)
///
/// A record and its index entry are written in one multi-tree transaction.
pub struct StateDb {
    db: sled::Db,
    global: sled::Tree,
    producers: sled::Tree,
    producers_by_votes: sled::Tree,
    gnodes: sled::Tree,
    proposals: sled::Tree,
    proposals_by_vend: sled::Tree,
    namebids: sled::Tree,
    namebids_by_amount: sled::Tree,
}

impl StateDb {
    /// Open or create the state database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DimensionError> {
        let db = sled::open(path).map_err(storage)?;
        Self::from_db(db)
    }

    /// An in-memory database removed on drop.
    pub fn open_temporary() -> Result<Self, DimensionError> {
        let db = sled::Config::new().temporary(true).open().map_err(storage)?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, DimensionError> {
        Ok(Self {
            global: db.open_tree("global").map_err(storage)?,
            producers: db.open_tree("producers").map_err(storage)?,
            producers_by_votes: db.open_tree("producers_by_votes").map_err(storage)?,
            gnodes: db.open_tree("gnodes").map_err(storage)?,
            proposals: db.open_tree("proposals").map_err(storage)?,
            proposals_by_vend: db.open_tree("proposals_by_vend").map_err(storage)?,
            namebids: db.open_tree("namebids").map_err(storage)?,
            namebids_by_amount: db.open_tree("namebids_by_amount").map_err(storage)?,
            db,
        })
    }

    // ── Global state ──────────────────────────────────────────────────────────

    pub fn get_global(&self) -> Result<Option<GlobalState>, DimensionError> {
        get_record(&self.global, GLOBAL_KEY)
    }

    /// The global record; fails if genesis has not been applied.
    pub fn global(&self) -> Result<GlobalState, DimensionError> {
        self.get_global()?.ok_or(DimensionError::NotInitialised)
    }

    pub fn put_global(&self, global: &GlobalState) -> Result<(), DimensionError> {
        self.global.insert(GLOBAL_KEY, encode(global)?).map_err(storage)?;
        Ok(())
    }

    pub fn is_initialised(&self) -> Result<bool, DimensionError> {
        self.global.contains_key(GLOBAL_KEY).map_err(storage)
    }

    // ── Producers ─────────────────────────────────────────────────────────────

    pub fn get_producer(&self, owner: &AccountName) -> Result<Option<ProducerInfo>, DimensionError> {
        get_record(&self.producers, owner.as_bytes())
    }

    pub fn put_producer(&self, producer: &ProducerInfo) -> Result<(), DimensionError> {
        let old_index = self
            .get_producer(&producer.owner)?
            .map(|p| votes_index_key(p.total_votes, &p.owner));
        put_indexed(
            &self.producers,
            &self.producers_by_votes,
            producer.owner.as_bytes(),
            &encode(producer)?,
            old_index.as_deref(),
            &votes_index_key(producer.total_votes, &producer.owner),
        )
    }

    /// Number of registered producer candidates.
    pub fn producer_count(&self) -> usize {
        self.producers.len()
    }

    /// All producers, highest vote weight first.
    pub fn producers_by_votes(&self) -> Result<Vec<ProducerInfo>, DimensionError> {
        self.producers_by_votes
            .iter()
            .values()
            .map(|owner| {
                let owner = owner.map_err(storage)?;
                let name = AccountName::from_bytes(&owner)?;
                self.get_producer(&name)?
                    .ok_or_else(|| DimensionError::Storage(format!("dangling vote index entry for {name}")))
            })
            .collect()
    }

    pub fn producers(&self) -> Result<Vec<ProducerInfo>, DimensionError> {
        all_records(&self.producers)
    }

    // ── Governance nodes ──────────────────────────────────────────────────────

    pub fn get_gnode(&self, owner: &AccountName) -> Result<Option<GovernanceNodeInfo>, DimensionError> {
        get_record(&self.gnodes, owner.as_bytes())
    }

    pub fn put_gnode(&self, node: &GovernanceNodeInfo) -> Result<(), DimensionError> {
        self.gnodes
            .insert(node.owner.as_bytes(), encode(node)?)
            .map_err(storage)?;
        Ok(())
    }

    pub fn erase_gnode(&self, owner: &AccountName) -> Result<(), DimensionError> {
        self.gnodes.remove(owner.as_bytes()).map_err(storage)?;
        Ok(())
    }

    pub fn gnode_exists(&self, owner: &AccountName) -> Result<bool, DimensionError> {
        self.gnodes.contains_key(owner.as_bytes()).map_err(storage)
    }

    pub fn gnodes(&self) -> Result<Vec<GovernanceNodeInfo>, DimensionError> {
        all_records(&self.gnodes)
    }

    // ── Proposals ─────────────────────────────────────────────────────────────

    pub fn get_proposal(&self, id: ProposalId) -> Result<Option<ProposalInfo>, DimensionError> {
        get_record(&self.proposals, &id.to_be_bytes())
    }

    pub fn put_proposal(&self, proposal: &ProposalInfo) -> Result<(), DimensionError> {
        let old_index = self
            .get_proposal(proposal.id)?
            .map(|p| vend_index_key(p.vote_end_time, p.id));
        put_indexed(
            &self.proposals,
            &self.proposals_by_vend,
            &proposal.id.to_be_bytes(),
            &encode(proposal)?,
            old_index.as_deref(),
            &vend_index_key(proposal.vote_end_time, proposal.id),
        )
    }

    /// Next free primary key: one past the highest id, or 0 when empty.
    pub fn next_proposal_id(&self) -> Result<ProposalId, DimensionError> {
        match self.proposals.last().map_err(storage)? {
            Some((key, _)) => Ok(decode_id(&key)? + 1),
            None => Ok(0),
        }
    }

    /// Proposals whose vote window is still open at `now`
    /// (`vote_end_time > now`), earliest vote end first.
    pub fn proposals_voting_after(&self, now: Timestamp) -> Result<Vec<ProposalInfo>, DimensionError> {
        let Some(from) = now.checked_add(1) else {
            return Ok(Vec::new());
        };
        let start = vend_index_key(from, 0);
        self.proposals_by_vend
            .range(start.as_slice()..)
            .values()
            .map(|id| {
                let id = decode_id(&id.map_err(storage)?)?;
                self.get_proposal(id)?
                    .ok_or_else(|| DimensionError::Storage(format!("dangling vote-end index entry for {id}")))
            })
            .collect()
    }

    pub fn proposals(&self) -> Result<Vec<ProposalInfo>, DimensionError> {
        all_records(&self.proposals)
    }

    // ── Name bids ─────────────────────────────────────────────────────────────

    pub fn get_name_bid(&self, name: &AccountName) -> Result<Option<NameBid>, DimensionError> {
        get_record(&self.namebids, name.as_bytes())
    }

    pub fn put_name_bid(&self, bid: &NameBid) -> Result<(), DimensionError> {
        let old_index = self
            .get_name_bid(&bid.newname)?
            .map(|b| bid_index_key(b.high_bid, &b.newname));
        put_indexed(
            &self.namebids,
            &self.namebids_by_amount,
            bid.newname.as_bytes(),
            &encode(bid)?,
            old_index.as_deref(),
            &bid_index_key(bid.high_bid, &bid.newname),
        )
    }

    /// The bid at the head of the amount index. Closed bids are negative and
    /// therefore sort after every open one.
    pub fn highest_name_bid(&self) -> Result<Option<NameBid>, DimensionError> {
        match self.namebids_by_amount.first().map_err(storage)? {
            Some((_, name)) => self.get_name_bid(&AccountName::from_bytes(&name)?),
            None => Ok(None),
        }
    }

    // ── Maintenance ───────────────────────────────────────────────────────────

    /// BLAKE3 digest over every table and index, hex encoded. Two replicas
    /// that applied the same transactions report the same digest.
    pub fn state_digest(&self) -> Result<String, DimensionError> {
        let mut hasher = blake3::Hasher::new();
        for (name, tree) in [
            ("global", &self.global),
            ("producers", &self.producers),
            ("producers_by_votes", &self.producers_by_votes),
            ("gnodes", &self.gnodes),
            ("proposals", &self.proposals),
            ("proposals_by_vend", &self.proposals_by_vend),
            ("namebids", &self.namebids),
            ("namebids_by_amount", &self.namebids_by_amount),
        ] {
            hasher.update(name.as_bytes());
            for item in tree.iter() {
                let (key, value) = item.map_err(storage)?;
                hasher.update(&(key.len() as u64).to_le_bytes());
                hasher.update(&key);
                hasher.update(&(value.len() as u64).to_le_bytes());
                hasher.update(&value);
            }
        }
        Ok(hex::encode(hasher.finalize().as_bytes()))
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), DimensionError> {
        self.db.flush().map_err(storage)?;
        Ok(())
    }
}

// ── Index keys ────────────────────────────────────────────────────────────────

fn votes_index_key(votes: u64, owner: &AccountName) -> Vec<u8> {
    let mut key = (!votes).to_be_bytes().to_vec();
    key.extend_from_slice(owner.as_bytes());
    key
}

fn vend_index_key(vote_end_time: Timestamp, id: ProposalId) -> Vec<u8> {
    let mut key = vote_end_time.to_be_bytes().to_vec();
    key.extend_from_slice(&id.to_be_bytes());
    key
}

/// Flipping the sign bit orders i64 as u64; inverting makes it descending.
fn bid_index_key(high_bid: Amount, name: &AccountName) -> Vec<u8> {
    let ascending = (high_bid as u64) ^ (1 << 63);
    let mut key = (!ascending).to_be_bytes().to_vec();
    key.extend_from_slice(name.as_bytes());
    key
}

fn decode_id(bytes: &[u8]) -> Result<ProposalId, DimensionError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| DimensionError::Storage(format!("malformed proposal key ({} bytes)", bytes.len())))?;
    Ok(u64::from_be_bytes(arr))
}

// ── Record helpers ────────────────────────────────────────────────────────────

fn storage(e: sled::Error) -> DimensionError {
    DimensionError::Storage(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, DimensionError> {
    bincode::serialize(value).map_err(|e| DimensionError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DimensionError> {
    bincode::deserialize(bytes).map_err(|e| DimensionError::Serialization(e.to_string()))
}

fn get_record<T: DeserializeOwned>(tree: &sled::Tree, key: &[u8]) -> Result<Option<T>, DimensionError> {
    match tree.get(key).map_err(storage)? {
        Some(bytes) => Ok(Some(decode(&bytes)?)),
        None => Ok(None),
    }
}

fn all_records<T: DeserializeOwned>(tree: &sled::Tree) -> Result<Vec<T>, DimensionError> {
    tree.iter()
        .values()
        .map(|bytes| decode(&bytes.map_err(storage)?))
        .collect()
}

/// Write a record and move its index entry in one transaction.
fn put_indexed(
    rows: &sled::Tree,
    index: &sled::Tree,
    key: &[u8],
    value: &[u8],
    old_index: Option<&[u8]>,
    new_index: &[u8],
) -> Result<(), DimensionError> {
    (rows, index)
        .transaction(|(rows, index)| {
            if let Some(old) = old_index {
                index.remove(old)?;
            }
            rows.insert(key, value)?;
            index.insert(new_index, key)?;
            Ok::<_, ConflictableTransactionError<()>>(())
        })
        .map_err(|e: TransactionError<()>| DimensionError::Storage(format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimension_core::records::ProposalType;
    use dimension_core::types::PublicKey;

    fn name(s: &str) -> AccountName {
        AccountName::new(s).unwrap()
    }

    fn proposal(id: ProposalId, vote_end_time: Timestamp) -> ProposalInfo {
        ProposalInfo {
            id,
            owner: name("alice"),
            account: name("alice"),
            start_time: vote_end_time - 10,
            vote_end_time,
            exec_end_time: vote_end_time + 10,
            block_height: 0,
            proposal_type: ProposalType::AddProducer,
            consensus_type: 0,
            total_yeas: 0,
            total_nays: 0,
            is_satisfy: false,
            is_exec: false,
            exec_time: 0,
            total_staked: 0,
        }
    }

    fn bid(n: &str, high_bid: Amount) -> NameBid {
        NameBid { newname: name(n), high_bidder: name("bidder"), high_bid, last_bid_time: 0 }
    }

    #[test]
    fn global_requires_genesis() {
        let db = StateDb::open_temporary().unwrap();
        assert!(matches!(db.global(), Err(DimensionError::NotInitialised)));
        db.put_global(&GlobalState::default()).unwrap();
        assert!(db.is_initialised().unwrap());
        assert_eq!(db.global().unwrap(), GlobalState::default());
    }

    #[test]
    fn producers_ranked_by_votes_after_update() {
        let db = StateDb::open_temporary().unwrap();
        let key = PublicKey(vec![1]);
        db.put_producer(&ProducerInfo::new(name("low"), key.clone(), 10)).unwrap();
        db.put_producer(&ProducerInfo::new(name("mid"), key.clone(), 50)).unwrap();
        db.put_producer(&ProducerInfo::new(name("high"), key.clone(), 90)).unwrap();

        let ranked: Vec<_> = db.producers_by_votes().unwrap().into_iter().map(|p| p.owner).collect();
        assert_eq!(ranked, vec![name("high"), name("mid"), name("low")]);

        // Re-ranking must not leave the old index entry behind.
        db.put_producer(&ProducerInfo::new(name("low"), key, 100)).unwrap();
        let ranked: Vec<_> = db.producers_by_votes().unwrap().into_iter().map(|p| p.owner).collect();
        assert_eq!(ranked, vec![name("low"), name("high"), name("mid")]);
        assert_eq!(db.producer_count(), 3);
    }

    #[test]
    fn proposal_ids_and_vote_end_scan() {
        let db = StateDb::open_temporary().unwrap();
        assert_eq!(db.next_proposal_id().unwrap(), 0);
        db.put_proposal(&proposal(0, 300)).unwrap();
        db.put_proposal(&proposal(1, 100)).unwrap();
        db.put_proposal(&proposal(2, 200)).unwrap();
        assert_eq!(db.next_proposal_id().unwrap(), 3);

        let open: Vec<_> = db.proposals_voting_after(200).unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(open, vec![0]);
        let open: Vec<_> = db.proposals_voting_after(99).unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(open, vec![1, 2, 0]);
        assert!(db.proposals_voting_after(u32::MAX).unwrap().is_empty());
    }

    #[test]
    fn highest_bid_skips_closed_auctions() {
        let db = StateDb::open_temporary().unwrap();
        assert!(db.highest_name_bid().unwrap().is_none());
        db.put_name_bid(&bid("apple", 500)).unwrap();
        db.put_name_bid(&bid("pear", 900)).unwrap();
        db.put_name_bid(&bid("plum", 100)).unwrap();
        assert_eq!(db.highest_name_bid().unwrap().unwrap().newname, name("pear"));

        db.put_name_bid(&bid("pear", -900)).unwrap();
        assert_eq!(db.highest_name_bid().unwrap().unwrap().newname, name("apple"));
    }

    #[test]
    fn digest_tracks_content() {
        let a = StateDb::open_temporary().unwrap();
        let b = StateDb::open_temporary().unwrap();
        assert_eq!(a.state_digest().unwrap(), b.state_digest().unwrap());
        a.put_name_bid(&bid("apple", 1)).unwrap();
        assert_ne!(a.state_digest().unwrap(), b.state_digest().unwrap());
        b.put_name_bid(&bid("apple", 1)).unwrap();
        assert_eq!(a.state_digest().unwrap(), b.state_digest().unwrap());
    }
}
