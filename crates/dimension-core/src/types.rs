use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{BLOCK_INTERVAL_MS, BLOCK_TIMESTAMP_EPOCH_MS, MAX_ACCOUNT_NAME_LEN};
use crate::error::DimensionError;

/// Token amount in base units (4 decimals). Signed: name bids encode
/// "closed" by negating the winning amount.
pub type Amount = i64;

/// Chain time in whole seconds, as returned by `now()`.
pub type Timestamp = u32;

/// Auto-incrementing proposal identifier.
pub type ProposalId = u64;

// ── AccountName ──────────────────────────────────────────────────────────────

/// On-chain account identifier: 1–12 characters from `a-z`, `1-5` and `.`,
/// never ending in `.`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountName(String);

impl AccountName {
    pub fn new(name: impl Into<String>) -> Result<Self, DimensionError> {
        let name = name.into();
        let valid_chars = name
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'1'..=b'5' | b'.'));
        if name.is_empty()
            || name.len() > MAX_ACCOUNT_NAME_LEN
            || !valid_chars
            || name.ends_with('.')
        {
            return Err(DimensionError::InvalidAccountName(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Decode a name previously stored with `as_bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DimensionError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| DimensionError::InvalidAccountName(e.to_string()))?;
        Self::new(s)
    }
}

impl TryFrom<String> for AccountName {
    type Error = DimensionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountName> for String {
    fn from(name: AccountName) -> Self {
        name.0
    }
}

impl FromStr for AccountName {
    type Err = DimensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountName({})", self.0)
    }
}

// ── PublicKey ────────────────────────────────────────────────────────────────

/// Block-signing public key. The core never verifies signatures with it;
/// an empty key marks a producer as inactive.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey(pub Vec<u8>);

impl PublicKey {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, DimensionError> {
        hex::decode(s)
            .map(Self)
            .map_err(|e| DimensionError::InvalidPublicKey(e.to_string()))
    }
}

impl TryFrom<String> for PublicKey {
    type Error = DimensionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<PublicKey> for String {
    fn from(key: PublicKey) -> Self {
        key.to_hex()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "PublicKey({})", &hex[..hex.len().min(16)])
    }
}

// ── ChainTime ────────────────────────────────────────────────────────────────

/// Host-supplied chain time in microseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChainTime(pub u64);

impl ChainTime {
    pub fn from_micros(us: u64) -> Self {
        Self(us)
    }

    pub fn from_secs(secs: Timestamp) -> Self {
        Self(secs as u64 * 1_000_000)
    }

    /// `current_time()`: microseconds.
    pub fn micros(self) -> u64 {
        self.0
    }

    /// `now()`: whole seconds, saturating at `u32::MAX`.
    pub fn secs(self) -> Timestamp {
        u32::try_from(self.0 / 1_000_000).unwrap_or(u32::MAX)
    }

    pub fn plus_micros(self, us: u64) -> Self {
        Self(self.0.saturating_add(us))
    }
}

// ── BlockTimestamp ───────────────────────────────────────────────────────────

/// Half-second block slot counted from 2000-01-01T00:00:00Z.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockTimestamp {
    pub slot: u32,
}

impl BlockTimestamp {
    pub fn new(slot: u32) -> Self {
        Self { slot }
    }

    pub fn from_chain_time(t: ChainTime) -> Self {
        let ms = (t.micros() / 1_000).saturating_sub(BLOCK_TIMESTAMP_EPOCH_MS);
        Self { slot: u32::try_from(ms / BLOCK_INTERVAL_MS).unwrap_or(u32::MAX) }
    }

    pub fn to_chain_time(self) -> ChainTime {
        let ms = BLOCK_TIMESTAMP_EPOCH_MS + self.slot as u64 * BLOCK_INTERVAL_MS;
        ChainTime::from_micros(ms * 1_000)
    }

    /// Slots elapsed since `earlier`; zero if `earlier` is in the future.
    pub fn slots_since(self, earlier: BlockTimestamp) -> u32 {
        self.slot.saturating_sub(earlier.slot)
    }
}
