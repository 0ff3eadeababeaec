/// ─── Dimension System Constants ─────────────────────────────────────────────
///
/// Time is measured three ways throughout the system contract:
///   chain seconds      — `now()`, used by proposals and governance nodes
///   chain microseconds — `current_time()`, used by claims and name bids
///   block slots        — half-second block timestamps, used by the hook

// ── Time ─────────────────────────────────────────────────────────────────────

pub const SECONDS_PER_HOUR: u32 = 3_600;
pub const SECONDS_PER_DAY: u32 = 24 * SECONDS_PER_HOUR;

pub const USECONDS_PER_DAY: u64 = SECONDS_PER_DAY as u64 * 1_000_000;

/// Half-second block slots per hour.
pub const BLOCKS_PER_HOUR: u32 = 2 * SECONDS_PER_HOUR;

/// Half-second block slots per day.
pub const BLOCKS_PER_DAY: u32 = 2 * SECONDS_PER_DAY;

/// Block timestamps count half-second slots from 2000-01-01T00:00:00Z.
pub const BLOCK_TIMESTAMP_EPOCH_MS: u64 = 946_684_800_000;
pub const BLOCK_INTERVAL_MS: u64 = 500;

// ── Activation thresholds ────────────────────────────────────────────────────

/// Until governance stake crosses this threshold the block hook is dormant
/// and rewards cannot be claimed.
pub const MIN_PROPOSAL_STAKE: i64 = 1_000_000;

/// Minimum elected producers before the block hook starts accounting.
pub const MIN_PRODUCER_SIZE: u32 = 7;

/// Above this many registered producers, proposals may only execute once
/// their vote window has closed.
pub const BOOTSTRAP_PRODUCER_LIMIT: usize = 7;

// ── Block-production hook ────────────────────────────────────────────────────

/// Slots between elected-schedule refreshes (one minute).
pub const SCHEDULE_UPDATE_INTERVAL_SLOTS: u32 = 240;

/// Slots between name-auction closings.
pub const NAME_CLOSE_INTERVAL_SLOTS: u32 = BLOCKS_PER_DAY;

/// A winning bid must be older than this before the auction closes.
pub const NAME_BID_MIN_AGE_US: u64 = USECONDS_PER_DAY;

/// Days that must pass after stake activation before any name auction closes.
pub const NAME_CLOSE_ACTIVATION_DAYS: u64 = 14;

/// Upper bound on the candidate list handed to the schedule updater.
pub const MAX_SCHEDULE_SIZE: usize = 21;

// ── Proposals ────────────────────────────────────────────────────────────────

/// Voting window opened by `newproposal` (seconds).
pub const PROPOSAL_VOTE_WINDOW_SECS: u32 = SECONDS_PER_DAY;

/// Execution window following the vote window (seconds).
pub const PROPOSAL_EXEC_WINDOW_SECS: u32 = 3 * SECONDS_PER_DAY;

/// Net approval must exceed `total_proposal_stake / PASS_THRESHOLD_DIVISOR`.
pub const PASS_THRESHOLD_DIVISOR: i64 = 10;

/// Valid values for `consensus_type` on a consensus-switch proposal.
pub const CONSENSUS_TYPES: [i64; 3] = [0, 1, 2];

// ── Fees (base units, 4 decimals) ────────────────────────────────────────────

/// Default fee charged by `newproposal` (1.5000).
pub const DEFAULT_NEW_PROPOSAL_FEE: i64 = 15_000;

/// Default stake locked by `staketognode` (1.0000).
pub const DEFAULT_STAKE_TO_GNODE_FEE: i64 = 10_000;

// ── Reward claims ────────────────────────────────────────────────────────────

/// Minimum spacing between two claims by the same producer.
pub const CLAIM_INTERVAL_US: u64 = USECONDS_PER_DAY;

pub const BLOCK_PAY_MEMO: &str = "producer block pay";
pub const NEW_PROPOSAL_MEMO: &str = "new proposal fee";
pub const STAKE_GNODE_MEMO: &str = "stake to governance node";
pub const UNSTAKE_GNODE_MEMO: &str = "unstake governance node refund";

// ── Accounts ─────────────────────────────────────────────────────────────────

/// Maximum length of an account name.
pub const MAX_ACCOUNT_NAME_LEN: usize = 12;

pub const DEFAULT_SYSTEM_ACCOUNT: &str = "dimension";
pub const DEFAULT_PROPOSAL_ESCROW: &str = "dimension.pr";
pub const DEFAULT_STAKE_ESCROW: &str = "dimension.bp";
pub const DEFAULT_BLOCK_PAY_ESCROW: &str = "dimension.bk";
