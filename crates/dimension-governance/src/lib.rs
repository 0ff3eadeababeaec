//! dimension-governance
//!
//! Read-only views over the system tables. All state changes go through
//! dimension-state's SystemEngine; this crate answers questions about
//! proposals, governance nodes and producer pay without mutating anything.

pub mod proposal;
pub mod registry;
pub mod rewards;

pub use proposal::{ProposalQuery, ProposalStatus};
pub use registry::GovernanceRegistry;
pub use rewards::RewardQuery;
