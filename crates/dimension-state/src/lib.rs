pub mod db;
pub mod engine;
pub mod host;

mod block;
mod gnode;
mod proposal;
mod rewards;

#[cfg(test)]
mod testkit;

pub use db::StateDb;
pub use engine::SystemEngine;
pub use host::{ChainHost, HostCall, MemoryLedger, RecordingHost, TokenLedger, Transfer};
