//! End-to-end tests for the dimension-node binary.
//!
//! Run with:
//!   cargo test -p dimension-node --test replay

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const GENESIS: &str = r#"{
    "genesis_time_us": 1749945600000000,
    "total_proposal_stake": 1000000,
    "perblock_bucket": 1000000,
    "reward_pre_block": 10,
    "producers": [
        { "owner": "bpa", "producer_key": "02a1", "total_votes": 70 },
        { "owner": "bpb", "producer_key": "02b2", "total_votes": 60 },
        { "owner": "bpc", "producer_key": "02c3", "total_votes": 50 },
        { "owner": "bpd", "producer_key": "02d4", "total_votes": 40 },
        { "owner": "bpe", "producer_key": "02e5", "total_votes": 30 },
        { "owner": "bpf", "producer_key": "02f6", "total_votes": 20 },
        { "owner": "bpg", "producer_key": "0207", "total_votes": 10 }
    ],
    "gnodes": [ { "owner": "alice" }, { "owner": "bob" } ],
    "balances": { "alice": 100000, "dimension.bk": 1000000 }
}"#;

const SCRIPT: &str = r#"{ "steps": [
    { "at": "2025-06-15T00:00:01Z", "blocks": { "producers": ["bpa", "bpb"], "count": 10 } },
    { "at": "2025-06-15T00:01:00Z", "tx": { "signers": ["alice"], "action": { "NewProposal": {
        "owner": "alice", "account": "alice", "block_height": 10, "proposal_type": 1, "consensus_type": 0 } } } },
    { "at": "2025-06-15T00:02:00Z", "tx": { "signers": ["bob"], "action": { "ExecProposal": { "owner": "bob", "proposal_id": 0 } } } },
    { "at": "2025-06-15T00:03:00Z", "tx": { "signers": ["bpa"], "action": { "ClaimRewards": { "owner": "bpa" } } } },
    { "at": "2025-06-15T00:04:00Z", "tx": { "signers": ["bpa"], "action": { "ClaimRewards": { "owner": "bpa" } } } },
    { "at": "2025-06-15T00:05:00Z", "tx": { "signers": ["bob"], "action": { "UnstakeGnode": { "owner": "bob" } } } }
] }"#;

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Workdir(PathBuf);

impl Workdir {
    fn new(tag: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("dimension_node_{tag}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("genesis.json"), GENESIS).unwrap();
        std::fs::write(dir.join("script.json"), SCRIPT).unwrap();
        Self(dir)
    }

    fn path(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}

impl Drop for Workdir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn node(args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dimension-node"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("spawn dimension-node")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

/// Value printed after `key` on its own report line.
fn field<'a>(report: &'a str, key: &str) -> Option<&'a str> {
    report.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        (parts.next() == Some(key)).then(|| parts.next()).flatten()
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn replay_reports_outcomes_and_balances() {
    let wd = Workdir::new("replay");
    let out = node(&[
        Path::new("replay"),
        Path::new("--genesis"),
        &wd.path("genesis.json"),
        Path::new("--script"),
        &wd.path("script.json"),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let report = stdout(&out);

    assert_eq!(field(&report, "applied"), Some("14"), "{report}");
    assert_eq!(field(&report, "rejected"), Some("1"), "{report}");
    assert!(report.contains("claimrewards   rejected (Precondition)"), "{report}");

    // Five blocks by bpa at 10 per block.
    assert_eq!(field(&report, "bpa"), Some("50"));
    assert_eq!(field(&report, "alice"), Some("85000"));
    assert_eq!(field(&report, "dimension.pr"), Some("15000"));
    // Bob's genesis stake comes back to bob.
    assert_eq!(field(&report, "bob"), Some("10000"));
    assert_eq!(field(&report, "digest").map(str::len), Some(64));
}

#[test]
fn replay_is_deterministic() {
    let wd = Workdir::new("determinism");
    let run = || {
        let out = node(&[
            Path::new("replay"),
            Path::new("--genesis"),
            &wd.path("genesis.json"),
            Path::new("--script"),
            &wd.path("script.json"),
        ]);
        assert!(out.status.success());
        field(&stdout(&out), "digest").map(str::to_owned)
    };
    let first = run();
    assert!(first.is_some());
    assert_eq!(first, run());
}

#[test]
fn strict_replay_stops_at_first_rejection() {
    let wd = Workdir::new("strict");
    let out = node(&[
        Path::new("replay"),
        Path::new("--strict"),
        Path::new("--genesis"),
        &wd.path("genesis.json"),
        Path::new("--script"),
        &wd.path("script.json"),
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("rejected"));
}

#[test]
fn genesis_then_inspect() {
    let wd = Workdir::new("inspect");
    let data = wd.path("data");

    let out = node(&[Path::new("genesis"), Path::new("--data-dir"), &data, Path::new("--genesis"), &wd.path("genesis.json")]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let digest = stdout(&out).trim().to_owned();

    // A second genesis on the same directory is refused.
    let again = node(&[Path::new("genesis"), Path::new("--data-dir"), &data, Path::new("--genesis"), &wd.path("genesis.json")]);
    assert!(!again.status.success());

    let out = node(&[Path::new("inspect"), Path::new("--data-dir"), &data, Path::new("digest")]);
    assert_eq!(stdout(&out).trim(), digest);

    let out = node(&[Path::new("inspect"), Path::new("--data-dir"), &data, Path::new("gnodes")]);
    let text = stdout(&out);
    assert!(text.contains("alice | candidate | staked 10000"), "{text}");
    assert!(text.contains("total staked 20000"), "{text}");

    let out = node(&[Path::new("inspect"), Path::new("--data-dir"), &data, Path::new("global")]);
    let global: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(global["producer_num"], 7);
    assert_eq!(global["reward_pre_block"], 10);
}
