//! dimension-node — applies system-contract transactions against a local
//! state database.
//!
//! Subcommands:
//!   genesis  initialise a data directory from genesis params
//!   replay   apply genesis, then a script of timed transactions, and print
//!            each outcome, the final state digest and ledger balances
//!   inspect  print records from an existing data directory

mod host;
mod script;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use dimension_core::types::{AccountName, ChainTime, ProposalId};
use dimension_genesis::{apply_genesis, genesis_ledger, GenesisParams};
use dimension_governance::{GovernanceRegistry, ProposalQuery, RewardQuery};
use dimension_state::{StateDb, SystemEngine};

use crate::host::TracingHost;
use crate::script::Script;

#[derive(Parser, Debug)]
#[command(
    name = "dimension-node",
    version,
    about = "Dimension system contract: governance nodes, proposals and producer pay"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialise a data directory from a genesis params file.
    Genesis {
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long)]
        genesis: PathBuf,
    },

    /// Apply genesis and replay a transaction script.
    Replay {
        #[arg(long)]
        genesis: PathBuf,
        #[arg(long)]
        script: PathBuf,
        /// Keep the resulting state here. A temporary database is used if omitted.
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Stop at the first rejected transaction.
        #[arg(long)]
        strict: bool,
    },

    /// Print state from an existing data directory.
    Inspect {
        #[arg(long)]
        data_dir: PathBuf,
        /// Chain time for status computations (RFC 3339). Defaults to now.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        #[command(subcommand)]
        what: Inspect,
    },
}

#[derive(Subcommand, Debug)]
enum Inspect {
    Global,
    Proposal { id: ProposalId },
    Proposals,
    Gnode { owner: AccountName },
    Gnodes,
    Producer { owner: AccountName },
    Digest,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dimension=debug".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Genesis { data_dir, genesis } => cmd_genesis(&data_dir, &genesis),
        Command::Replay { genesis, script, data_dir, strict } => {
            cmd_replay(&genesis, &script, data_dir.as_deref(), strict)
        }
        Command::Inspect { data_dir, at, what } => cmd_inspect(&data_dir, at, what),
    }
}

// ── genesis ───────────────────────────────────────────────────────────────────

fn cmd_genesis(data_dir: &Path, genesis: &Path) -> anyhow::Result<()> {
    let params = load_genesis(genesis)?;
    let db = open_db(data_dir)?;
    let summary = apply_genesis(&db, &params).context("applying genesis")?;
    println!("{}", summary.state_digest);
    Ok(())
}

// ── replay ────────────────────────────────────────────────────────────────────

fn cmd_replay(genesis: &Path, script: &Path, data_dir: Option<&Path>, strict: bool) -> anyhow::Result<()> {
    let params = load_genesis(genesis)?;
    let json = std::fs::read_to_string(script)
        .with_context(|| format!("reading replay script from {}", script.display()))?;
    let txs = Script::from_json(&json)?.expand(&params.system.system_account)?;

    let db = Arc::new(match data_dir {
        Some(dir) => open_db(dir)?,
        None => StateDb::open_temporary().context("opening temporary state database")?,
    });
    apply_genesis(&db, &params).context("applying genesis")?;

    let mut host = TracingHost::default();
    for node in db.gnodes()?.into_iter().filter(|n| n.is_bp) {
        host.elected.insert(node.owner);
    }
    let mut engine = SystemEngine::new(Arc::clone(&db), params.system.clone(), host, genesis_ledger(&params));

    info!(transactions = txs.len(), "replaying script");
    let (mut applied, mut rejected) = (0usize, 0usize);
    for (i, timed) in txs.iter().enumerate() {
        let action = timed.tx.action.name();
        match engine.apply(&timed.tx, timed.at) {
            Ok(()) => {
                applied += 1;
                // Block runs are noisy; report only the other actions.
                if action != "onblock" {
                    println!("#{i:<6} {action:<14} ok");
                }
            }
            Err(e) => {
                rejected += 1;
                warn!(index = i, action, error = %e, "transaction rejected");
                println!("#{i:<6} {action:<14} rejected ({:?}): {e}", e.kind());
                if strict {
                    bail!("transaction #{i} rejected: {e}");
                }
            }
        }
    }
    db.flush()?;

    println!();
    println!("applied   {applied}");
    println!("rejected  {rejected}");
    println!("digest    {}", db.state_digest()?);
    println!("consensus {}", engine.host.consensus_type);
    let elected: Vec<_> = engine.host.elected.iter().map(AccountName::as_str).collect();
    println!("elected   [{}]", elected.join(", "));
    println!();
    for (account, balance) in engine.ledger.balances() {
        println!("{:<12} {balance}", account.as_str());
    }
    Ok(())
}

// ── inspect ───────────────────────────────────────────────────────────────────

fn cmd_inspect(data_dir: &Path, at: Option<DateTime<Utc>>, what: Inspect) -> anyhow::Result<()> {
    if !data_dir.exists() {
        bail!("no state database at {}", data_dir.display());
    }
    let db = StateDb::open(data_dir).context("opening state database")?;
    let now = at.unwrap_or_else(Utc::now);
    let now = ChainTime::from_micros(u64::try_from(now.timestamp_micros()).context("time before the Unix epoch")?);

    match what {
        Inspect::Global => print_json(&db.global()?)?,
        Inspect::Digest => println!("{}", db.state_digest()?),
        Inspect::Proposal { id } => {
            let q = ProposalQuery::new(&db);
            println!("{}", q.describe(id, now.secs())?);
            print_json(&q.get(id)?)?;
        }
        Inspect::Proposals => {
            let q = ProposalQuery::new(&db);
            for p in db.proposals()? {
                println!("{}", q.describe(p.id, now.secs())?);
            }
        }
        Inspect::Gnode { owner } => {
            println!("{}", GovernanceRegistry::new(&db).describe(&owner)?);
        }
        Inspect::Gnodes => {
            let registry = GovernanceRegistry::new(&db);
            for node in registry.nodes()? {
                println!("{}", registry.describe(&node.owner)?);
            }
            println!("total staked {}", registry.total_staked()?);
        }
        Inspect::Producer { owner } => {
            println!("{}", RewardQuery::new(&db).describe(&owner, now)?);
            print_json(&db.get_producer(&owner)?)?;
        }
    }
    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn load_genesis(path: &Path) -> anyhow::Result<GenesisParams> {
    GenesisParams::load(path).with_context(|| format!("loading genesis params from {}", path.display()))
}

fn open_db(dir: &Path) -> anyhow::Result<StateDb> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating data dir {}", dir.display()))?;
    StateDb::open(dir).context("opening state database")
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("encoding JSON")?);
    Ok(())
}
