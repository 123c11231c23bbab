use anyhow::{Context, Result};
use clap::Parser;
use ledger_core::ChainReport;
use ledger_sim::{BlockStatus, Session, SimConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const PARTIES: [&str; 4] = ["alice", "bob", "carol", "dave"];

#[derive(Parser, Debug)]
#[command(name = "ledger-sim")]
#[command(about = "Mine a toy proof-of-work chain, tamper with it and watch validation catch it")]
struct Args {
    /// Leading zero hex digits required of each hash (clamped to 6)
    #[arg(long)]
    difficulty: Option<u32>,

    /// Blocks to mine on top of genesis
    #[arg(long, default_value_t = 3)]
    blocks: usize,

    /// Block whose first transaction gets rewritten (clamped to 1..=blocks)
    #[arg(long, default_value_t = 1)]
    tamper: usize,

    /// Search nonces on every core
    #[arg(long)]
    parallel: bool,

    /// JSON config file, e.g. {"difficulty": 3, "parallel": true}
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the final chain as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            SimConfig::from_json(&raw).with_context(|| format!("parsing {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(difficulty) = args.difficulty {
        config.difficulty = difficulty;
    }
    if args.parallel {
        config.parallel = true;
    }
    Ok(config.clamped())
}

fn print_stage(stage: &str, report: &ChainReport) {
    match report.first_invalid() {
        None => println!("{stage}: chain valid"),
        Some(index) => println!("{stage}: chain INVALID (first bad block {index})"),
    }
}

fn print_table(session: &Session) {
    println!(
        "{:>5}  {:>10}  {:<10}  {:<16}  {:<16}  {:>3}",
        "block", "nonce", "status", "hash", "previous", "txs"
    );
    for (block, status) in session.chain().iter().zip(session.statuses()) {
        let status = match status {
            BlockStatus::Valid => "valid",
            BlockStatus::Invalid => "invalid",
            BlockStatus::Mining => "mining",
            BlockStatus::Restricted => "restricted",
        };
        let previous = &block.header.previous_hash;
        println!(
            "{:>5}  {:>10}  {:<10}  {:<16}  {:<16}  {:>3}",
            block.index(),
            block.header.nonce,
            status,
            &block.hash[..16.min(block.hash.len())],
            &previous[..16.min(previous.len())],
            block.transactions().len()
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(
        "ledger-sim starting at difficulty {} ({})",
        config.difficulty,
        if config.parallel { "parallel" } else { "single-threaded" }
    );
    let mut session = Session::new(config);

    for i in 0..args.blocks {
        let from = PARTIES[i % PARTIES.len()];
        let to = PARTIES[(i + 1) % PARTIES.len()];
        session.submit_transaction(from, to, (i as f64 + 1.0) * 10.0)?;
        session.submit_transaction(to, from, 2.5)?;
        session.mine_pending().await?;
    }
    let mut report = session.validate();
    print_stage("after mining", &report);

    if args.blocks > 0 {
        let target = args.tamper.clamp(1, args.blocks);
        session.tamper_amount(target, 0, 1_000_000.0)?;
        report = session.validate();
        print_stage(&format!("after tampering block {target}"), &report);

        for index in target..=args.blocks {
            session.remine(index).await?;
        }
        report = session.validate();
        print_stage("after re-mining", &report);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(session.chain())?);
    } else {
        print_table(&session);
    }

    if !report.valid {
        anyhow::bail!("final chain failed validation");
    }
    Ok(())
}
