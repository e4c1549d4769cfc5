use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sojourn_core::app::EngineBuilder;
use sojourn_core::config::{Config, DeploymentMode};
use sojourn_core::domain::items::{COINS, LOGS, MORT_MYRE_FUNGUS, RANARR_SEED};
use sojourn_core::domain::{Activity, ActivityKind, ActorProfile, Bank, PerkTier};
use sojourn_core::impls::{
    InMemoryActivityStore, InMemoryActorDirectory, InMemoryLedger, TracingTransport,
};
use sojourn_core::ports::{IdGenerator, SystemClock, UlidGenerator};

#[derive(Parser)]
#[command(
    name = "sojourn",
    about = "Run the activity completion engine against in-memory demo data",
    version
)]
struct Cli {
    /// Deployment mode (production | development)
    #[arg(long, env = "SOJOURN_MODE", default_value = "development")]
    mode: DeploymentMode,

    /// YAML config file; overrides the mode defaults
    #[arg(long, env = "SOJOURN_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for deterministic effect rolls
    #[arg(long, env = "SOJOURN_SEED")]
    seed: Option<u64>,

    /// Demo actors to create
    #[arg(long, default_value_t = 3)]
    actors: usize,

    /// Demo activities to schedule
    #[arg(long, default_value_t = 12)]
    activities: usize,

    /// Stop after this many seconds (default: run until ctrl-c)
    #[arg(long)]
    run_for: Option<u64>,

    /// Verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

const DEMO_KINDS: &[ActivityKind] = &[
    ActivityKind::MonsterKilling,
    ActivityKind::Woodcutting,
    ActivityKind::Fishing,
    ActivityKind::Mining,
    ActivityKind::UnderwaterAgilityThieving,
    ActivityKind::Inferno,
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::for_mode(cli.mode),
    };
    let config = match cli.seed {
        Some(seed) => config.with_rng_seed(Some(seed)),
        None => config,
    };

    let store = InMemoryActivityStore::new();
    let ledger = InMemoryLedger::new();
    let directory = InMemoryActorDirectory::new();
    seed_demo(&store, &ledger, &directory, cli.actors, cli.activities).await;

    let mut engine = EngineBuilder::new(config)
        .store(Arc::new(store.clone()))
        .ledger(Arc::new(ledger))
        .directory(Arc::new(directory))
        .transport(Arc::new(TracingTransport::new()))
        .canonical_handlers()
        .context("registering effect handlers")?
        .build()
        .context("building engine")?;
    engine.start().await.context("starting tickers")?;

    match cli.run_for {
        Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
        None => tokio::signal::ctrl_c()
            .await
            .context("waiting for ctrl-c")?,
    }

    engine.request_shutdown();
    let status = engine.status().await;
    engine.shutdown_and_join().await;

    tracing::info!(pending = store.pending_count().await, "shutdown complete");
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

/// Actors with a few items, and activities finishing over the next seconds.
async fn seed_demo(
    store: &InMemoryActivityStore,
    ledger: &InMemoryLedger,
    directory: &InMemoryActorDirectory,
    actors: usize,
    activities: usize,
) {
    let ids = UlidGenerator::new(SystemClock);
    let tiers = [PerkTier::Zero, PerkTier::Two, PerkTier::Four];

    let mut owners = Vec::with_capacity(actors);
    for n in 0..actors {
        let id = ids.actor_id();
        let profile =
            ActorProfile::new(id, format!("demo-{n}")).with_perk_tier(tiers[n % tiers.len()]);
        directory.upsert(profile).await;
        ledger
            .set_bank(
                id,
                Bank::new()
                    .with(COINS, 10_000)
                    .with(MORT_MYRE_FUNGUS, 20),
            )
            .await;
        owners.push(id);
    }
    if owners.is_empty() {
        return;
    }

    let now = Utc::now();
    for n in 0..activities {
        let kind = DEMO_KINDS[n % DEMO_KINDS.len()];
        let minutes = 10 + (n as u64 * 7) % 50;
        let loot = Bank::new()
            .with(LOGS, 5 + n as u64)
            .with(RANARR_SEED, 1 + n as u64 % 3);
        let activity = Activity::new(
            ids.activity_id(),
            owners[n % owners.len()],
            kind,
            ids.channel_id(),
            now + chrono::Duration::milliseconds(n as i64 * 400),
            Duration::from_secs(minutes * 60),
        )
        .with_payload(serde_json::json!({
            "description": format!("Your minion finished a {minutes} minute {kind:?} trip."),
            "loot": loot,
        }));
        store.insert(activity).await;
    }
    tracing::info!(actors, activities, "demo data seeded");
}
