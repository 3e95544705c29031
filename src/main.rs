//! Warwatch - Entry Point
//!
//! Loads deployment config, then either runs the sync scheduler loop,
//! a single sync cycle, or an on-demand check of one kingdom.

use std::path::PathBuf;

use clap::Parser;
use tokio::runtime::Runtime;

use warwatch::core::config::AppConfig;
use warwatch::core::error::Result;
use warwatch::core::types::Loc;
use warwatch::detect::WarEndDetector;
use warwatch::notify::DiscordNotifier;
use warwatch::store::World;
use warwatch::sync::{run_scheduler, DumpFetcher, SyncJob};

/// Track kingdom dumps and raise end-of-war ceasefire notifications
#[derive(Parser, Debug)]
#[command(name = "warwatch")]
#[command(about = "End-of-war ceasefire tracker for periodic kingdom dumps")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, default_value = "warwatch.toml")]
    config: PathBuf,

    /// Run one sync cycle and exit instead of looping
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Sync once, then run detection for a single kingdom loc (e.g. "6:9")
    #[arg(long)]
    check: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warwatch=info".to_string()),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::load(&args.config)?;

    let webhook = config
        .webhook_url
        .clone()
        .or_else(|| std::env::var("DISCORD_WEBHOOK_URL").ok());
    if webhook.is_none() {
        tracing::warn!("no webhook configured, notifications will be dropped");
    }
    let notifier = DiscordNotifier::new(webhook);

    let job = SyncJob::new(
        DumpFetcher::new(config.dump_url.clone()),
        WarEndDetector::new(config.detector.clone()),
    );
    let mut world = World::new();

    let rt = Runtime::new()?;

    if let Some(loc) = args.check {
        let created = rt.block_on(async {
            let at = job.sync(&mut world).await?;
            Ok::<_, warwatch::core::error::WatchError>(
                job.detector()
                    .check_kingdom(&mut world, &notifier, &Loc::new(loc), at)
                    .await,
            )
        })?;
        tracing::info!("check finished with {} new ceasefire records", created.len());
    } else if args.once {
        let created = rt.block_on(job.run_once(&mut world, &notifier))?;
        tracing::info!("cycle finished with {} new ceasefire records", created.len());
    } else {
        tracing::info!(
            "starting scheduler, syncing every {}s from {}",
            config.sync_interval_secs,
            config.dump_url
        );
        rt.block_on(run_scheduler(
            &job,
            &mut world,
            &notifier,
            std::time::Duration::from_secs(config.sync_interval_secs),
        ));
    }

    Ok(())
}
