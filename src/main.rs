//! Duel Sim - headless two-fighter match runner
//!
//! Loads configuration from the environment, builds the match from builtin or
//! on-disk skins, then drives it against the wall clock. Outcomes go to
//! stdout as JSON lines; logs go to stderr.

use std::io::{self, Write};

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use duel_sim::assets::{AssetProvider, BuiltinAssets, ManifestAssets};
use duel_sim::config::Config;
use duel_sim::game::MatchController;
use duel_sim::input::{IdleInput, InputSource, ScriptedInput};
use duel_sim::runner::{self, RunOptions};
use duel_sim::util::rng::SeededRandom;
use duel_sim::util::time::TickRate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level, config.log_json);

    info!("Starting Duel Sim");
    info!(
        skin_a = %config.skin_a,
        skin_b = %config.skin_b,
        human = %config.human_side,
        "Match configuration"
    );

    let assets: Box<dyn AssetProvider> = match &config.asset_dir {
        Some(dir) => Box::new(ManifestAssets::new(dir.clone())),
        None => Box::new(BuiltinAssets),
    };

    let rng = match config.ai_seed {
        Some(seed) => SeededRandom::from_seed(seed),
        None => SeededRandom::from_entropy(),
    };

    let mut controller = MatchController::new(
        Uuid::new_v4(),
        config.rules.clone(),
        assets.as_ref(),
        [config.skin_a.as_str(), config.skin_b.as_str()],
        Box::new(rng),
    )?;

    let mut input: Box<dyn InputSource> = match &config.input_script {
        Some(path) => Box::new(ScriptedInput::from_path(path)?),
        None => Box::new(IdleInput),
    };

    controller.select_human(config.human_side);

    let options = RunOptions {
        tick_rate: TickRate::new(config.tick_rate),
        realtime: config.realtime,
        max_ticks: config.max_ticks,
        rounds: config.rounds,
        snapshot_interval: config.snapshot_interval,
    };

    let mut stdout = io::stdout().lock();
    let summary = tokio::select! {
        summary = runner::run(&mut controller, input.as_mut(), &options, &mut stdout) => Some(summary?),
        _ = shutdown_signal() => None,
    };

    if let Some(summary) = summary {
        serde_json::to_writer(&mut stdout, &summary)?;
        writeln!(stdout)?;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(io::stderr),
            )
            .init();
    }
}

/// Resolves on Ctrl+C or SIGTERM; the run stops at a tick boundary
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping");
        }
        _ = terminate => {
            info!("Received terminate signal, stopping");
        }
    }
}
