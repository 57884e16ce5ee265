use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use snake_dqn::config::AppConfig;
use snake_dqn::modes::{PlayMode, TrainMode, play::default_model_path};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snake_dqn")]
#[command(version, about = "Snake agent trained with deep Q-learning")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a new agent, saving the model on every new record
    Train {
        /// Path to TOML configuration file
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,

        /// Stop after this many episodes (default: run until Ctrl-C)
        #[arg(long)]
        episodes: Option<usize>,

        /// Override where the best model is saved
        #[arg(long)]
        model_path: Option<PathBuf>,

        /// Seed exploration, replay sampling and food placement
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Play greedy episodes with a saved model
    Play {
        /// Saved model path, without the .mpk / .meta.json suffix
        #[arg(long, default_value_os_t = default_model_path())]
        model_path: PathBuf,

        /// Number of episodes to play
        #[arg(long, default_value = "10")]
        episodes: usize,

        /// Path to TOML configuration file (only the [game] section is used)
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Raise `stop` on Ctrl-C; the running mode finishes its current step first
fn spawn_interrupt_handler(stop: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping after the current step");
            stop.store(true, Ordering::SeqCst);
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stop = Arc::new(AtomicBool::new(false));
    spawn_interrupt_handler(Arc::clone(&stop));

    match cli.command {
        Command::Train {
            config,
            episodes,
            model_path,
            seed,
        } => {
            let mut app_config = AppConfig::load_or_default(&config)
                .with_context(|| format!("loading config from {}", config.display()))?;

            if let Some(episodes) = episodes {
                app_config.training.max_episodes = Some(episodes);
            }
            if let Some(model_path) = model_path {
                app_config.training.model_path = model_path;
            }
            if let Some(seed) = seed {
                app_config.agent.seed = Some(seed);
            }

            tokio::task::spawn_blocking(move || {
                TrainMode::new(app_config).with_stop_flag(stop).run()
            })
            .await
            .context("training task panicked")??;
        }
        Command::Play {
            model_path,
            episodes,
            config,
        } => {
            let app_config = AppConfig::load_or_default(&config)
                .with_context(|| format!("loading config from {}", config.display()))?;

            tokio::task::spawn_blocking(move || {
                PlayMode::new(&model_path, app_config.game, episodes)?
                    .with_stop_flag(stop)
                    .run()
            })
            .await
            .context("play task panicked")??;
        }
    }

    Ok(())
}
