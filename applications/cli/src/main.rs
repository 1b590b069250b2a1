/// Lyra - terminal music player
use anyhow::Context;
use clap::{Parser, Subcommand};
use lyra_audio_desktop::RodioEngine;
use lyra_cli::{config::AppConfig, inspect, Session};
use lyra_playback::PlaybackController;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::thread;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "lyra")]
#[command(about = "Play a streaming music catalog from the terminal", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue a catalog and play it interactively
    Play {
        /// Catalog JSON file
        catalog: PathBuf,

        /// 1-based catalog entry to start from
        #[arg(short, long, default_value_t = 1)]
        start: usize,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List catalog tracks and the source each would play
    Inspect {
        /// Catalog JSON file
        catalog: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        Commands::Play { config, .. }
        | Commands::Inspect { config, .. }
        | Commands::Config { config } => config.clone(),
    };
    let config = AppConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.logging.filter.as_str().into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match cli.command {
        Commands::Play { catalog, start, .. } => play(&config, &catalog, start),
        Commands::Inspect { catalog, .. } => {
            let tracks = load_tracks(&catalog)?;
            inspect::write_catalog(&mut io::stdout().lock(), &tracks, config.player.source_policy)?;
            Ok(())
        }
        Commands::Config { .. } => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn load_tracks(path: &Path) -> anyhow::Result<Vec<lyra_core::Track>> {
    let tracks = lyra_core::load_catalog(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    tracing::info!(tracks = tracks.len(), path = %path.display(), "Catalog loaded");
    Ok(tracks)
}

fn play(config: &AppConfig, catalog: &Path, start: usize) -> anyhow::Result<()> {
    let tracks = load_tracks(catalog)?;
    if tracks.is_empty() {
        anyhow::bail!("Catalog {} has no tracks", catalog.display());
    }

    let engine =
        RodioEngine::new(config.to_fetch_settings()).context("Failed to open audio output")?;
    let player = PlaybackController::new(engine, config.to_player_config());

    let mut session = Session::new(player, tracks, io::stdout());
    println!("Type 'help' for commands.");
    session.start(start)?;

    let (tx, rx) = crossbeam_channel::unbounded();
    thread::Builder::new()
        .name("lyra-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("Failed to spawn input thread")?;

    // Poll engine notices at least every 100ms
    let tick = config
        .to_player_config()
        .position_poll_interval
        .min(std::time::Duration::from_millis(100));
    session.run(rx, tick)?;
    Ok(())
}
