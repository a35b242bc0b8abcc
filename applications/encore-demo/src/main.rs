/// Encore Demo - console player on a simulated engine
use clap::{Parser, Subcommand};
use encore_control::{ControlError, ControlLoop, HttpArtworkLoader, SimulatedEngine};
use encore_demo::{
    config::DemoConfig,
    console::{self, Command},
    output::{LogListener, LogSurface},
    playlist, DemoError,
};
use encore_playback::MediaEngine;
use std::{path::PathBuf, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "encore-demo")]
#[command(about = "Queued playback controller demo", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ENCORE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a playlist and read commands from stdin
    Play {
        /// Playlist JSON file (built-in sample when omitted)
        #[arg(short, long)]
        playlist: Option<PathBuf>,

        /// Queue index to start from (clamped into the queue)
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        start: i64,

        /// Load the queue without starting playback
        #[arg(long)]
        paused: bool,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encore_demo=info,encore_control=info,encore_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = DemoConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Play {
            playlist,
            start,
            paused,
        } => {
            play(config, playlist, start, !paused).await?;
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

async fn play(
    config: DemoConfig,
    playlist_path: Option<PathBuf>,
    start: i64,
    autoplay: bool,
) -> anyhow::Result<()> {
    let tracks = match &playlist_path {
        Some(path) => playlist::load(path).await?,
        None => playlist::sample(),
    };
    tracing::info!("Loaded {} playlist entries", tracks.len());

    let options = config.engine.simulated_options();
    let factory = move || Box::new(SimulatedEngine::new(options.clone())) as Box<dyn MediaEngine>;

    let (control, player) = ControlLoop::new(config.player.clone(), factory)?;
    let mut control = control
        .with_listener(LogListener::default())
        .with_surface(LogSurface::default());
    if config.artwork.enabled {
        control = control.with_artwork_loader(Arc::new(HttpArtworkLoader::new()?));
    }
    let task = control.spawn();

    player.setup(tracks, start, autoplay).await?;
    println!("{}", console::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match console::execute(&player, command).await {
            Ok(Some(output)) => println!("{}", output),
            Ok(None) => {}
            Err(DemoError::Control(ControlError::Closed)) => {
                tracing::error!("Control loop stopped unexpectedly");
                break;
            }
            Err(e) => println!("{}", e),
        }
    }

    // Already stopped if the loop exited on its own
    let _ = player.shutdown();
    task.await?;
    tracing::info!("Goodbye");

    Ok(())
}
