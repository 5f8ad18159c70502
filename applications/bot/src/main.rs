/// Chorus - chat-platform music assistant
use chorus_bot::{build_resolver, BotConfig};
use chorus_playback::Resolution;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chorus-bot")]
#[command(about = "Chorus music assistant", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./chorus.toml)
    #[arg(short, long, global = true, env = "CHORUS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a query the way /play would and print the tracks
    Resolve {
        /// Search text, video link, or playlist link
        query: String,
    },
    /// Load and validate the configuration
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chorus_bot=info,chorus_playback=info,chorus_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = BotConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Resolve { query } => resolve(&config, &query).await?,
        Commands::CheckConfig => check_config(&config),
    }

    Ok(())
}

async fn resolve(config: &BotConfig, query: &str) -> anyhow::Result<()> {
    let (resolver, _lavalink) = build_resolver(config)?;

    match resolver.resolve(query).await {
        Resolution::Single(track) => {
            println!("{} - {} ({}s)", track.title, track.author, track.duration.as_secs());
        }
        Resolution::Batch(tracks) => {
            println!("Queued {} songs.", tracks.len());
            for (index, track) in tracks.iter().enumerate() {
                println!("{:>4}: {} - {}", index + 1, track.title, track.author);
            }
        }
        failure => anyhow::bail!("{failure}"),
    }

    Ok(())
}

fn check_config(config: &BotConfig) {
    println!("Configuration OK");
    println!("Lavalink: {}", config.lavalink_config().base_url());
    println!("Spotify API: {}", config.spotify.api_url);
    println!(
        "Resolver: min playlist {}, page size {}, {} concurrent searches",
        config.resolver.min_playlist_len,
        config.resolver.page_size,
        config.resolver.search_concurrency
    );
}
