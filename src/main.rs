mod config;
mod logging;
mod ports;
mod preferences;
mod services;
mod spotify;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config,
    logging::setup_logging,
    preferences::YearRange,
    services::playlist::{DEFAULT_PLAYLIST_CAP, PlaylistBuilder},
    services::recommend::Recommender,
    spotify::auth::TokenProvider,
    spotify::client::SpotifyCatalog,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "PLAYLIST_WIZARD_CONFIG")]
    config: Option<PathBuf>,

    /// Console log level (default: off)
    #[arg(long, default_value = "off", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "PLAYLIST_WIZARD_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recommend artists for a set of onboarding selections
    Recommend {
        /// Genre ids from the onboarding wizard (comma separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        genres: Vec<u32>,

        /// Language ids from the onboarding wizard (comma separated)
        #[arg(short, long, value_delimiter = ',')]
        languages: Vec<u32>,

        /// Start of the preferred year range
        #[arg(long, default_value = "1950")]
        year_from: i32,

        /// End of the preferred year range
        #[arg(long, default_value = "2025")]
        year_to: i32,

        /// Result page offset passed to every catalog query
        #[arg(short, long, default_value = "0")]
        offset: u32,
    },
    /// Assemble a starter playlist from picked artists
    Playlist {
        /// Catalog artist ids (comma separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        artists: Vec<String>,

        /// Market code used for top-track lookups
        #[arg(short, long, default_value = "US")]
        market: String,

        /// Maximum number of tracks
        #[arg(long, default_value_t = DEFAULT_PLAYLIST_CAP)]
        cap: usize,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("Playlist wizard starting");

    // Config subcommands run before (and without) loading the config file
    if let Commands::Config(config_commands) = &args.command {
        match config_commands {
            ConfigCommands::CreateDefault => {
                log::debug!("Creating default config");
                Config::create_default()?;
                log::info!("Default config created successfully");
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        }
        return Ok(());
    }

    log::debug!("Loading configuration");
    let config = {
        if let Some(config) = args.config {
            Config::from_file(&config)
        } else {
            Config::load()
        }
    }
    .with_context(|| "Failed to load playlist-wizard config")?;

    let credentials = config.spotify_config()?;
    let catalog = SpotifyCatalog::new(TokenProvider::new(
        credentials.client_id,
        credentials.client_secret,
    ));

    match args.command {
        Commands::Recommend {
            genres,
            languages,
            year_from,
            year_to,
            offset,
        } => {
            log::debug!(
                "Starting recommend command for {} genre ids, {} language ids",
                genres.len(),
                languages.len()
            );
            let recommender = Recommender::with_concurrency(catalog, config.concurrency());
            let candidates = recommender
                .artists_for_selection(
                    &genres,
                    &languages,
                    YearRange {
                        from: year_from,
                        to: year_to,
                    },
                    offset,
                )
                .await;
            println!("{}", serde_json::to_string_pretty(&candidates)?);
            log::info!("Recommend command completed successfully");
        }
        Commands::Playlist {
            artists,
            market,
            cap,
        } => {
            log::debug!("Starting playlist command for {} artists", artists.len());
            let builder = PlaylistBuilder::with_concurrency(catalog, config.concurrency());
            let tracks = builder.starter_playlist(&artists, &market, cap).await;
            println!("{}", serde_json::to_string_pretty(&tracks)?);
            log::info!("Playlist command completed successfully");
        }
        Commands::Config(_) => unreachable!("handled above"),
    }

    Ok(())
}
