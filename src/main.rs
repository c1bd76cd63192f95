use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tweetglobe::app::App;
use tweetglobe::config::Config;
use tweetglobe::feeds::mock::generate_mock_tweets;
use tweetglobe::logging;

#[derive(Parser)]
#[command(name = "tweetglobe")]
#[command(about = "Search geolocated tweets and explore them on a terminal globe", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/tweetglobe/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run this search as soon as the dashboard opens
    #[arg(short, long)]
    query: Option<String>,

    /// Write logs here instead of the default data directory
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace, off)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Print the records a search would produce as JSON
    Generate { query: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { force }) => return init_config(cli.config, force),
        Some(Commands::Generate { query }) => {
            let tweets = generate_mock_tweets(&query);
            println!("{}", serde_json::to_string_pretty(&tweets)?);
            return Ok(());
        }
        None => {}
    }

    let config = Config::load(cli.config.as_deref())?;

    let level = cli.log_level.as_deref().unwrap_or(&config.general.log_level);
    let level = logging::parse_level(level)?;
    let log_path = cli
        .log_file
        .clone()
        .or_else(|| config.general.log_file.clone())
        .or_else(logging::default_log_path);
    if let Some(path) = log_path {
        logging::init(&path, level)?;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting tweetglobe");

    let mut app = App::new(config);
    if let Some(query) = cli.query.as_deref() {
        app.start_search(query);
    }

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal).await;
    ratatui::restore();

    tracing::info!("shutting down");
    result
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => Config::default_path().context("could not determine config directory")?,
    };

    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::write_default(&path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
