use anyhow::Result;
use cinematch_engine::Config;
use clap::Parser;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "cinematch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the catalog and matrices (default: ~/.local/share/cinematch)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Start the HTTP recommendation service
    ///
    /// Downloads any missing similarity matrices, loads the catalog and all
    /// five models, then serves:
    ///
    /// - GET  /           search page
    /// - POST /recommend  {"movie": "<title>"} -> up to five recommendations
    /// - GET  /health     catalog size, loaded models, cache counters
    ///
    /// Results and poster lookups are cached for the life of the process.
    /// Press Ctrl-C to stop; cache statistics are logged on the way out.
    Serve {
        /// Listen address (default: bind_addr from config, 127.0.0.1:5000)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Recommend titles similar to TITLE
    Recommend {
        /// Movie title (case-insensitive, exact match)
        title: String,

        /// Show each model's ranked list and the vote tally
        #[arg(long)]
        explain: bool,
    },
    /// Download missing similarity matrices
    Bootstrap,
    /// Show data directory, artifact and catalog status
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file if it does not exist
    Init,
}

fn load_config(data_dir: Option<PathBuf>) -> Result<Config> {
    match data_dir {
        Some(dir) => Config::load_with_data_dir(dir),
        None => Config::load(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => {
            commands::run_serve(load_config(cli.data_dir)?, bind).await?;
        }
        Commands::Recommend { title, explain } => {
            commands::run_recommend(load_config(cli.data_dir)?, &title, explain).await?;
        }
        Commands::Bootstrap => {
            commands::run_bootstrap(load_config(cli.data_dir)?).await?;
        }
        Commands::Status => {
            commands::show_status(&load_config(cli.data_dir)?)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&load_config(cli.data_dir)?)?,
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}
