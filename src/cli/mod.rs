//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod device;
pub mod locate;
pub mod route;
pub mod search;
pub mod serve;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::Position;
use crate::nav::{AmapServices, Navigator};
use crate::view::ViewState;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Navigation core for a map client paired with a guide stick
#[derive(Parser)]
#[command(name = "guide-nav")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Locate yourself and describe the place
    Locate(locate::LocateArgs),

    /// Search places by keywords
    Search(search::SearchArgs),

    /// Plan a driving route to a destination
    Route(route::RouteArgs),

    /// Locate the guide stick
    Device(device::DeviceArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Locate(args) => locate::run(args).await,
        Commands::Search(args) => search::run(args).await,
        Commands::Route(args) => route::run(args).await,
        Commands::Device(args) => device::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}

/// Install the log subscriber; `RUST_LOG` overrides `default`
pub(crate) fn init_tracing(default: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration and build an AMap-backed navigator
pub(crate) fn navigator() -> Result<Navigator<AmapServices>> {
    let config = Config::load()?;
    let services = AmapServices::from_config(&config)?;
    Navigator::from_config(&config, services)
}

/// Set the origin from `--from`, or from the location sensor
pub(crate) async fn establish_origin(
    navigator: &Navigator<AmapServices>,
    from: Option<Position>,
) -> Result<ViewState> {
    let result = match from {
        Some(position) => navigator.set_user_position(position).await,
        None => navigator.locate_user().await,
    };
    tolerate_lookup(navigator, result).await
}

/// Keep going when only a place lookup failed; the position has committed
pub(crate) async fn tolerate_lookup(
    navigator: &Navigator<AmapServices>,
    result: Result<ViewState>,
) -> Result<ViewState> {
    match result {
        Err(Error::Geocode(reason)) => {
            warn!(%reason, "Place lookup failed");
            Ok(navigator.view().await)
        }
        other => other,
    }
}

/// Print a value as pretty JSON
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
