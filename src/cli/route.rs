//! Route command handler
//!
//! Runs one navigation session from the terminal: set the origin, pick a
//! destination, plan the route and print its summary.

use crate::cli::{establish_origin, init_tracing, navigator, print_json, tolerate_lookup};
use crate::error::Result;
use crate::geo::Position;
use crate::nav::Selection;
use clap::Args;

/// Route command arguments
#[derive(Args)]
pub struct RouteArgs {
    /// Destination as "lon,lat"
    #[arg(long, allow_hyphen_values = true, conflicts_with = "search")]
    pub to: Option<Position>,

    /// Destination found by place search
    #[arg(long, required_unless_present = "to")]
    pub search: Option<String>,

    /// Which search candidate to use
    #[arg(long, default_value = "0")]
    pub pick: u32,

    /// Origin as "lon,lat" (default: location sensor)
    #[arg(long, allow_hyphen_values = true)]
    pub from: Option<Position>,

    /// Print the full view state as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the route command
pub async fn run(args: RouteArgs) -> Result<()> {
    init_tracing("warn");

    let navigator = navigator()?;
    establish_origin(&navigator, args.from).await?;

    let destination = match (args.to, &args.search) {
        (Some(position), _) => {
            let result = navigator.select(Selection::point(position)).await;
            tolerate_lookup(&navigator, result).await?
        }
        (None, Some(query)) => {
            navigator.search(query).await?;
            navigator
                .select(Selection::Marker {
                    marker_id: args.pick,
                })
                .await?
        }
        (None, None) => navigator.view().await,
    };

    let view = navigator.start_navigation().await?;

    if args.json {
        return print_json(&view);
    }

    if let Some(marker) = destination.destination {
        println!("To: {} ({})", marker.name, marker.position.to_lon_lat());
    }
    println!("{}", view.status_text.title);
    println!("{}", view.status_text.subtitle);
    Ok(())
}
