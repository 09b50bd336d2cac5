//! Search command handler
//!
//! Lists the candidates a place search puts on the map.

use crate::cli::{init_tracing, navigator, print_json};
use crate::error::Result;
use clap::Args;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Keywords, e.g. "library"
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Print the candidates as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    init_tracing("warn");

    let navigator = navigator()?;
    let view = navigator.search(&args.query.join(" ")).await?;

    if args.json {
        return print_json(&view.markers);
    }

    for marker in &view.markers {
        println!(
            "[{}] {} ({})",
            marker.id,
            marker.name,
            marker.position.to_lon_lat()
        );
    }
    Ok(())
}
