//! Locate command handler

use crate::cli::{establish_origin, init_tracing, navigator, print_json};
use crate::error::Result;
use clap::Args;

/// Locate command arguments
#[derive(Args)]
pub struct LocateArgs {
    /// Print the full view state as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the locate command
pub async fn run(args: LocateArgs) -> Result<()> {
    init_tracing("warn");

    let navigator = navigator()?;
    let view = establish_origin(&navigator, None).await?;

    if args.json {
        return print_json(&view);
    }

    if let Some(position) = view.user_position {
        println!("{}", position.to_lon_lat());
    }
    println!("{}", view.status_text.title);
    if !view.status_text.subtitle.is_empty() {
        println!("{}", view.status_text.subtitle);
    }
    Ok(())
}
