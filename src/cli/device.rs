//! Device command handler

use crate::cli::{establish_origin, init_tracing, navigator, print_json};
use crate::error::Result;
use crate::format::format_distance;
use crate::geo::Position;
use clap::Args;

/// Device command arguments
#[derive(Args)]
pub struct DeviceArgs {
    /// Your position as "lon,lat" (default: location sensor)
    #[arg(long, allow_hyphen_values = true)]
    pub from: Option<Position>,

    /// Print the full view state as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the device command
pub async fn run(args: DeviceArgs) -> Result<()> {
    init_tracing("warn");

    let navigator = navigator()?;
    establish_origin(&navigator, args.from).await?;
    let view = navigator.locate_device().await?;

    if args.json {
        return print_json(&view);
    }

    if let Some(position) = view.device_position {
        println!("Guide stick at {}", position.to_lon_lat());
    }
    if let Some(meters) = navigator.device_distance_meters().await {
        println!("{} away", format_distance(meters));
    }
    Ok(())
}
