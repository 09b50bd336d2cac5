//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "amap.key")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            show_all_config(&config);
        }

        // Key only: show that value
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Unknown config key: {}", key);
                eprintln!("\nAvailable keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                std::process::exit(1);
            }
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            eprintln!("Error: Must specify a key to set a value");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[amap]");
    if config.amap.key.is_empty() {
        println!("key = \"\" # not configured");
    } else {
        println!("key = \"***\" # configured");
    }
    println!("base_url = \"{}\"", config.amap.base_url);
    println!();

    println!("[device]");
    println!("feed_url = \"{}\"", config.device.feed_url);
    println!("timeout_secs = {}", config.device.timeout_secs);
    println!();

    println!("[sensor]");
    println!("source = \"{}\"", config.sensor.source);
    if let Some(position) = &config.sensor.fixed_position {
        println!("fixed_position = \"{}\"", position);
    }
    println!("accuracy = \"{}\"", config.sensor.accuracy);
    println!();

    println!("[map]");
    println!("scale = {}", config.map.scale);
    println!("route_color = \"{}\"", config.map.route_color);
    println!("route_width = {}", config.map.route_width);
    println!("route_opacity = {}", config.map.route_opacity);
    println!();

    println!("[navigation]");
    if let Some(destination) = &config.navigation.default_destination {
        println!("default_destination = \"{}\"", destination);
    }
    if let Some(name) = &config.navigation.default_destination_name {
        println!("default_destination_name = \"{}\"", name);
    }
    println!();

    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
}
