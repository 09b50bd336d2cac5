//! guide-nav CLI entry point
//!
//! Navigation core for a map client - CLI + web app

use guide_nav::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
