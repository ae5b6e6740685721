//! ripple-nav CLI entry point
//!
//! Ring/spoke navigation route generator - CLI + web API

use ripple_nav::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
