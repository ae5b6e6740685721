//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod generate;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Ring/spoke navigation route generator
#[derive(Parser)]
#[command(name = "ripple-nav")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a route and write its artifacts
    Generate(generate::GenerateArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Initialize tracing, honouring RUST_LOG when set
pub fn init_logging(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate::run(args),
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "ripple-nav",
            "generate",
            "--lat",
            "35.6",
            "--lon",
            "-139.5",
            "--bearings",
            "0,120,240",
            "--kml",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.lon, -139.5);
                assert_eq!(args.bearings, vec![0.0, 120.0, 240.0]);
                assert!(args.kml);
                assert!(!args.plot);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["ripple-nav", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.port, Some(9000)),
            _ => panic!("expected serve"),
        }
    }
}
