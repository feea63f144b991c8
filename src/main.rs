//! lexbot - A dialog fulfillment gateway in Rust.
//!
//! Bridges Lex-style intent events to an LLM completion endpoint and a
//! document retrieval index, as a CLI one-shot or an HTTP gateway.

mod agent;
mod cli;
mod config;
mod errors;
mod fulfillment;
mod lex;
mod prompt;
mod providers;
mod retrieval;
mod server;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use clap::{Parser, Subcommand};

pub(crate) const VERSION: &str = "0.3.1";
pub(crate) const LOGO: &str = "*";

#[derive(Parser)]
#[command(name = "lexbot", about = "lexbot - Dialog Fulfillment Gateway", version = VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize lexbot configuration.
    Onboard,
    /// Handle a single intent event and print the response envelope.
    Handle {
        /// Path to the event JSON file. Reads stdin when omitted or "-".
        event: Option<String>,
    },
    /// Start the HTTP fulfillment gateway.
    Gateway {
        /// Gateway port.
        #[arg(short, long, default_value_t = 18080)]
        port: u16,
        /// Verbose logging.
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show lexbot status.
    Status,
}

fn main() {
    let cli = Cli::parse();

    // Always suppress noisy transport crates regardless of RUST_LOG setting.
    let noisy_crate_filters = ",hyper=warn,reqwest=warn";
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(_) => {
            // RUST_LOG is set, append our mandatory suppressions
            let combined = format!(
                "{}{}",
                std::env::var("RUST_LOG").unwrap_or_default(),
                noisy_crate_filters
            );
            tracing_subscriber::EnvFilter::new(combined)
        }
        Err(_) => tracing_subscriber::EnvFilter::new(format!("info{}", noisy_crate_filters)),
    };

    let fmt_layer = tracing_subscriber::fmt::layer();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .ok();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        command = %format!("{:?}", std::mem::discriminant(&cli.command)),
        "lexbot started"
    );

    match cli.command {
        Commands::Onboard => cli::cmd_onboard(),
        Commands::Handle { event } => cli::cmd_handle(event),
        Commands::Gateway { port, verbose } => cli::cmd_gateway(port, verbose),
        Commands::Status => cli::cmd_status(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_gateway_default_port() {
        let cli = Cli::try_parse_from(["lexbot", "gateway"]).unwrap();
        match cli.command {
            Commands::Gateway { port, verbose } => {
                assert_eq!(port, 18080);
                assert!(!verbose);
            }
            other => panic!(
                "unexpected parsed command: {:?}",
                std::mem::discriminant(&other)
            ),
        }
    }

    #[test]
    fn test_cli_parses_gateway_custom_port() {
        let cli =
            Cli::try_parse_from(["lexbot", "gateway", "--port", "9099", "--verbose"]).unwrap();
        match cli.command {
            Commands::Gateway { port, verbose } => {
                assert_eq!(port, 9099);
                assert!(verbose);
            }
            other => panic!(
                "unexpected parsed command: {:?}",
                std::mem::discriminant(&other)
            ),
        }
    }

    #[test]
    fn test_cli_parses_handle_with_path() {
        let cli = Cli::try_parse_from(["lexbot", "handle", "event.json"]).unwrap();
        match cli.command {
            Commands::Handle { event } => assert_eq!(event.as_deref(), Some("event.json")),
            other => panic!(
                "unexpected parsed command: {:?}",
                std::mem::discriminant(&other)
            ),
        }
    }

    #[test]
    fn test_cli_parses_handle_without_path() {
        let cli = Cli::try_parse_from(["lexbot", "handle"]).unwrap();
        match cli.command {
            Commands::Handle { event } => assert!(event.is_none()),
            other => panic!(
                "unexpected parsed command: {:?}",
                std::mem::discriminant(&other)
            ),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["lexbot"]).is_err());
    }
}
