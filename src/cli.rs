//! CLI subcommand handlers for lexbot.
//!
//! Command implementations live here so main.rs stays focused on argument
//! parsing and routing.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use crate::config::loader::{get_config_path, load_config, save_config};
use crate::config::schema::{Config, QueryMode};
use crate::fulfillment::FulfillmentHandler;
use crate::lex::event::IntentEvent;
use crate::server::run_gateway;

// ============================================================================
// Onboard
// ============================================================================

pub(crate) fn cmd_onboard() {
    let config_path = get_config_path();

    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        print!("Overwrite? [y/N] ");
        io::stdout().flush().ok();
        let mut input = String::new();
        io::stdin().read_line(&mut input).ok();
        if !input.trim().eq_ignore_ascii_case("y") {
            return;
        }
    }

    let config = Config::default();
    save_config(&config, None);
    println!("  Created config at {}", config_path.display());

    println!("\n{} lexbot is ready!", crate::LOGO);
    println!("\nNext steps:");
    println!("  1. Set region, endpoints, and apiKey in ~/.lexbot/config.json");
    println!("  2. Smoke-test an event: lexbot handle event.json");
    println!("  3. Start the webhook: lexbot gateway");
}

// ============================================================================
// Handle (one-shot event)
// ============================================================================

pub(crate) fn cmd_handle(event: Option<String>) {
    let raw = match read_event_json(event.as_deref()) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Failed to read event: {}", e);
            std::process::exit(1);
        }
    };

    let event: IntentEvent = match serde_json::from_str(&raw) {
        Ok(event) => event,
        Err(e) => {
            eprintln!("Invalid intent event: {}", e);
            std::process::exit(1);
        }
    };

    let config = load_config(None);
    let handler = match FulfillmentHandler::from_config(&config) {
        Ok(handler) => handler,
        Err(e) => {
            eprintln!("Failed to build handler: {:#}", e);
            std::process::exit(1);
        }
    };

    let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    match runtime.block_on(handler.handle(&event)) {
        Ok(envelope) => match serde_json::to_string_pretty(&envelope) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize envelope: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Fulfillment failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Read the event document from a file path, or stdin when the path is
/// omitted or `-`.
pub(crate) fn read_event_json(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(p) if p != "-" => fs::read_to_string(Path::new(p)),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

// ============================================================================
// Gateway
// ============================================================================

pub(crate) fn cmd_gateway(port: u16, verbose: bool) {
    if verbose {
        eprintln!("Verbose mode enabled");
    }

    let mut config = load_config(None);
    config.gateway.port = port;

    println!(
        "{} Starting lexbot gateway on port {}...",
        crate::LOGO,
        port
    );

    let handler = match FulfillmentHandler::from_config(&config) {
        Ok(handler) => Arc::new(handler),
        Err(e) => {
            eprintln!("Failed to build handler: {:#}", e);
            std::process::exit(1);
        }
    };

    let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    if let Err(e) = runtime.block_on(run_gateway(&config, handler)) {
        eprintln!("Gateway error: {:#}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Status
// ============================================================================

pub(crate) fn cmd_status() {
    let config_path = get_config_path();
    let config = load_config(None);

    println!("{} lexbot Status\n", crate::LOGO);
    println!(
        "Config: {} [{}]",
        config_path.display(),
        if config_path.exists() {
            "ok"
        } else {
            "missing"
        }
    );
    println!("Region: {}", config.region);
    println!("Model: {}", config.llm.model);
    println!("History turns kept: {}", config.llm.max_history_turns);
    println!("LLM endpoint: {}", config.llm_endpoint());
    println!("Retrieval endpoint: {}", config.retrieval_endpoint());
    println!("Retrieval index: {}", config.retrieval.index_id);
    println!(
        "Query mode: {}",
        match config.retrieval.query_mode {
            QueryMode::Literal => "literal",
            QueryMode::Transcript => "transcript",
        }
    );
    println!(
        "API key: {}",
        if config.llm.api_key.is_empty() {
            "not set"
        } else {
            "configured"
        }
    );
    println!("Gateway: {}:{}", config.gateway.host, config.gateway.port);
    println!("Timezone: {}", config.timezone);
}
