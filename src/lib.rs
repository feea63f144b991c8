//! lexbot library: exposes internal modules for integration tests.

pub mod agent;
pub mod config;
pub mod errors;
pub mod fulfillment;
pub mod lex;
pub mod prompt;
pub mod providers;
pub mod retrieval;
pub mod server;
