//! Domain error types for lexbot.
//!
//! Typed errors at module boundaries replace string-encoded errors and
//! enable structured error handling via pattern matching. They are embedded
//! in `anyhow::Error` at the call seams so trait signatures stay
//! `anyhow::Result<T>` while callers can downcast:
//! `e.downcast_ref::<ProviderError>()`.

use thiserror::Error;

/// Literal prefix of a recoverable agent parse failure. The assistant path
/// treats any failure whose message starts with this prefix as a
/// best-effort answer rather than an error.
pub const UNPARSED_OUTPUT_PREFIX: &str = "Could not parse LLM output:";

/// The prefix plus the opening backtick that wraps the raw model text.
const UNPARSED_OUTPUT_STRIP: &str = "Could not parse LLM output: `";

// ---------------------------------------------------------------------------
// Provider errors
// ---------------------------------------------------------------------------

/// Errors from the hosted completion-model endpoint.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Model endpoint returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse model response JSON: {0}")]
    JsonParseError(String),

    #[error("Model response has no `completion` field")]
    MissingCompletion,
}

// ---------------------------------------------------------------------------
// Retrieval errors
// ---------------------------------------------------------------------------

/// Errors from the managed retrieval index.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Retrieval endpoint returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse retrieval response JSON: {0}")]
    JsonParseError(String),
}

// ---------------------------------------------------------------------------
// Agent errors
// ---------------------------------------------------------------------------

/// Errors from the conversational agent.
///
/// `UnparsedOutput` carries the raw model text and renders with the exact
/// message shape the assistant path's recovery contract string-matches on.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Could not parse LLM output: `{raw}`")]
    UnparsedOutput { raw: String },
}

// ---------------------------------------------------------------------------
// Fulfillment errors
// ---------------------------------------------------------------------------

/// Errors raised by the fulfillment handler itself.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    #[error("Unsupported invocation source: {0}")]
    UnsupportedInvocationSource(String),
}

/// Recover the answer text from an agent parse failure.
///
/// Returns `Some(answer)` when the message starts with
/// [`UNPARSED_OUTPUT_PREFIX`], with the prefix and the surrounding backticks
/// stripped. The strip steps are best-effort: a message carrying the prefix
/// but not the backtick wrapping is returned as-is. Returns `None` for any
/// other message, which the caller must propagate unchanged.
pub fn recover_unparsed_output(message: &str) -> Option<String> {
    if !message.starts_with(UNPARSED_OUTPUT_PREFIX) {
        return None;
    }
    let stripped = message.strip_prefix(UNPARSED_OUTPUT_STRIP).unwrap_or(message);
    let stripped = stripped.strip_suffix('`').unwrap_or(stripped);
    Some(stripped.to_string())
}
