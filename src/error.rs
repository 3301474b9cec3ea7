use std::time::Duration;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `dbot`.
///
/// Collaborator failures are raised as one of these variants and carried
/// inside `anyhow::Error`; callers that need to branch on the kind (e.g. a
/// timeout versus an API rejection) downcast to the specific type.
#[derive(Debug, Error)]
pub enum DbotError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Cloud control plane ─────────────────────────────────────────────
    #[error("cloud: {0}")]
    Cloud(#[from] CloudError),

    // ── Completion provider ─────────────────────────────────────────────
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    // ── Transport / Channel ─────────────────────────────────────────────
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Cloud errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CloudError {
    #[error("{action} rejected ({code}): {message}")]
    Api {
        action: String,
        code: String,
        message: String,
    },

    #[error("{action} for {instance_id} timed out after {elapsed:?}")]
    Timeout {
        action: String,
        instance_id: String,
        elapsed: Duration,
    },

    #[error("credentials: {0}")]
    Credentials(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

// ─── LLM / Provider errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} API error ({status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("provider {provider} timed out after {secs}s")]
    Timeout { provider: String, secs: u64 },

    #[error("provider {provider} returned no completion")]
    EmptyResponse { provider: String },

    #[error("provider {provider} rejected the API key")]
    Auth { provider: String },
}

// ─── Transport errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("channel {channel} connection failed: {message}")]
    Connection { channel: String, message: String },

    #[error("channel {channel} send failed: {message}")]
    Send { channel: String, message: String },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, DbotError>;
