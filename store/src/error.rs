//! Error types for store access, composer validation, and configuration.
//!
//! ERROR HANDLING
//! ==============
//! Transport errors carry strings rather than the transport's own error type
//! so the browser socket, the native socket, and the REST client all report
//! through the same [`StoreError`].

/// Errors produced by [`crate::MessageStore`] implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response (network, DNS, CORS, ...).
    #[error("store request failed: {0}")]
    Request(String),

    /// The store answered with a non-success HTTP status.
    #[error("store rejected request: status {status}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded into messages.
    #[error("store response parse failed: {0}")]
    Parse(String),

    /// An insert succeeded at the HTTP level but returned no row.
    #[error("insert returned no row")]
    EmptyInsert,

    /// No realtime transport is configured for this store.
    #[error("realtime subscriptions are unavailable")]
    RealtimeUnavailable,

    /// The realtime socket could not be opened or the channel join failed.
    #[error("realtime connection failed: {0}")]
    Realtime(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Composer input rejected before any store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("message content is empty")]
    EmptyContent,
}

/// Errors returned by [`crate::ChatController::post_message`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The panel state was disposed while the call was pending.
    #[error("chat panel is no longer mounted")]
    Detached,
}

/// Errors produced while reading configuration keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required key is absent or blank.
    #[error("missing configuration: {0} not set")]
    Missing(&'static str),

    /// A key is present but its value is unusable.
    #[error("invalid {var}='{value}': {reason}")]
    Invalid { var: &'static str, value: String, reason: String },
}
