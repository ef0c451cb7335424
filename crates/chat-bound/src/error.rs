//! Error type shared by the client, the history bounder, and the stores.

use thiserror::Error;

/// Everything that can go wrong while running a chat turn.
///
/// None of these are retried: a failure ends the current turn and leaves the
/// thread's stored history exactly as it was before the turn started.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status, or with an error object
    /// in a 200 body (reported as status 200).
    #[error("chat API HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The API response was not valid chat-completion JSON.
    #[error("failed to parse response: {0}")]
    Decode(String),

    /// The API returned no text for a completion.
    #[error("empty LLM response")]
    EmptyCompletion,

    /// The incoming user text was empty or whitespace only.
    #[error("incoming message is empty")]
    EmptyInput,

    /// A turn with an unexpected role was handed to the bounder.
    #[error("invalid turn: {0}")]
    InvalidTurn(String),

    /// A configuration value is out of range or missing.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A thread id that cannot be used as a storage key.
    #[error("invalid thread id '{0}'")]
    InvalidThreadId(String),

    /// The thread store refused or failed a load/commit.
    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
