use thiserror::Error;

/// Why a call to the relay did not produce a completion.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay could not be reached or the body could not be read.
    #[error("Failed to reach the chat relay: {0}")]
    Transport(#[from] reqwest::Error),

    /// The relay answered with an error status.
    #[error("Chat relay returned {status}: {message}")]
    Relay {
        /// HTTP status of the relay response.
        status: u16,
        /// The `error` field of the relay response, when present.
        message: String,
    },

    /// The relay answered with a success status but the body was not a completion object.
    #[error("Chat relay returned an unexpected body: {0}")]
    InvalidResponse(String),
}
