//! Error types for Reeldeck core operations.

use thiserror::Error;

use crate::media::MediaKind;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Reeldeck core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No credential is stored; the user has not signed in to the
    /// tracking service.
    #[error("Not authenticated with the tracking service")]
    NotAuthenticated,

    /// The stored credential was expired and refreshing it failed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The tracking service answered with a non-success status code.
    #[error("HTTP {status} from {url}")]
    Http {
        /// Status code returned by the service.
        status: u16,
        /// Request URL.
        url: String,
    },

    /// The HTTP client failed before a response was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A media id could not be formatted for the remote wire protocol.
    #[error("Invalid remote id {id:?} for {kind}")]
    InvalidRemoteId {
        /// The offending catalog id.
        id: String,
        /// Kind the id was supposed to identify.
        kind: MediaKind,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
