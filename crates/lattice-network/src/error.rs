//! Network protocol error types.

use thiserror::Error;

/// Errors from the wire codecs and endpoint utilities.
///
/// The datagram parser absorbs these into [`ParseStatus`]
/// (crate::ParseStatus) values; they surface directly only from the
/// standalone codec entry points.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Input ended before a field.
    #[error("Truncated {0}")]
    Truncated(&'static str),

    /// Message-type code outside the frozen table, or one that names no
    /// decodable payload.
    #[error("Unknown message type: {0}")]
    UnknownMessageType(u8),

    /// The header's block-type nibble is not a code this payload accepts.
    #[error("Invalid block type nibble: {0}")]
    InvalidBlockType(u8),

    /// bulk_pull_account flag byte outside the known table.
    #[error("Unknown pull-account flags: {0}")]
    UnknownPullAccountFlags(u8),

    /// bulk_pull_blocks mode byte outside the known table.
    #[error("Unknown pull-blocks mode: {0}")]
    UnknownPullBlocksMode(u8),

    /// node_id_handshake with neither query nor response flagged.
    #[error("Handshake carries neither query nor response")]
    EmptyHandshake,

    /// Primitive codec failure inside a carried block or vote.
    #[error(transparent)]
    Core(#[from] lattice_core::CoreError),

    /// Endpoint text failed to parse.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Port text failed to parse.
    #[error("Invalid port: {0}")]
    InvalidPort(String),
}

/// Result type for wire operations.
pub type NetworkResult<T> = Result<T, NetworkError>;
