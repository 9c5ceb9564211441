//! Primitive codec error types.

use crate::BlockType;
use thiserror::Error;

/// Errors from the block and vote codecs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Input ended before a fixed-width field.
    #[error("Truncated {0}")]
    Truncated(&'static str),

    /// Block-type code outside the frozen table.
    #[error("Unknown block type: {0}")]
    UnknownBlockType(u8),

    /// A block-type code that carries no block payload.
    #[error("Block type {0:?} has no payload")]
    PayloadlessBlockType(BlockType),

    /// Vote-by-hash with no hashes at all.
    #[error("Empty vote hash list")]
    EmptyVoteHashes,

    /// Vote hash list not a whole number of 32-byte entries.
    #[error("Ragged vote hash list: {0} leftover bytes")]
    RaggedVoteHashes(usize),

    /// Slice of the wrong length for a fixed-width type.
    #[error("Wrong length: expected {expected}, got {got}")]
    WrongLength { expected: usize, got: usize },

    /// Text that is not valid hex for a fixed-width type.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
}
