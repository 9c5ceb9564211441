//! # lattice-core
//!
//! Ledger primitives carried by the lattice wire protocol.
//!
//! This crate provides:
//! - Fixed-width byte types: block hashes, accounts, signatures, amounts
//! - The five ledger block variants and their wire codecs
//! - Representative votes
//! - The work-proof capability interface

mod block;
mod error;
mod types;
mod vote;
pub mod wire;
mod work;

pub use block::{
    Block, BlockType, ChangeBlock, OpenBlock, ReceiveBlock, SendBlock, StateBlock,
};
pub use error::CoreError;
pub use types::{Account, Amount, BlockHash, Signature};
pub use vote::{Vote, VotePayload};
pub use work::{work_value, ThresholdWork, WorkThresholds, WorkVerifier};
