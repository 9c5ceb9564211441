//! Work-proof gating.
//!
//! Every published block carries a small proof-of-work token over its
//! root. The metric is the little-endian reading of an 8-byte blake2b
//! digest of (work nonce, root); a block is publishable when the metric
//! clears the network's floor.

use crate::{Block, BlockHash};
use blake2::{Blake2b, Digest};

/// Per-network work difficulty floors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkThresholds {
    /// Minimum metric for blocks entering the network.
    pub publish: u64,
}

impl WorkThresholds {
    pub const fn new(publish: u64) -> Self {
        Self { publish }
    }
}

/// Compute the work metric for a root and nonce.
pub fn work_value(root: &BlockHash, work: u64) -> u64 {
    let mut hasher = Blake2b::<typenum::U8>::new();
    hasher.update(work.to_le_bytes());
    hasher.update(root.as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&hasher.finalize());
    u64::from_le_bytes(out)
}

/// Capability interface the datagram parser uses to rate-gate blocks.
///
/// Hosts may substitute an implementation that defers to a thread pool
/// or a cache of recently verified roots.
pub trait WorkVerifier {
    /// Whether the block's work token clears the publish floor.
    fn sufficient(&self, block: &Block) -> bool;
}

/// Stock verifier checking inline against fixed thresholds.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdWork {
    thresholds: WorkThresholds,
}

impl ThresholdWork {
    pub fn new(thresholds: WorkThresholds) -> Self {
        Self { thresholds }
    }
}

impl WorkVerifier for ThresholdWork {
    fn sufficient(&self, block: &Block) -> bool {
        work_value(&block.root(), block.work()) >= self.thresholds.publish
    }
}
