//! Deduplicating registries for decoded blocks and votes.
//!
//! A uniquer is a content-addressed intern table: content hash to a weak
//! handle on the live decoded value. Parsers share one instance, so a
//! block or vote flooding in over many datagrams is decoded once and the
//! interned copy handed out everywhere else. Entries hold no ownership;
//! once every message referencing a value is gone, the table entry
//! expires and is swept.

use lattice_core::{Block, BlockHash, Vote};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::trace;

/// Dead weak handles are swept after this many inserts.
const SWEEP_INTERVAL: usize = 128;

/// Hash identity used to intern decoded payloads.
pub trait ContentAddressed {
    /// 32-byte content hash.
    fn content_hash(&self) -> BlockHash;
}

impl ContentAddressed for Block {
    fn content_hash(&self) -> BlockHash {
        self.hash()
    }
}

impl ContentAddressed for Vote {
    fn content_hash(&self) -> BlockHash {
        self.hash()
    }
}

struct Inner<T> {
    entries: HashMap<BlockHash, Weak<T>>,
    inserts_since_sweep: usize,
}

/// Weak-value intern table keyed by content hash.
///
/// Internally synchronized; may be shared across parsers and threads.
pub struct Uniquer<T> {
    inner: Mutex<Inner<T>>,
}

/// Interning cache for decoded blocks.
pub type BlockUniquer = Uniquer<Block>;

/// Interning cache for decoded votes.
pub type VoteUniquer = Uniquer<Vote>;

impl<T: ContentAddressed> Uniquer<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                inserts_since_sweep: 0,
            }),
        }
    }

    /// Intern a decoded value.
    ///
    /// When a live entry already exists for the candidate's content
    /// hash, the candidate is dropped and the existing copy returned;
    /// otherwise a weak handle to the candidate is recorded and the
    /// candidate itself comes back.
    pub fn unique(&self, candidate: Arc<T>) -> Arc<T> {
        let key = candidate.content_hash();
        let mut inner = self.inner.lock();
        if let Some(existing) = inner.entries.get(&key).and_then(Weak::upgrade) {
            return existing;
        }
        inner.entries.insert(key, Arc::downgrade(&candidate));
        inner.inserts_since_sweep += 1;
        if inner.inserts_since_sweep >= SWEEP_INTERVAL {
            let before = inner.entries.len();
            inner.entries.retain(|_, entry| entry.strong_count() > 0);
            inner.inserts_since_sweep = 0;
            trace!(
                swept = before - inner.entries.len(),
                live = inner.entries.len(),
                "Swept uniquer"
            );
        }
        candidate
    }

    /// Drop every expired entry now.
    pub fn cleanup(&self) {
        let mut inner = self.inner.lock();
        inner.entries.retain(|_, entry| entry.strong_count() > 0);
        inner.inserts_since_sweep = 0;
    }

    /// Table entries, live or awaiting sweep.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ContentAddressed> Default for Uniquer<T> {
    fn default() -> Self {
        Self::new()
    }
}
