//! Representative votes.

use crate::wire;
use crate::{Account, Block, BlockHash, BlockType, CoreError, Signature};
use blake2::{Blake2b, Digest};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::sync::Arc;

/// A signed statement by a representative that one or more blocks should
/// be confirmed. The sequence increases monotonically per account so a
/// newer vote supersedes an older one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub account: Account,
    pub signature: Signature,
    pub sequence: u64,
    pub payload: VotePayload,
}

/// What a vote points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VotePayload {
    /// Votes by hash; the carrying header nibble is [`BlockType::NotABlock`].
    Hashes(Vec<BlockHash>),
    /// A vote carrying the full block being confirmed.
    Block(Arc<Block>),
}

impl Vote {
    /// The nibble a carrying header must advertise for this payload.
    pub fn payload_block_type(&self) -> BlockType {
        match &self.payload {
            VotePayload::Hashes(_) => BlockType::NotABlock,
            VotePayload::Block(block) => block.block_type(),
        }
    }

    /// Hashes of every block this vote covers.
    pub fn block_hashes(&self) -> Vec<BlockHash> {
        match &self.payload {
            VotePayload::Hashes(hashes) => hashes.clone(),
            VotePayload::Block(block) => vec![block.hash()],
        }
    }

    /// Blake2b-256 over the covered block hashes and the sequence.
    pub fn hash(&self) -> BlockHash {
        let mut hasher = Blake2b::<typenum::U32>::new();
        for hash in self.block_hashes() {
            hasher.update(hash.as_bytes());
        }
        hasher.update(self.sequence.to_le_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        BlockHash(out)
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        buf.put_slice(self.account.as_bytes());
        buf.put_slice(self.signature.as_bytes());
        buf.put_u64_le(self.sequence);
        match &self.payload {
            VotePayload::Hashes(hashes) => {
                for hash in hashes {
                    buf.put_slice(hash.as_bytes());
                }
            }
            VotePayload::Block(block) => block.serialize(buf),
        }
    }

    /// Decode a vote whose payload shape is named by `block_type`.
    ///
    /// A hash-list payload runs to the end of the stream: the datagram
    /// frames it, so the list must be non-empty and a whole number of
    /// 32-byte entries.
    pub fn deserialize(block_type: BlockType, bytes: &mut Bytes) -> Result<Self, CoreError> {
        let account = wire::read_account(bytes, "vote account")?;
        let signature = wire::read_signature(bytes, "vote signature")?;
        let sequence = wire::read_u64_le(bytes, "vote sequence")?;
        let payload = match block_type {
            BlockType::NotABlock => {
                let remaining = bytes.remaining();
                if remaining == 0 {
                    return Err(CoreError::EmptyVoteHashes);
                }
                if remaining % 32 != 0 {
                    return Err(CoreError::RaggedVoteHashes(remaining % 32));
                }
                let mut hashes = Vec::with_capacity(remaining / 32);
                while bytes.has_remaining() {
                    hashes.push(wire::read_hash(bytes, "vote hash")?);
                }
                VotePayload::Hashes(hashes)
            }
            other => VotePayload::Block(Arc::new(Block::deserialize(other, bytes)?)),
        };
        Ok(Self {
            account,
            signature,
            sequence,
            payload,
        })
    }
}
