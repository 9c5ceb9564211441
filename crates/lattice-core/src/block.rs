//! Ledger block variants and their wire codecs.
//!
//! Block bytes travel untagged inside `publish`, `confirm_req` and
//! `confirm_ack` messages; the carrying header names the variant in its
//! block-type nibble. Work and signature ride along on the wire but are
//! excluded from the content hash.

use crate::wire;
use crate::{Account, Amount, BlockHash, CoreError, Signature};
use blake2::{Blake2b, Digest};
use bytes::{BufMut, Bytes, BytesMut};

/// Block type codes.
///
/// Serialized to the network inside the header's block-type nibble;
/// existing values must never change as variants are added or retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockType {
    Invalid = 0,
    /// Placeholder marking "no block follows" (vote-by-hash).
    NotABlock = 1,
    Send = 2,
    Receive = 3,
    Open = 4,
    Change = 5,
    State = 6,
}

impl BlockType {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for BlockType {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BlockType::Invalid),
            1 => Ok(BlockType::NotABlock),
            2 => Ok(BlockType::Send),
            3 => Ok(BlockType::Receive),
            4 => Ok(BlockType::Open),
            5 => Ok(BlockType::Change),
            6 => Ok(BlockType::State),
            _ => Err(CoreError::UnknownBlockType(value)),
        }
    }
}

/// Spend from an account chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendBlock {
    pub previous: BlockHash,
    pub destination: Account,
    /// Balance remaining on the chain after the send.
    pub balance: Amount,
    pub signature: Signature,
    pub work: u64,
}

/// Pocket a pending send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveBlock {
    pub previous: BlockHash,
    /// Hash of the send being pocketed.
    pub source: BlockHash,
    pub signature: Signature,
    pub work: u64,
}

/// First block on an account chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenBlock {
    pub source: BlockHash,
    pub representative: Account,
    pub account: Account,
    pub signature: Signature,
    pub work: u64,
}

/// Rotate an account's representative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBlock {
    pub previous: BlockHash,
    pub representative: Account,
    pub signature: Signature,
    pub work: u64,
}

/// Unified block carrying the full account state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateBlock {
    pub account: Account,
    pub previous: BlockHash,
    pub representative: Account,
    pub balance: Amount,
    /// Overloaded: send destination, receive source, or zero.
    pub link: BlockHash,
    pub signature: Signature,
    pub work: u64,
}

/// An atomic ledger operation, addressed by its 32-byte content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Send(SendBlock),
    Receive(ReceiveBlock),
    Open(OpenBlock),
    Change(ChangeBlock),
    State(StateBlock),
}

impl Block {
    pub fn block_type(&self) -> BlockType {
        match self {
            Block::Send(_) => BlockType::Send,
            Block::Receive(_) => BlockType::Receive,
            Block::Open(_) => BlockType::Open,
            Block::Change(_) => BlockType::Change,
            Block::State(_) => BlockType::State,
        }
    }

    pub fn work(&self) -> u64 {
        match self {
            Block::Send(b) => b.work,
            Block::Receive(b) => b.work,
            Block::Open(b) => b.work,
            Block::Change(b) => b.work,
            Block::State(b) => b.work,
        }
    }

    pub fn signature(&self) -> &Signature {
        match self {
            Block::Send(b) => &b.signature,
            Block::Receive(b) => &b.signature,
            Block::Open(b) => &b.signature,
            Block::Change(b) => &b.signature,
            Block::State(b) => &b.signature,
        }
    }

    /// The value the work proof must cover: `previous` on an existing
    /// chain, the account itself when the chain starts here.
    pub fn root(&self) -> BlockHash {
        match self {
            Block::Send(b) => b.previous,
            Block::Receive(b) => b.previous,
            Block::Change(b) => b.previous,
            Block::Open(b) => b.account.into(),
            Block::State(b) => {
                if b.previous.is_zero() {
                    b.account.into()
                } else {
                    b.previous
                }
            }
        }
    }

    /// Blake2b-256 over the hashable fields, signature and work excluded.
    ///
    /// State blocks are domain-separated from the legacy variants by a
    /// 32-byte preamble carrying the state type code, so a state block
    /// can never collide with a legacy block over the same fields.
    pub fn hash(&self) -> BlockHash {
        let mut hasher = Blake2b::<typenum::U32>::new();
        match self {
            Block::Send(b) => {
                hasher.update(b.previous.as_bytes());
                hasher.update(b.destination.as_bytes());
                hasher.update(b.balance.to_be_bytes());
            }
            Block::Receive(b) => {
                hasher.update(b.previous.as_bytes());
                hasher.update(b.source.as_bytes());
            }
            Block::Open(b) => {
                hasher.update(b.source.as_bytes());
                hasher.update(b.representative.as_bytes());
                hasher.update(b.account.as_bytes());
            }
            Block::Change(b) => {
                hasher.update(b.previous.as_bytes());
                hasher.update(b.representative.as_bytes());
            }
            Block::State(b) => {
                let mut preamble = [0u8; 32];
                preamble[31] = BlockType::State.as_u8();
                hasher.update(preamble);
                hasher.update(b.account.as_bytes());
                hasher.update(b.previous.as_bytes());
                hasher.update(b.representative.as_bytes());
                hasher.update(b.balance.to_be_bytes());
                hasher.update(b.link.as_bytes());
            }
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        BlockHash(out)
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        match self {
            Block::Send(b) => {
                buf.put_slice(b.previous.as_bytes());
                buf.put_slice(b.destination.as_bytes());
                buf.put_slice(&b.balance.to_be_bytes());
                buf.put_slice(b.signature.as_bytes());
                buf.put_u64_le(b.work);
            }
            Block::Receive(b) => {
                buf.put_slice(b.previous.as_bytes());
                buf.put_slice(b.source.as_bytes());
                buf.put_slice(b.signature.as_bytes());
                buf.put_u64_le(b.work);
            }
            Block::Open(b) => {
                buf.put_slice(b.source.as_bytes());
                buf.put_slice(b.representative.as_bytes());
                buf.put_slice(b.account.as_bytes());
                buf.put_slice(b.signature.as_bytes());
                buf.put_u64_le(b.work);
            }
            Block::Change(b) => {
                buf.put_slice(b.previous.as_bytes());
                buf.put_slice(b.representative.as_bytes());
                buf.put_slice(b.signature.as_bytes());
                buf.put_u64_le(b.work);
            }
            Block::State(b) => {
                buf.put_slice(b.account.as_bytes());
                buf.put_slice(b.previous.as_bytes());
                buf.put_slice(b.representative.as_bytes());
                buf.put_slice(&b.balance.to_be_bytes());
                buf.put_slice(b.link.as_bytes());
                buf.put_slice(b.signature.as_bytes());
                buf.put_u64_le(b.work);
            }
        }
    }

    /// Decode one block of the given type off the stream.
    pub fn deserialize(block_type: BlockType, bytes: &mut Bytes) -> Result<Self, CoreError> {
        match block_type {
            BlockType::Send => Ok(Block::Send(SendBlock {
                previous: wire::read_hash(bytes, "send previous")?,
                destination: wire::read_account(bytes, "send destination")?,
                balance: wire::read_amount(bytes, "send balance")?,
                signature: wire::read_signature(bytes, "send signature")?,
                work: wire::read_u64_le(bytes, "send work")?,
            })),
            BlockType::Receive => Ok(Block::Receive(ReceiveBlock {
                previous: wire::read_hash(bytes, "receive previous")?,
                source: wire::read_hash(bytes, "receive source")?,
                signature: wire::read_signature(bytes, "receive signature")?,
                work: wire::read_u64_le(bytes, "receive work")?,
            })),
            BlockType::Open => Ok(Block::Open(OpenBlock {
                source: wire::read_hash(bytes, "open source")?,
                representative: wire::read_account(bytes, "open representative")?,
                account: wire::read_account(bytes, "open account")?,
                signature: wire::read_signature(bytes, "open signature")?,
                work: wire::read_u64_le(bytes, "open work")?,
            })),
            BlockType::Change => Ok(Block::Change(ChangeBlock {
                previous: wire::read_hash(bytes, "change previous")?,
                representative: wire::read_account(bytes, "change representative")?,
                signature: wire::read_signature(bytes, "change signature")?,
                work: wire::read_u64_le(bytes, "change work")?,
            })),
            BlockType::State => Ok(Block::State(StateBlock {
                account: wire::read_account(bytes, "state account")?,
                previous: wire::read_hash(bytes, "state previous")?,
                representative: wire::read_account(bytes, "state representative")?,
                balance: wire::read_amount(bytes, "state balance")?,
                link: wire::read_hash(bytes, "state link")?,
                signature: wire::read_signature(bytes, "state signature")?,
                work: wire::read_u64_le(bytes, "state work")?,
            })),
            BlockType::Invalid | BlockType::NotABlock => {
                Err(CoreError::PayloadlessBlockType(block_type))
            }
        }
    }
}
