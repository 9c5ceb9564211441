//! The 8-byte message header shared by every datagram.
//!
//! Wire layout, in order: two magic bytes (`'R'` then the network byte),
//! the version triple (max, using, min), the message type code, and a
//! 16-bit little-endian extensions word.
//!
//! The extensions word is partitioned: bits 0-7 are per-message-type
//! flag space, bits 8-11 embed a block type for the block-carrying
//! messages, bits 12-15 are reserved. Accessors below own those
//! partitioning rules; nothing else pokes at the raw word.

use crate::{Network, NetworkError, PROTOCOL_VERSION, PROTOCOL_VERSION_MIN};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use lattice_core::BlockType;

/// Message type identifiers.
///
/// Serialized to the network; existing values must never change or be
/// reused, even once a message is retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    Invalid = 0x00,
    NotAType = 0x01,
    Keepalive = 0x02,
    Publish = 0x03,
    ConfirmReq = 0x04,
    ConfirmAck = 0x05,
    BulkPull = 0x06,
    BulkPush = 0x07,
    FrontierReq = 0x08,
    /// Retired range pull; the code stays parseable forever.
    BulkPullBlocks = 0x09,
    NodeIdHandshake = 0x0a,
    BulkPullAccount = 0x0b,
}

impl TryFrom<u8> for MessageType {
    type Error = NetworkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(MessageType::Invalid),
            0x01 => Ok(MessageType::NotAType),
            0x02 => Ok(MessageType::Keepalive),
            0x03 => Ok(MessageType::Publish),
            0x04 => Ok(MessageType::ConfirmReq),
            0x05 => Ok(MessageType::ConfirmAck),
            0x06 => Ok(MessageType::BulkPull),
            0x07 => Ok(MessageType::BulkPush),
            0x08 => Ok(MessageType::FrontierReq),
            0x09 => Ok(MessageType::BulkPullBlocks),
            0x0a => Ok(MessageType::NodeIdHandshake),
            0x0b => Ok(MessageType::BulkPullAccount),
            _ => Err(NetworkError::UnknownMessageType(value)),
        }
    }
}

/// Fixed header opening every protocol message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Magic pair exactly as received; only the parser judges it.
    pub magic: [u8; 2],
    pub version_max: u8,
    pub version_using: u8,
    pub version_min: u8,
    message_type: u8,
    pub extensions: u16,
}

impl MessageHeader {
    /// Serialized size.
    pub const WIRE_SIZE: usize = 8;

    /// Extensions bits embedding the block type.
    const BLOCK_TYPE_MASK: u16 = 0x0f00;

    /// bulk_pull: an extended-parameters trailer follows the payload.
    const BULK_PULL_COUNT_PRESENT_FLAG: u16 = 1 << 0;

    /// node_id_handshake: a query cookie is present.
    const QUERY_FLAG: u16 = 1 << 0;

    /// node_id_handshake: a response pair is present.
    const RESPONSE_FLAG: u16 = 1 << 1;

    // Bits 1 and 2 of the flag space once carried `ipv4_only` and
    // `bootstrap_server`; they stay reserved-zero and are never reused
    // outside the handshake, which postdates their retirement.

    /// Fresh header for an outgoing message: local magic, build version
    /// triple, zeroed extensions.
    pub fn new(network: Network, message_type: MessageType) -> Self {
        Self {
            magic: network.magic(),
            version_max: PROTOCOL_VERSION,
            version_using: PROTOCOL_VERSION,
            version_min: PROTOCOL_VERSION_MIN,
            message_type: message_type as u8,
            extensions: 0,
        }
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.magic);
        buf.put_u8(self.version_max);
        buf.put_u8(self.version_using);
        buf.put_u8(self.version_min);
        buf.put_u8(self.message_type);
        buf.put_u16_le(self.extensions);
    }

    /// Read a header off the front of a datagram.
    ///
    /// Fails only on short input. Magic, network, version and type
    /// policy belong to the parser, so a header for an unknown type or
    /// foreign network still decodes.
    pub fn deserialize(bytes: &mut Bytes) -> Result<Self, NetworkError> {
        if bytes.remaining() < Self::WIRE_SIZE {
            return Err(NetworkError::Truncated("message header"));
        }
        let mut magic = [0u8; 2];
        bytes.copy_to_slice(&mut magic);
        Ok(Self {
            magic,
            version_max: bytes.get_u8(),
            version_using: bytes.get_u8(),
            version_min: bytes.get_u8(),
            message_type: bytes.get_u8(),
            extensions: bytes.get_u16_le(),
        })
    }

    /// The typed message code, when the raw byte is in the table.
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::try_from(self.message_type).ok()
    }

    /// The type byte exactly as received.
    pub fn raw_message_type(&self) -> u8 {
        self.message_type
    }

    /// The embedded block-type nibble, when it names a known code.
    pub fn block_type(&self) -> Option<BlockType> {
        BlockType::try_from(self.raw_block_type()).ok()
    }

    /// The nibble exactly as received.
    pub fn raw_block_type(&self) -> u8 {
        ((self.extensions & Self::BLOCK_TYPE_MASK) >> 8) as u8
    }

    /// Write the block-type nibble, leaving every other bit intact.
    pub fn set_block_type(&mut self, block_type: BlockType) {
        self.extensions &= !Self::BLOCK_TYPE_MASK;
        self.extensions |= (block_type.as_u8() as u16) << 8;
    }

    pub fn bulk_pull_is_count_present(&self) -> bool {
        self.extensions & Self::BULK_PULL_COUNT_PRESENT_FLAG != 0
    }

    pub fn set_bulk_pull_count_present(&mut self, present: bool) {
        self.set_flag(Self::BULK_PULL_COUNT_PRESENT_FLAG, present);
    }

    pub fn is_query_flag(&self) -> bool {
        self.extensions & Self::QUERY_FLAG != 0
    }

    pub fn set_query_flag(&mut self, value: bool) {
        self.set_flag(Self::QUERY_FLAG, value);
    }

    pub fn is_response_flag(&self) -> bool {
        self.extensions & Self::RESPONSE_FLAG != 0
    }

    pub fn set_response_flag(&mut self, value: bool) {
        self.set_flag(Self::RESPONSE_FLAG, value);
    }

    fn set_flag(&mut self, flag: u16, value: bool) {
        if value {
            self.extensions |= flag;
        } else {
            self.extensions &= !flag;
        }
    }

    /// Whether the magic pair is well formed for any known network.
    pub fn valid_magic(&self) -> bool {
        self.magic[0] == b'R' && (b'A'..=b'C').contains(&self.magic[1])
    }

    /// The network the sender claims, when the magic is well formed.
    pub fn network(&self) -> Option<Network> {
        if self.magic[0] == b'R' {
            Network::from_magic(self.magic[1])
        } else {
            None
        }
    }

    pub fn valid_network(&self, local: Network) -> bool {
        self.network() == Some(local)
    }
}
