//! Protocol message variants.
//!
//! Every message owns its header by value. Deserializers take a header
//! already peeled off the datagram plus the remaining payload bytes and
//! are total: adversarial input comes back as [`NetworkError`], never a
//! panic. Serializers write the header and payload into the caller's
//! buffer; the transport owns the bytes from there.

use crate::uniquer::{BlockUniquer, VoteUniquer};
use crate::{Endpoint, MessageHeader, MessageType, MessageVisitor, Network, NetworkError};
use bytes::{BufMut, Bytes, BytesMut};
use lattice_core::wire;
use lattice_core::{Account, Amount, Block, BlockHash, Signature, Vote};
use std::net::{Ipv6Addr, SocketAddrV6};
use std::sync::Arc;

const ZERO_ENDPOINT: Endpoint = SocketAddrV6::new(Ipv6Addr::UNSPECIFIED, 0, 0, 0);

/// Node-discovery keepalive carrying eight peer endpoint slots.
///
/// Unused slots are all-zero address and port; recipients filter every
/// slot through [`reserved_address`](crate::reserved_address) rather
/// than trusting the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keepalive {
    pub header: MessageHeader,
    pub peers: [Endpoint; 8],
}

impl Keepalive {
    /// Payload size on the wire: eight (address, port) slots.
    pub const WIRE_SIZE: usize = 8 * 18;

    pub fn new(network: Network) -> Self {
        Self {
            header: MessageHeader::new(network, MessageType::Keepalive),
            peers: [ZERO_ENDPOINT; 8],
        }
    }

    pub fn deserialize(header: MessageHeader, bytes: &mut Bytes) -> Result<Self, NetworkError> {
        let mut peers = [ZERO_ENDPOINT; 8];
        for peer in peers.iter_mut() {
            let octets: [u8; 16] = wire::read_array(bytes, "keepalive address")?;
            let port = wire::read_u16_le(bytes, "keepalive port")?;
            *peer = SocketAddrV6::new(Ipv6Addr::from(octets), port, 0, 0);
        }
        Ok(Self { header, peers })
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        self.header.serialize(buf);
        for peer in &self.peers {
            buf.put_slice(&peer.ip().octets());
            buf.put_u16_le(peer.port());
        }
    }
}

/// Block publication.
#[derive(Debug, Clone)]
pub struct Publish {
    pub header: MessageHeader,
    pub block: Arc<Block>,
}

impl Publish {
    pub fn new(network: Network, block: Arc<Block>) -> Self {
        let mut header = MessageHeader::new(network, MessageType::Publish);
        header.set_block_type(block.block_type());
        Self { header, block }
    }

    pub fn deserialize(
        header: MessageHeader,
        bytes: &mut Bytes,
        uniquer: Option<&BlockUniquer>,
    ) -> Result<Self, NetworkError> {
        let block = deserialize_block(&header, bytes, uniquer)?;
        Ok(Self { header, block })
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        self.header.serialize(buf);
        self.block.serialize(buf);
    }
}

// Content equality: the same block republished through a different
// allocation is the same message.
impl PartialEq for Publish {
    fn eq(&self, other: &Self) -> bool {
        self.block.hash() == other.block.hash()
    }
}

impl Eq for Publish {}

/// Request that a peer confirm one block.
#[derive(Debug, Clone)]
pub struct ConfirmReq {
    pub header: MessageHeader,
    pub block: Arc<Block>,
}

impl ConfirmReq {
    pub fn new(network: Network, block: Arc<Block>) -> Self {
        let mut header = MessageHeader::new(network, MessageType::ConfirmReq);
        header.set_block_type(block.block_type());
        Self { header, block }
    }

    pub fn deserialize(
        header: MessageHeader,
        bytes: &mut Bytes,
        uniquer: Option<&BlockUniquer>,
    ) -> Result<Self, NetworkError> {
        let block = deserialize_block(&header, bytes, uniquer)?;
        Ok(Self { header, block })
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        self.header.serialize(buf);
        self.block.serialize(buf);
    }
}

impl PartialEq for ConfirmReq {
    fn eq(&self, other: &Self) -> bool {
        self.block.hash() == other.block.hash()
    }
}

impl Eq for ConfirmReq {}

/// Vote propagation.
#[derive(Debug, Clone)]
pub struct ConfirmAck {
    pub header: MessageHeader,
    pub vote: Arc<Vote>,
}

impl ConfirmAck {
    pub fn new(network: Network, vote: Arc<Vote>) -> Self {
        let mut header = MessageHeader::new(network, MessageType::ConfirmAck);
        header.set_block_type(vote.payload_block_type());
        Self { header, vote }
    }

    pub fn deserialize(
        header: MessageHeader,
        bytes: &mut Bytes,
        uniquer: Option<&VoteUniquer>,
    ) -> Result<Self, NetworkError> {
        let block_type = header
            .block_type()
            .ok_or_else(|| NetworkError::InvalidBlockType(header.raw_block_type()))?;
        let vote = Arc::new(Vote::deserialize(block_type, bytes)?);
        let vote = match uniquer {
            Some(uniquer) => uniquer.unique(vote),
            None => vote,
        };
        Ok(Self { header, vote })
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        self.header.serialize(buf);
        self.vote.serialize(buf);
    }
}

impl PartialEq for ConfirmAck {
    fn eq(&self, other: &Self) -> bool {
        self.vote.hash() == other.vote.hash()
    }
}

impl Eq for ConfirmAck {}

/// Request for the frontier of every account past a start point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierReq {
    pub header: MessageHeader,
    pub start: Account,
    /// Maximum frontier age in seconds; [`FrontierReq::ANY`] disables
    /// the filter.
    pub age: u32,
    /// Maximum number of frontiers; [`FrontierReq::ANY`] means
    /// unbounded.
    pub count: u32,
}

impl FrontierReq {
    /// Sentinel disabling the age or count filter.
    pub const ANY: u32 = u32::MAX;

    pub fn new(network: Network, start: Account, age: u32, count: u32) -> Self {
        Self {
            header: MessageHeader::new(network, MessageType::FrontierReq),
            start,
            age,
            count,
        }
    }

    pub fn deserialize(header: MessageHeader, bytes: &mut Bytes) -> Result<Self, NetworkError> {
        Ok(Self {
            header,
            start: wire::read_account(bytes, "frontier_req start")?,
            age: wire::read_u32_le(bytes, "frontier_req age")?,
            count: wire::read_u32_le(bytes, "frontier_req count")?,
        })
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        self.header.serialize(buf);
        buf.put_slice(self.start.as_bytes());
        buf.put_u32_le(self.age);
        buf.put_u32_le(self.count);
    }
}

/// Bootstrap request for a run of blocks.
///
/// `start` is overloaded: an account (pull its whole chain) or a block
/// hash (pull from that block); the responder disambiguates against its
/// ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkPull {
    pub header: MessageHeader,
    pub start: BlockHash,
    pub end: BlockHash,
    /// Zero means unlimited; non-zero rides in the extended trailer.
    pub count: u32,
}

impl BulkPull {
    /// Size of the optional extended-parameters trailer.
    pub const EXTENDED_PARAMETERS_SIZE: usize = 8;

    pub fn new(network: Network, start: BlockHash, end: BlockHash, count: u32) -> Self {
        let mut header = MessageHeader::new(network, MessageType::BulkPull);
        header.set_bulk_pull_count_present(count != 0);
        Self {
            header,
            start,
            end,
            count,
        }
    }

    pub fn deserialize(header: MessageHeader, bytes: &mut Bytes) -> Result<Self, NetworkError> {
        let start = wire::read_hash(bytes, "bulk_pull start")?;
        let end = wire::read_hash(bytes, "bulk_pull end")?;
        let count = if header.bulk_pull_is_count_present() {
            let trailer: [u8; Self::EXTENDED_PARAMETERS_SIZE] =
                wire::read_array(bytes, "bulk_pull trailer")?;
            // One reserved byte, little-endian count, three reserved bytes.
            u32::from_le_bytes([trailer[1], trailer[2], trailer[3], trailer[4]])
        } else {
            0
        };
        Ok(Self {
            header,
            start,
            end,
            count,
        })
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        self.header.serialize(buf);
        buf.put_slice(self.start.as_bytes());
        buf.put_slice(self.end.as_bytes());
        if self.header.bulk_pull_is_count_present() {
            buf.put_u8(0);
            buf.put_u32_le(self.count);
            buf.put_slice(&[0u8; 3]);
        }
    }
}

/// Filter selecting what a `bulk_pull_account` response carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BulkPullAccountFlags {
    PendingHashAndAmount = 0x00,
    PendingAddressOnly = 0x01,
    PendingHashAmountAndAddress = 0x02,
}

impl TryFrom<u8> for BulkPullAccountFlags {
    type Error = NetworkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(BulkPullAccountFlags::PendingHashAndAmount),
            0x01 => Ok(BulkPullAccountFlags::PendingAddressOnly),
            0x02 => Ok(BulkPullAccountFlags::PendingHashAmountAndAddress),
            _ => Err(NetworkError::UnknownPullAccountFlags(value)),
        }
    }
}

/// Bootstrap request for an account's pending entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkPullAccount {
    pub header: MessageHeader,
    pub account: Account,
    /// Pending entries below this amount are omitted.
    pub minimum_amount: Amount,
    pub flags: BulkPullAccountFlags,
}

impl BulkPullAccount {
    pub fn new(
        network: Network,
        account: Account,
        minimum_amount: Amount,
        flags: BulkPullAccountFlags,
    ) -> Self {
        Self {
            header: MessageHeader::new(network, MessageType::BulkPullAccount),
            account,
            minimum_amount,
            flags,
        }
    }

    pub fn deserialize(header: MessageHeader, bytes: &mut Bytes) -> Result<Self, NetworkError> {
        Ok(Self {
            header,
            account: wire::read_account(bytes, "bulk_pull_account account")?,
            minimum_amount: wire::read_amount(bytes, "bulk_pull_account minimum")?,
            flags: BulkPullAccountFlags::try_from(wire::read_u8(
                bytes,
                "bulk_pull_account flags",
            )?)?,
        })
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        self.header.serialize(buf);
        buf.put_slice(self.account.as_bytes());
        buf.put_slice(&self.minimum_amount.to_be_bytes());
        buf.put_u8(self.flags as u8);
    }
}

/// Response shape for the retired `bulk_pull_blocks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BulkPullBlocksMode {
    ListBlocks = 0x00,
    ChecksumBlocks = 0x01,
}

impl TryFrom<u8> for BulkPullBlocksMode {
    type Error = NetworkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(BulkPullBlocksMode::ListBlocks),
            0x01 => Ok(BulkPullBlocksMode::ChecksumBlocks),
            _ => Err(NetworkError::UnknownPullBlocksMode(value)),
        }
    }
}

/// Retired hash-range pull, kept parseable for wire compatibility.
/// Whether to answer it at all is the host's call, not the codec's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkPullBlocks {
    pub header: MessageHeader,
    pub min_hash: BlockHash,
    pub max_hash: BlockHash,
    pub mode: BulkPullBlocksMode,
    pub max_count: u32,
}

impl BulkPullBlocks {
    pub fn new(
        network: Network,
        min_hash: BlockHash,
        max_hash: BlockHash,
        mode: BulkPullBlocksMode,
        max_count: u32,
    ) -> Self {
        Self {
            header: MessageHeader::new(network, MessageType::BulkPullBlocks),
            min_hash,
            max_hash,
            mode,
            max_count,
        }
    }

    pub fn deserialize(header: MessageHeader, bytes: &mut Bytes) -> Result<Self, NetworkError> {
        Ok(Self {
            header,
            min_hash: wire::read_hash(bytes, "bulk_pull_blocks min")?,
            max_hash: wire::read_hash(bytes, "bulk_pull_blocks max")?,
            mode: BulkPullBlocksMode::try_from(wire::read_u8(bytes, "bulk_pull_blocks mode")?)?,
            max_count: wire::read_u32_le(bytes, "bulk_pull_blocks count")?,
        })
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        self.header.serialize(buf);
        buf.put_slice(self.min_hash.as_bytes());
        buf.put_slice(self.max_hash.as_bytes());
        buf.put_u8(self.mode as u8);
        buf.put_u32_le(self.max_count);
    }
}

/// Opens a push of blocks from the requester; header only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkPush {
    pub header: MessageHeader,
}

impl BulkPush {
    pub fn new(network: Network) -> Self {
        Self {
            header: MessageHeader::new(network, MessageType::BulkPush),
        }
    }

    pub fn deserialize(header: MessageHeader, _bytes: &mut Bytes) -> Result<Self, NetworkError> {
        Ok(Self { header })
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        self.header.serialize(buf);
    }
}

/// Node-identity handshake: a challenge cookie, an answer, or both.
///
/// A server answering a prior challenge while issuing its own sets both
/// flags. A handshake carrying neither is meaningless and rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdHandshake {
    pub header: MessageHeader,
    pub query: Option<[u8; 32]>,
    pub response: Option<(Account, Signature)>,
}

impl NodeIdHandshake {
    pub fn new(
        network: Network,
        query: Option<[u8; 32]>,
        response: Option<(Account, Signature)>,
    ) -> Self {
        let mut header = MessageHeader::new(network, MessageType::NodeIdHandshake);
        header.set_query_flag(query.is_some());
        header.set_response_flag(response.is_some());
        Self {
            header,
            query,
            response,
        }
    }

    pub fn deserialize(header: MessageHeader, bytes: &mut Bytes) -> Result<Self, NetworkError> {
        if !header.is_query_flag() && !header.is_response_flag() {
            return Err(NetworkError::EmptyHandshake);
        }
        let query = if header.is_query_flag() {
            Some(wire::read_array(bytes, "handshake query")?)
        } else {
            None
        };
        let response = if header.is_response_flag() {
            let account = wire::read_account(bytes, "handshake account")?;
            let signature = wire::read_signature(bytes, "handshake signature")?;
            Some((account, signature))
        } else {
            None
        };
        Ok(Self {
            header,
            query,
            response,
        })
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        self.header.serialize(buf);
        if let Some(query) = &self.query {
            buf.put_slice(query);
        }
        if let Some((account, signature)) = &self.response {
            buf.put_slice(account.as_bytes());
            buf.put_slice(signature.as_bytes());
        }
    }
}

/// A decoded protocol message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Keepalive(Keepalive),
    Publish(Publish),
    ConfirmReq(ConfirmReq),
    ConfirmAck(ConfirmAck),
    BulkPull(BulkPull),
    BulkPush(BulkPush),
    FrontierReq(FrontierReq),
    BulkPullBlocks(BulkPullBlocks),
    NodeIdHandshake(NodeIdHandshake),
    BulkPullAccount(BulkPullAccount),
}

impl Message {
    pub fn header(&self) -> &MessageHeader {
        match self {
            Message::Keepalive(m) => &m.header,
            Message::Publish(m) => &m.header,
            Message::ConfirmReq(m) => &m.header,
            Message::ConfirmAck(m) => &m.header,
            Message::BulkPull(m) => &m.header,
            Message::BulkPush(m) => &m.header,
            Message::FrontierReq(m) => &m.header,
            Message::BulkPullBlocks(m) => &m.header,
            Message::NodeIdHandshake(m) => &m.header,
            Message::BulkPullAccount(m) => &m.header,
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Keepalive(_) => MessageType::Keepalive,
            Message::Publish(_) => MessageType::Publish,
            Message::ConfirmReq(_) => MessageType::ConfirmReq,
            Message::ConfirmAck(_) => MessageType::ConfirmAck,
            Message::BulkPull(_) => MessageType::BulkPull,
            Message::BulkPush(_) => MessageType::BulkPush,
            Message::FrontierReq(_) => MessageType::FrontierReq,
            Message::BulkPullBlocks(_) => MessageType::BulkPullBlocks,
            Message::NodeIdHandshake(_) => MessageType::NodeIdHandshake,
            Message::BulkPullAccount(_) => MessageType::BulkPullAccount,
        }
    }

    pub fn serialize(&self, buf: &mut BytesMut) {
        match self {
            Message::Keepalive(m) => m.serialize(buf),
            Message::Publish(m) => m.serialize(buf),
            Message::ConfirmReq(m) => m.serialize(buf),
            Message::ConfirmAck(m) => m.serialize(buf),
            Message::BulkPull(m) => m.serialize(buf),
            Message::BulkPush(m) => m.serialize(buf),
            Message::FrontierReq(m) => m.serialize(buf),
            Message::BulkPullBlocks(m) => m.serialize(buf),
            Message::NodeIdHandshake(m) => m.serialize(buf),
            Message::BulkPullAccount(m) => m.serialize(buf),
        }
    }

    /// Serialize into a fresh buffer, ready for the transport.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(MessageHeader::WIRE_SIZE + 256);
        self.serialize(&mut buf);
        buf.freeze()
    }

    /// Decode the payload for an already-peeled header.
    ///
    /// The full-table decoder used by stream transports and tests; the
    /// datagram parser restricts itself to the UDP subset and adds its
    /// own policy checks on top.
    pub fn deserialize(
        header: MessageHeader,
        bytes: &mut Bytes,
        block_uniquer: Option<&BlockUniquer>,
        vote_uniquer: Option<&VoteUniquer>,
    ) -> Result<Self, NetworkError> {
        let message_type = header
            .message_type()
            .ok_or_else(|| NetworkError::UnknownMessageType(header.raw_message_type()))?;
        match message_type {
            MessageType::Keepalive => {
                Keepalive::deserialize(header, bytes).map(Message::Keepalive)
            }
            MessageType::Publish => {
                Publish::deserialize(header, bytes, block_uniquer).map(Message::Publish)
            }
            MessageType::ConfirmReq => {
                ConfirmReq::deserialize(header, bytes, block_uniquer).map(Message::ConfirmReq)
            }
            MessageType::ConfirmAck => {
                ConfirmAck::deserialize(header, bytes, vote_uniquer).map(Message::ConfirmAck)
            }
            MessageType::BulkPull => BulkPull::deserialize(header, bytes).map(Message::BulkPull),
            MessageType::BulkPush => BulkPush::deserialize(header, bytes).map(Message::BulkPush),
            MessageType::FrontierReq => {
                FrontierReq::deserialize(header, bytes).map(Message::FrontierReq)
            }
            MessageType::BulkPullBlocks => {
                BulkPullBlocks::deserialize(header, bytes).map(Message::BulkPullBlocks)
            }
            MessageType::NodeIdHandshake => {
                NodeIdHandshake::deserialize(header, bytes).map(Message::NodeIdHandshake)
            }
            MessageType::BulkPullAccount => {
                BulkPullAccount::deserialize(header, bytes).map(Message::BulkPullAccount)
            }
            MessageType::Invalid | MessageType::NotAType => {
                Err(NetworkError::UnknownMessageType(header.raw_message_type()))
            }
        }
    }

    /// Dispatch to the visitor method for this variant.
    pub fn visit(&self, visitor: &mut dyn MessageVisitor) {
        match self {
            Message::Keepalive(m) => visitor.keepalive(m),
            Message::Publish(m) => visitor.publish(m),
            Message::ConfirmReq(m) => visitor.confirm_req(m),
            Message::ConfirmAck(m) => visitor.confirm_ack(m),
            Message::BulkPull(m) => visitor.bulk_pull(m),
            Message::BulkPush(m) => visitor.bulk_push(m),
            Message::FrontierReq(m) => visitor.frontier_req(m),
            Message::BulkPullBlocks(m) => visitor.bulk_pull_blocks(m),
            Message::NodeIdHandshake(m) => visitor.node_id_handshake(m),
            Message::BulkPullAccount(m) => visitor.bulk_pull_account(m),
        }
    }
}

/// Decode the nibble-typed block payload, interning through the uniquer
/// when one is supplied.
fn deserialize_block(
    header: &MessageHeader,
    bytes: &mut Bytes,
    uniquer: Option<&BlockUniquer>,
) -> Result<Arc<Block>, NetworkError> {
    let block_type = header
        .block_type()
        .ok_or_else(|| NetworkError::InvalidBlockType(header.raw_block_type()))?;
    let block = Arc::new(Block::deserialize(block_type, bytes)?);
    Ok(match uniquer {
        Some(uniquer) => uniquer.unique(block),
        None => block,
    })
}
