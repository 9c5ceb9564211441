//! Datagram parsing: one UDP buffer in, at most one visitor callback out.
//!
//! The parser owns receive-side policy: the size gate, magic and network
//! checks, the version floor, dispatch over the UDP message subset,
//! work-proof gating on carried blocks, and the exactness rule that a
//! datagram holds one message and nothing else. Every failure is
//! absorbed into a [`ParseStatus`]; nothing propagates upward.

use crate::uniquer::{BlockUniquer, VoteUniquer};
use crate::{
    ConfirmAck, ConfirmReq, Keepalive, MessageHeader, MessageType, MessageVisitor, Network,
    NodeIdHandshake, Publish, MAX_SAFE_UDP_MESSAGE_SIZE, PROTOCOL_VERSION_MIN,
};
use bytes::{Buf, Bytes};
use lattice_core::{VotePayload, WorkVerifier};
use std::fmt;
use tracing::debug;

/// Outcome of one datagram parse, surfaced for telemetry and abuse
/// scoring.
///
/// The split matters to the host: a wrong magic is likely a scanner, a
/// wrong network a misconfigured peer, a per-type failure either
/// corruption or malice from someone speaking the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseStatus {
    Success,
    InsufficientWork,
    InvalidHeader,
    InvalidMessageType,
    InvalidKeepaliveMessage,
    InvalidPublishMessage,
    InvalidConfirmReqMessage,
    InvalidConfirmAckMessage,
    InvalidNodeIdHandshakeMessage,
    OutdatedVersion,
    InvalidMagic,
    InvalidNetwork,
}

impl ParseStatus {
    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ParseStatus::Success => "success",
            ParseStatus::InsufficientWork => "insufficient_work",
            ParseStatus::InvalidHeader => "invalid_header",
            ParseStatus::InvalidMessageType => "invalid_message_type",
            ParseStatus::InvalidKeepaliveMessage => "invalid_keepalive_message",
            ParseStatus::InvalidPublishMessage => "invalid_publish_message",
            ParseStatus::InvalidConfirmReqMessage => "invalid_confirm_req_message",
            ParseStatus::InvalidConfirmAckMessage => "invalid_confirm_ack_message",
            ParseStatus::InvalidNodeIdHandshakeMessage => "invalid_node_id_handshake_message",
            ParseStatus::OutdatedVersion => "outdated_version",
            ParseStatus::InvalidMagic => "invalid_magic",
            ParseStatus::InvalidNetwork => "invalid_network",
        }
    }
}

impl fmt::Display for ParseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-datagram parser.
///
/// Carries mutable `status`, so one instance serves one thread; spin up
/// one per call stack if parsing concurrently. The uniquers behind it
/// are internally synchronized and meant to be shared.
pub struct MessageParser<'a> {
    block_uniquer: &'a BlockUniquer,
    vote_uniquer: &'a VoteUniquer,
    visitor: &'a mut dyn MessageVisitor,
    work: &'a dyn WorkVerifier,
    network: Network,
    pub status: ParseStatus,
}

impl<'a> MessageParser<'a> {
    pub fn new(
        block_uniquer: &'a BlockUniquer,
        vote_uniquer: &'a VoteUniquer,
        visitor: &'a mut dyn MessageVisitor,
        work: &'a dyn WorkVerifier,
        network: Network,
    ) -> Self {
        Self {
            block_uniquer,
            vote_uniquer,
            visitor,
            work,
            network,
            status: ParseStatus::Success,
        }
    }

    /// Stable label for the last parse outcome.
    pub fn status_string(&self) -> &'static str {
        self.status.as_str()
    }

    /// Parse one datagram and, on success, hand the message to the
    /// visitor. The outcome is stored in `status` and returned.
    pub fn deserialize_buffer(&mut self, buffer: &[u8]) -> ParseStatus {
        self.status = self.parse(buffer);
        if self.status != ParseStatus::Success {
            debug!(status = %self.status, len = buffer.len(), "Dropped datagram");
        }
        self.status
    }

    fn parse(&mut self, buffer: &[u8]) -> ParseStatus {
        if buffer.len() > MAX_SAFE_UDP_MESSAGE_SIZE {
            return ParseStatus::InvalidHeader;
        }
        let mut bytes = Bytes::copy_from_slice(buffer);
        let header = match MessageHeader::deserialize(&mut bytes) {
            Ok(header) => header,
            Err(_) => return ParseStatus::InvalidHeader,
        };
        if !header.valid_magic() {
            return ParseStatus::InvalidMagic;
        }
        if !header.valid_network(self.network) {
            return ParseStatus::InvalidNetwork;
        }
        if header.version_using < PROTOCOL_VERSION_MIN {
            return ParseStatus::OutdatedVersion;
        }
        // Only the datagram subset is handled here; the bulk types are
        // framed over TCP by the bootstrap reader.
        match header.message_type() {
            Some(MessageType::Keepalive) => self.deserialize_keepalive(header, bytes),
            Some(MessageType::Publish) => self.deserialize_publish(header, bytes),
            Some(MessageType::ConfirmReq) => self.deserialize_confirm_req(header, bytes),
            Some(MessageType::ConfirmAck) => self.deserialize_confirm_ack(header, bytes),
            Some(MessageType::NodeIdHandshake) => {
                self.deserialize_node_id_handshake(header, bytes)
            }
            _ => ParseStatus::InvalidMessageType,
        }
    }

    fn deserialize_keepalive(&mut self, header: MessageHeader, mut bytes: Bytes) -> ParseStatus {
        match Keepalive::deserialize(header, &mut bytes) {
            Ok(message) if at_end(&bytes) => {
                self.visitor.keepalive(&message);
                ParseStatus::Success
            }
            _ => ParseStatus::InvalidKeepaliveMessage,
        }
    }

    fn deserialize_publish(&mut self, header: MessageHeader, mut bytes: Bytes) -> ParseStatus {
        match Publish::deserialize(header, &mut bytes, Some(self.block_uniquer)) {
            Ok(message) if at_end(&bytes) => {
                if !self.work.sufficient(&message.block) {
                    return ParseStatus::InsufficientWork;
                }
                self.visitor.publish(&message);
                ParseStatus::Success
            }
            _ => ParseStatus::InvalidPublishMessage,
        }
    }

    fn deserialize_confirm_req(&mut self, header: MessageHeader, mut bytes: Bytes) -> ParseStatus {
        match ConfirmReq::deserialize(header, &mut bytes, Some(self.block_uniquer)) {
            Ok(message) if at_end(&bytes) => {
                if !self.work.sufficient(&message.block) {
                    return ParseStatus::InsufficientWork;
                }
                self.visitor.confirm_req(&message);
                ParseStatus::Success
            }
            _ => ParseStatus::InvalidConfirmReqMessage,
        }
    }

    fn deserialize_confirm_ack(&mut self, header: MessageHeader, mut bytes: Bytes) -> ParseStatus {
        match ConfirmAck::deserialize(header, &mut bytes, Some(self.vote_uniquer)) {
            Ok(message) if at_end(&bytes) => {
                if let VotePayload::Block(block) = &message.vote.payload {
                    if !self.work.sufficient(block) {
                        return ParseStatus::InsufficientWork;
                    }
                }
                self.visitor.confirm_ack(&message);
                ParseStatus::Success
            }
            _ => ParseStatus::InvalidConfirmAckMessage,
        }
    }

    fn deserialize_node_id_handshake(
        &mut self,
        header: MessageHeader,
        mut bytes: Bytes,
    ) -> ParseStatus {
        match NodeIdHandshake::deserialize(header, &mut bytes) {
            Ok(message) if at_end(&bytes) => {
                self.visitor.node_id_handshake(&message);
                ParseStatus::Success
            }
            _ => ParseStatus::InvalidNodeIdHandshakeMessage,
        }
    }
}

// Datagrams are exact: one message, no slack.
fn at_end(bytes: &Bytes) -> bool {
    !bytes.has_remaining()
}
