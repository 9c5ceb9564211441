//! Datagram parser scenarios, driven over byte-level fixtures.

use crate::generators::*;
use bytes::BytesMut;
use lattice_core::WorkVerifier;
use lattice_network::{
    reserved_address, BlockUniquer, ConfirmAck, Keepalive, Message, MessageParser, Network,
    NodeIdHandshake, ParseStatus, Publish, VoteUniquer, MAX_SAFE_UDP_MESSAGE_SIZE,
};
use std::sync::Arc;

fn parse_with(
    network: Network,
    work: &dyn WorkVerifier,
    buffer: &[u8],
) -> (ParseStatus, RecordingVisitor) {
    let blocks = BlockUniquer::new();
    let votes = VoteUniquer::new();
    let mut visitor = RecordingVisitor::new();
    let status = {
        let mut parser = MessageParser::new(&blocks, &votes, &mut visitor, work, network);
        parser.deserialize_buffer(buffer)
    };
    (status, visitor)
}

fn parse(buffer: &[u8]) -> (ParseStatus, RecordingVisitor) {
    parse_with(Network::Live, &AcceptAllWork, buffer)
}

#[test]
fn empty_keepalive_scenario() {
    // Live network, version 16, keepalive, zero extensions, eight empty
    // peer slots.
    let mut datagram = hex::decode("5243101007020000").unwrap();
    datagram.extend_from_slice(&[0u8; 144]);

    let (status, visitor) = parse(&datagram);
    assert_eq!(status, ParseStatus::Success);
    assert_eq!(visitor.len(), 1);

    match &visitor.messages[0] {
        Message::Keepalive(keepalive) => {
            for peer in &keepalive.peers {
                assert!(peer.ip().is_unspecified());
                assert_eq!(peer.port(), 0);
                assert!(reserved_address(peer, true));
                assert!(reserved_address(peer, false));
            }
        }
        other => panic!("expected keepalive, got {other:?}"),
    }
}

#[test]
fn wrong_network_scenario() {
    // Test-network magic arriving at a live-built node.
    let mut buf = BytesMut::new();
    Keepalive::new(Network::Test).serialize(&mut buf);
    assert_eq!(&buf[..2], &[0x52, 0x41]);

    let (status, visitor) = parse(&buf);
    assert_eq!(status, ParseStatus::InvalidNetwork);
    assert!(visitor.is_empty());
}

#[test]
fn wrong_magic_rejected_before_payload() {
    // Garbage magic and a deliberately nonsensical remainder: the parser
    // must classify on the first two bytes alone.
    let datagram = [0x58u8, 0x43, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
    let (status, visitor) = parse(&datagram);
    assert_eq!(status, ParseStatus::InvalidMagic);
    assert!(visitor.is_empty());

    let (status, _) = parse(&[0x52, 0x44, 0x10, 0x10, 0x07, 0x02, 0x00, 0x00]);
    assert_eq!(status, ParseStatus::InvalidMagic);
}

#[test]
fn outdated_version_rejected() {
    // version_using = 6, below the supported floor of 7.
    let (status, visitor) = parse(&hex::decode("5243100607020000").unwrap());
    assert_eq!(status, ParseStatus::OutdatedVersion);
    assert!(visitor.is_empty());
}

#[test]
fn short_and_oversize_buffers_rejected() {
    let (status, _) = parse(&[0x52, 0x43, 0x10]);
    assert_eq!(status, ParseStatus::InvalidHeader);

    let (status, _) = parse(&[]);
    assert_eq!(status, ParseStatus::InvalidHeader);

    let oversize = vec![0u8; MAX_SAFE_UDP_MESSAGE_SIZE + 1];
    let (status, _) = parse(&oversize);
    assert_eq!(status, ParseStatus::InvalidHeader);
}

#[test]
fn unknown_and_non_datagram_types_rejected() {
    // Type byte outside the frozen table.
    let (status, _) = parse(&hex::decode("52431010077f0000").unwrap());
    assert_eq!(status, ParseStatus::InvalidMessageType);

    // bulk_pull is TCP-framed; over UDP it is not a valid message.
    let (status, visitor) = parse(&hex::decode("5243101007060000").unwrap());
    assert_eq!(status, ParseStatus::InvalidMessageType);
    assert!(visitor.is_empty());
}

#[test]
fn handshake_query_only_scenario() {
    let cookie: [u8; 32] = test_bytes32(0xc0);
    let handshake = NodeIdHandshake::new(Network::Live, Some(cookie), None);
    let datagram = Message::NodeIdHandshake(handshake).to_bytes();

    let (status, visitor) = parse(&datagram);
    assert_eq!(status, ParseStatus::Success);
    match &visitor.messages[0] {
        Message::NodeIdHandshake(handshake) => {
            assert_eq!(handshake.query, Some(cookie));
            assert!(handshake.response.is_none());
        }
        other => panic!("expected node_id_handshake, got {other:?}"),
    }
}

#[test]
fn handshake_without_parts_rejected() {
    // Both flags clear; a handshake that says nothing.
    let (status, visitor) = parse(&hex::decode("52431010070a0000").unwrap());
    assert_eq!(status, ParseStatus::InvalidNodeIdHandshakeMessage);
    assert!(visitor.is_empty());
}

#[test]
fn publish_insufficient_work_scenario() {
    let publish = Publish::new(Network::Live, Arc::new(test_send_block(1)));
    let datagram = Message::Publish(publish).to_bytes();

    let (status, visitor) = parse_with(Network::Live, &RejectAllWork, &datagram);
    assert_eq!(status, ParseStatus::InsufficientWork);
    assert!(visitor.is_empty());

    let (status, visitor) = parse_with(Network::Live, &AcceptAllWork, &datagram);
    assert_eq!(status, ParseStatus::Success);
    assert_eq!(visitor.len(), 1);
}

#[test]
fn publish_with_unknown_nibble_rejected() {
    // Valid header except the block-type nibble is 0x0f.
    let mut datagram = hex::decode("524310100703000f").unwrap();
    datagram.extend_from_slice(&[0u8; 152]);
    let (status, visitor) = parse(&datagram);
    assert_eq!(status, ParseStatus::InvalidPublishMessage);
    assert!(visitor.is_empty());
}

#[test]
fn publish_with_trailing_byte_rejected() {
    let publish = Publish::new(Network::Live, Arc::new(test_send_block(1)));
    let mut datagram = Message::Publish(publish).to_bytes().to_vec();
    datagram.push(0);

    let (status, visitor) = parse(&datagram);
    assert_eq!(status, ParseStatus::InvalidPublishMessage);
    assert!(visitor.is_empty());
}

#[test]
fn confirm_ack_hash_vote_skips_work_check() {
    let ack = ConfirmAck::new(Network::Live, Arc::new(test_hash_vote(2, 3)));
    let datagram = Message::ConfirmAck(ack).to_bytes();

    // Votes by hash carry no block, so even a rejecting verifier passes.
    let (status, visitor) = parse_with(Network::Live, &RejectAllWork, &datagram);
    assert_eq!(status, ParseStatus::Success);
    assert_eq!(visitor.len(), 1);
}

#[test]
fn confirm_ack_block_vote_gated_on_work() {
    let ack = ConfirmAck::new(Network::Live, Arc::new(test_block_vote(2)));
    let datagram = Message::ConfirmAck(ack).to_bytes();

    let (status, visitor) = parse_with(Network::Live, &RejectAllWork, &datagram);
    assert_eq!(status, ParseStatus::InsufficientWork);
    assert!(visitor.is_empty());
}

#[test]
fn repeated_publish_interns_one_block() {
    let publish = Publish::new(Network::Live, Arc::new(test_send_block(9)));
    let datagram = Message::Publish(publish).to_bytes();

    let blocks = BlockUniquer::new();
    let votes = VoteUniquer::new();
    let mut visitor = RecordingVisitor::new();
    let work = AcceptAllWork;
    {
        let mut parser =
            MessageParser::new(&blocks, &votes, &mut visitor, &work, Network::Live);
        assert_eq!(parser.deserialize_buffer(&datagram), ParseStatus::Success);
        assert_eq!(parser.deserialize_buffer(&datagram), ParseStatus::Success);
        assert_eq!(parser.status_string(), "success");
    }

    let [first, second] = &visitor.messages[..] else {
        panic!("expected two messages");
    };
    match (first, second) {
        (Message::Publish(a), Message::Publish(b)) => {
            assert!(Arc::ptr_eq(&a.block, &b.block));
        }
        other => panic!("expected two publishes, got {other:?}"),
    }
    assert_eq!(blocks.len(), 1);
}
