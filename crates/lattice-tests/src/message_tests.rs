//! Round-trip and fixture suites for the message codecs.

use crate::generators::*;
use bytes::{Buf, Bytes, BytesMut};
use lattice_core::{Amount, BlockType};
use lattice_network::{
    BulkPull, BulkPullAccount, BulkPullAccountFlags, BulkPullBlocks, BulkPullBlocksMode, BulkPush,
    ConfirmAck, ConfirmReq, FrontierReq, Keepalive, Message, MessageHeader, MessageType, Network,
    NodeIdHandshake, Publish,
};
use std::sync::Arc;

/// Serialize, peel the header back off, decode, and insist the payload
/// was consumed exactly.
fn roundtrip(message: &Message) -> Message {
    let mut bytes = message.to_bytes();
    let header = MessageHeader::deserialize(&mut bytes).unwrap();
    assert_eq!(header.message_type(), Some(message.message_type()));
    let decoded = Message::deserialize(header, &mut bytes, None, None).unwrap();
    assert!(!bytes.has_remaining());
    decoded
}

#[test]
fn every_variant_roundtrips() {
    let mut keepalive = Keepalive::new(Network::Live);
    keepalive.peers[0] = test_endpoint(1, 7075);
    keepalive.peers[7] = test_endpoint(2, 54_321);

    let messages = [
        Message::Keepalive(keepalive),
        Message::Publish(Publish::new(Network::Live, Arc::new(test_state_block(3)))),
        Message::ConfirmReq(ConfirmReq::new(Network::Live, Arc::new(test_open_block(4)))),
        Message::ConfirmAck(ConfirmAck::new(Network::Live, Arc::new(test_hash_vote(5, 2)))),
        Message::BulkPull(BulkPull::new(
            Network::Live,
            test_hash(6),
            test_hash(7),
            0,
        )),
        Message::BulkPush(BulkPush::new(Network::Live)),
        Message::FrontierReq(FrontierReq::new(
            Network::Live,
            test_account(8),
            FrontierReq::ANY,
            1000,
        )),
        Message::BulkPullBlocks(BulkPullBlocks::new(
            Network::Live,
            test_hash(9),
            test_hash(10),
            BulkPullBlocksMode::ChecksumBlocks,
            512,
        )),
        Message::NodeIdHandshake(NodeIdHandshake::new(
            Network::Live,
            Some(test_bytes32(11)),
            Some((test_account(12), test_signature(13))),
        )),
        Message::BulkPullAccount(BulkPullAccount::new(
            Network::Live,
            test_account(14),
            Amount::new(1_000_000),
            BulkPullAccountFlags::PendingHashAmountAndAddress,
        )),
    ];

    for message in &messages {
        assert_eq!(&roundtrip(message), message, "{:?}", message.message_type());
    }
}

#[test]
fn publish_and_confirm_req_roundtrip_each_block_variant() {
    for block in [
        test_send_block(1),
        test_receive_block(2),
        test_open_block(3),
        test_change_block(4),
        test_state_block(5),
    ] {
        let block = Arc::new(block);
        let publish = Message::Publish(Publish::new(Network::Beta, block.clone()));
        assert_eq!(roundtrip(&publish), publish);

        let req = Message::ConfirmReq(ConfirmReq::new(Network::Beta, block.clone()));
        assert_eq!(roundtrip(&req), req);
        assert_eq!(req.header().block_type(), Some(block.block_type()));
    }
}

#[test]
fn confirm_ack_nibble_tracks_payload() {
    let by_hash = ConfirmAck::new(Network::Live, Arc::new(test_hash_vote(1, 4)));
    assert_eq!(by_hash.header.block_type(), Some(BlockType::NotABlock));

    let by_block = ConfirmAck::new(Network::Live, Arc::new(test_block_vote(2)));
    assert_eq!(by_block.header.block_type(), Some(BlockType::Send));

    for ack in [by_hash, by_block] {
        let message = Message::ConfirmAck(ack);
        assert_eq!(roundtrip(&message), message);
    }
}

#[test]
fn bulk_pull_without_count_fixture() {
    // Flag clear: 64-byte payload, count decodes as unlimited, and the
    // codec must not touch bytes past the payload.
    let header = MessageHeader::new(Network::Live, MessageType::BulkPull);
    assert!(!header.bulk_pull_is_count_present());

    let mut payload = BytesMut::new();
    payload.extend_from_slice(test_hash(1).as_bytes());
    payload.extend_from_slice(test_hash(2).as_bytes());
    payload.extend_from_slice(&[0xaa]); // sentinel past the payload
    let mut bytes = payload.freeze();

    let pull = BulkPull::deserialize(header, &mut bytes).unwrap();
    assert_eq!(pull.count, 0);
    assert_eq!(pull.start, test_hash(1));
    assert_eq!(pull.end, test_hash(2));
    assert_eq!(bytes.remaining(), 1, "sentinel must remain unread");
}

#[test]
fn bulk_pull_with_count_fixture() {
    let mut header = MessageHeader::new(Network::Live, MessageType::BulkPull);
    header.set_bulk_pull_count_present(true);

    let mut payload = BytesMut::new();
    payload.extend_from_slice(&[0u8; 64]);
    payload.extend_from_slice(&hex::decode("0000010000000000").unwrap());
    let mut bytes = payload.freeze();

    let pull = BulkPull::deserialize(header, &mut bytes).unwrap();
    assert_eq!(pull.count, 256);
    assert!(!bytes.has_remaining());
}

#[test]
fn bulk_pull_count_roundtrip() {
    let pull = BulkPull::new(Network::Live, test_hash(1), test_hash(2), 256);
    assert!(pull.header.bulk_pull_is_count_present());

    let message = Message::BulkPull(pull);
    let decoded = roundtrip(&message);
    assert_eq!(decoded, message);

    // The serialized trailer carries the reserved-byte layout.
    let bytes = message.to_bytes();
    assert_eq!(&bytes[bytes.len() - 8..], &[0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn bulk_pull_truncated_trailer_rejected() {
    let mut header = MessageHeader::new(Network::Live, MessageType::BulkPull);
    header.set_bulk_pull_count_present(true);
    let mut bytes = Bytes::from_static(&[0u8; 68]); // 64 + half a trailer
    assert!(BulkPull::deserialize(header, &mut bytes).is_err());
}

#[test]
fn frontier_req_sentinels() {
    let req = FrontierReq::new(
        Network::Live,
        test_account(1),
        FrontierReq::ANY,
        FrontierReq::ANY,
    );
    assert_eq!(req.age, 0xffff_ffff);
    assert_eq!(req.count, 0xffff_ffff);

    // Fixed 40-byte payload after the header.
    let message = Message::FrontierReq(req);
    assert_eq!(message.to_bytes().len(), MessageHeader::WIRE_SIZE + 40);
}

#[test]
fn bulk_pull_blocks_modes() {
    for (byte, mode) in [
        (0x00, BulkPullBlocksMode::ListBlocks),
        (0x01, BulkPullBlocksMode::ChecksumBlocks),
    ] {
        assert_eq!(BulkPullBlocksMode::try_from(byte).unwrap(), mode);
    }
    assert!(BulkPullBlocksMode::try_from(0x02).is_err());
}

#[test]
fn keepalive_zero_slots_roundtrip() {
    // Senders with fewer than eight peers pad with zero slots; those
    // slots survive the codec rather than being silently dropped.
    let mut keepalive = Keepalive::new(Network::Live);
    keepalive.peers[3] = test_endpoint(1, 7075);
    let message = Message::Keepalive(keepalive);

    match roundtrip(&message) {
        Message::Keepalive(decoded) => {
            assert_eq!(decoded.peers[3], test_endpoint(1, 7075));
            assert!(decoded.peers[0].ip().is_unspecified());
            assert_eq!(decoded.peers[0].port(), 0);
        }
        other => panic!("expected keepalive, got {other:?}"),
    }
}

#[test]
fn handshake_response_only_roundtrip() {
    let handshake = NodeIdHandshake::new(
        Network::Live,
        None,
        Some((test_account(1), test_signature(2))),
    );
    assert!(!handshake.header.is_query_flag());
    assert!(handshake.header.is_response_flag());

    let message = Message::NodeIdHandshake(handshake);
    assert_eq!(roundtrip(&message), message);
    // Header + account + signature.
    assert_eq!(message.to_bytes().len(), MessageHeader::WIRE_SIZE + 96);
}

#[test]
fn vote_equality_is_by_hash() {
    let a = ConfirmAck::new(Network::Live, Arc::new(test_hash_vote(1, 2)));
    let b = ConfirmAck::new(Network::Live, Arc::new(test_hash_vote(1, 2)));
    assert!(!Arc::ptr_eq(&a.vote, &b.vote));
    assert_eq!(a, b);

    let c = ConfirmAck::new(Network::Live, Arc::new(test_hash_vote(1, 3)));
    assert_ne!(a, c);
}
