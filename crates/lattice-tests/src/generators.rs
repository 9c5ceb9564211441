//! Deterministic test data for the protocol suites.
//!
//! Seeded builders so failures reproduce byte-for-byte, plus the stub
//! work verifiers and the recording visitor the parser suites share.

use lattice_core::{
    Account, Amount, Block, BlockHash, ChangeBlock, OpenBlock, ReceiveBlock, SendBlock, Signature,
    StateBlock, Vote, VotePayload, WorkVerifier,
};
use lattice_network::{
    map_to_v6, BulkPull, BulkPullAccount, BulkPullBlocks, BulkPush, ConfirmAck, ConfirmReq,
    Endpoint, FrontierReq, Keepalive, Message, MessageVisitor, NodeIdHandshake, Publish,
};
use std::net::SocketAddr;
use std::sync::Arc;

/// A 32-byte value with a recognizable seed pattern.
pub fn test_bytes32(seed: u8) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[0] = seed;
    bytes[31] = seed.wrapping_mul(7);
    bytes
}

pub fn test_hash(seed: u8) -> BlockHash {
    BlockHash(test_bytes32(seed))
}

pub fn test_account(seed: u8) -> Account {
    Account(test_bytes32(seed))
}

pub fn test_signature(seed: u8) -> Signature {
    Signature([seed; 64])
}

/// A send block with seed-derived fields.
pub fn test_send_block(seed: u8) -> Block {
    Block::Send(SendBlock {
        previous: test_hash(seed),
        destination: test_account(seed.wrapping_add(1)),
        balance: Amount::new(seed as u128 * 1_000),
        signature: test_signature(seed),
        work: 0x0123_4567_89ab_cdef ^ seed as u64,
    })
}

pub fn test_receive_block(seed: u8) -> Block {
    Block::Receive(ReceiveBlock {
        previous: test_hash(seed),
        source: test_hash(seed.wrapping_add(1)),
        signature: test_signature(seed),
        work: seed as u64,
    })
}

pub fn test_open_block(seed: u8) -> Block {
    Block::Open(OpenBlock {
        source: test_hash(seed),
        representative: test_account(seed.wrapping_add(1)),
        account: test_account(seed.wrapping_add(2)),
        signature: test_signature(seed),
        work: seed as u64,
    })
}

pub fn test_change_block(seed: u8) -> Block {
    Block::Change(ChangeBlock {
        previous: test_hash(seed),
        representative: test_account(seed.wrapping_add(1)),
        signature: test_signature(seed),
        work: seed as u64,
    })
}

pub fn test_state_block(seed: u8) -> Block {
    Block::State(StateBlock {
        account: test_account(seed),
        previous: test_hash(seed.wrapping_add(1)),
        representative: test_account(seed.wrapping_add(2)),
        balance: Amount::new(seed as u128 + 1),
        link: test_hash(seed.wrapping_add(3)),
        signature: test_signature(seed),
        work: seed as u64,
    })
}

/// A vote over `count` seeded hashes.
pub fn test_hash_vote(seed: u8, count: usize) -> Vote {
    Vote {
        account: test_account(seed),
        signature: test_signature(seed),
        sequence: seed as u64 + 1,
        payload: VotePayload::Hashes(
            (0..count)
                .map(|i| test_hash(seed.wrapping_add(i as u8)))
                .collect(),
        ),
    }
}

/// A vote carrying a full block.
pub fn test_block_vote(seed: u8) -> Vote {
    Vote {
        account: test_account(seed),
        signature: test_signature(seed),
        sequence: seed as u64 + 1,
        payload: VotePayload::Block(Arc::new(test_send_block(seed))),
    }
}

/// A routable public endpoint.
pub fn test_endpoint(seed: u8, port: u16) -> Endpoint {
    map_to_v6(SocketAddr::from(([93, 184, seed, 1], port)))
}

/// Work verifier that accepts every block.
pub struct AcceptAllWork;

impl WorkVerifier for AcceptAllWork {
    fn sufficient(&self, _block: &Block) -> bool {
        true
    }
}

/// Work verifier that rejects every block.
pub struct RejectAllWork;

impl WorkVerifier for RejectAllWork {
    fn sufficient(&self, _block: &Block) -> bool {
        false
    }
}

/// Visitor recording every callback for later assertions.
#[derive(Default)]
pub struct RecordingVisitor {
    pub messages: Vec<Message>,
}

impl RecordingVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl MessageVisitor for RecordingVisitor {
    fn keepalive(&mut self, message: &Keepalive) {
        self.messages.push(Message::Keepalive(message.clone()));
    }

    fn publish(&mut self, message: &Publish) {
        self.messages.push(Message::Publish(message.clone()));
    }

    fn confirm_req(&mut self, message: &ConfirmReq) {
        self.messages.push(Message::ConfirmReq(message.clone()));
    }

    fn confirm_ack(&mut self, message: &ConfirmAck) {
        self.messages.push(Message::ConfirmAck(message.clone()));
    }

    fn bulk_pull(&mut self, message: &BulkPull) {
        self.messages.push(Message::BulkPull(message.clone()));
    }

    fn bulk_pull_account(&mut self, message: &BulkPullAccount) {
        self.messages.push(Message::BulkPullAccount(message.clone()));
    }

    fn bulk_pull_blocks(&mut self, message: &BulkPullBlocks) {
        self.messages.push(Message::BulkPullBlocks(message.clone()));
    }

    fn bulk_push(&mut self, message: &BulkPush) {
        self.messages.push(Message::BulkPush(message.clone()));
    }

    fn frontier_req(&mut self, message: &FrontierReq) {
        self.messages.push(Message::FrontierReq(message.clone()));
    }

    fn node_id_handshake(&mut self, message: &NodeIdHandshake) {
        self.messages.push(Message::NodeIdHandshake(message.clone()));
    }
}
