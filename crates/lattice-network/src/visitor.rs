//! Polymorphic dispatch surface for decoded messages.

use crate::message::{
    BulkPull, BulkPullAccount, BulkPullBlocks, BulkPush, ConfirmAck, ConfirmReq, FrontierReq,
    Keepalive, NodeIdHandshake, Publish,
};

/// Receives each fully validated message, one method per variant.
///
/// The parser calls exactly one method per successful datagram,
/// synchronously, after all validation. There is no return channel;
/// implementations act by side effect, typically enqueueing work.
/// References must not be retained past the callback unless the shared
/// payload handle is cloned too.
pub trait MessageVisitor {
    fn keepalive(&mut self, message: &Keepalive);
    fn publish(&mut self, message: &Publish);
    fn confirm_req(&mut self, message: &ConfirmReq);
    fn confirm_ack(&mut self, message: &ConfirmAck);
    fn bulk_pull(&mut self, message: &BulkPull);
    fn bulk_pull_account(&mut self, message: &BulkPullAccount);
    fn bulk_pull_blocks(&mut self, message: &BulkPullBlocks);
    fn bulk_push(&mut self, message: &BulkPush);
    fn frontier_req(&mut self, message: &FrontierReq);
    fn node_id_handshake(&mut self, message: &NodeIdHandshake);
}
