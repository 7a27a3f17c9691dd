//! Actor Message Types
//!
//! Value types exchanged between the host and an external actor. Inbound
//! messages are immutable; payload bytes are reference counted so an actor can
//! echo or retain them without copying.

use bytes::Bytes;
use std::fmt;

/// Identifier of the message sender, as assigned by the host
pub type SenderId = i32;

/// Host-defined message type tag
pub type MessageType = i32;

/// Payload that asks the host to release the receiving actor (ASCII "cc")
pub const RELEASE_SENTINEL: [u8; 2] = [99, 99];

/// Default bound on inbound payload length
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 64 * 1024;

/// Check whether a payload is exactly the release sentinel
pub fn is_release_sentinel(payload: &[u8]) -> bool {
    payload == RELEASE_SENTINEL
}

/// Reply type for an inbound type tag, wrapping at the integer width
pub fn reply_type(msg_type: MessageType) -> MessageType {
    msg_type.wrapping_add(1)
}

/// Message delivered by the host to an actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender: SenderId,
    pub msg_type: MessageType,
    pub payload: Bytes,
}

impl InboundMessage {
    pub fn new(sender: SenderId, msg_type: MessageType, payload: impl Into<Bytes>) -> Self {
        Self {
            sender,
            msg_type,
            payload: payload.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn is_release_sentinel(&self) -> bool {
        is_release_sentinel(&self.payload)
    }
}

/// Per-send options passed through to the host delivery primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendFlags {
    /// Host takes the payload even when delivery fails
    pub discard_on_failure: bool,
}

impl Default for SendFlags {
    fn default() -> Self {
        Self {
            discard_on_failure: true,
        }
    }
}

/// Message sent by an actor through its host context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: SenderId,
    pub msg_type: MessageType,
    pub payload: Bytes,
    pub flags: SendFlags,
}

impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "to={} type={} len={}",
            self.recipient,
            self.msg_type,
            self.payload.len()
        )
    }
}
