//! Host Context
//!
//! The host-owned channel through which an actor replies and asks to be
//! released. Actors only ever hold a [`HostContextHandle`], a weak reference
//! to the host's context; the host decides when the context goes away.

use crate::error::{ActorError, Result};
use crate::messages::{MessageType, SendFlags, SenderId};
use bytes::Bytes;
use std::fmt;
use std::sync::{Arc, Weak};
use uuid::Uuid;

/// Unique host context identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId {
    id: Uuid,
}

impl ContextId {
    /// Create new context ID
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    /// Create from UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self { id }
    }

    /// Get UUID
    pub fn uuid(&self) -> Uuid {
        self.id
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.id.simple())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

/// Operations the host runtime exposes to an actor bound to one context
pub trait HostContext: Send + Sync {
    fn context_id(&self) -> ContextId;

    /// Deliver a message to `recipient`. Failures are reported, never retried.
    fn send_message(
        &self,
        recipient: SenderId,
        msg_type: MessageType,
        payload: Bytes,
        flags: SendFlags,
    ) -> Result<()>;

    /// Ask the host to release the actor bound to this context
    fn request_release(&self) -> Result<()>;
}

/// Weak handle to a host context, held by actor instances
#[derive(Clone)]
pub struct HostContextHandle {
    id: ContextId,
    inner: Weak<dyn HostContext>,
}

impl HostContextHandle {
    /// Create a handle without taking ownership of the context
    pub fn new<C: HostContext + 'static>(context: &Arc<C>) -> Self {
        let inner: Arc<dyn HostContext> = context.clone();
        Self {
            id: context.context_id(),
            inner: Arc::downgrade(&inner),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Check if the host still holds the context
    pub fn is_live(&self) -> bool {
        self.inner.strong_count() > 0
    }

    fn upgrade(&self) -> Result<Arc<dyn HostContext>> {
        self.inner.upgrade().ok_or(ActorError::ContextGone)
    }

    pub fn send_message(
        &self,
        recipient: SenderId,
        msg_type: MessageType,
        payload: Bytes,
        flags: SendFlags,
    ) -> Result<()> {
        self.upgrade()?
            .send_message(recipient, msg_type, payload, flags)
    }

    pub fn request_release(&self) -> Result<()> {
        self.upgrade()?.request_release()
    }
}

impl fmt::Debug for HostContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContextHandle")
            .field("id", &self.id)
            .field("live", &self.is_live())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::messages::OutboundMessage;
    use parking_lot::Mutex;

    /// Context that records sends and release requests
    pub(crate) struct RecordingContext {
        pub id: ContextId,
        pub fail_sends: bool,
        pub sent: Mutex<Vec<OutboundMessage>>,
        pub release_requests: Mutex<usize>,
    }

    impl RecordingContext {
        pub fn new() -> Arc<Self> {
            Self::with_failing_sends(false)
        }

        pub fn with_failing_sends(fail_sends: bool) -> Arc<Self> {
            Arc::new(Self {
                id: ContextId::new(),
                fail_sends,
                sent: Mutex::new(Vec::new()),
                release_requests: Mutex::new(0),
            })
        }
    }

    impl HostContext for RecordingContext {
        fn context_id(&self) -> ContextId {
            self.id
        }

        fn send_message(
            &self,
            recipient: SenderId,
            msg_type: MessageType,
            payload: Bytes,
            flags: SendFlags,
        ) -> Result<()> {
            if self.fail_sends {
                return Err(ActorError::send_failed(recipient, "recording context rejects sends"));
            }
            self.sent.lock().push(OutboundMessage {
                recipient,
                msg_type,
                payload,
                flags,
            });
            Ok(())
        }

        fn request_release(&self) -> Result<()> {
            *self.release_requests.lock() += 1;
            Ok(())
        }
    }
}
