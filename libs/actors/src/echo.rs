//! Echo Actor
//!
//! Replies to every message with the same payload and the next type tag, and
//! asks the host to release it when it receives the release sentinel. Works
//! for both actor flavors.

use crate::context::HostContextHandle;
use crate::error::Result;
use crate::instance::ExternalActor;
use crate::messages::{reply_type, InboundMessage, SendFlags};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Counters shared between an echo actor and whoever observes it
#[derive(Debug, Default)]
pub struct EchoStats {
    pub replies_sent: AtomicU64,
    pub send_failures: AtomicU64,
    pub release_requests: AtomicU64,
}

impl EchoStats {
    pub fn replies_sent(&self) -> u64 {
        self.replies_sent.load(Ordering::Relaxed)
    }

    pub fn send_failures(&self) -> u64 {
        self.send_failures.load(Ordering::Relaxed)
    }

    pub fn release_requests(&self) -> u64 {
        self.release_requests.load(Ordering::Relaxed)
    }
}

pub struct EchoActor {
    context: HostContextHandle,
    flags: SendFlags,
    stats: Arc<EchoStats>,
}

impl EchoActor {
    pub fn new(context: HostContextHandle, flags: SendFlags, stats: Arc<EchoStats>) -> Self {
        Self {
            context,
            flags,
            stats,
        }
    }

    /// Factory suitable for [`crate::ActorRegistry::register`]
    pub fn factory(
        flags: SendFlags,
    ) -> impl Fn(HostContextHandle) -> Result<Box<dyn ExternalActor>> + Send + Sync + 'static {
        Self::factory_with_stats(flags, Arc::new(EchoStats::default()))
    }

    /// Factory whose instances all report into `stats`
    pub fn factory_with_stats(
        flags: SendFlags,
        stats: Arc<EchoStats>,
    ) -> impl Fn(HostContextHandle) -> Result<Box<dyn ExternalActor>> + Send + Sync + 'static {
        move |context: HostContextHandle| -> Result<Box<dyn ExternalActor>> {
            Ok(Box::new(EchoActor::new(context, flags, Arc::clone(&stats))))
        }
    }

    pub fn stats(&self) -> Arc<EchoStats> {
        Arc::clone(&self.stats)
    }
}

impl ExternalActor for EchoActor {
    fn on_message(&mut self, message: &InboundMessage) {
        let reply = reply_type(message.msg_type);

        match self
            .context
            .send_message(message.sender, reply, message.payload.clone(), self.flags)
        {
            Ok(()) => {
                self.stats.replies_sent.fetch_add(1, Ordering::Relaxed);
                debug!(
                    context_id = %self.context.id(),
                    recipient = message.sender,
                    msg_type = reply,
                    "Echoed message"
                );
            }
            Err(e) => {
                self.stats.send_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    context_id = %self.context.id(),
                    recipient = message.sender,
                    error = %e,
                    "Unable to send reply"
                );
            }
        }

        if message.is_release_sentinel() {
            self.stats.release_requests.fetch_add(1, Ordering::Relaxed);
            if let Err(e) = self.context.request_release() {
                warn!(
                    context_id = %self.context.id(),
                    error = %e,
                    "Unable to request release"
                );
            }
        }
    }

    fn on_release(self: Box<Self>) {
        debug!(context_id = %self.context.id(), "Freeing echo actor state");
    }

    fn name(&self) -> &str {
        "echo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::RecordingContext;
    use bytes::Bytes;

    fn echo_for(context: &Arc<RecordingContext>) -> EchoActor {
        EchoActor::new(
            HostContextHandle::new(context),
            SendFlags::default(),
            Arc::new(EchoStats::default()),
        )
    }

    #[test]
    fn test_echo_reply() {
        let context = RecordingContext::new();
        let mut actor = echo_for(&context);

        actor.on_message(&InboundMessage::new(7, 3, vec![1u8, 2, 3]));

        let sent = context.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, 7);
        assert_eq!(sent[0].msg_type, 4);
        assert_eq!(sent[0].payload, Bytes::from_static(&[1, 2, 3]));
        assert!(sent[0].flags.discard_on_failure);
        assert_eq!(*context.release_requests.lock(), 0);
        assert_eq!(actor.stats().replies_sent(), 1);
    }

    #[test]
    fn test_sentinel_requests_release_after_reply() {
        let context = RecordingContext::new();
        let mut actor = echo_for(&context);

        actor.on_message(&InboundMessage::new(7, 5, vec![99u8, 99]));

        assert_eq!(context.sent.lock()[0].msg_type, 6);
        assert_eq!(*context.release_requests.lock(), 1);
    }

    #[test]
    fn test_send_failure_does_not_suppress_sentinel() {
        let context = RecordingContext::with_failing_sends(true);
        let mut actor = echo_for(&context);

        actor.on_message(&InboundMessage::new(7, 5, vec![1u8]));
        actor.on_message(&InboundMessage::new(7, 5, vec![99u8, 99]));

        let stats = actor.stats();
        assert_eq!(stats.send_failures(), 2);
        assert_eq!(stats.replies_sent(), 0);
        assert_eq!(*context.release_requests.lock(), 1);
    }

    #[test]
    fn test_near_sentinels_ignored() {
        let context = RecordingContext::new();
        let mut actor = echo_for(&context);

        for payload in [vec![], vec![99u8], vec![99, 98], vec![99, 99, 99]] {
            actor.on_message(&InboundMessage::new(1, 1, payload));
        }

        assert_eq!(context.sent.lock().len(), 4);
        assert_eq!(*context.release_requests.lock(), 0);
    }

    #[test]
    fn test_wrapping_reply_type() {
        let context = RecordingContext::new();
        let mut actor = echo_for(&context);

        actor.on_message(&InboundMessage::new(1, i32::MAX, vec![0u8]));
        assert_eq!(context.sent.lock()[0].msg_type, i32::MIN);
    }

    #[test]
    fn test_context_gone_is_survivable() {
        let context = RecordingContext::new();
        let mut actor = echo_for(&context);
        drop(context);

        actor.on_message(&InboundMessage::new(7, 5, vec![99u8, 99]));
        assert_eq!(actor.stats().send_failures(), 1);
    }
}
