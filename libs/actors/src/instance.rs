//! Actor Instance Lifecycle
//!
//! State machine wrapping one external actor:
//!
//! ```text
//! Uninitialized ──create──▶ Created ──activate──▶ Active ──release──▶ Released
//!                              │                                        ▲
//!                              └────────────────release─────────────────┘
//! ```
//!
//! `on_message` is only accepted while `Active`. `release` hands the boxed
//! actor to [`ExternalActor::on_release`], which consumes it, so no state is
//! reachable afterwards. Allocation failure during `create` yields no
//! instance at all; there is nothing to deliver to and nothing to release.

use crate::context::{ContextId, HostContextHandle};
use crate::error::{ActorError, Result};
use crate::messages::InboundMessage;
use crate::registry::{ActorKind, RegistrationKey};
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Behavior implemented per actor kind
pub trait ExternalActor: Send + 'static {
    /// Handle one inbound message. Failures are handled locally.
    fn on_message(&mut self, message: &InboundMessage);

    /// Called exactly once when the host releases the actor
    fn on_release(self: Box<Self>) {}

    fn name(&self) -> &str;
}

/// Lifecycle state of an actor instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Uninitialized,
    Created,
    Active,
    Released,
}

impl LifecycleState {
    pub fn accepts_messages(self) -> bool {
        self == LifecycleState::Active
    }

    pub fn can_release(self) -> bool {
        matches!(self, LifecycleState::Created | LifecycleState::Active)
    }
}

/// One live external actor bound to a host context
pub struct ActorInstance {
    key: RegistrationKey,
    context: HostContextHandle,
    state: LifecycleState,
    actor: Option<Box<dyn ExternalActor>>,
    messages_handled: u64,
    created_at: Instant,
}

impl ActorInstance {
    /// Allocate actor-local state through `factory` and bind it to `context`
    pub fn create<F>(key: RegistrationKey, context: HostContextHandle, factory: F) -> Result<Self>
    where
        F: FnOnce(HostContextHandle) -> Result<Box<dyn ExternalActor>>,
    {
        let context_id = context.id();
        let actor = factory(context.clone()).map_err(|e| {
            let err = if e.is_fatal_to_instance() {
                e
            } else {
                ActorError::allocation_failed(key.clone(), e.to_string())
            };
            error!(
                key = %key,
                context_id = %context_id,
                error = %err,
                "Unable to allocate actor state"
            );
            err
        })?;

        info!(
            key = %key,
            context_id = %context_id,
            actor = actor.name(),
            "Actor instance created"
        );

        Ok(Self {
            key,
            context,
            state: LifecycleState::Created,
            actor: Some(actor),
            messages_handled: 0,
            created_at: Instant::now(),
        })
    }

    /// Mark callbacks as bound so the host may start delivering messages
    pub fn activate(&mut self) -> Result<()> {
        if self.state != LifecycleState::Created {
            return Err(ActorError::invalid_state("activate", self.state));
        }
        self.state = LifecycleState::Active;
        debug!(context_id = %self.context.id(), "Actor instance active");
        Ok(())
    }

    /// Deliver one message to the actor
    pub fn on_message(&mut self, message: &InboundMessage) -> Result<()> {
        if !self.state.accepts_messages() {
            warn!(
                context_id = %self.context.id(),
                state = ?self.state,
                sender = message.sender,
                "Rejecting message outside active state"
            );
            return Err(ActorError::invalid_state("on_message", self.state));
        }

        let actor = self
            .actor
            .as_mut()
            .ok_or(ActorError::invalid_state("on_message", self.state))?;

        debug!(
            context_id = %self.context.id(),
            sender = message.sender,
            msg_type = message.msg_type,
            payload_len = message.len(),
            "Delivering message"
        );
        actor.on_message(message);
        self.messages_handled += 1;
        Ok(())
    }

    /// Tear the actor down and free its state
    pub fn release(&mut self) -> Result<()> {
        if !self.state.can_release() {
            return Err(ActorError::invalid_state("release", self.state));
        }

        self.state = LifecycleState::Released;
        if let Some(actor) = self.actor.take() {
            actor.on_release();
        }

        info!(
            key = %self.key,
            context_id = %self.context.id(),
            messages_handled = self.messages_handled,
            lifetime_ms = self.created_at.elapsed().as_millis(),
            "Actor instance released"
        );
        Ok(())
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn key(&self) -> &RegistrationKey {
        &self.key
    }

    pub fn kind(&self) -> ActorKind {
        self.key.kind()
    }

    pub fn context_id(&self) -> ContextId {
        self.context.id()
    }

    pub fn messages_handled(&self) -> u64 {
        self.messages_handled
    }
}

impl fmt::Debug for ActorInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorInstance")
            .field("key", &self.key)
            .field("context", &self.context)
            .field("state", &self.state)
            .field("messages_handled", &self.messages_handled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::RecordingContext;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingActor {
        messages: Arc<AtomicUsize>,
        releases: Arc<AtomicUsize>,
    }

    impl ExternalActor for CountingActor {
        fn on_message(&mut self, _message: &InboundMessage) {
            self.messages.fetch_add(1, Ordering::SeqCst);
        }

        fn on_release(self: Box<Self>) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn counting_instance() -> (ActorInstance, Arc<AtomicUsize>, Arc<AtomicUsize>, Arc<RecordingContext>) {
        let messages = Arc::new(AtomicUsize::new(0));
        let releases = Arc::new(AtomicUsize::new(0));
        let context = RecordingContext::new();
        let (m, r) = (messages.clone(), releases.clone());
        let instance = ActorInstance::create(
            RegistrationKey::Handler(1),
            HostContextHandle::new(&context),
            move |_| {
                Ok(Box::new(CountingActor {
                    messages: m,
                    releases: r,
                }) as Box<dyn ExternalActor>)
            },
        )
        .unwrap();
        (instance, messages, releases, context)
    }

    #[test]
    fn test_full_lifecycle() {
        let (mut instance, messages, releases, _context) = counting_instance();
        assert_eq!(instance.state(), LifecycleState::Created);

        instance.activate().unwrap();
        assert_eq!(instance.state(), LifecycleState::Active);

        let msg = InboundMessage::new(7, 3, vec![1u8, 2, 3]);
        instance.on_message(&msg).unwrap();
        instance.on_message(&msg).unwrap();
        assert_eq!(messages.load(Ordering::SeqCst), 2);
        assert_eq!(instance.messages_handled(), 2);

        instance.release().unwrap();
        assert_eq!(instance.state(), LifecycleState::Released);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_message_rejected_before_activation() {
        let (mut instance, messages, _releases, _context) = counting_instance();
        let msg = InboundMessage::new(7, 3, vec![1u8]);

        assert_eq!(
            instance.on_message(&msg),
            Err(ActorError::invalid_state("on_message", LifecycleState::Created))
        );
        assert_eq!(messages.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_release_from_created() {
        let (mut instance, _messages, releases, _context) = counting_instance();
        instance.release().unwrap();
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert!(instance.activate().is_err());
    }

    #[test]
    fn test_release_at_most_once() {
        let (mut instance, messages, releases, _context) = counting_instance();
        instance.activate().unwrap();
        instance.release().unwrap();

        assert_eq!(
            instance.release(),
            Err(ActorError::invalid_state("release", LifecycleState::Released))
        );
        assert!(instance.on_message(&InboundMessage::new(1, 1, vec![0u8])).is_err());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(messages.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_activate_twice_rejected() {
        let (mut instance, _messages, _releases, _context) = counting_instance();
        instance.activate().unwrap();
        assert_eq!(
            instance.activate(),
            Err(ActorError::invalid_state("activate", LifecycleState::Active))
        );
    }

    #[test]
    fn test_factory_failure_yields_allocation_error() {
        let context = RecordingContext::new();
        let key = RegistrationKey::Process("broken".to_string());

        let result = ActorInstance::create(key.clone(), HostContextHandle::new(&context), |_| {
            Err(ActorError::ContextGone)
        });

        match result {
            Err(ActorError::AllocationFailed { key: failed, .. }) => assert_eq!(failed, key),
            other => panic!("Expected allocation failure, got {:?}", other),
        }
    }
}
