//! Local Host Runtime
//!
//! In-process implementation of the host side of the actor contract. The
//! registry is injected at construction; each spawned instance gets its own
//! host context and its own mutex, so calls for one instance are strictly
//! sequential even when the host is shared across threads.
//!
//! # Lock Ordering
//!
//! 1. `instances` (read or write)
//! 2. per-instance `Mutex<ActorInstance>`
//! 3. `outbox` / `release_queue`
//!
//! The `instances` lock is dropped before an instance mutex is taken on the
//! delivery path. Actors only reach level 3 locks through their context.

use crate::config::HostConfig;
use crate::context::{ContextId, HostContext, HostContextHandle};
use crate::error::{ActorError, Result};
use crate::instance::{ActorInstance, LifecycleState};
use crate::messages::{InboundMessage, MessageType, OutboundMessage, SendFlags, SenderId};
use crate::metrics::{LifecycleMetrics, LifecycleStats};
use crate::registry::{ActorRegistry, RegistrationKey};
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// State reachable from every context handed out by one host
#[derive(Debug)]
struct Mailroom {
    outbox: Mutex<VecDeque<OutboundMessage>>,
    outbox_capacity: usize,
    release_queue: Mutex<Vec<ContextId>>,
    metrics: Arc<LifecycleMetrics>,
}

/// Host context owned by [`LocalHost`] for a single instance
#[derive(Debug)]
struct LocalContext {
    id: ContextId,
    mailroom: Arc<Mailroom>,
}

impl HostContext for LocalContext {
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
        let mut outbox = self.mailroom.outbox.lock();
        if outbox.len() >= self.mailroom.outbox_capacity {
            self.mailroom.metrics.record_send(false);
            return Err(ActorError::send_failed(
                recipient,
                format!("outbox full ({} pending)", outbox.len()),
            ));
        }

        outbox.push_back(OutboundMessage {
            recipient,
            msg_type,
            payload,
            flags,
        });
        self.mailroom.metrics.record_send(true);
        Ok(())
    }

    fn request_release(&self) -> Result<()> {
        self.mailroom.metrics.record_release_request();
        let mut queue = self.mailroom.release_queue.lock();
        if !queue.contains(&self.id) {
            queue.push(self.id);
        }
        debug!(context_id = %self.id, "Release requested");
        Ok(())
    }
}

struct InstanceSlot {
    // Keeps the context alive; the instance only holds a weak handle
    _context: Arc<LocalContext>,
    instance: Mutex<ActorInstance>,
}

/// In-process host runtime driving registered external actors
pub struct LocalHost {
    registry: Arc<ActorRegistry>,
    config: HostConfig,
    instances: RwLock<HashMap<ContextId, Arc<InstanceSlot>>>,
    mailroom: Arc<Mailroom>,
    metrics: Arc<LifecycleMetrics>,
}

impl LocalHost {
    pub fn new(registry: Arc<ActorRegistry>, config: HostConfig) -> Result<Self> {
        config.validate()?;

        let metrics = Arc::new(LifecycleMetrics::default());
        let mailroom = Arc::new(Mailroom {
            outbox: Mutex::new(VecDeque::new()),
            outbox_capacity: config.outbox_capacity,
            release_queue: Mutex::new(Vec::new()),
            metrics: Arc::clone(&metrics),
        });

        info!(
            registered = registry.len(),
            max_instances = config.max_instances,
            "Local host ready"
        );

        Ok(Self {
            registry,
            config,
            instances: RwLock::new(HashMap::new()),
            mailroom,
            metrics,
        })
    }

    /// Create and activate a new instance for `key`
    pub fn spawn(&self, key: impl Into<RegistrationKey>) -> Result<ContextId> {
        let key = key.into();
        let mut instances = self.instances.write();

        if instances.len() >= self.config.max_instances {
            self.metrics.record_allocation_failure();
            let err = ActorError::allocation_failed(
                key,
                format!("all {} instance slots in use", self.config.max_instances),
            );
            error!(error = %err, "Unable to spawn actor");
            return Err(err);
        }

        let context = Arc::new(LocalContext {
            id: ContextId::new(),
            mailroom: Arc::clone(&self.mailroom),
        });

        let mut instance = self
            .registry
            .create_instance(&key, HostContextHandle::new(&context))
            .map_err(|e| {
                if e.is_fatal_to_instance() {
                    self.metrics.record_allocation_failure();
                }
                e
            })?;
        instance.activate()?;

        let id = context.id;
        instances.insert(
            id,
            Arc::new(InstanceSlot {
                _context: context,
                instance: Mutex::new(instance),
            }),
        );
        self.metrics.record_created();

        debug!(key = %key, context_id = %id, "Spawned actor");
        Ok(id)
    }

    /// Deliver one message to the instance bound to `context`
    pub fn deliver(
        &self,
        context: ContextId,
        sender: SenderId,
        msg_type: MessageType,
        payload: impl Into<Bytes>,
    ) -> Result<()> {
        self.deliver_message(context, InboundMessage::new(sender, msg_type, payload))
    }

    pub fn deliver_message(&self, context: ContextId, message: InboundMessage) -> Result<()> {
        if message.len() > self.config.max_payload_len {
            return Err(ActorError::PayloadTooLarge {
                len: message.len(),
                max: self.config.max_payload_len,
            });
        }

        let slot = self.slot(context)?;
        slot.instance.lock().on_message(&message)?;
        self.metrics.record_delivered();
        Ok(())
    }

    /// Release the instance bound to `context`. Succeeds at most once.
    pub fn release(&self, context: ContextId) -> Result<()> {
        let slot = self
            .instances
            .write()
            .remove(&context)
            .ok_or_else(|| ActorError::no_such_instance(context))?;

        slot.instance.lock().release()?;
        self.mailroom.release_queue.lock().retain(|id| *id != context);
        self.metrics.record_released();
        Ok(())
    }

    /// Release every instance that asked to be released
    pub fn process_release_requests(&self) -> Vec<ContextId> {
        let pending = std::mem::take(&mut *self.mailroom.release_queue.lock());
        let mut released = Vec::with_capacity(pending.len());

        for context in pending {
            match self.release(context) {
                Ok(()) => released.push(context),
                Err(e) => debug!(context_id = %context, error = %e, "Skipping release request"),
            }
        }
        released
    }

    /// Take all replies sent since the last drain
    pub fn drain_outbox(&self) -> Vec<OutboundMessage> {
        self.mailroom.outbox.lock().drain(..).collect()
    }

    pub fn pending_release_requests(&self) -> Vec<ContextId> {
        self.mailroom.release_queue.lock().clone()
    }

    /// Current state of an instance, or `None` once it is gone
    pub fn state(&self, context: ContextId) -> Option<LifecycleState> {
        self.instances
            .read()
            .get(&context)
            .map(|slot| slot.instance.lock().state())
    }

    pub fn live_instances(&self) -> Vec<ContextId> {
        let mut ids: Vec<_> = self.instances.read().keys().copied().collect();
        ids.sort();
        ids
    }

    /// Release every live instance. Returns how many were released.
    pub fn shutdown(&self) -> usize {
        let ids = self.live_instances();
        let mut released = 0;
        for context in ids {
            match self.release(context) {
                Ok(()) => released += 1,
                Err(e) => warn!(context_id = %context, error = %e, "Release during shutdown failed"),
            }
        }
        if released > 0 {
            info!(released, "Local host shut down");
        }
        released
    }

    pub fn registry(&self) -> &Arc<ActorRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<LifecycleMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn stats(&self) -> LifecycleStats {
        self.metrics.stats()
    }

    fn slot(&self, context: ContextId) -> Result<Arc<InstanceSlot>> {
        self.instances
            .read()
            .get(&context)
            .cloned()
            .ok_or_else(|| ActorError::no_such_instance(context))
    }
}

impl Drop for LocalHost {
    fn drop(&mut self) {
        if !self.instances.read().is_empty() {
            warn!("Local host dropped with live instances, releasing");
            self.shutdown();
        }
    }
}
