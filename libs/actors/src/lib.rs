//! External Actor Lifecycle
//!
//! Registration and lifecycle management for external actors driven by a
//! host runtime's messaging facility. An actor is created against a host
//! context, receives zero or more messages, may ask to be removed, and is
//! released exactly once.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐   create_instance   ┌─────────────────────┐
//! │    ActorRegistry     │────────────────────▶│    ActorInstance    │
//! │  handler 0 ─▶ fn     │                     │  Created ─▶ Active  │
//! │  "echo"    ─▶ fn     │                     │   ─▶ Released       │
//! └──────────────────────┘                     └──────────┬──────────┘
//!            ▲                                            │ weak
//!            │ Arc (injected)                             ▼
//! ┌──────────┴───────────┐    send / release   ┌─────────────────────┐
//! │      LocalHost       │◀────────────────────│     HostContext     │
//! │  outbox, releases    │                     │   (host-owned)      │
//! └──────────────────────┘                     └─────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust
//! use external_actors::{ActorRegistry, EchoActor, HostConfig, LocalHost, SendFlags};
//! use std::sync::Arc;
//!
//! let mut registry = ActorRegistry::new();
//! registry.register_handler(0, EchoActor::factory(SendFlags::default())).unwrap();
//!
//! let host = LocalHost::new(Arc::new(registry), HostConfig::default()).unwrap();
//! let ctx = host.spawn(0u32).unwrap();
//!
//! host.deliver(ctx, 7, 3, vec![1u8, 2, 3]).unwrap();
//! let reply = &host.drain_outbox()[0];
//! assert_eq!((reply.recipient, reply.msg_type), (7, 4));
//!
//! host.deliver(ctx, 7, 5, vec![99u8, 99]).unwrap();
//! assert_eq!(host.process_release_requests(), vec![ctx]);
//! ```

pub mod config;
pub mod context;
pub mod echo;
pub mod error;
pub mod host;
pub mod instance;
pub mod messages;
pub mod metrics;
pub mod registry;

pub use config::HostConfig;
pub use context::{ContextId, HostContext, HostContextHandle};
pub use echo::{EchoActor, EchoStats};
pub use error::{ActorError, Result};
pub use host::LocalHost;
pub use instance::{ActorInstance, ExternalActor, LifecycleState};
pub use messages::{
    is_release_sentinel, reply_type, InboundMessage, MessageType, OutboundMessage, SendFlags,
    SenderId, RELEASE_SENTINEL,
};
pub use metrics::{LifecycleMetrics, LifecycleStats};
pub use registry::{ActorFactory, ActorKind, ActorRegistry, RegistrationKey};
