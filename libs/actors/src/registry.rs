//! Actor Registry
//!
//! Binds registration keys to actor factories at startup and resolves them
//! when the host asks for a new instance. Registration takes `&mut self`, so
//! the table is complete before it is shared with a host.

use crate::context::HostContextHandle;
use crate::error::{ActorError, Result};
use crate::instance::{ActorInstance, ExternalActor};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Actor flavor, determined by how it is keyed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorKind {
    /// External message handler, keyed by numeric type id
    Handler,
    /// External process, keyed by name
    Process,
}

/// Key under which a factory is registered
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegistrationKey {
    Handler(u32),
    Process(String),
}

impl RegistrationKey {
    pub fn process(name: impl Into<String>) -> Self {
        Self::Process(name.into())
    }

    pub fn kind(&self) -> ActorKind {
        match self {
            RegistrationKey::Handler(_) => ActorKind::Handler,
            RegistrationKey::Process(_) => ActorKind::Process,
        }
    }
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationKey::Handler(type_id) => write!(f, "handler {}", type_id),
            RegistrationKey::Process(name) => write!(f, "process {:?}", name),
        }
    }
}

impl From<u32> for RegistrationKey {
    fn from(type_id: u32) -> Self {
        Self::Handler(type_id)
    }
}

impl From<&str> for RegistrationKey {
    fn from(name: &str) -> Self {
        Self::Process(name.to_string())
    }
}

/// Factory producing a fresh actor for a host context
pub type ActorFactory =
    Box<dyn Fn(HostContextHandle) -> Result<Box<dyn ExternalActor>> + Send + Sync>;

/// Registration table mapping keys to factories
#[derive(Default)]
pub struct ActorRegistry {
    factories: HashMap<RegistrationKey, ActorFactory>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Bind `key` to `factory`. Fails if the key is already bound.
    pub fn register<F>(&mut self, key: impl Into<RegistrationKey>, factory: F) -> Result<()>
    where
        F: Fn(HostContextHandle) -> Result<Box<dyn ExternalActor>> + Send + Sync + 'static,
    {
        let key = key.into();
        if self.factories.contains_key(&key) {
            return Err(ActorError::already_registered(key));
        }

        info!(key = %key, kind = ?key.kind(), "Registering external actor");
        self.factories.insert(key, Box::new(factory));
        Ok(())
    }

    /// Register an external message handler under a numeric type id
    pub fn register_handler<F>(&mut self, type_id: u32, factory: F) -> Result<()>
    where
        F: Fn(HostContextHandle) -> Result<Box<dyn ExternalActor>> + Send + Sync + 'static,
    {
        self.register(RegistrationKey::Handler(type_id), factory)
    }

    /// Register an external process under a name
    pub fn register_process<F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn(HostContextHandle) -> Result<Box<dyn ExternalActor>> + Send + Sync + 'static,
    {
        self.register(RegistrationKey::Process(name.into()), factory)
    }

    /// Resolve `key` and create an instance bound to `context`
    pub fn create_instance(
        &self,
        key: &RegistrationKey,
        context: HostContextHandle,
    ) -> Result<ActorInstance> {
        let factory = self.factories.get(key).ok_or_else(|| {
            debug!(key = %key, "Lookup of unregistered key");
            ActorError::no_such_key(key.clone())
        })?;

        ActorInstance::create(key.clone(), context, |ctx| factory(ctx))
    }

    pub fn contains(&self, key: &RegistrationKey) -> bool {
        self.factories.contains_key(key)
    }

    /// Registered keys in sorted order
    pub fn keys(&self) -> Vec<RegistrationKey> {
        let mut keys: Vec<_> = self.factories.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ActorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
