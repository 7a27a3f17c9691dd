//! Actor Error Types
//!
//! Error handling for registration, instance lifecycle and host delivery
//! failures. Only allocation failure is fatal to an instance; everything else
//! is reported to the caller and recovered locally.

use crate::instance::LifecycleState;
use crate::registry::RegistrationKey;
use crate::context::ContextId;
use thiserror::Error;

/// Main actor error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActorError {
    /// Key already bound to a factory
    #[error("Registration error: {key} is already registered")]
    AlreadyRegistered { key: RegistrationKey },

    /// Lookup of an unregistered key
    #[error("Registration error: no factory registered for {key}")]
    NoSuchKey { key: RegistrationKey },

    /// Instance-local state could not be allocated
    #[error("Allocation failed for {key}: {reason}")]
    AllocationFailed { key: RegistrationKey, reason: String },

    /// Reply delivery failed
    #[error("Send to {recipient} failed: {reason}")]
    SendFailed { recipient: i32, reason: String },

    /// Lifecycle operation invoked in the wrong state
    #[error("Invalid lifecycle transition: {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: LifecycleState,
    },

    /// Host has no live instance bound to this context
    #[error("No live instance for context {context}")]
    NoSuchInstance { context: ContextId },

    /// Host context dropped while a handle was still in use
    #[error("Host context is gone")]
    ContextGone,

    /// Inbound payload exceeds the configured bound
    #[error("Payload of {len} bytes exceeds limit of {max} bytes")]
    PayloadTooLarge { len: usize, max: usize },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },
}

/// Result type alias for actor operations
pub type Result<T> = std::result::Result<T, ActorError>;

impl ActorError {
    pub fn already_registered(key: RegistrationKey) -> Self {
        Self::AlreadyRegistered { key }
    }

    pub fn no_such_key(key: RegistrationKey) -> Self {
        Self::NoSuchKey { key }
    }

    /// Create an allocation failure for the given key
    pub fn allocation_failed(key: RegistrationKey, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            key,
            reason: reason.into(),
        }
    }

    /// Create a send failure
    pub fn send_failed(recipient: i32, reason: impl Into<String>) -> Self {
        Self::SendFailed {
            recipient,
            reason: reason.into(),
        }
    }

    pub fn invalid_state(operation: &'static str, state: LifecycleState) -> Self {
        Self::InvalidState { operation, state }
    }

    pub fn no_such_instance(context: ContextId) -> Self {
        Self::NoSuchInstance { context }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>, field: Option<&str>) -> Self {
        Self::Configuration {
            message: message.into(),
            field: field.map(|s| s.to_string()),
        }
    }

    /// Whether this error permanently prevents the instance from activating
    pub fn is_fatal_to_instance(&self) -> bool {
        matches!(self, ActorError::AllocationFailed { .. })
    }

    /// Get error category for metrics
    pub fn category(&self) -> &'static str {
        match self {
            ActorError::AlreadyRegistered { .. } => "already_registered",
            ActorError::NoSuchKey { .. } => "no_such_key",
            ActorError::AllocationFailed { .. } => "allocation_failed",
            ActorError::SendFailed { .. } => "send_failed",
            ActorError::InvalidState { .. } => "invalid_state",
            ActorError::NoSuchInstance { .. } => "no_such_instance",
            ActorError::ContextGone => "context_gone",
            ActorError::PayloadTooLarge { .. } => "payload_too_large",
            ActorError::Configuration { .. } => "configuration",
        }
    }
}
