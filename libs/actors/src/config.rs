//! Host Configuration
//!
//! Limits applied by [`crate::LocalHost`]. Loaded from TOML; every field has
//! a default so an empty file is valid.

use crate::error::{ActorError, Result};
use crate::messages::{SendFlags, DEFAULT_MAX_PAYLOAD_LEN};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    /// Live instance slots; spawning beyond this fails allocation
    pub max_instances: usize,

    /// Largest inbound payload accepted by `deliver`
    pub max_payload_len: usize,

    /// Replies held before sends start failing
    pub outbox_capacity: usize,

    /// Flag passed with echo replies
    pub reply_discard_on_failure: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_instances: 64,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            outbox_capacity: 1024,
            reply_discard_on_failure: true,
        }
    }
}

impl HostConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: HostConfig = toml::from_str(contents)
            .map_err(|e| ActorError::configuration(format!("Invalid TOML: {}", e), None))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading host config from {:?}", path);
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ActorError::configuration(format!("Failed to read {}: {}", path.display(), e), None)
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_instances == 0 {
            return Err(ActorError::configuration(
                "max_instances must be greater than zero",
                Some("max_instances"),
            ));
        }
        if self.max_payload_len == 0 {
            return Err(ActorError::configuration(
                "max_payload_len must be greater than zero",
                Some("max_payload_len"),
            ));
        }
        if self.outbox_capacity == 0 {
            return Err(ActorError::configuration(
                "outbox_capacity must be greater than zero",
                Some("outbox_capacity"),
            ));
        }
        Ok(())
    }

    pub fn reply_flags(&self) -> SendFlags {
        SendFlags {
            discard_on_failure: self.reply_discard_on_failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = HostConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_payload_len, 65536);
        assert!(config.reply_flags().discard_on_failure);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(HostConfig::from_toml_str("").unwrap(), HostConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = HostConfig::from_toml_str(
            r#"
            max_instances = 2
            reply_discard_on_failure = false
            "#,
        )
        .unwrap();

        assert_eq!(config.max_instances, 2);
        assert_eq!(config.outbox_capacity, 1024);
        assert!(!config.reply_flags().discard_on_failure);
    }

    #[test]
    fn test_zero_limits_rejected() {
        let err = HostConfig::from_toml_str("outbox_capacity = 0").unwrap_err();
        match err {
            ActorError::Configuration { field, .. } => {
                assert_eq!(field.as_deref(), Some("outbox_capacity"));
            }
            other => panic!("Expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_toml() {
        let err = HostConfig::from_toml_str("max_instances = \"many\"").unwrap_err();
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_payload_len = 16").unwrap();

        let config = HostConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_payload_len, 16);

        assert!(HostConfig::from_file("/nonexistent/host.toml").is_err());
    }
}
