//! Configuration types.
//!
//! Configuration is built once at process start and passed into the
//! pipeline constructor. There is no ambient global state.

use crate::error::ConfigError;
use crate::mapping::ForwardMap;

/// Forwarder configuration.
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Prepended to the Subject of every forwarded copy when non-empty.
    pub subject_prefix: String,
    /// Treat `user+tag@domain` as `user@domain` for rule matching.
    pub allow_plus_sign: bool,
    /// Rule key → destination list.
    pub mapping: ForwardMap,
}

impl ForwarderConfig {
    /// Config with default flags (empty prefix, plus-addressing enabled).
    pub fn new(mapping: ForwardMap) -> Self {
        Self {
            subject_prefix: String::new(),
            allow_plus_sign: true,
            mapping,
        }
    }

    /// Build config from environment variables.
    ///
    /// - `REMAIL_MAPPING` (required): JSON object of rule → destinations
    /// - `REMAIL_SUBJECT_PREFIX` (default empty)
    /// - `REMAIL_ALLOW_PLUS_SIGN` (default true)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mapping_json = std::env::var("REMAIL_MAPPING")
            .map_err(|_| ConfigError::MissingEnvVar("REMAIL_MAPPING".into()))?;
        let mapping: ForwardMap =
            serde_json::from_str(&mapping_json).map_err(|e| ConfigError::InvalidValue {
                key: "REMAIL_MAPPING".into(),
                message: e.to_string(),
            })?;

        let subject_prefix = std::env::var("REMAIL_SUBJECT_PREFIX").unwrap_or_default();

        let allow_plus_sign = match std::env::var("REMAIL_ALLOW_PLUS_SIGN") {
            Err(_) => true,
            Ok(v) => v
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "REMAIL_ALLOW_PLUS_SIGN".into(),
                    message: format!("expected true or false, got {v:?}"),
                })?,
        };

        Ok(Self {
            subject_prefix,
            allow_plus_sign,
            mapping,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_original_defaults() {
        let config = ForwarderConfig::new(ForwardMap::default());
        assert_eq!(config.subject_prefix, "");
        assert!(config.allow_plus_sign);
        assert!(config.mapping.is_empty());
    }
}
