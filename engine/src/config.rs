//! Engine configuration
//!
//! Chosen by the host when the context is constructed. Nothing here changes
//! the word sequence of the permutation backend; it only selects the backend
//! and decides how misuse is reported.

use crate::error::RngError;
use serde::{Deserialize, Serialize};

/// Generator backing every stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Seekable, reproducible ChaCha8 block generator
    #[default]
    Permutation,
    /// Platform-style sequential generator; not seekable, not reproducible
    /// across restore
    Platform,
}

/// How invalid distribution parameters are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Return `ProgrammingError::InvalidRange`
    Strict,
    /// Log a warning and return the documented fallback value
    Lenient,
}

impl Default for Strictness {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Strictness::Strict
        } else {
            Strictness::Lenient
        }
    }
}

/// What happens when a budget's consumption exceeds its declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Log a warning only
    #[default]
    Warn,
    /// Finish the release, then return `ProgrammingError::BudgetOverflow`
    Reject,
}

/// Context construction parameters
///
/// # Example
/// ```
/// use stream_rng_core_rs::{BackendKind, OverflowPolicy, RngConfig};
///
/// let config = RngConfig::from_json(r#"{ "overflow_policy": "reject" }"#).unwrap();
/// assert_eq!(config.backend, BackendKind::Permutation);
/// assert_eq!(config.overflow_policy, OverflowPolicy::Reject);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RngConfig {
    pub backend: BackendKind,
    pub strictness: Strictness,
    pub overflow_policy: OverflowPolicy,
    /// Upper bound of the geometric factor used by `scaled_ratio`
    pub geometric_cap: i32,
}

impl Default for RngConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            strictness: Strictness::default(),
            overflow_policy: OverflowPolicy::default(),
            geometric_cap: 5,
        }
    }
}

impl RngConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, RngError> {
        let config: RngConfig = serde_json::from_str(json)
            .map_err(|e| RngError::InvalidConfig(format!("Config parse failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RngError> {
        if self.geometric_cap < 1 {
            return Err(RngError::InvalidConfig(format!(
                "geometric_cap must be at least 1, got {}",
                self.geometric_cap
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RngConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_full() {
        let config = RngConfig::from_json(
            r#"{
                "backend": "platform",
                "strictness": "lenient",
                "overflow_policy": "warn",
                "geometric_cap": 10
            }"#,
        )
        .unwrap();

        assert_eq!(config.backend, BackendKind::Platform);
        assert_eq!(config.strictness, Strictness::Lenient);
        assert_eq!(config.geometric_cap, 10);
    }

    #[test]
    fn test_from_json_rejects_zero_cap() {
        let result = RngConfig::from_json(r#"{ "geometric_cap": 0 }"#);
        assert!(matches!(result, Err(RngError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_json_rejects_unknown_backend() {
        let result = RngConfig::from_json(r#"{ "backend": "lcg" }"#);
        assert!(matches!(result, Err(RngError::InvalidConfig(_))));
    }
}
