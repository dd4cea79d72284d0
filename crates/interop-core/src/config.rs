//! Adapter configuration
use serde::{Deserialize, Serialize};

pub const DEFAULT_FALLBACK_MESSAGE: &str = "interop call rejected without an error value";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteropConfig {
    /// Message of the sentinel used when reject is called without a value
    pub fallback_message: String,
    /// Report every rejection through tracing as well
    pub log_rejections: bool,
}

impl Default for InteropConfig {
    fn default() -> Self {
        Self {
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            log_rejections: false,
        }
    }
}

impl InteropConfig {
    /// Message for sentinel errors. A blank configured message falls back to the default.
    pub fn sentinel_message(&self) -> &str {
        if self.fallback_message.trim().is_empty() {
            DEFAULT_FALLBACK_MESSAGE
        } else {
            &self.fallback_message
        }
    }

    /// Defaults overridden by `INTEROP_FALLBACK_MESSAGE` and `INTEROP_LOG_REJECTIONS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(msg) = lookup("INTEROP_FALLBACK_MESSAGE").filter(|m| !m.trim().is_empty()) {
            config.fallback_message = msg;
        }
        if let Some(flag) = lookup("INTEROP_LOG_REJECTIONS") {
            let flag = flag.trim().to_ascii_lowercase();
            config.log_rejections = matches!(flag.as_str(), "1" | "true");
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        assert_eq!(InteropConfig::from_lookup(lookup(&[])), InteropConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = InteropConfig::from_lookup(lookup(&[
            ("INTEROP_FALLBACK_MESSAGE", "host call failed"),
            ("INTEROP_LOG_REJECTIONS", "TRUE"),
        ]));
        assert_eq!(config.fallback_message, "host call failed");
        assert!(config.log_rejections);
    }

    #[test]
    fn test_blank_message_is_ignored() {
        let config = InteropConfig::from_lookup(lookup(&[
            ("INTEROP_FALLBACK_MESSAGE", "  "),
            ("INTEROP_LOG_REJECTIONS", "no"),
        ]));
        assert_eq!(config.fallback_message, DEFAULT_FALLBACK_MESSAGE);
        assert!(!config.log_rejections);
    }

    #[test]
    fn test_blank_sentinel_uses_default() {
        let config: InteropConfig = serde_json::from_str(r#"{"fallback_message":"  "}"#).unwrap();
        assert_eq!(config.sentinel_message(), DEFAULT_FALLBACK_MESSAGE);

        let config = InteropConfig {
            fallback_message: "host call failed".to_string(),
            ..InteropConfig::default()
        };
        assert_eq!(config.sentinel_message(), "host call failed");
    }

    #[test]
    fn test_deserialize_partial() {
        let config: InteropConfig = serde_json::from_str(r#"{"log_rejections":true}"#).unwrap();
        assert!(config.log_rejections);
        assert_eq!(config.fallback_message, DEFAULT_FALLBACK_MESSAGE);
    }
}
