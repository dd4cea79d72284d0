//! Unified Error Model
use crate::config::InteropConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// A failure value handed across the interop boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorValue {
    /// Human-readable message
    pub message: String,

    /// Stack trace text, if the producer captured one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorValue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Normalize an arbitrary rejection value.
    ///
    /// Returns `None` for `null`, which is the "no error supplied" case.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self::new(s.clone())),
            Value::Object(map) => {
                let message = map.get("message").and_then(Value::as_str);
                let stack = map.get("stack").and_then(Value::as_str);
                if message.is_none() && stack.is_none() {
                    return Some(Self::new(value.to_string()));
                }
                Some(Self {
                    message: message.unwrap_or_default().to_string(),
                    stack: stack.map(str::to_string),
                })
            }
            other => Some(Self::new(other.to_string())),
        }
    }

    /// Normalize a rejection value, substituting the sentinel error when it is absent.
    pub fn normalize(value: Option<&Value>, config: &InteropConfig) -> Self {
        value
            .and_then(Self::from_json)
            .unwrap_or_else(|| Self::new(config.sentinel_message()))
    }

    /// Message of an error returned by the wrapped function, cause chain included.
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }

    /// Message of a caught panic payload.
    pub fn from_panic(payload: &(dyn Any + Send), fallback: &str) -> Self {
        if let Some(s) = payload.downcast_ref::<&str>() {
            Self::new(*s)
        } else if let Some(s) = payload.downcast_ref::<String>() {
            Self::new(s.clone())
        } else {
            Self::new(fallback)
        }
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<&str> for ErrorValue {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ErrorValue {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Why an adapted call rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InteropError {
    #[error("REJECTED/{0}")]
    Rejected(ErrorValue),

    #[error("THROWN/{0}")]
    Thrown(ErrorValue),

    #[error("FALLBACK/{0}")]
    Fallback(ErrorValue),

    #[error("MISSING/interop function is undefined")]
    MissingFunction,

    #[error("ABANDONED/call {call_id} dropped its callbacks without settling")]
    Abandoned { call_id: Uuid },
}

impl InteropError {
    /// The carried error value, if this variant has one.
    pub fn value(&self) -> Option<&ErrorValue> {
        match self {
            Self::Rejected(v) | Self::Thrown(v) | Self::Fallback(v) => Some(v),
            Self::MissingFunction | Self::Abandoned { .. } => None,
        }
    }

    /// Short category label, as used in the Display prefix.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "REJECTED",
            Self::Thrown(_) => "THROWN",
            Self::Fallback(_) => "FALLBACK",
            Self::MissingFunction => "MISSING",
            Self::Abandoned { .. } => "ABANDONED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_null_is_absent() {
        assert_eq!(ErrorValue::from_json(&Value::Null), None);
    }

    #[test]
    fn test_from_json_error_like_object() {
        let v = json!({ "message": "boom", "stack": "Error: boom\n    at f (a.js:1:1)" });
        let e = ErrorValue::from_json(&v).unwrap();
        assert_eq!(e.message, "boom");
        assert_eq!(e.stack.as_deref(), Some("Error: boom\n    at f (a.js:1:1)"));
    }

    #[test]
    fn test_from_json_plain_values() {
        assert_eq!(ErrorValue::from_json(&json!("nope")).unwrap().message, "nope");
        assert_eq!(ErrorValue::from_json(&json!(404)).unwrap().message, "404");
        assert_eq!(
            ErrorValue::from_json(&json!({ "code": 7 })).unwrap().message,
            r#"{"code":7}"#
        );
    }

    #[test]
    fn test_normalize_absent_values() {
        let config = InteropConfig::default();
        let expected = ErrorValue::new(config.sentinel_message());
        assert_eq!(ErrorValue::normalize(None, &config), expected);
        assert_eq!(ErrorValue::normalize(Some(&Value::Null), &config), expected);
    }

    #[test]
    fn test_normalize_present_values() {
        let config = InteropConfig::default();
        assert_eq!(
            ErrorValue::normalize(Some(&json!("texture missing")), &config),
            ErrorValue::new("texture missing")
        );

        let error_like = json!({ "message": "boom", "stack": "Error: boom\n    at hud.js:1:1" });
        assert_eq!(
            ErrorValue::normalize(Some(&error_like), &config),
            ErrorValue::new("boom").with_stack("Error: boom\n    at hud.js:1:1")
        );
    }

    #[test]
    fn test_normalize_blank_config_still_has_message() {
        let config = InteropConfig {
            fallback_message: String::new(),
            ..InteropConfig::default()
        };
        assert!(!ErrorValue::normalize(None, &config).message.is_empty());
    }

    #[test]
    fn test_from_panic_payloads() {
        let p: Box<dyn Any + Send> = Box::new("static boom");
        assert_eq!(ErrorValue::from_panic(p.as_ref(), "fb").message, "static boom");

        let p: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(ErrorValue::from_panic(p.as_ref(), "fb").message, "owned boom");

        let p: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(ErrorValue::from_panic(p.as_ref(), "fb").message, "fb");
    }

    #[test]
    fn test_display_uses_category_prefix() {
        let err = InteropError::Rejected(ErrorValue::new("denied"));
        assert_eq!(err.to_string(), "REJECTED/denied");
        assert_eq!(err.category(), "REJECTED");
        assert_eq!(InteropError::MissingFunction.value(), None);
    }
}
