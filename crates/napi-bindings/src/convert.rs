//! Conversions between JS error objects and core types
use interop_core::{ErrorRecord, ErrorValue, Tagged};

/// Error object as seen from JavaScript
#[napi(object)]
#[derive(Clone, Debug)]
pub struct JsInteropError {
    pub message: String,
    pub stack: Option<String>,
    pub soft: bool,
}

impl From<ErrorRecord> for JsInteropError {
    fn from(record: ErrorRecord) -> Self {
        Self {
            message: record.message,
            stack: record.stack,
            soft: record.soft,
        }
    }
}

impl From<JsInteropError> for ErrorRecord {
    fn from(js: JsInteropError) -> Self {
        Self {
            message: js.message,
            stack: js.stack,
            soft: js.soft,
        }
    }
}

impl From<Tagged<ErrorValue>> for JsInteropError {
    fn from(tagged: Tagged<ErrorValue>) -> Self {
        ErrorRecord::from(tagged).into()
    }
}

impl From<JsInteropError> for Tagged<ErrorValue> {
    fn from(js: JsInteropError) -> Self {
        ErrorRecord::from(js).into()
    }
}
