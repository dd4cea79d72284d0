#[macro_use]
extern crate napi_derive;

pub mod convert;
pub mod promise;

use convert::JsInteropError;
use interop_core::{
    init_tracing, log_error as core_log_error, report_lines, to_soft_error as core_to_soft_error,
    ErrorValue, InteropConfig, Reportable, Tagged, TracingSink,
};
use serde_json::Value;

#[napi]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Turn any rejection value into an error object.
///
/// `null` and `undefined` become the configured fallback error.
#[napi]
pub fn normalize_rejection(value: Option<Value>) -> JsInteropError {
    let error = ErrorValue::normalize(value.as_ref(), &InteropConfig::from_env());
    Tagged::hard(error).into()
}

/// Copy of `error` marked soft
#[napi]
pub fn to_soft_error(error: JsInteropError) -> JsInteropError {
    let tagged: Tagged<ErrorValue> = error.into();
    core_to_soft_error(tagged.into_inner()).into()
}

/// Lines `logError` would print for `error`
#[napi]
pub fn error_report(error: Option<JsInteropError>) -> Vec<String> {
    let tagged = error.map(Tagged::<ErrorValue>::from);
    report_lines(tagged.as_ref().map(|t| t as &dyn Reportable))
}

#[napi]
pub fn log_error(error: Option<JsInteropError>) {
    init_tracing();
    let tagged = error.map(Tagged::<ErrorValue>::from);
    core_log_error(tagged.as_ref().map(|t| t as &dyn Reportable), &TracingSink);
}
