//! Interop Core: callback-to-future adapter and error helpers
//!
//! Bridges a native host's callback-style API (`resolve`, `reject`, extra
//! arguments) into futures, tags errors by severity, and reports errors
//! with their stack trace or a substitute one.
//!
//! # Example
//!
//! ```ignore
//! use interop_core::{to_promise, log_error, TracingSink};
//!
//! let outcome = to_promise(|resolve, _reject, ()| {
//!     resolve.call(42);
//!     Ok(())
//! }, ()).await;
//!
//! if let Err(err) = &outcome {
//!     log_error(Some(err), &TracingSink);
//! }
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod report;
pub mod severity;
pub mod sink;
pub mod telemetry;

pub use adapter::{to_promise, InteropAdapter, InteropCall, Reject, Resolve};
pub use config::InteropConfig;
pub use error::{ErrorValue, InteropError};
pub use report::{log_error, report_lines, ErrorRef, Reportable};
pub use severity::{to_soft_error, ErrorRecord, Severity, Tagged};
pub use sink::{LogSink, MemorySink, TracingSink};
pub use telemetry::init_tracing;

/// Interop core version
pub const INTEROP_VERSION: &str = env!("CARGO_PKG_VERSION");
