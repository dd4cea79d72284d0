//! Interop Adapter: callback-style host calls as futures
//!
//! A host function receives a [`Resolve`] handle, a [`Reject`] handle and its
//! extra arguments. It may settle right away, or hand the handles to another
//! thread or task and settle later. The returned [`InteropCall`] settles once.
//! The first outcome wins, and it always settles with a defined value:
//!
//! - `reject` without a value becomes [`InteropError::Fallback`]
//! - an `Err` return or a panic becomes [`InteropError::Thrown`]
//! - a missing function becomes [`InteropError::MissingFunction`]
//! - dropping every handle unsettled becomes [`InteropError::Abandoned`]

use crate::config::InteropConfig;
use crate::error::{ErrorValue, InteropError};
use crate::report::log_error;
use crate::sink::TracingSink;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use uuid::Uuid;

type Outcome<T> = Result<T, InteropError>;

struct Slot<T> {
    call_id: Uuid,
    tx: Mutex<Option<oneshot::Sender<Outcome<T>>>>,
    config: Arc<InteropConfig>,
}

impl<T> Slot<T> {
    fn settle(&self, outcome: Outcome<T>) -> bool {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(tx) = tx else {
            tracing::debug!(call_id = %self.call_id, "call already settled, ignoring");
            return false;
        };

        match &outcome {
            Ok(_) => tracing::debug!(call_id = %self.call_id, "interop call resolved"),
            Err(err) => {
                tracing::debug!(
                    call_id = %self.call_id,
                    category = err.category(),
                    "interop call rejected"
                );
                if self.config.log_rejections {
                    log_error(Some(err), &TracingSink);
                }
            }
        }

        // The future may already be dropped; the call is settled either way.
        let _ = tx.send(outcome);
        true
    }

    fn fallback(&self) -> ErrorValue {
        let value = ErrorValue::new(self.config.sentinel_message());
        let trace = Backtrace::capture();
        match trace.status() {
            BacktraceStatus::Captured => value.with_stack(trace.to_string()),
            _ => value,
        }
    }
}

/// Success callback handed to the host function.
pub struct Resolve<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Resolve<T> {
    /// Fulfill the call with `value`. Returns false if it was already settled.
    pub fn call(&self, value: T) -> bool {
        self.slot.settle(Ok(value))
    }

    pub fn call_id(&self) -> Uuid {
        self.slot.call_id
    }
}

impl<T> Clone for Resolve<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

/// Failure callback handed to the host function.
pub struct Reject<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Reject<T> {
    /// Reject the call. `None` substitutes the configured fallback error.
    /// Returns false if it was already settled.
    pub fn call(&self, reason: Option<ErrorValue>) -> bool {
        let err = match reason {
            Some(value) => InteropError::Rejected(value),
            None => InteropError::Fallback(self.slot.fallback()),
        };
        self.slot.settle(Err(err))
    }

    pub fn reject(&self, reason: impl Into<ErrorValue>) -> bool {
        self.call(Some(reason.into()))
    }

    pub fn call_id(&self) -> Uuid {
        self.slot.call_id
    }
}

impl<T> Clone for Reject<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

/// Pending outcome of an adapted call.
#[must_use = "an interop call does nothing observable unless awaited"]
pub struct InteropCall<T> {
    call_id: Uuid,
    rx: oneshot::Receiver<Outcome<T>>,
    log_rejections: bool,
}

impl<T> InteropCall<T> {
    pub fn call_id(&self) -> Uuid {
        self.call_id
    }
}

impl<T> Future for InteropCall<T> {
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => {
                tracing::warn!(
                    call_id = %self.call_id,
                    "interop callbacks dropped without settling"
                );
                let err = InteropError::Abandoned {
                    call_id: self.call_id,
                };
                if self.log_rejections {
                    log_error(Some(&err), &TracingSink);
                }
                Poll::Ready(Err(err))
            }
        }
    }
}

/// Adapts host functions using one shared configuration.
#[derive(Debug, Clone, Default)]
pub struct InteropAdapter {
    config: Arc<InteropConfig>,
}

impl InteropAdapter {
    pub fn new(config: InteropConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn from_env() -> Self {
        Self::new(InteropConfig::from_env())
    }

    pub fn config(&self) -> &InteropConfig {
        &self.config
    }

    /// Run `interop_fn` with fresh callbacks and return its pending outcome.
    pub fn call<T, A, F>(&self, interop_fn: F, args: A) -> InteropCall<T>
    where
        F: FnOnce(Resolve<T>, Reject<T>, A) -> anyhow::Result<()>,
    {
        self.call_optional(Some(interop_fn), args)
    }

    /// Like [`call`](Self::call), for a function that may not exist.
    pub fn call_optional<T, A, F>(&self, interop_fn: Option<F>, args: A) -> InteropCall<T>
    where
        F: FnOnce(Resolve<T>, Reject<T>, A) -> anyhow::Result<()>,
    {
        let call_id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Slot {
            call_id,
            tx: Mutex::new(Some(tx)),
            config: Arc::clone(&self.config),
        });
        let call = InteropCall {
            call_id,
            rx,
            log_rejections: self.config.log_rejections,
        };

        let _span = tracing::debug_span!("interop_call", %call_id).entered();

        let Some(interop_fn) = interop_fn else {
            tracing::warn!(%call_id, "interop function is undefined");
            slot.settle(Err(InteropError::MissingFunction));
            return call;
        };

        let resolve = Resolve {
            slot: Arc::clone(&slot),
        };
        let reject = Reject {
            slot: Arc::clone(&slot),
        };

        match panic::catch_unwind(AssertUnwindSafe(|| interop_fn(resolve, reject, args))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                slot.settle(Err(InteropError::Thrown(ErrorValue::from_error(&err))));
            }
            Err(payload) => {
                let fallback = self.config.sentinel_message();
                let value = ErrorValue::from_panic(payload.as_ref(), fallback);
                slot.settle(Err(InteropError::Thrown(value)));
            }
        }

        call
    }
}

/// Adapt `interop_fn` with the default configuration.
pub fn to_promise<T, A, F>(interop_fn: F, args: A) -> InteropCall<T>
where
    F: FnOnce(Resolve<T>, Reject<T>, A) -> anyhow::Result<()>,
{
    InteropAdapter::default().call(interop_fn, args)
}
