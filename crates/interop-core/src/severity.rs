//! Severity tagging
//!
//! A soft error is advisorily non-fatal. Nothing in this crate enforces the
//! distinction; callers read it to decide how loudly to fail.

use crate::error::ErrorValue;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Hard,
    Soft,
}

/// An error paired with its severity. Always built fresh, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tagged<E> {
    pub error: E,
    pub severity: Severity,
}

impl<E> Tagged<E> {
    pub fn hard(error: E) -> Self {
        Self {
            error,
            severity: Severity::Hard,
        }
    }

    pub fn soft(error: E) -> Self {
        Self {
            error,
            severity: Severity::Soft,
        }
    }

    /// Same error, re-tagged as soft.
    pub fn into_soft(self) -> Self {
        Self::soft(self.error)
    }

    pub fn is_soft(&self) -> bool {
        self.severity == Severity::Soft
    }

    pub fn into_inner(self) -> E {
        self.error
    }

    pub fn map<F, U>(self, f: F) -> Tagged<U>
    where
        F: FnOnce(E) -> U,
    {
        Tagged {
            error: f(self.error),
            severity: self.severity,
        }
    }
}

impl<E: fmt::Display> fmt::Display for Tagged<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl<E: Error> Error for Tagged<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.error.source()
    }
}

/// Mark an error as soft.
pub fn to_soft_error<E>(error: E) -> Tagged<E> {
    Tagged::soft(error)
}

/// Flat error object with a `soft` flag, as plain-object consumers expect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default)]
    pub soft: bool,
}

impl From<Tagged<ErrorValue>> for ErrorRecord {
    fn from(tagged: Tagged<ErrorValue>) -> Self {
        let soft = tagged.is_soft();
        let ErrorValue { message, stack } = tagged.into_inner();
        Self {
            message,
            stack,
            soft,
        }
    }
}

impl From<ErrorRecord> for Tagged<ErrorValue> {
    fn from(record: ErrorRecord) -> Self {
        let error = ErrorValue {
            message: record.message,
            stack: record.stack,
        };
        if record.soft {
            Tagged::soft(error)
        } else {
            Tagged::hard(error)
        }
    }
}
