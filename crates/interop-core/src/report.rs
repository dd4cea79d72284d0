//! Error reporting: stack trace or a substitute.
use crate::error::{ErrorValue, InteropError};
use crate::severity::Tagged;
use crate::sink::LogSink;
use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// An error that may carry its own stack trace.
pub trait Reportable: fmt::Display {
    fn stack(&self) -> Option<&str> {
        None
    }
}

impl Reportable for ErrorValue {
    fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }
}

impl Reportable for InteropError {
    fn stack(&self) -> Option<&str> {
        self.value().and_then(|v| v.stack.as_deref())
    }
}

impl<E: Reportable> Reportable for Tagged<E> {
    fn stack(&self) -> Option<&str> {
        self.error.stack()
    }
}

impl Reportable for anyhow::Error {}

impl Reportable for std::io::Error {}

/// Makes any borrowed `std::error::Error` reportable. Its Display includes the source chain.
pub struct ErrorRef<'a>(pub &'a (dyn Error + 'a));

impl fmt::Display for ErrorRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(cause) = source {
            write!(f, ": {}", cause)?;
            source = cause.source();
        }
        Ok(())
    }
}

impl Reportable for ErrorRef<'_> {}

const UNPRINTABLE: &str = "<unprintable error>";

/// Lines `log_error` would emit for `error`.
///
/// With a stack, that is the stack alone. Without one, a diagnostic line
/// followed by a backtrace captured here.
pub fn report_lines(error: Option<&dyn Reportable>) -> Vec<String> {
    if let Some(stack) = error.and_then(|e| e.stack()) {
        return vec![stack.to_string()];
    }

    let shown = match error {
        Some(e) => panic::catch_unwind(AssertUnwindSafe(|| e.to_string()))
            .unwrap_or_else(|_| UNPRINTABLE.to_string()),
        None => "undefined".to_string(),
    };

    vec![
        format!("Error ({shown}) without stack trace, alternate stack trace follows:"),
        Backtrace::force_capture().to_string(),
    ]
}

/// Print an error's stack, or a substitute trace, to `sink`. Never panics.
pub fn log_error(error: Option<&dyn Reportable>, sink: &dyn LogSink) {
    for line in report_lines(error) {
        sink.error(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::to_soft_error;
    use crate::sink::MemorySink;

    struct Exploding;

    impl fmt::Display for Exploding {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            panic!("display exploded")
        }
    }

    impl Reportable for Exploding {}

    #[test]
    fn test_stack_is_printed_verbatim() {
        let stack = "Error: boom\n    at load (hud.js:10:3)";
        let e = ErrorValue::new("boom").with_stack(stack);
        let sink = MemorySink::new();
        log_error(Some(&e), &sink);
        assert_eq!(sink.lines(), vec![stack.to_string()]);
    }

    #[test]
    fn test_missing_stack_gets_substitute() {
        let e = ErrorValue::new("no trace here");
        let lines = report_lines(Some(&e));
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Error (no trace here) without stack trace, alternate stack trace follows:"
        );
        assert!(!lines[1].is_empty());
    }

    #[test]
    fn test_absent_error_is_undefined() {
        let lines = report_lines(None);
        assert!(lines[0].starts_with("Error (undefined) without stack trace"));
    }

    #[test]
    fn test_interop_error_without_value() {
        let lines = report_lines(Some(&InteropError::MissingFunction));
        assert!(lines[0].contains("MISSING/interop function is undefined"));
    }

    #[test]
    fn test_tagged_uses_inner_stack() {
        let tagged = to_soft_error(ErrorValue::new("x").with_stack("trace"));
        assert_eq!(report_lines(Some(&tagged)), vec!["trace".to_string()]);
    }

    #[test]
    fn test_anyhow_error_is_reportable() {
        let err = anyhow::anyhow!("engine interop lost");
        let sink = MemorySink::new();
        log_error(Some(&err), &sink);
        assert!(sink.lines()[0].starts_with("Error (engine interop lost) without stack trace"));
    }

    #[test]
    fn test_io_error_is_reportable() {
        let err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let lines = report_lines(Some(&err));
        assert!(lines[0].contains("(pipe closed)"));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("drawing interop failed")]
    struct DrawFailed(#[source] std::io::Error);

    #[test]
    fn test_error_ref_includes_sources() {
        let err = DrawFailed(std::io::Error::new(std::io::ErrorKind::Other, "pipe closed"));
        let wrapped = ErrorRef(&err);
        assert_eq!(wrapped.to_string(), "drawing interop failed: pipe closed");

        let lines = report_lines(Some(&wrapped));
        assert!(lines[0].contains("(drawing interop failed: pipe closed)"));
    }

    #[test]
    fn test_panicking_display_does_not_escape() {
        let sink = MemorySink::new();
        log_error(Some(&Exploding), &sink);
        assert!(sink.lines()[0].contains(UNPRINTABLE));
    }
}
