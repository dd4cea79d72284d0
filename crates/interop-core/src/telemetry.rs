//! Tracing bootstrap for hosts that have no subscriber of their own.

/// Install a stderr fmt subscriber. Later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
