//! Tracing subscriber setup.

use std::io;

/// Install the fmt subscriber on stderr. Stdout is reserved for the build report.
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
