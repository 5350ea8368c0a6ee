//! Trace context: where a log call came from.
//!
//! Format: `<source-file>:<line> PID: <pid>`

use std::panic::Location;

/// Placeholder used when no source file is known.
const UNKNOWN_LOCATION: &str = "???";

/// Captures the caller's source location and the current process id.
///
/// ```rust,ignore
/// writer.write("info", "service started", &logit::trace_context());
/// ```
#[track_caller]
pub fn trace_context() -> String {
    let caller = Location::caller();
    format_trace(caller.file(), caller.line(), std::process::id())
}

pub fn format_trace(file: &str, line: u32, pid: u32) -> String {
    let file = if file.is_empty() {
        UNKNOWN_LOCATION
    } else {
        file
    };
    format!("{}:{} PID: {}", file, line, pid)
}
