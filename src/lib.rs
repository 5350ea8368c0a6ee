//! Process-local logging to a daily log file.
//!
//! A [`LogWriter`] appends one categorized, timestamped line per call to
//! `logs/YYYY_MM_DD.log` (or any path the caller picks), creating the
//! directory and file on demand. Failures never reach the caller; they are
//! reported on a fallback console stream.

pub mod categories;
pub mod config;
pub mod console;
pub mod errors;
pub mod log_paths;
pub mod trace;
pub mod writer;

pub use categories::{Category, CategoryRegistry};
pub use config::LogitConfig;
pub use console::{ConsoleSink, MemoryConsole, StdoutConsole};
pub use errors::WriteError;
pub use trace::trace_context;
pub use writer::{LogWriter, WriteOutcome};
