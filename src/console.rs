//! Fallback console stream.
//!
//! Diagnostics that cannot go to the log file (directory or open failures,
//! unknown categories) are written here instead.

use std::sync::{Arc, Mutex, PoisonError};

/// A destination for single-line diagnostics.
pub trait ConsoleSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Prints each diagnostic line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl ConsoleSink for StdoutConsole {
    fn emit(&self, line: &str) {
        println!("{}", line);
    }
}

/// Keeps diagnostics in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryConsole {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every line emitted so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ConsoleSink for MemoryConsole {
    fn emit(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}
