//! Daily log file writer.
//!
//! Every call to [`LogWriter::write`] runs the full lifecycle on its own:
//! ensure the log directory, open the file for append, write one line, close.
//! No file handle outlives a call, so the file may be rotated or deleted
//! externally between writes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use logit::{trace_context, LogWriter};
//!
//! let writer = LogWriter::daily();
//! writer.write("info", "service started", &trace_context());
//! ```
//!
//! ## Log Format
//!
//! ```text
//! 2026/01/15 14:30:00 Info: service started on src/main.rs:12 PID: 4242
//! 2026/01/15 14:30:01 audit (non existent category) login on src/main.rs:20 PID: 4242
//! ```

use crate::categories::{Category, CategoryRegistry};
use crate::console::{ConsoleSink, StdoutConsole};
use crate::errors::WriteError;
use crate::log_paths;
use crate::trace::trace_context;
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard};
use tokio::task::JoinHandle;

/// Permission bits for created log files (owner rw, group/other r).
#[cfg(unix)]
const LOG_FILE_MODE: u32 = 0o644;

/// What a successful write recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The category was known and its label was used.
    Written,
    /// The category was unknown; a degraded line was written and a warning emitted.
    UnknownCategory,
}

/// Appends categorized lines to a single log file.
///
/// The writer is `Send + Sync`; share it with `Arc` across threads. Writes
/// through one writer are serialized, so lines never interleave.
pub struct LogWriter {
    file_path: PathBuf,
    categories: RwLock<CategoryRegistry>,
    console: Arc<dyn ConsoleSink>,
    /// Guards directory creation, open, append and close as one unit.
    io_lock: Mutex<()>,
}

impl LogWriter {
    /// Creates a writer for `file_path` with the built-in categories.
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            categories: RwLock::new(CategoryRegistry::new()),
            console: Arc::new(StdoutConsole),
            io_lock: Mutex::new(()),
        }
    }

    /// Creates a writer for `logs/YYYY_MM_DD.log`, dated now.
    ///
    /// The date is fixed here and not re-derived on later writes.
    pub fn daily() -> Self {
        Self::new(log_paths::today_log_path())
    }

    pub fn with_file_path(mut self, file_path: impl Into<PathBuf>) -> Self {
        self.file_path = file_path.into();
        self
    }

    /// Replaces the fallback console stream.
    pub fn with_console(mut self, console: impl ConsoleSink + 'static) -> Self {
        self.console = Arc::new(console);
        self
    }

    pub fn with_categories(self, categories: CategoryRegistry) -> Self {
        Self {
            categories: RwLock::new(categories),
            ..self
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn set_file_path(&mut self, file_path: impl Into<PathBuf>) {
        self.file_path = file_path.into();
    }

    /// Resets the registry to the built-in categories.
    pub fn load_categories(&self) {
        self.categories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .load();
    }

    /// Adds or overwrites categories key by key.
    pub fn extend_categories<I>(&self, additions: I)
    where
        I: IntoIterator<Item = (String, Category)>,
    {
        self.categories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_with(additions);
    }

    pub fn resolve_category(&self, key: &str) -> Option<Category> {
        self.read_categories().resolve(key).cloned()
    }

    /// Returns a snapshot of the current registry.
    pub fn categories(&self) -> CategoryRegistry {
        self.read_categories().clone()
    }

    /// Trace context of the code calling this method.
    #[track_caller]
    pub fn trace_context(&self) -> String {
        trace_context()
    }

    /// Writes one line to the log file.
    ///
    /// Never fails from the caller's point of view: directory, open and append
    /// failures are reported on the console stream and the line is dropped.
    #[track_caller]
    pub fn write(&self, category: &str, message: &str, trace: &str) {
        let context = trace_context();
        self.write_reporting(category, message, trace, &context);
    }

    /// Same as [`write`](Self::write) but hands failures back to the caller.
    ///
    /// Unknown categories still produce a console warning and a degraded line;
    /// they are reported as [`WriteOutcome::UnknownCategory`], not as errors.
    #[track_caller]
    pub fn try_write(
        &self,
        category: &str,
        message: &str,
        trace: &str,
    ) -> Result<WriteOutcome, WriteError> {
        let context = trace_context();
        self.append_line(category, message, trace, &context)
    }

    /// Writes on the tokio blocking pool and returns the completion handle.
    ///
    /// Must be called from within a tokio runtime.
    #[track_caller]
    pub fn spawn_write(
        self: &Arc<Self>,
        category: impl Into<String>,
        message: impl Into<String>,
        trace: impl Into<String>,
    ) -> JoinHandle<()> {
        let context = trace_context();
        let writer = Arc::clone(self);
        let category = category.into();
        let message = message.into();
        let trace = trace.into();
        tokio::task::spawn_blocking(move || {
            writer.write_reporting(&category, &message, &trace, &context);
        })
    }

    fn write_reporting(&self, category: &str, message: &str, trace: &str, context: &str) {
        if let Err(err) = self.append_line(category, message, trace, context) {
            tracing::warn!("Dropped log line for {}: {}", err.path().display(), err);
            self.console.emit(&format!(
                "{} Logit error: {} on {}",
                format_timestamp(),
                err,
                context
            ));
        }
    }

    fn append_line(
        &self,
        category: &str,
        message: &str,
        trace: &str,
        context: &str,
    ) -> Result<WriteOutcome, WriteError> {
        let _io = self.io_lock.lock().unwrap_or_else(PoisonError::into_inner);

        match log_paths::ensure_parent_dir(&self.file_path) {
            Ok(true) => tracing::debug!("Created log directory for {}", self.file_path.display()),
            Ok(false) => {}
            Err(source) => {
                return Err(WriteError::CreateDir {
                    path: self.file_path.clone(),
                    source,
                })
            }
        }

        let opened = open_append(&self.file_path);

        // The category is resolved even when the open failed, so an unknown
        // category is still warned about alongside the open error.
        let (body, outcome) = self.format_body(category, message, trace, context);
        let mut file = opened.map_err(|source| WriteError::Open {
            path: self.file_path.clone(),
            source,
        })?;

        let mut line = format!("{} {}", format_timestamp(), body);
        if !line.ends_with('\n') {
            line.push('\n');
        }
        file.write_all(line.as_bytes())
            .map_err(|source| WriteError::Append {
                path: self.file_path.clone(),
                source,
            })?;

        Ok(outcome)
    }

    /// Formats the line body (everything after the timestamp).
    ///
    /// Emits the unknown-category warning as a side effect.
    fn format_body(
        &self,
        category: &str,
        message: &str,
        trace: &str,
        context: &str,
    ) -> (String, WriteOutcome) {
        let categories = self.read_categories();
        match categories.resolve(category) {
            Some(known) => (
                format!("{} {} on {}", known.label(), message, trace),
                WriteOutcome::Written,
            ),
            None => {
                tracing::warn!("Unknown log category '{}'", category);
                self.console.emit(&format!(
                    "{} {} The category {} does not exist on {}",
                    format_timestamp(),
                    categories.warning_label(),
                    category,
                    context
                ));
                (
                    format!("{} (non existent category) {} on {}", category, message, trace),
                    WriteOutcome::UnknownCategory,
                )
            }
        }
    }

    fn read_categories(&self) -> RwLockReadGuard<'_, CategoryRegistry> {
        self.categories.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::daily()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(LOG_FILE_MODE);
    }
    options.open(path)
}

/// Formats the current local time as `YYYY/MM/DD HH:MM:SS`.
fn format_timestamp() -> String {
    Local::now().format("%Y/%m/%d %H:%M:%S").to_string()
}

#[cfg(test)]
#[path = "tests/writer_tests.rs"]
mod tests;
