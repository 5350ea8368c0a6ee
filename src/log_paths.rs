//! Log file path helpers.
//!
//! The default log file lives under a relative `logs/` directory and is named
//! after the local calendar date: `logs/2026_01_15.log`.

use chrono::{Local, NaiveDate};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory holding the daily log files, relative to the working directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Permission bits for created log directories (owner rwx, group/other rx).
#[cfg(unix)]
const LOG_DIR_MODE: u32 = 0o755;

/// Returns the daily file name for `date`: `YYYY_MM_DD.log`.
pub fn daily_file_name(date: NaiveDate) -> String {
    format!("{}.log", date.format("%Y_%m_%d"))
}

/// Returns `<dir>/YYYY_MM_DD.log`.
pub fn daily_log_path_in(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(daily_file_name(date))
}

/// Returns `logs/YYYY_MM_DD.log`.
pub fn daily_log_path(date: NaiveDate) -> PathBuf {
    daily_log_path_in(Path::new(DEFAULT_LOG_DIR), date)
}

/// Returns today's default log path using the local date.
pub fn today_log_path() -> PathBuf {
    daily_log_path(Local::now().date_naive())
}

/// Returns the directory a log file is written into, if it has one.
///
/// A bare file name such as `app.log` has an empty parent and needs no
/// directory.
pub fn log_dir_of(path: &Path) -> Option<&Path> {
    path.parent().filter(|dir| !dir.as_os_str().is_empty())
}

/// Ensures the parent directory of `path` exists, creating it recursively.
///
/// Returns `Ok(true)` when the directory had to be created. A directory created
/// concurrently by someone else is not an error.
pub fn ensure_parent_dir(path: &Path) -> io::Result<bool> {
    let Some(dir) = log_dir_of(path) else {
        return Ok(false);
    };
    if dir.is_dir() {
        return Ok(false);
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(LOG_DIR_MODE);
    }
    builder.create(dir)?;
    Ok(true)
}
