//! Error types for the log write path.

use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

/// Failures that abandon a single write.
#[derive(Debug)]
pub enum WriteError {
    /// The log directory was missing and could not be created.
    CreateDir { path: PathBuf, source: io::Error },
    /// The log file could not be opened for append.
    Open { path: PathBuf, source: io::Error },
    /// The line could not be appended to the opened file.
    Append { path: PathBuf, source: io::Error },
}

impl WriteError {
    /// Path of the log file the write was aimed at.
    pub fn path(&self) -> &Path {
        match self {
            Self::CreateDir { path, .. } | Self::Open { path, .. } | Self::Append { path, .. } => {
                path.as_path()
            }
        }
    }
}

impl Display for WriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDir { path, .. } => write!(
                f,
                "path {} doesn't exist or is not writable and cannot be created",
                path.display()
            ),
            Self::Open { path, .. } => write!(f, "cannot open log file {}", path.display()),
            Self::Append { path, .. } => write!(f, "cannot append to log file {}", path.display()),
        }
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } | Self::Open { source, .. } | Self::Append { source, .. } => {
                Some(source)
            }
        }
    }
}
