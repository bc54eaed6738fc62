//! Error types for the ci-dispatch-core crate

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Exit code a POSIX shell reports when a command cannot be found
pub const EXIT_NOT_FOUND: i32 = 127;
/// Exit code a POSIX shell reports when a command is found but cannot be executed
pub const EXIT_NOT_EXECUTABLE: i32 = 126;
/// Exit code for any other dispatch failure
pub const EXIT_FAILURE: i32 = 1;

/// Main error type for dispatch operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The test-runner script does not exist
    #[error("Test runner not found: {}", path.display())]
    #[diagnostic(
        code(ci_dispatch::script::not_found),
        help("Run the dispatcher from the repository root or pass --working-dir")
    )]
    ScriptNotFound {
        /// The script that was looked up
        path: Box<Path>,
    },

    /// The test-runner script exists but could not be executed
    #[error("Test runner is not executable: {}", path.display())]
    #[diagnostic(
        code(ci_dispatch::script::not_executable),
        help("Mark the script executable with `chmod +x`")
    )]
    ScriptNotExecutable {
        /// The script that was rejected
        path: Box<Path>,
    },

    /// Spawning or waiting on the test runner failed for another reason
    #[error("Failed to run {}: {source}", path.display())]
    #[diagnostic(code(ci_dispatch::script::spawn))]
    Spawn {
        /// The script being run
        path: Box<Path>,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error with path context
    #[error("I/O error during {operation}: {source}")]
    #[diagnostic(code(ci_dispatch::io::error))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The path where the I/O error occurred, if applicable
        path: Option<Box<Path>>,
        /// Description of the operation that failed
        operation: String,
    },
}

impl Error {
    /// Classify a spawn failure the way a shell would report it
    pub fn spawn(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into().into_boxed_path();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::ScriptNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::ScriptNotExecutable { path },
            _ => Self::Spawn { path, source },
        }
    }

    /// Create an I/O error with context
    pub fn io(source: std::io::Error, path: Option<PathBuf>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.map(|p| p.into_boxed_path()),
            operation: operation.into(),
        }
    }

    /// Process exit code this error should terminate the dispatcher with
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ScriptNotFound { .. } => EXIT_NOT_FOUND,
            Self::ScriptNotExecutable { .. } => EXIT_NOT_EXECUTABLE,
            Self::Spawn { .. } | Self::Io { .. } => EXIT_FAILURE,
        }
    }
}

/// Result type for dispatch operations
pub type Result<T> = std::result::Result<T, Error>;
