use std::path::PathBuf;

/// Typed failures raised inside the engine.
///
/// We use `anyhow` at the top level for CLI error handling, but the core
/// reifies these into `(success, message)` results before they reach a caller,
/// so one failing item never aborts a batch.
#[derive(Debug, thiserror::Error)]
pub enum CleanerError {
    /// The bridge command did not finish within its timeout
    #[error("Command timed out after {secs}s: {command}")]
    Timeout { command: String, secs: u64 },

    /// The command could not be spawned or polled
    #[error("{message}")]
    ExecutionFault { command: String, message: String },

    /// The requested device is not connected or not in the ready state
    #[error("Device '{serial}' is not connected or not ready")]
    DeviceUnavailable { serial: String },

    /// Destructive action refused because the target emulator is running
    #[error("Cannot clean running emulator '{name}'")]
    UnsafeOperation { name: String },

    /// Bridge output did not have the expected shape
    #[error("Could not parse {what}: {input:?}")]
    ParseFailure { what: &'static str, input: String },

    /// File system operation failed
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CleanerError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CleanerError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from a command running past its deadline
    pub fn is_timeout(&self) -> bool {
        matches!(self, CleanerError::Timeout { .. })
    }
}
