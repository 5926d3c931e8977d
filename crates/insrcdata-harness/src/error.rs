//! Harness error type.
//!
//! Structured variants for the failure taxonomy the harness actually
//! observes: external tools exiting non-zero, regression mismatches, and
//! plain I/O. Everything is fatal to the current run; there are no retries
//! and no partial-success reporting.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for harness operations.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// An external command could not be spawned at all.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// An external command ran but exited with a non-zero status.
    #[error("command failed ({status}): `{command}`")]
    CommandFailed { command: String, status: String },

    /// A sample's output diverged from its stored baseline. The diff
    /// artifact holding the new bytes has already been written.
    #[error(
        "output differs from regression baseline: sample `{sample}` check `{check}` \
         (new output written to {artifact})"
    )]
    RegressionMismatch {
        sample: String,
        check: String,
        artifact: PathBuf,
    },

    /// Samples root does not exist or is not a directory.
    #[error("samples root is not a directory: {path}")]
    SamplesRootMissing { path: PathBuf },

    /// A benchmark variant name that no configured variant matches.
    #[error("unknown benchmark variant: {name}")]
    UnknownVariant { name: String },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HarnessError>;
