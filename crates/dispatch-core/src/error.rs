//! Error types for the dispatch core library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the dispatch [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for dispatch operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad user input or configuration, detected before any side effect.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Target workspace directory is already on disk.
    #[error("Path already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// An external program ran but exited unsuccessfully.
    #[error("{program} {} failed: {}", .args.join(" "), .output.trim())]
    ExternalTool {
        program: String,
        args: Vec<String>,
        /// Combined stdout/stderr, verbatim.
        output: String,
    },

    /// An external program could not be started at all.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The directory has no session sidecar.
    #[error("Not a managed workspace: {}", .0.display())]
    NotManaged(PathBuf),

    /// Every workspace failed to materialize.
    #[error("No workspaces could be created")]
    NothingLaunched,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Build an [`Error::ExternalTool`] from borrowed argument slices.
    pub fn external(program: &str, args: &[&str], output: impl Into<String>) -> Self {
        Self::ExternalTool {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            output: output.into(),
        }
    }
}
