//! Error taxonomy
//!
//! Every failure mode in the pipeline is local and non-fatal: resolution and
//! extraction errors degrade to absent fields on the affected frame rather
//! than aborting the batch. These types exist so each step can report what
//! actually went wrong instead of collapsing everything into a sentinel.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from capture hook registration.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// A hook is already registered. Use `replace` to overwrite deliberately.
    #[error("a capture hook is already installed; call replace() to overwrite it")]
    AlreadyInstalled,
}

/// Errors from source and position-map resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed position-map artifact {path}: {source}")]
    MapParse {
        path: PathBuf,
        #[source]
        source: sourcemap::Error,
    },

    #[error("no mapping for {file}:{line}:{column}")]
    NoMapping { file: String, line: u32, column: u32 },

    #[error("mapping names no original source for {file}:{line}:{column}")]
    NoOriginalSource { file: String, line: u32, column: u32 },
}

/// Errors from closure/section extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },
}

/// Errors from the assembler and its sinks.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("failed to write output artifact {path}: {source}")]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize context records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("hand-off to companion endpoint failed: {0}")]
    HandOff(#[from] reqwest::Error),

    #[error("no companion server URL configured for detached hand-off")]
    NoServerUrl,
}

/// Errors from the companion endpoint itself.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind companion endpoint on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("companion endpoint terminated: {0}")]
    Serve(#[source] std::io::Error),
}
