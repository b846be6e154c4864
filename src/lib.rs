//! # tracelight
//!
//! Augments a JavaScript/TypeScript runtime failure with rich, structured
//! source context, for tooling (an LLM debugging loop, a crash dashboard)
//! that needs more than a message and a stack string.
//!
//! Given a caught error, tracelight reconstructs the call stack, filters
//! out capture noise and dependency internals, maps each generated-code
//! frame back to its original source through `<file>.map` sidecars, and
//! extracts the enclosing function (closure) and surrounding root-scope
//! block (section) for both the call site and the error origin. The result
//! is an ordered JSON array of [`CodeContext`] records.
//!
//! ## Pipeline
//!
//! ```text
//! caught error ──► trace of record ──► frame filter ──► per-frame fan-out
//!                                                        │
//!                                         ┌──────────────┼──────────────┐
//!                                         ▼              ▼              ▼
//!                                   source read    .map sidecar    oxc parse
//!                                   caller line    original pos    closure/section
//!                                         └──────────────┼──────────────┘
//!                                                        ▼
//!                                              CodeContext records ──► JSON sink
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tracelight::{Contextualizer, ErrorReport, InitOptions, ContextualizeOptions};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let contextualizer = Contextualizer::initialize(InitOptions::default());
//!
//! let caught = contextualizer.capture(ErrorReport {
//!     name: Some("Error".into()),
//!     message: Some("boom".into()),
//!     stack: Some("Error: boom\n    at boom (/srv/app/a.js:2:9)".into()),
//!     ..ErrorReport::default()
//! });
//!
//! contextualizer
//!     .contextualize_error(&caught, &ContextualizeOptions::default())
//!     .await?;
//! // Check error-context.json for the assembled records.
//! # Ok(())
//! # }
//! ```
//!
//! Every failure mode is local: unreadable files, malformed sidecars, and
//! parse errors each degrade to absent fields on the affected frame. Partial
//! context is still useful to the consumer.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assemble;
pub mod capture;
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod filter;
pub mod frame;
pub mod resolver;
pub mod server;

// Re-exports
pub use assemble::Contextualizer;
pub use capture::{CaptureHook, CaptureHub, CaughtError, ErrorReport, StackStringHook, parse_stack};
pub use config::{ContextualizeOptions, DEFAULT_OUTPUT_FILE, DEFAULT_SERVER_PORT, InitOptions};
pub use context::{CodeContext, SnippetTarget, Snippets};
pub use error::{CaptureError, ContextError, ExtractError, ResolveError, ServerError};
pub use extract::extract_snippets;
pub use filter::filter_frames;
pub use frame::{AugmentedStackTrace, FrameSummary, RawFrame};
pub use resolver::{GeneratedSource, MappedPosition, Resolution, SourceMapSidecar};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::assemble::Contextualizer;
    pub use crate::capture::{CaughtError, ErrorReport};
    pub use crate::config::{ContextualizeOptions, InitOptions};
    pub use crate::context::CodeContext;
    pub use crate::frame::{AugmentedStackTrace, FrameSummary};
}
