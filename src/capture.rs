//! Stack capture
//!
//! The original runtime hook (`Error.prepareStackTrace`) mutated process-wide
//! error formatting and smuggled the augmented trace onto the error object as
//! an ad hoc property. Here capture is explicit: a [`CaptureHub`] owns at most
//! one registered [`CaptureHook`], installation of a second hook fails loudly
//! unless `replace` is used, and capturing returns a [`CaughtError`] that
//! bundles the report with its trace instead of mutating the error.
//!
//! The default hook parses a V8-rendered stack string into structured frames,
//! which is also how the assembler synthesizes its fallback snapshot.

use crate::config::InitOptions;
use crate::error::CaptureError;
use crate::frame::{AugmentedStackTrace, RawFrame};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::LazyLock;

/// A runtime error as reported by the instrumented application.
///
/// Extra error properties (an HTTP status code, a request id) arrive as
/// arbitrary JSON and are kept verbatim in `fields`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorReport {
    pub name: Option<String>,
    pub message: Option<String>,
    /// The rendered stack string, `Error: msg\n    at fn (file:line:col)…`.
    pub stack: Option<String>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ErrorReport {
    /// `Name: message` rendering, matching `Error.prototype.toString()`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!(
            "{}: {}",
            self.name.as_deref().unwrap_or("Error"),
            self.message.as_deref().unwrap_or_default()
        )
    }
}

/// An error bundled with its captured trace. This is the single owned value
/// that replaces the original's duck-typed side-channel property.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaughtError {
    pub report: ErrorReport,
    pub trace: Option<AugmentedStackTrace>,
}

/// Converts an error report into an augmented trace.
pub trait CaptureHook: Send + Sync {
    fn capture(&self, report: &ErrorReport) -> AugmentedStackTrace;

    /// File name of the capturing code itself, if the hook's frames can
    /// contain it. The filter drops such self-referential frames.
    fn self_file(&self) -> Option<&str> {
        None
    }
}

/// Single-owner registry for the capture hook plus the companion endpoint
/// base URL recorded at initialization.
#[derive(Default)]
pub struct CaptureHub {
    hook: Option<Arc<dyn CaptureHook>>,
    server_url: Option<String>,
}

impl CaptureHub {
    /// An empty hub. Capture is a no-op until a hook is installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a hook. Fails when one is already registered.
    pub fn install(
        &mut self,
        hook: Arc<dyn CaptureHook>,
        options: &InitOptions,
    ) -> Result<(), CaptureError> {
        if self.hook.is_some() {
            return Err(CaptureError::AlreadyInstalled);
        }
        self.hook = Some(hook);
        self.server_url = options.server_url();
        Ok(())
    }

    /// Install the default stack-string hook.
    pub fn install_default(&mut self, options: &InitOptions) -> Result<(), CaptureError> {
        self.install(Arc::new(StackStringHook), options)
    }

    /// Deliberately overwrite whatever hook is registered.
    pub fn replace(&mut self, hook: Arc<dyn CaptureHook>, options: &InitOptions) {
        if self.hook.is_some() {
            tracing::warn!("replacing previously installed capture hook");
        }
        self.hook = Some(hook);
        self.server_url = options.server_url();
    }

    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.hook.is_some()
    }

    #[must_use]
    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }

    /// File name of the capturing code, forwarded from the hook.
    #[must_use]
    pub fn self_file(&self) -> Option<&str> {
        self.hook.as_deref().and_then(CaptureHook::self_file)
    }

    /// Capture a trace for `report` and bundle the two together. The trace
    /// is `None` when no hook is installed; downstream tolerates that.
    #[must_use]
    pub fn capture(&self, report: ErrorReport) -> CaughtError {
        let trace = self.hook.as_deref().map(|hook| hook.capture(&report));
        CaughtError { report, trace }
    }

    /// Synthesize a fresh snapshot trace for an error whose own trace is
    /// missing or trivially short.
    #[must_use]
    pub fn snapshot(&self, report: &ErrorReport) -> Option<AugmentedStackTrace> {
        self.hook.as_deref().map(|hook| hook.capture(report))
    }
}

/// Default hook: structures the frames already rendered into the error's
/// stack string.
pub struct StackStringHook;

impl CaptureHook for StackStringHook {
    fn capture(&self, report: &ErrorReport) -> AugmentedStackTrace {
        let frames = report.stack.as_deref().map(parse_stack).unwrap_or_default();
        AugmentedStackTrace::from_frames(report.stack.clone(), frames)
    }
}

static FRAME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    // `at [new|async ][name (]file:line:col[)]`
    Regex::new(r"^\s*at\s+(?:(new|async)\s+)?(?:(.+?)\s+\()?(.+?):(\d+):(\d+)\)?\s*$")
        .expect("frame line regex is valid")
});

/// Parse a V8-rendered stack string into raw frames, innermost first.
///
/// Lines that do not look like frame entries (the message line, native
/// frames without a location) are skipped. V8 renders 1-based columns; the
/// structured form uses 0-based columns, so one is subtracted here.
#[must_use]
pub fn parse_stack(stack: &str) -> Vec<RawFrame> {
    stack
        .lines()
        .filter_map(|line| {
            let caps = FRAME_LINE.captures(line)?;
            let modifier = caps.get(1).map(|m| m.as_str());
            let function_name = caps.get(2).map(|m| m.as_str().to_string());
            let file_name = caps.get(3).map(|m| m.as_str().to_string());
            let line_number: Option<u32> = caps.get(4).and_then(|m| m.as_str().parse().ok());
            let column_number: Option<u32> = caps
                .get(5)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .map(|col| col.saturating_sub(1));

            let is_eval = function_name.as_deref().is_some_and(|name| name.contains("eval"));
            Some(RawFrame {
                is_constructor: modifier == Some("new"),
                is_async: modifier == Some("async"),
                is_eval,
                is_toplevel: function_name.is_none(),
                script_name_or_source_url: file_name.clone(),
                function_name,
                file_name,
                line_number,
                column_number,
                ..RawFrame::default()
            })
        })
        .collect()
}
