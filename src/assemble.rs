//! Context assembly
//!
//! Top-level driver. Picks the trace of record, filters its frames, fans out
//! one async task per surviving frame (resolution and extraction both happen
//! inside the task), and serializes the collected records in stack order.
//!
//! Every per-frame failure is caught locally: a frame that cannot be read is
//! skipped, a side-resolution that fails leaves its fields unset, and the
//! batch always runs to completion. Partial context is still useful context.

use crate::capture::{CaptureHook, CaptureHub, CaughtError, ErrorReport, StackStringHook};
use crate::config::{ContextualizeOptions, InitOptions};
use crate::context::{CodeContext, SnippetTarget};
use crate::error::{CaptureError, ContextError, ResolveError};
use crate::extract::extract_snippets;
use crate::filter::filter_frames;
use crate::frame::FrameSummary;
use crate::resolver::{Resolution, SourceMapSidecar, line_at, load_generated};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Error-origin details attached to stack index 0.
#[derive(Debug, Clone)]
struct ErrorInfo {
    message: String,
    rendered: String,
    fields: BTreeMap<String, String>,
}

impl ErrorInfo {
    fn from_report(report: &ErrorReport) -> Self {
        let fields = report
            .fields
            .iter()
            .map(|(key, value)| (key.clone(), stringify_field(value)))
            .collect();
        Self {
            message: report.message.clone().unwrap_or_default(),
            rendered: report.display_name(),
            fields,
        }
    }
}

/// Pretty-print an extra error property; irreducible values become a
/// placeholder naming the property's type.
///
/// Serializing a `serde_json::Value` only fails for non-string map keys,
/// which `serde_json::Map` rules out, so properties that arrived through the
/// wire always take the pretty-print arm. The placeholder is the recorded
/// shape for anything a future hook feeds in that cannot be rendered.
fn stringify_field(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| unserializable_placeholder(value))
}

fn unserializable_placeholder(value: &serde_json::Value) -> String {
    format!("[Unserializable Value - {}]", json_type_name(value))
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// The library's entry point: owns the capture hub and drives extraction.
pub struct Contextualizer {
    hub: CaptureHub,
}

impl Contextualizer {
    /// Initialize with the default stack-string capture hook.
    #[must_use]
    pub fn initialize(options: InitOptions) -> Self {
        let mut hub = CaptureHub::new();
        hub.replace(Arc::new(StackStringHook), &options);
        Self { hub }
    }

    /// Initialize with a caller-provided capture hook.
    pub fn with_hook(
        hook: Arc<dyn CaptureHook>,
        options: InitOptions,
    ) -> Result<Self, CaptureError> {
        let mut hub = CaptureHub::new();
        hub.install(hook, &options)?;
        Ok(Self { hub })
    }

    /// A contextualizer with no hook installed. Extraction degrades to the
    /// warn-and-return path until one is registered.
    #[must_use]
    pub fn uninitialized() -> Self {
        Self {
            hub: CaptureHub::new(),
        }
    }

    #[must_use]
    pub fn hub(&self) -> &CaptureHub {
        &self.hub
    }

    #[must_use]
    pub fn hub_mut(&mut self) -> &mut CaptureHub {
        &mut self.hub
    }

    /// Capture a trace for `report` and bundle the two.
    #[must_use]
    pub fn capture(&self, report: ErrorReport) -> CaughtError {
        self.hub.capture(report)
    }

    /// Extract context for a caught error and write the JSON artifact.
    ///
    /// The error's own trace is preferred; a fresh snapshot is synthesized
    /// only when that trace is absent or has at most one frame. When neither
    /// yields frames this warns and returns without writing anything.
    pub async fn contextualize_error(
        &self,
        caught: &CaughtError,
        options: &ContextualizeOptions,
    ) -> Result<(), ContextError> {
        let snapshot;
        let trace = match caught.trace.as_ref().filter(|trace| trace.is_usable()) {
            Some(own) => own,
            None => {
                snapshot = self.hub.snapshot(&caught.report);
                match snapshot.as_ref().filter(|trace| !trace.parsed_stack.is_empty()) {
                    Some(fresh) => fresh,
                    None => {
                        tracing::warn!(
                            "contextualize_error called without a usable trace; was a capture \
                             hook installed before the error was caught?"
                        );
                        return Ok(());
                    }
                }
            }
        };

        let frames = filter_frames(&trace.parsed_stack, self.hub.self_file());
        let error_info = ErrorInfo::from_report(&caught.report);

        let tasks = frames.into_iter().enumerate().map(|(stack_index, frame)| {
            let error_info = (stack_index == 0).then(|| error_info.clone());
            async move { process_frame(stack_index, frame, error_info).await }
        });

        // Fan-out then join-all; results are keyed by stack position, so the
        // output order is stack order regardless of completion order.
        let contexts: Vec<CodeContext> =
            futures::future::join_all(tasks).await.into_iter().flatten().collect();

        let json = serde_json::to_string_pretty(&contexts)?;
        tokio::fs::write(&options.output_file, json).await.map_err(|source| {
            ContextError::Sink {
                path: PathBuf::from(&options.output_file),
                source,
            }
        })?;

        tracing::info!(
            output_file = %options.output_file,
            frames = contexts.len(),
            "wrote error context artifact"
        );
        Ok(())
    }

    /// Hand a caught error off to the companion endpoint recorded at
    /// initialization instead of contextualizing it in-process.
    ///
    /// Fails with [`ContextError::NoServerUrl`] when initialization disabled
    /// the endpoint.
    pub async fn forward_error(
        &self,
        caught: &CaughtError,
        options: &ContextualizeOptions,
    ) -> Result<(), ContextError> {
        let server_url = self.hub.server_url().ok_or(ContextError::NoServerUrl)?;
        crate::client::forward_error(server_url, caught, options).await
    }
}

/// Build the context record for one frame. Returns `None` when the frame is
/// missing location data or its generated source cannot be read; siblings
/// are unaffected either way.
async fn process_frame(
    stack_index: usize,
    frame: FrameSummary,
    error_info: Option<ErrorInfo>,
) -> Option<CodeContext> {
    let (Some(file), Some(line), Some(column)) =
        (frame.file_name.clone(), frame.line_number, frame.column_number)
    else {
        tracing::warn!(stack_index, "incomplete stack frame data, skipping");
        return None;
    };

    let generated = match load_generated(&file, line).await {
        Ok(generated) => generated,
        Err(err) => {
            tracing::warn!(stack_index, file = %file, error = %err, "failed to read generated source, skipping frame");
            return None;
        }
    };

    let mut ctx = CodeContext {
        stack_index,
        generated_file_name: file.clone(),
        generated_file: generated.text,
        generated_line_number: line,
        generated_column_number: column,
        generated_caller_line: generated.caller_line,
        ..CodeContext::default()
    };

    if let Some(info) = &error_info {
        ctx.error_message = Some(info.message.clone());
        ctx.error_message_stack = Some(info.rendered.clone());
        ctx.error_fields = Some(info.fields.clone());
        ctx.generated_error_line_number = Some(line);
        ctx.generated_error_column = Some(column);
        ctx.generated_error_line = Some(line_at(&ctx.generated_file, line));
    }

    apply_extraction(&mut ctx, SnippetTarget::GeneratedCall, &file, line);
    if ctx.generated_error_line_number.is_some() {
        apply_extraction(&mut ctx, SnippetTarget::GeneratedError, &file, line);
    }

    match SourceMapSidecar::load(&file).await {
        Resolution::NotAttempted => {}
        Resolution::Failed(err) => {
            tracing::warn!(file = %file, error = %err, "position-map artifact unusable");
        }
        Resolution::Resolved(sidecar) => {
            resolve_original_side(&sidecar, &mut ctx).await;
        }
    }

    Some(ctx)
}

/// Run one extraction call and place its snippets; parse failures degrade
/// to unset fields.
fn apply_extraction(ctx: &mut CodeContext, target: SnippetTarget, file: &str, line: u32) {
    let (source, file_name) = match target {
        SnippetTarget::GeneratedCall | SnippetTarget::GeneratedError => {
            (ctx.generated_file.clone(), file.to_string())
        }
        SnippetTarget::OriginalCall | SnippetTarget::OriginalError => {
            match (&ctx.original_file, &ctx.original_file_name) {
                (Some(text), Some(name)) => (text.clone(), name.clone()),
                _ => return,
            }
        }
    };

    match extract_snippets(&file_name, &source, line) {
        Ok(snippets) => ctx.apply_snippets(target, snippets),
        Err(err) => {
            tracing::warn!(file = %file_name, error = %err, "closure/section extraction failed");
        }
    }
}

/// Populate the original-source side of a record through the sidecar.
///
/// The original fields are set as a complete group once the mapped position
/// and source text are both in hand; any earlier failure leaves the whole
/// group absent while the generated side stays populated.
async fn resolve_original_side(sidecar: &SourceMapSidecar, ctx: &mut CodeContext) {
    let Some(position) = sidecar.lookup(ctx.generated_line_number, ctx.generated_column_number)
    else {
        let err = ResolveError::NoMapping {
            file: ctx.generated_file_name.clone(),
            line: ctx.generated_line_number,
            column: ctx.generated_column_number,
        };
        tracing::warn!(error = %err, "original position resolution failed");
        return;
    };

    let (Some(source), Some(original_line)) = (position.source, position.line) else {
        let err = ResolveError::NoOriginalSource {
            file: ctx.generated_file_name.clone(),
            line: ctx.generated_line_number,
            column: ctx.generated_column_number,
        };
        tracing::warn!(error = %err, "original position resolution failed");
        return;
    };

    let text = match sidecar.source_text(&source).await {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(source = %source, error = %err, "failed to fetch original source content");
            return;
        }
    };

    ctx.original_file_name = Some(source.clone());
    ctx.original_line_number = Some(original_line);
    ctx.original_column_number = position.column;
    ctx.original_caller_line = Some(line_at(&text, original_line));
    ctx.original_file = Some(text);

    apply_extraction(ctx, SnippetTarget::OriginalCall, &source, original_line);

    if let (Some(error_line), Some(error_column)) =
        (ctx.generated_error_line_number, ctx.generated_error_column)
    {
        if let Some(error_position) = sidecar.lookup(error_line, error_column) {
            if let Some(original_error_line) = error_position.line {
                ctx.original_error_line_number = Some(original_error_line);
                ctx.original_error_column = error_position.column;
                ctx.original_error_line = ctx
                    .original_file
                    .as_deref()
                    .map(|text| line_at(text, original_error_line));
                apply_extraction(ctx, SnippetTarget::OriginalError, &source, original_error_line);
            }
        }
    }
}
