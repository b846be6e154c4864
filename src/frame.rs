//! Stack frame data model
//!
//! Passive shapes for raw engine frames, their simplified descriptors, and
//! the augmented trace bundle attached to a captured error. Wire names are
//! camelCase so payloads interoperate with the JavaScript client side.

use serde::{Deserialize, Serialize};

/// A raw stack frame with the full engine capability set.
///
/// Mirrors what a V8-style `CallSite` exposes: location accessors plus the
/// boolean predicates. Every positional field is nullable because engines
/// omit them for native and eval frames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFrame {
    pub function_name: Option<String>,
    pub file_name: Option<String>,
    pub script_name_or_source_url: Option<String>,
    /// 1-based line number.
    pub line_number: Option<u32>,
    /// 0-based column number.
    pub column_number: Option<u32>,
    pub enclosing_line_number: Option<u32>,
    pub enclosing_column_number: Option<u32>,
    pub is_constructor: bool,
    pub is_eval: bool,
    pub is_native: bool,
    pub is_toplevel: bool,
    pub is_async: bool,
    pub is_wasm: bool,
}

impl RawFrame {
    /// Collapse to the simplified descriptor used by filtering and assembly.
    #[must_use]
    pub fn summary(&self) -> FrameSummary {
        FrameSummary {
            function_name: self.function_name.clone(),
            file_name: self.file_name.clone(),
            script_name_or_source_url: self.script_name_or_source_url.clone(),
            line_number: self.line_number,
            column_number: self.column_number,
            enclosing_line_number: self.enclosing_line_number,
            enclosing_column_number: self.enclosing_column_number,
        }
    }
}

/// Simplified frame descriptor, the working currency of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameSummary {
    pub function_name: Option<String>,
    pub file_name: Option<String>,
    pub script_name_or_source_url: Option<String>,
    /// 1-based line number.
    pub line_number: Option<u32>,
    /// 0-based column number.
    pub column_number: Option<u32>,
    pub enclosing_line_number: Option<u32>,
    pub enclosing_column_number: Option<u32>,
}

impl FrameSummary {
    /// A frame is processable only with a file name, line, and column.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.file_name.is_some() && self.line_number.is_some() && self.column_number.is_some()
    }
}

/// The structured trace bundled with a captured error.
///
/// Owns the rendered stack string, the raw frame sequence, and the parallel
/// simplified sequence. Created exactly once per capture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AugmentedStackTrace {
    /// The rendered stack string as the runtime produced it.
    pub stack: Option<String>,
    /// Ordered raw frames, innermost first.
    pub structured_stack: Vec<RawFrame>,
    /// Parallel ordered simplified descriptors.
    pub parsed_stack: Vec<FrameSummary>,
}

impl AugmentedStackTrace {
    /// Build a trace from raw frames, deriving the parallel summary sequence.
    #[must_use]
    pub fn from_frames(stack: Option<String>, frames: Vec<RawFrame>) -> Self {
        let parsed_stack = frames.iter().map(RawFrame::summary).collect();
        Self {
            stack,
            structured_stack: frames,
            parsed_stack,
        }
    }

    /// True when the trace carries enough frames to be the trace of record.
    /// A single frame means augmentation never really fired for this error.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.parsed_stack.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_carries_location_fields() {
        let raw = RawFrame {
            function_name: Some("handler".into()),
            file_name: Some("/srv/app.js".into()),
            line_number: Some(12),
            column_number: Some(4),
            is_async: true,
            ..RawFrame::default()
        };
        let summary = raw.summary();
        assert_eq!(summary.function_name.as_deref(), Some("handler"));
        assert_eq!(summary.file_name.as_deref(), Some("/srv/app.js"));
        assert_eq!(summary.line_number, Some(12));
        assert_eq!(summary.column_number, Some(4));
    }

    #[test]
    fn completeness_requires_file_line_and_column() {
        let mut frame = FrameSummary {
            file_name: Some("a.js".into()),
            line_number: Some(1),
            column_number: Some(0),
            ..FrameSummary::default()
        };
        assert!(frame.is_complete());
        frame.column_number = None;
        assert!(!frame.is_complete());
    }

    #[test]
    fn wire_names_are_camel_case() {
        let trace = AugmentedStackTrace::from_frames(
            Some("Error: x".into()),
            vec![RawFrame {
                file_name: Some("a.js".into()),
                ..RawFrame::default()
            }],
        );
        let json = serde_json::to_string(&trace).unwrap();
        assert!(json.contains("structuredStack"));
        assert!(json.contains("parsedStack"));
        assert!(json.contains("fileName"));
    }
}
