//! Assembled per-frame context record
//!
//! One [`CodeContext`] per retained stack frame. Generated-code fields are
//! always present; error-site fields only on stack index 0; original-source
//! fields only when the position-map sidecar resolved, and then as a
//! complete group. Serialized camelCase to match the artifact format the
//! downstream tooling consumes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which snippet slots an extraction call populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetTarget {
    GeneratedCall,
    GeneratedError,
    OriginalCall,
    OriginalError,
}

/// Closure and section snippets for one target site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snippets {
    /// Full text of the nearest enclosing function-like node.
    pub closure: Option<String>,
    /// Text of the smallest enclosing root-scope brace block.
    pub section: Option<String>,
}

/// The context record for a single stack frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeContext {
    /// Position in the filtered stack, 0-based; 0 is the error origin.
    pub stack_index: usize,

    pub generated_file_name: String,
    pub generated_file: String,
    /// 1-based.
    pub generated_line_number: u32,
    /// 0-based.
    pub generated_column_number: u32,
    pub generated_caller_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_closure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_section: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_error_line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_error_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_error_column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_error_closure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_error_section: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_column_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_caller_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_closure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_section: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_error_line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_error_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_error_column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_error_closure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_error_section: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message_stack: Option<String>,
    /// Stringified extra error properties, keyed by property name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_fields: Option<BTreeMap<String, String>>,
}

impl CodeContext {
    /// Place extracted snippets into the slots the target selects.
    pub fn apply_snippets(&mut self, target: SnippetTarget, snippets: Snippets) {
        match target {
            SnippetTarget::GeneratedCall => {
                self.generated_closure = snippets.closure;
                self.generated_section = snippets.section;
            }
            SnippetTarget::GeneratedError => {
                self.generated_error_closure = snippets.closure;
                self.generated_error_section = snippets.section;
            }
            SnippetTarget::OriginalCall => {
                self.original_closure = snippets.closure;
                self.original_section = snippets.section;
            }
            SnippetTarget::OriginalError => {
                self.original_error_closure = snippets.closure;
                self.original_error_section = snippets.section;
            }
        }
    }
}
