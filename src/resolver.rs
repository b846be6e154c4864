//! Source and position-map resolution
//!
//! Loads generated-code text for a frame and, when a `<file>.map` sidecar
//! exists, resolves the corresponding original-source position and text.
//! Original text comes from the artifact's embedded `sourcesContent` when
//! present, otherwise from disk relative to the generated file's directory.
//!
//! Each step returns its own result so the assembler can tell "not
//! attempted" from "attempted and failed" from "succeeded"; any failure on
//! the original side leaves the already-captured generated side intact.

use crate::error::ResolveError;
use std::io;
use std::path::{Path, PathBuf};

/// Outcome of an optional resolution step.
#[derive(Debug)]
pub enum Resolution<T> {
    /// The precondition for attempting was absent (no sidecar on disk).
    NotAttempted,
    /// Attempted and failed; the error says why.
    Failed(ResolveError),
    Resolved(T),
}

impl<T> Resolution<T> {
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Resolution::Resolved(value) => Some(value),
            _ => None,
        }
    }
}

/// Generated-code text for one frame.
#[derive(Debug, Clone)]
pub struct GeneratedSource {
    pub text: String,
    /// The 1-based caller line, trimmed. Empty when out of range.
    pub caller_line: String,
}

/// Read the generated file named by a frame and pull out the caller line.
pub async fn load_generated(file: &str, line: u32) -> Result<GeneratedSource, ResolveError> {
    let text = tokio::fs::read_to_string(file).await.map_err(|source| ResolveError::Io {
        path: PathBuf::from(file),
        source,
    })?;
    let caller_line = line_at(&text, line);
    Ok(GeneratedSource { text, caller_line })
}

/// Fetch a 1-based line from source text, trimmed. Out-of-range is empty,
/// matching the tolerant indexing the record format expects.
#[must_use]
pub fn line_at(text: &str, line: u32) -> String {
    if line == 0 {
        return String::new();
    }
    text.split('\n')
        .nth(line as usize - 1)
        .map(|l| l.trim().to_string())
        .unwrap_or_default()
}

/// An original position a sidecar yielded for a generated position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedPosition {
    pub source: Option<String>,
    /// 1-based line in the original source.
    pub line: Option<u32>,
    /// 0-based column in the original source.
    pub column: Option<u32>,
}

/// A parsed `<file>.map` sidecar plus the context needed to resolve the
/// original sources it names.
pub struct SourceMapSidecar {
    map: sourcemap::SourceMap,
    generated_dir: PathBuf,
}

impl SourceMapSidecar {
    /// Look for `<generated_file>.map` and parse it.
    ///
    /// A missing sidecar is [`Resolution::NotAttempted`]; an unreadable or
    /// malformed one is [`Resolution::Failed`].
    pub async fn load(generated_file: &str) -> Resolution<Self> {
        let map_path = PathBuf::from(format!("{generated_file}.map"));
        let bytes = match tokio::fs::read(&map_path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Resolution::NotAttempted;
            }
            Err(err) => {
                return Resolution::Failed(ResolveError::Io {
                    path: map_path,
                    source: err,
                });
            }
        };

        match sourcemap::SourceMap::from_slice(&bytes) {
            Ok(map) => {
                let generated_dir = Path::new(generated_file)
                    .parent()
                    .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
                Resolution::Resolved(Self { map, generated_dir })
            }
            Err(source) => Resolution::Failed(ResolveError::MapParse {
                path: map_path,
                source,
            }),
        }
    }

    /// Original position for a generated (1-based line, 0-based column).
    #[must_use]
    pub fn lookup(&self, line: u32, column: u32) -> Option<MappedPosition> {
        let token = self.map.lookup_token(line.saturating_sub(1), column)?;
        Some(MappedPosition {
            source: token.get_source().map(str::to_string),
            line: Some(token.get_src_line() + 1),
            column: Some(token.get_src_col()),
        })
    }

    /// Text of an original source named by the sidecar: embedded
    /// `sourcesContent` first, then disk relative to the generated file.
    pub async fn source_text(&self, source: &str) -> Result<String, ResolveError> {
        if let Some(idx) = self.map.sources().position(|s| s == source) {
            if let Some(contents) = self.map.get_source_contents(idx as u32) {
                return Ok(contents.to_string());
            }
        }

        let resolved = self.generated_dir.join(source);
        tokio::fs::read_to_string(&resolved).await.map_err(|err| ResolveError::Io {
            path: resolved,
            source: err,
        })
    }
}
