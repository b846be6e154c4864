//! Closure and section extraction
//!
//! Parses a source file with oxc and, for a target line, finds the nearest
//! enclosing function-like node (the closure) and the smallest enclosing
//! root-scope brace block (the section). The section comes from a
//! character-level brace-balance scan rather than AST node boundaries:
//! dialect parsers do not expose a "statement block containing this node"
//! primitive uniformly across declaration styles, and the section may not
//! correspond to any single AST node at all.

use crate::context::Snippets;
use crate::error::ExtractError;
use oxc_allocator::Allocator;
use oxc_ast::AstKind;
use oxc_ast::Visit;
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};
use std::path::Path;

/// Byte-offset to 1-based line number mapping.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.char_indices().filter(|&(_, c)| c == '\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// 1-based line containing the byte offset.
    fn line_of(&self, offset: usize) -> u32 {
        self.starts.partition_point(|&start| start <= offset) as u32
    }
}

/// Records the last function-like node whose line span covers the target.
struct ClosureVisitor<'i> {
    line_index: &'i LineIndex,
    target_line: u32,
    covering: Option<(u32, u32)>,
}

impl ClosureVisitor<'_> {
    fn consider(&mut self, span: Span) {
        let start_line = self.line_index.line_of(span.start as usize);
        let end_line = self.line_index.line_of(span.end.saturating_sub(1) as usize);
        if self.target_line >= start_line && self.target_line <= end_line {
            self.covering = Some((start_line, end_line));
        }
    }
}

impl Visit<'_> for ClosureVisitor<'_> {
    fn enter_node(&mut self, kind: AstKind<'_>) {
        match kind {
            // Function covers both declarations and function expressions.
            AstKind::Function(func) => self.consider(func.span),
            AstKind::ArrowFunctionExpression(arrow) => self.consider(arrow.span),
            _ => {}
        }
    }
}

/// Find closure and section snippets for `line` (1-based) in `source`.
///
/// The parser dialect is chosen from the file extension. Parse failures are
/// an error the caller logs and degrades on; a parse that simply finds no
/// covering function yields empty snippets.
pub fn extract_snippets(
    file_name: &str,
    source: &str,
    line: u32,
) -> Result<Snippets, ExtractError> {
    let source_type = SourceType::from_path(Path::new(file_name)).unwrap_or_default();

    let allocator = Allocator::default();
    let parser = Parser::new(&allocator, source, source_type);
    let result = parser.parse();

    if let Some(first) = result.errors.first() {
        return Err(ExtractError::Parse {
            file: file_name.to_string(),
            message: first.to_string(),
        });
    }

    let line_index = LineIndex::new(source);
    let mut visitor = ClosureVisitor {
        line_index: &line_index,
        target_line: line,
        covering: None,
    };
    visitor.visit_program(&result.program);

    let Some((start_line, end_line)) = visitor.covering else {
        return Ok(Snippets::default());
    };

    let lines: Vec<&str> = source.split('\n').collect();
    let closure = lines[start_line as usize - 1..(end_line as usize).min(lines.len())].join("\n");

    let (section_start, section_end) = section_bounds(&lines, start_line, end_line);
    let section = lines[section_start..section_end.min(lines.len())].join("\n");

    Ok(Snippets {
        closure: Some(closure),
        section: Some(section),
    })
}

/// Brace-balance scan for the smallest enclosing root-scope block.
///
/// Backward from the closure's first line: the first `{` seen at depth zero
/// is an opening brace whose matching `}` has not been closed on the way
/// out, so its line starts the section. Forward from the line after the
/// closure with a fresh counter: the first `}` at depth zero closes that
/// block and ends the section. Bounds are (inclusive start, exclusive end)
/// 0-based line indices.
fn section_bounds(lines: &[&str], closure_start: u32, closure_end: u32) -> (usize, usize) {
    let mut section_start = closure_start as usize - 1;
    let mut section_end = closure_end as usize;

    let mut depth: i32 = 0;
    'backward: for i in (0..=section_start).rev() {
        for ch in lines[i].chars() {
            match ch {
                '{' => {
                    if depth == 0 {
                        section_start = i;
                        break 'backward;
                    }
                    depth += 1;
                }
                '}' => depth -= 1,
                _ => {}
            }
        }
    }

    depth = 0;
    'forward: for i in closure_end as usize..lines.len() {
        for ch in lines[i].chars() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    if depth == 0 {
                        section_end = i + 1;
                        break 'forward;
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
    }

    (section_start, section_end)
}
