//! Parser module for ECMAScript source code
//!
//! Integrates with SWC for parsing source files, then lowers the SWC AST into
//! the arena-backed [`SyntaxTree`] used by scope analysis.

use std::ops::Range;
use std::sync::OnceLock;

use swc_common::sync::Lrc;
use swc_common::{FileName, SourceFile, SourceMap, Spanned};
use swc_ecma_parser::{EsSyntax, StringInput, Syntax, lexer::Lexer, parse_file_as_script};

use crate::syntax::{SyntaxTree, line_terminators};
use crate::syntax::lower::lower_script;

pub use swc_ecma_ast::{EsVersion, Script};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {line}:{column}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub span_lo: u32,
    pub span_hi: u32,
    pub message: String,
}

impl ParseError {
    fn from_swc(source_map: &SourceMap, file: &SourceFile, error: &swc_ecma_parser::error::Error) -> Self {
        let span = error.span();
        let loc = source_map.lookup_char_pos(span.lo);
        Self {
            line: loc.line,
            column: loc.col_display,
            span_lo: span.lo.0.saturating_sub(file.start_pos.0),
            span_hi: span.hi.0.saturating_sub(file.start_pos.0),
            message: error.kind().msg().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub filename: String,
    pub line_count: usize,
    pub has_errors: bool,
}

/// A source file together with its lowered syntax tree.
///
/// Any parse error, recovered or fatal, leaves the file without a tree: the
/// analysis never runs on a partially understood program.
pub struct ParsedFile {
    source: String,
    metadata: FileMetadata,
    tree: Option<SyntaxTree>,
    errors: Vec<ParseError>,
    line_ranges: OnceLock<Vec<Range<usize>>>,
}

impl std::fmt::Debug for ParsedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedFile")
            .field("metadata", &self.metadata)
            .field("has_tree", &self.tree.is_some())
            .field("error_count", &self.errors.len())
            .finish()
    }
}

impl ParsedFile {
    pub fn from_source(filename: &str, source: &str) -> Self {
        let parser = Parser::new();
        let (tree, errors) = parser.parse_tree(filename, source);

        let line_count = line_ranges(source).len();

        let metadata = FileMetadata {
            filename: filename.to_string(),
            line_count,
            has_errors: !errors.is_empty(),
        };

        tracing::debug!(
            file = filename,
            nodes = tree.as_ref().map(SyntaxTree::len).unwrap_or(0),
            errors = errors.len(),
            "parsed source file"
        );

        Self {
            source: source.to_string(),
            metadata,
            tree,
            errors,
            line_ranges: OnceLock::new(),
        }
    }

    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    pub fn filename(&self) -> &str {
        &self.metadata.filename
    }

    pub fn tree(&self) -> Option<&SyntaxTree> {
        self.tree.as_ref()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn get_line(&self, line_number: usize) -> Option<&str> {
        if line_number == 0 {
            return None;
        }

        let ranges = self.line_ranges.get_or_init(|| self.build_line_ranges());
        let index = line_number - 1;

        ranges.get(index).map(|range| &self.source[range.clone()])
    }

    fn build_line_ranges(&self) -> Vec<Range<usize>> {
        line_ranges(&self.source)
    }
}

/// Byte ranges of each line, terminators excluded. A trailing terminator
/// does not start a new line.
fn line_ranges(source: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;

    for (end, next) in line_terminators(source) {
        ranges.push(start..end);
        start = next;
    }

    if start < source.len() {
        ranges.push(start..source.len());
    }

    ranges
}

#[derive(Debug, Clone)]
pub struct Parser {
    syntax: Syntax,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            syntax: Syntax::Es(EsSyntax::default()),
        }
    }

    /// Parse `code` as a script, failing on the first error.
    pub fn parse_script(&self, code: &str) -> Result<Script, ParseError> {
        let source_map: Lrc<SourceMap> = Default::default();
        let fm = source_map
            .new_source_file(FileName::Custom("input.js".into()).into(), code.to_string());

        let lexer = Lexer::new(
            self.syntax,
            Default::default(),
            StringInput::from(&*fm),
            None,
        );

        let mut parser = swc_ecma_parser::Parser::new_from(lexer);

        parser
            .parse_script()
            .map_err(|e| ParseError::from_swc(&source_map, &fm, &e))
    }

    /// Parse and lower `code` into a [`SyntaxTree`].
    pub fn parse_tree(&self, filename: &str, code: &str) -> (Option<SyntaxTree>, Vec<ParseError>) {
        let source_map: Lrc<SourceMap> = Default::default();
        let fm = source_map
            .new_source_file(FileName::Custom(filename.into()).into(), code.to_string());

        let (script, errors) = self.parse_in(&source_map, &fm);
        let script = match script {
            Some(script) if errors.is_empty() => script,
            _ => return (None, errors),
        };

        match lower_script(&script, code, fm.start_pos) {
            Ok(tree) => (Some(tree), errors),
            Err(e) => {
                let loc = crate::syntax::LineIndex::new(code).position(e.offset());
                let error = ParseError {
                    line: loc.line,
                    column: loc.column,
                    span_lo: e.offset() as u32,
                    span_hi: e.offset() as u32,
                    message: e.to_string(),
                };
                (None, vec![error])
            }
        }
    }

    fn parse_in(&self, source_map: &SourceMap, fm: &Lrc<SourceFile>) -> (Option<Script>, Vec<ParseError>) {
        let mut recovered_errors = Vec::new();

        let result = parse_file_as_script(
            fm,
            self.syntax,
            EsVersion::latest(),
            None,
            &mut recovered_errors,
        );

        let mut errors: Vec<ParseError> = recovered_errors
            .iter()
            .map(|e| ParseError::from_swc(source_map, fm, e))
            .collect();

        match result {
            Ok(script) => (Some(script), errors),
            Err(e) => {
                errors.push(ParseError::from_swc(source_map, fm, &e));
                (None, errors)
            }
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
