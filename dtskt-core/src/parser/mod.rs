//! TreeSitter-based `.d.ts` parser
//!
//! Parses TypeScript declaration files with tree-sitter and lowers the syntax
//! tree into the declaration model in [`crate::ast`].

pub mod declarations;
pub mod types;

use std::fs;
use std::path::Path;
use thiserror::Error;
use tree_sitter::Node;

use crate::ast::SourceFile;

/// Errors that can occur during parsing
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse: {0}")]
    Parse(String),
    #[error("TreeSitter error: {0}")]
    TreeSitter(String),
}

/// True for paths the generator reads (`.ts`, including `.d.ts`)
pub fn is_typescript_path(path: &str) -> bool {
    let ext = path.rsplit('.').next().unwrap_or("");
    ext.eq_ignore_ascii_case("ts") || ext.eq_ignore_ascii_case("mts") || ext.eq_ignore_ascii_case("cts")
}

/// Source text of a node; empty for invalid UTF-8
pub(crate) fn node_text<'s>(node: Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Parse a file from disk
pub fn parse_file(path: &Path) -> Result<SourceFile, ParseError> {
    let source = fs::read_to_string(path)?;
    parse_string(&source, &path.to_string_lossy())
}

/// Parse source text; `file_path` is only recorded in the result
pub fn parse_string(source: &str, file_path: &str) -> Result<SourceFile, ParseError> {
    let language: tree_sitter::Language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();

    let mut parser = tree_sitter::Parser::new();
    parser.set_language(&language)
        .map_err(|e| ParseError::TreeSitter(e.to_string()))?;

    let tree = parser.parse(source, None)
        .ok_or_else(|| ParseError::Parse("Failed to parse source".to_string()))?;

    let root = tree.root_node();
    if root.has_error() {
        tracing::debug!(file = file_path, "syntax errors in input, lowering what parsed");
    }

    Ok(SourceFile {
        path: file_path.to_string(),
        modules: declarations::lower_program(root, source),
    })
}
