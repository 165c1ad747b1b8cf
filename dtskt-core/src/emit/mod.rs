//! Declaration emitters
//!
//! Each collected declaration becomes an [`Artifact`]: the Kotlin text of its
//! signatures and members, kept structured until the file is rendered so
//! fusion can still splice interface members into a class.

pub mod class;
pub mod function;
pub mod interface;
pub mod member;

pub use class::ClassArtifact;
pub use function::FunctionArtifact;
pub use interface::InterfaceArtifact;

use crate::header::HeaderArena;
use crate::mapper::TypeMapper;
use crate::scope::{DeclKey, Declaration, ScopeId, SymbolIndex};

/// Emitted form of one declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Function(FunctionArtifact),
    Class(ClassArtifact),
    Interface(InterfaceArtifact),
}

impl Artifact {
    /// Kotlin text, or `None` when the artifact renders through another one
    pub fn render(&self) -> Option<String> {
        match self {
            Artifact::Function(function) => Some(function.render()),
            Artifact::Class(class) => Some(class.render()),
            Artifact::Interface(interface) => interface.render(),
        }
    }
}

/// Emits the declarations of one scope
pub struct Emitter<'a> {
    index: &'a SymbolIndex,
    headers: &'a mut HeaderArena,
    scope: ScopeId,
}

impl<'a> Emitter<'a> {
    pub fn new(index: &'a SymbolIndex, headers: &'a mut HeaderArena, scope: ScopeId) -> Self {
        Self { index, headers, scope }
    }

    /// A mapper writing into the declaration's own header
    fn mapper(&mut self, key: &DeclKey) -> TypeMapper<'_> {
        let root = self.index.scope(self.scope).header;
        let header = self.headers.child(root, &key.header_label());
        TypeMapper::new(self.index, self.headers, self.scope, header)
    }

    pub fn emit(&mut self, key: &DeclKey, declaration: &Declaration) -> Option<Artifact> {
        match declaration {
            Declaration::Functions(overloads) => {
                let mut mapper = self.mapper(key);
                Some(Artifact::Function(function::emit_function(&mut mapper, &key.name, overloads)))
            }
            Declaration::Class(decl) => {
                let mut mapper = self.mapper(key);
                class::emit_class(&mut mapper, decl).map(Artifact::Class)
            }
            Declaration::Interface(decl) => {
                let paired = self.index.scope(self.scope).class(&key.name).is_some();
                let mut mapper = self.mapper(key);
                interface::emit_interface(&mut mapper, decl, paired).map(Artifact::Interface)
            }
        }
    }
}

const KOTLIN_KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "typeof", "val", "var", "when", "while",
];

/// Backtick-quote names that are hard keywords in Kotlin
pub fn kotlin_ident(name: &str) -> String {
    if KOTLIN_KEYWORDS.contains(&name) {
        format!("`{}`", name)
    } else {
        name.to_string()
    }
}

/// Indent every non-empty line
pub(crate) fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a `{ }` body: entries indented, blank line between entries
pub(crate) fn block(entries: &[String], width: usize) -> String {
    if entries.is_empty() {
        return "{}".to_string();
    }
    let body = entries
        .iter()
        .map(|entry| indent(entry, width))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{{\n{}\n}}", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kotlin_ident() {
        assert_eq!(kotlin_ident("object"), "`object`");
        assert_eq!(kotlin_ident("in"), "`in`");
        assert_eq!(kotlin_ident("listener"), "listener");
    }

    #[test]
    fn test_block() {
        assert_eq!(block(&[], 2), "{}");
        assert_eq!(
            block(&["val a: Int".to_string(), "fun b(): Unit".to_string()], 2),
            "{\n  val a: Int\n\n  fun b(): Unit\n}"
        );
    }

    #[test]
    fn test_indent_keeps_blank_lines_empty() {
        assert_eq!(indent("a\n\nb", 4), "    a\n\n    b");
    }
}
