//! Declaration model lowered from TypeScript `.d.ts` sources
//!
//! The generator never touches tree-sitter nodes directly. The parser lowers
//! every ambient module into these plain data types, which is all the symbol
//! index, the type mapper and the emitters need. Everything here is
//! serializable so `--dump-ast` can show exactly what the generator saw.

use serde::Serialize;

/// A parsed `.d.ts` file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    /// File path or "<input>"
    pub path: String,

    /// Top-level module declarations, in source order
    pub modules: Vec<ModuleNode>,
}

impl SourceFile {
    /// Pretty JSON rendering of the lowered model
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// How a module node was introduced in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleKind {
    /// `declare global { }` or top-level script declarations
    Global,
    /// `declare module "name" { }`
    Ambient,
    /// `namespace Name { }` / `declare namespace Name { }`
    Namespace,
}

/// One TypeScript module or namespace block
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleNode {
    /// Raw name as written (`node:events`, `NodeJS`, `global`)
    pub name: String,
    pub kind: ModuleKind,
    pub body: Vec<Statement>,
}

impl ModuleNode {
    pub fn new(name: impl Into<String>, kind: ModuleKind) -> Self {
        Self {
            name: name.into(),
            kind,
            body: Vec::new(),
        }
    }

    /// The synthetic root module every script-level declaration belongs to
    pub fn global() -> Self {
        Self::new("global", ModuleKind::Global)
    }

    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.body.push(statement);
        self
    }
}

/// A statement inside a module body that the generator cares about
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "statement", rename_all = "camelCase")]
pub enum Statement {
    Function(FunctionDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Module(ModuleNode),
    Import(ImportDecl),
}

/// `import { A, B as C } from "module"` / `import * as ns from "module"`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDecl {
    pub module: String,
    pub bindings: Vec<ImportBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ImportBinding {
    /// `name` or `name as alias`
    Named { name: String, alias: Option<String> },
    /// `* as alias`
    Namespace { alias: String },
}

impl ImportBinding {
    /// The identifier this binding introduces into the importing scope
    pub fn local_name(&self) -> &str {
        match self {
            ImportBinding::Named { name, alias } => alias.as_deref().unwrap_or(name),
            ImportBinding::Namespace { alias } => alias,
        }
    }
}

/// `function name(params): Ret;`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDecl {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub is_async: bool,
}

/// `class Name extends Base { ... }`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDecl {
    pub name: Option<String>,
    pub extends: Option<TypeRef>,
    /// Parameter lists of every `constructor(...)` signature, in source order
    pub constructors: Vec<Vec<Param>>,
    pub members: Vec<Member>,
}

/// `interface Name extends A, B { ... }`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDecl {
    pub name: Option<String>,
    pub extends: Vec<TypeRef>,
    pub members: Vec<Member>,
}

/// A function or method parameter
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
    /// `...args`
    pub rest: bool,
    /// `name?: T`
    pub optional: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            rest: false,
            optional: false,
        }
    }

    pub fn rest(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            rest: true,
            ..Self::new(name, ty)
        }
    }
}

/// Member name shapes found in class and interface bodies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "camelCase")]
pub enum MemberName {
    /// Plain identifier, usable as a Kotlin name
    Identifier(String),
    /// `"quoted-name"` or `'quoted'`
    Quoted(String),
    /// `[Symbol.iterator]`
    Computed(String),
}

impl MemberName {
    pub fn text(&self) -> &str {
        match self {
            MemberName::Identifier(s) | MemberName::Quoted(s) | MemberName::Computed(s) => s,
        }
    }
}

/// Class and interface members, as a closed set of kinds
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Member {
    Method(MethodMember),
    Property(PropertyMember),
    Accessor(AccessorMember),
}

impl Member {
    pub fn name(&self) -> &MemberName {
        match self {
            Member::Method(m) => &m.name,
            Member::Property(p) => &p.name,
            Member::Accessor(a) => &a.name,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            Member::Method(m) => m.is_static,
            Member::Property(p) => p.is_static,
            Member::Accessor(a) => a.is_static,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodMember {
    pub name: MemberName,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub is_static: bool,
    pub is_async: bool,
    pub is_override: bool,
    /// `name?(...)`
    pub optional: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMember {
    pub name: MemberName,
    pub ty: TypeRef,
    pub is_static: bool,
    pub is_override: bool,
    pub readonly: bool,
    pub optional: bool,
}

/// `get name(): T` / `set name(value: T)` pairs, merged by name
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessorMember {
    pub name: MemberName,
    pub ty: TypeRef,
    pub is_static: bool,
    pub is_override: bool,
    pub has_setter: bool,
}

// =============================================================================
// TYPES
// =============================================================================

/// A type position: either structurally resolved, or only raw source text
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "type", rename_all = "camelCase")]
pub enum TypeRef {
    Resolved(ResolvedType),
    Unresolved(String),
}

impl TypeRef {
    /// Unannotated positions are implicitly `any`
    pub fn implicit_any() -> Self {
        TypeRef::Unresolved("any".to_string())
    }

    pub fn text(&self) -> &str {
        match self {
            TypeRef::Resolved(resolved) => &resolved.text,
            TypeRef::Unresolved(text) => text,
        }
    }
}

/// Structural classification of a resolved type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeShape {
    String,
    StringLiteral,
    Boolean,
    BooleanLiteral,
    Number,
    NumberLiteral,
    Undefined,
    Void,
    Object,
    Any,
    Unknown,
    This,
    Array { element: Box<ResolvedType> },
    /// `T | undefined`
    Nullable { inner: Box<ResolvedType> },
    /// `Name`, `Ns.Name`, `Name<Args>`
    Reference {
        name: String,
        type_arguments: Vec<ResolvedType>,
    },
    /// Resolved, but nothing the mapper has a rule for (`null`, `never`, unions)
    Other,
}

/// A resolved type handle: the source text plus its classification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedType {
    pub text: String,
    pub shape: TypeShape,
}

impl ResolvedType {
    pub fn new(text: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            text: text.into(),
            shape,
        }
    }

    pub fn reference(name: &str) -> Self {
        Self::new(
            name,
            TypeShape::Reference {
                name: name.to_string(),
                type_arguments: Vec::new(),
            },
        )
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_string(&self) -> bool {
        matches!(self.shape, TypeShape::String | TypeShape::StringLiteral)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.shape, TypeShape::Boolean)
    }

    pub fn is_boolean_literal(&self) -> bool {
        matches!(self.shape, TypeShape::BooleanLiteral)
    }

    pub fn is_number(&self) -> bool {
        matches!(self.shape, TypeShape::Number)
    }

    pub fn is_number_literal(&self) -> bool {
        matches!(self.shape, TypeShape::NumberLiteral)
    }

    pub fn is_array(&self) -> bool {
        matches!(self.shape, TypeShape::Array { .. })
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self.shape, TypeShape::Nullable { .. })
    }

    pub fn array_element_type(&self) -> Option<&ResolvedType> {
        match &self.shape {
            TypeShape::Array { element } => Some(element),
            _ => None,
        }
    }

    /// `T` for `T | undefined`
    pub fn non_nullable_type(&self) -> Option<&ResolvedType> {
        match &self.shape {
            TypeShape::Nullable { inner } => Some(inner),
            _ => None,
        }
    }

    /// Name of a type reference, qualified or not
    pub fn reference_name(&self) -> Option<&str> {
        match &self.shape {
            TypeShape::Reference { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn type_arguments(&self) -> &[ResolvedType] {
        match &self.shape {
            TypeShape::Reference { type_arguments, .. } => type_arguments,
            _ => &[],
        }
    }
}

impl From<ResolvedType> for TypeRef {
    fn from(resolved: ResolvedType) -> Self {
        TypeRef::Resolved(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_binding_local_name() {
        let named = ImportBinding::Named {
            name: "AsyncResource".to_string(),
            alias: None,
        };
        let aliased = ImportBinding::Named {
            name: "EventEmitter".to_string(),
            alias: Some("Emitter".to_string()),
        };
        let ns = ImportBinding::Namespace {
            alias: "fs".to_string(),
        };
        assert_eq!(named.local_name(), "AsyncResource");
        assert_eq!(aliased.local_name(), "Emitter");
        assert_eq!(ns.local_name(), "fs");
    }

    #[test]
    fn test_resolved_type_capabilities() {
        let element = ResolvedType::new("string", TypeShape::String);
        let array = ResolvedType::new(
            "string[]",
            TypeShape::Array {
                element: Box::new(element.clone()),
            },
        );
        assert!(array.is_array());
        assert_eq!(array.array_element_type(), Some(&element));
        assert!(element.is_string());
        assert!(!element.is_nullable());
        assert!(array.type_arguments().is_empty());
    }

    #[test]
    fn test_serialize_type_ref() {
        let ty = TypeRef::Unresolved("(a: number) => void".to_string());
        let json = serde_json::to_string(&ty).unwrap();
        assert!(json.contains("unresolved"));
        assert!(json.contains("=> void"));
    }
}
