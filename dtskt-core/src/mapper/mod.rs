//! Type mapper: TypeScript type positions to Kotlin type text
//!
//! Classification runs one rule list, in priority order, over anything that
//! implements [`TypeDescriptor`]. Resolved types and raw text take the same
//! path, so both signal sources always agree on precedence.
//!
//! Mapping has one side effect: rules that need an import register it in the
//! header the mapper was created for.

pub mod descriptor;

use std::fmt;

use crate::ast::TypeRef;
use crate::header::{HeaderArena, HeaderId};
use crate::scope::{ScopeId, SymbolIndex};

pub use descriptor::{split_top_level, TextType, TypeDescriptor};

/// Per-position inputs to a mapping
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeContext<'a> {
    /// Name of the parameter, property or function the type belongs to
    pub alias: Option<&'a str>,
    /// What `this` stands for (the enclosing class or interface)
    pub this_name: Option<&'a str>,
    /// Drop the trailing `/* original */` comment
    pub suppress_comment: bool,
}

impl<'a> TypeContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alias(mut self, alias: &'a str) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn this_name(mut self, this_name: &'a str) -> Self {
        self.this_name = Some(this_name);
        self
    }

    pub fn quiet(mut self) -> Self {
        self.suppress_comment = true;
        self
    }
}

/// A mapped Kotlin type: `base`, `?` when nullable, then the comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    pub base: String,
    pub nullable: bool,
    /// Original text of the (non-null) type, when it differs from `base`
    pub comment: Option<String>,
}

impl MappedType {
    fn plain(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            nullable: false,
            comment: None,
        }
    }

    fn with_comment(base: impl Into<String>, comment: Option<String>) -> Self {
        Self {
            comment,
            ..Self::plain(base)
        }
    }

    fn into_nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// The type without its comment, for use inside other types
    pub fn bare(&self) -> String {
        if self.nullable {
            format!("{}?", self.base)
        } else {
            self.base.clone()
        }
    }
}

impl fmt::Display for MappedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bare())?;
        if let Some(comment) = &self.comment {
            write!(f, " /* {} */", comment)?;
        }
        Ok(())
    }
}

/// Collapse whitespace and neutralize comment terminators
fn sanitize_comment(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("*/", "*\\/")
}

/// Maps types for one emitter.
///
/// `resolve_from` is where names are looked up; `home` is the scope the
/// output lands in and decides whether a found symbol needs an import. They
/// differ only when members of a foreign interface are re-emitted into a
/// class.
pub struct TypeMapper<'a> {
    index: &'a SymbolIndex,
    headers: &'a mut HeaderArena,
    resolve_from: ScopeId,
    home: ScopeId,
    header: HeaderId,
}

impl<'a> TypeMapper<'a> {
    pub fn new(index: &'a SymbolIndex, headers: &'a mut HeaderArena, scope: ScopeId, header: HeaderId) -> Self {
        Self {
            index,
            headers,
            resolve_from: scope,
            home: scope,
            header,
        }
    }

    /// Look names up in `scope` instead of the home scope
    pub fn resolving_from(mut self, scope: ScopeId) -> Self {
        self.resolve_from = scope;
        self
    }

    /// Map a type position
    pub fn map(&mut self, ty: &TypeRef, ctx: &TypeContext) -> MappedType {
        match ty {
            TypeRef::Resolved(resolved) => self.classify(&resolved, ctx),
            TypeRef::Unresolved(text) => self.classify(&TextType::new(text), ctx),
        }
    }

    /// Map and render in one go
    pub fn render(&mut self, ty: &TypeRef, ctx: &TypeContext) -> String {
        self.map(ty, ctx).to_string()
    }

    fn classify<D: TypeDescriptor>(&mut self, ty: &D, ctx: &TypeContext) -> MappedType {
        if let Some(inner) = ty.nullable_inner() {
            return self.classify(&inner, ctx).into_nullable();
        }

        let text = ty.text().trim();
        let comment = |exact: bool| {
            if exact || ctx.suppress_comment {
                None
            } else {
                Some(sanitize_comment(text))
            }
        };

        if let Some(name) = ty.symbol_name() {
            if self.resolve_known(name) {
                return MappedType::with_comment(name, comment(text == name));
            }
        }

        if let Some((namespace, name)) = ty.qualified_name() {
            let alias = format!("{}_{}", namespace, name);
            let package = self.index.namespace_package(self.resolve_from, namespace);
            self.headers.add_import(self.header, &package, name, Some(&alias));
            return MappedType::with_comment(alias, comment(text == format!("{}.{}", namespace, name)));
        }

        if ty.is_string() {
            return MappedType::with_comment("String", comment(text == "string"));
        }

        if ty.is_boolean() {
            return MappedType::with_comment("Boolean", comment(text == "boolean"));
        }

        if ty.is_number() {
            let heuristic = self.index.config().id_heuristic;
            let base = if ctx.alias.is_some_and(|alias| heuristic.is_id(alias)) {
                "Int"
            } else {
                "Double"
            };
            return MappedType::with_comment(base, comment(text == "number"));
        }

        if let Some(element) = ty.array_element() {
            let base = self.array(&element, ctx);
            return MappedType::with_comment(base, comment(false));
        }

        if ty.is_void() {
            return MappedType::with_comment("Unit", comment(true));
        }

        if let Some(argument) = ty.promise_argument() {
            let package = self.index.config().promise_package.clone();
            self.headers.add_import(self.header, &package, "Promise", None);
            let base = match argument {
                Some(arg) => {
                    let inner = self.classify(&arg, &ctx.quiet());
                    format!("Promise<{}>", inner.bare())
                }
                None => "Promise<*>".to_string(),
            };
            return MappedType::with_comment(base, comment(false));
        }

        if ty.is_opaque() {
            return MappedType::with_comment("JsAny", comment(true));
        }

        if ty.is_this() {
            if let Some(this_name) = ctx.this_name.filter(|name| !name.is_empty()) {
                return MappedType::with_comment(this_name, comment(false));
            }
        }

        tracing::debug!(text = %text, "no mapping rule, falling back to JsAny");
        MappedType::with_comment("JsAny", comment(false))
    }

    /// Wrap an already mapped type in `Promise<...>`, for async declarations
    pub fn promise_of(&mut self, inner: MappedType) -> MappedType {
        let package = self.index.config().promise_package.clone();
        self.headers.add_import(self.header, &package, "Promise", None);
        MappedType::with_comment(format!("Promise<{}>", inner.bare()), inner.comment)
    }

    /// Rule 1: a name the symbol index resolves, through a declaration or a
    /// TypeScript import binding. Imports the mapper added for its own rules
    /// (`Promise`, primitive arrays, namespace aliases) do not count.
    fn resolve_known(&mut self, name: &str) -> bool {
        if !self.index.has_key_name(self.resolve_from, name) {
            return false;
        }
        let Some(location) = self.index.locate(self.resolve_from, name) else {
            return false;
        };
        let package = self.index.package_of(location.scope);
        let alias = (location.name != name).then_some(name);
        if location.scope != self.home && (alias.is_some() || package != self.index.package_of(self.home)) {
            self.headers.add_import(self.header, &package, &location.name, alias);
        }
        true
    }

    fn array<D: TypeDescriptor>(&mut self, element: &D, ctx: &TypeContext) -> String {
        let specialized = match element.text().trim() {
            "string" => Some("JsStringArray"),
            "number" => Some("JsNumberArray"),
            "boolean" => Some("JsBooleanArray"),
            _ => None,
        };
        match specialized {
            Some(name) => {
                let root = self.index.config().root_package.clone();
                self.headers.add_import(self.header, &root, name, None);
                name.to_string()
            }
            None => {
                let inner = self.classify(element, &ctx.quiet());
                format!("JsArray<{}>", inner.bare())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ClassDecl, ModuleKind, ResolvedType, TypeShape};
    use crate::config::{IdHeuristic, MappingConfig};
    use crate::scope::{DeclKey, DeclKind, Declaration, ScopeImport};

    struct Fixture {
        index: SymbolIndex,
        headers: HeaderArena,
        events: ScopeId,
        hooks: ScopeId,
    }

    fn class(name: &str) -> Declaration {
        Declaration::Class(ClassDecl {
            name: Some(name.to_string()),
            extends: None,
            constructors: Vec::new(),
            members: Vec::new(),
        })
    }

    fn fixture(config: MappingConfig) -> Fixture {
        let mut headers = HeaderArena::new();
        let mut index = SymbolIndex::new(config, &mut headers);
        let root = index.root();
        index.declare(root, DeclKey::new(DeclKind::Class, "AbortSignal"), class("AbortSignal"));
        let hooks = index.register_scope(&mut headers, "node:async_hooks", ModuleKind::Ambient, None);
        index.declare(hooks, DeclKey::new(DeclKind::Class, "AsyncResource"), class("AsyncResource"));
        let events = index.register_scope(&mut headers, "node:events", ModuleKind::Ambient, None);
        index.declare(events, DeclKey::new(DeclKind::Class, "EventEmitter"), class("EventEmitter"));
        index.add_import_binding(
            events,
            "Resource",
            ScopeImport::Named {
                module: "async_hooks".to_string(),
                name: "AsyncResource".to_string(),
            },
        );
        Fixture {
            index,
            headers,
            events,
            hooks,
        }
    }

    fn map_text(f: &mut Fixture, text: &str, ctx: TypeContext) -> String {
        let header = f.index.scope(f.events).header;
        let mut mapper = TypeMapper::new(&f.index, &mut f.headers, f.events, header);
        mapper.render(&TypeRef::Unresolved(text.to_string()), &ctx)
    }

    fn imports(f: &Fixture) -> String {
        f.headers.render(f.index.scope(f.events).header)
    }

    #[test]
    fn test_primitives() {
        let mut f = fixture(MappingConfig::default());
        assert_eq!(map_text(&mut f, "string", TypeContext::new()), "String");
        assert_eq!(map_text(&mut f, "boolean", TypeContext::new()), "Boolean");
        assert_eq!(map_text(&mut f, "number", TypeContext::new()), "Double");
        assert_eq!(map_text(&mut f, "void", TypeContext::new()), "Unit");
        assert_eq!(map_text(&mut f, "undefined", TypeContext::new()), "Unit");
        assert_eq!(map_text(&mut f, "unknown", TypeContext::new()), "JsAny");
        assert_eq!(map_text(&mut f, "object", TypeContext::new()), "JsAny");
        assert_eq!(map_text(&mut f, "any", TypeContext::new()), "JsAny");
        assert_eq!(imports(&f), "");
    }

    #[test]
    fn test_literals_keep_their_text() {
        let mut f = fixture(MappingConfig::default());
        assert_eq!(map_text(&mut f, "'utf8'", TypeContext::new()), "String /* 'utf8' */");
        assert_eq!(map_text(&mut f, "true", TypeContext::new()), "Boolean /* true */");
        assert_eq!(map_text(&mut f, "42", TypeContext::new()), "Double /* 42 */");
    }

    #[test]
    fn test_id_heuristic() {
        let mut f = fixture(MappingConfig::default());
        assert_eq!(map_text(&mut f, "number", TypeContext::new().alias("asyncId")), "Int");
        assert_eq!(map_text(&mut f, "number", TypeContext::new().alias("Id")), "Double");
        assert_eq!(map_text(&mut f, "number", TypeContext::new().alias("count")), "Double");

        let mut f = fixture(MappingConfig {
            id_heuristic: IdHeuristic::Contains,
            ..MappingConfig::default()
        });
        assert_eq!(map_text(&mut f, "number", TypeContext::new().alias("Id")), "Int");
    }

    #[test]
    fn test_nullable_round_trip() {
        let mut f = fixture(MappingConfig::default());
        for text in ["string", "number", "'a' | 'b'", "Foo<Bar>", "EventEmitter", "string[]"] {
            let plain = map_text(&mut f, text, TypeContext::new());
            let nullable = map_text(&mut f, &format!("{} | undefined", text), TypeContext::new());
            let expected = match plain.split_once(" /* ") {
                Some((base, rest)) => format!("{}? /* {}", base, rest),
                None => format!("{}?", plain),
            };
            assert_eq!(nullable, expected, "nullable form of {}", text);
        }
    }

    #[test]
    fn test_known_symbol_same_scope_no_import() {
        let mut f = fixture(MappingConfig::default());
        assert_eq!(map_text(&mut f, "EventEmitter", TypeContext::new()), "EventEmitter");
        assert_eq!(imports(&f), "");
    }

    #[test]
    fn test_known_symbol_from_ancestor_is_imported() {
        let mut f = fixture(MappingConfig::default());
        assert_eq!(map_text(&mut f, "AbortSignal", TypeContext::new()), "AbortSignal");
        assert_eq!(imports(&f), "import org.node.AbortSignal");
    }

    #[test]
    fn test_known_symbol_through_import_binding() {
        let mut f = fixture(MappingConfig::default());
        assert_eq!(map_text(&mut f, "Resource", TypeContext::new()), "Resource");
        assert_eq!(
            imports(&f),
            "import org.node.async_hooks.AsyncResource as Resource"
        );
    }

    #[test]
    fn test_known_symbol_with_type_arguments() {
        let mut f = fixture(MappingConfig::default());
        assert_eq!(
            map_text(&mut f, "EventEmitter<Events>", TypeContext::new()),
            "EventEmitter /* EventEmitter<Events> */"
        );
    }

    #[test]
    fn test_known_symbol_wins_over_primitive_rules() {
        let mut f = fixture(MappingConfig::default());
        let root = f.index.root();
        f.index.declare(root, DeclKey::new(DeclKind::Class, "Promise"), class("Promise"));
        assert_eq!(map_text(&mut f, "Promise", TypeContext::new()), "Promise");
        assert_eq!(imports(&f), "import org.node.Promise");
    }

    #[test]
    fn test_qualified_name() {
        let mut f = fixture(MappingConfig::default());
        assert_eq!(
            map_text(&mut f, "NodeJS.EventEmitter", TypeContext::new()),
            "NodeJS_EventEmitter"
        );
        assert_eq!(
            imports(&f),
            "import org.node.nodejs.EventEmitter as NodeJS_EventEmitter"
        );
    }

    #[test]
    fn test_qualified_name_through_namespace_import() {
        let mut f = fixture(MappingConfig::default());
        let events = f.events;
        f.index.add_import_binding(
            events,
            "hooks",
            ScopeImport::Namespace {
                module: "node:async_hooks".to_string(),
            },
        );
        assert_eq!(map_text(&mut f, "hooks.AsyncResource", TypeContext::new()), "hooks_AsyncResource");
        assert_eq!(
            imports(&f),
            "import org.node.async_hooks.AsyncResource as hooks_AsyncResource"
        );
    }

    #[test]
    fn test_arrays() {
        let mut f = fixture(MappingConfig::default());
        assert_eq!(map_text(&mut f, "string[]", TypeContext::new()), "JsStringArray /* string[] */");
        assert_eq!(map_text(&mut f, "Array<number>", TypeContext::new()), "JsNumberArray /* Array<number> */");
        assert_eq!(map_text(&mut f, "boolean[]", TypeContext::new()), "JsBooleanArray /* boolean[] */");
        assert_eq!(
            map_text(&mut f, "AbortSignal[]", TypeContext::new()),
            "JsArray<AbortSignal> /* AbortSignal[] */"
        );
        assert_eq!(
            map_text(&mut f, "'a'[]", TypeContext::new().quiet()),
            "JsArray<String>"
        );
        assert_eq!(
            imports(&f),
            "import org.node.AbortSignal\nimport org.node.JsBooleanArray\nimport org.node.JsNumberArray\nimport org.node.JsStringArray"
        );
    }

    #[test]
    fn test_promise() {
        let mut f = fixture(MappingConfig::default());
        assert_eq!(map_text(&mut f, "Promise<void>", TypeContext::new()), "Promise<Unit> /* Promise<void> */");
        assert_eq!(map_text(&mut f, "Promise", TypeContext::new().quiet()), "Promise<*>");
        assert_eq!(
            map_text(&mut f, "Promise<string | undefined>", TypeContext::new().quiet()),
            "Promise<String?>"
        );
        assert_eq!(imports(&f), "import kotlin.js.Promise");
    }

    #[test]
    fn test_this_and_fallback() {
        let mut f = fixture(MappingConfig::default());
        assert_eq!(
            map_text(&mut f, "this", TypeContext::new().this_name("EventEmitter")),
            "EventEmitter /* this */"
        );
        assert_eq!(map_text(&mut f, "this", TypeContext::new()), "JsAny /* this */");
        assert_eq!(
            map_text(&mut f, "(err: Error) => void", TypeContext::new()),
            "JsAny /* (err: Error) => void */"
        );
        assert_eq!(map_text(&mut f, "symbol", TypeContext::new().quiet()), "JsAny");
    }

    #[test]
    fn test_unions_and_callbacks_fall_back() {
        let mut f = fixture(MappingConfig::default());
        assert_eq!(
            map_text(&mut f, "(id: string) => string | undefined", TypeContext::new()),
            "JsAny /* (id: string) => string | undefined */"
        );
        assert_eq!(
            map_text(&mut f, "AbortSignal<A> | { a: 1 } | AbortSignal<B>", TypeContext::new()),
            "JsAny /* AbortSignal<A> | { a: 1 } | AbortSignal<B> */"
        );
        assert_eq!(
            map_text(&mut f, "Promise<void> | { a: 1 } | Promise<string>", TypeContext::new()),
            "JsAny /* Promise<void> | { a: 1 } | Promise<string> */"
        );
        assert_eq!(
            map_text(&mut f, "Array<string> | { a: 1 } | Array<number>", TypeContext::new()),
            "JsAny /* Array<string> | { a: 1 } | Array<number> */"
        );
        assert_eq!(imports(&f), "");
    }

    #[test]
    fn test_comment_is_sanitized() {
        let mut f = fixture(MappingConfig::default());
        assert_eq!(
            map_text(&mut f, "{\n  a: 1; /* x */\n}", TypeContext::new()),
            "JsAny /* { a: 1; /* x *\\/ } */"
        );
    }

    #[test]
    fn test_resolved_and_text_agree() {
        let mut f = fixture(MappingConfig::default());
        let resolved = ResolvedType::new(
            "AbortSignal | undefined",
            TypeShape::Nullable {
                inner: Box::new(ResolvedType::reference("AbortSignal")),
            },
        );
        let header = f.index.scope(f.events).header;
        let from_resolved = {
            let mut mapper = TypeMapper::new(&f.index, &mut f.headers, f.events, header);
            mapper.render(&TypeRef::Resolved(resolved), &TypeContext::new())
        };
        let from_text = map_text(&mut f, "AbortSignal | undefined", TypeContext::new());
        assert_eq!(from_resolved, "AbortSignal?");
        assert_eq!(from_resolved, from_text);
    }

    #[test]
    fn test_resolving_from_foreign_scope() {
        let mut f = fixture(MappingConfig::default());
        let header = f.index.scope(f.events).header;
        let mut mapper = TypeMapper::new(&f.index, &mut f.headers, f.events, header).resolving_from(f.hooks);
        assert_eq!(
            mapper.render(&TypeRef::Unresolved("AsyncResource".to_string()), &TypeContext::new()),
            "AsyncResource"
        );
        assert_eq!(imports(&f), "import org.node.async_hooks.AsyncResource");
    }

    #[test]
    fn test_generated_imports_are_not_known_symbols() {
        let mut f = fixture(MappingConfig::default());
        assert_eq!(map_text(&mut f, "Promise<any[]>", TypeContext::new().quiet()), "Promise<JsArray<JsAny>>");
        assert_eq!(map_text(&mut f, "Promise<void>", TypeContext::new()), "Promise<Unit> /* Promise<void> */");
        assert_eq!(map_text(&mut f, "string[]", TypeContext::new().quiet()), "JsStringArray");
        assert_eq!(map_text(&mut f, "JsStringArray", TypeContext::new()), "JsAny /* JsStringArray */");
        assert_eq!(map_text(&mut f, "NodeJS.Dict", TypeContext::new()), "NodeJS_Dict");
        assert_eq!(map_text(&mut f, "NodeJS_Dict", TypeContext::new()), "JsAny /* NodeJS_Dict */");
    }

    #[test]
    fn test_unresolvable_import_binding_falls_through() {
        let mut f = fixture(MappingConfig::default());
        let events = f.events;
        f.index.add_import_binding(
            events,
            "Readable",
            ScopeImport::Named {
                module: "stream".to_string(),
                name: "Readable".to_string(),
            },
        );
        assert_eq!(map_text(&mut f, "Readable", TypeContext::new()), "JsAny /* Readable */");
        assert_eq!(imports(&f), "");
    }
}
