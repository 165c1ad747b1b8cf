//! Symbol index: one scope per TypeScript module or namespace
//!
//! The index owns every [`ModuleScope`] of a run in an arena. Scopes form a
//! tree rooted at the synthetic `global` scope; parents are plain ids. A
//! scope's package is derived from its ancestor chain each time it is asked
//! for, and scopes are deduplicated by their output path, so visiting
//! `declare module "events"` twice (or once as `"node:events"`) lands in the
//! same scope.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::ast::{ClassDecl, FunctionDecl, InterfaceDecl, ModuleKind};
use crate::config::MappingConfig;
use crate::emit::Artifact;
use crate::header::{HeaderArena, HeaderId};

/// Index of a scope in the [`SymbolIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclKind {
    Function,
    Class,
    Interface,
}

impl DeclKind {
    pub const ALL: [DeclKind; 3] = [DeclKind::Function, DeclKind::Class, DeclKind::Interface];

    pub fn label(self) -> &'static str {
        match self {
            DeclKind::Function => "fun",
            DeclKind::Class => "class",
            DeclKind::Interface => "interface",
        }
    }
}

/// Declarations are unique per (kind, name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclKey {
    pub kind: DeclKind,
    pub name: String,
}

impl DeclKey {
    pub fn new(kind: DeclKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
        }
    }

    /// Label of the header a declaration's emitter writes into
    pub fn header_label(&self) -> String {
        format!("{}:{}", self.kind.label(), self.name)
    }
}

/// A collected source declaration, waiting for emission
#[derive(Debug, Clone)]
pub enum Declaration {
    /// All overloads of one function name
    Functions(Vec<FunctionDecl>),
    Class(ClassDecl),
    Interface(InterfaceDecl),
}

/// A TypeScript `import` binding visible in a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeImport {
    Named { module: String, name: String },
    Namespace { module: String },
}

/// Where a name resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolLocation {
    pub scope: ScopeId,
    /// The name as declared in `scope` (differs from the local name for
    /// `import { A as B }`)
    pub name: String,
}

/// One TypeScript module, namespace, or the global scope
#[derive(Debug)]
pub struct ModuleScope {
    /// Name as written in the source
    pub raw_name: String,
    pub kind: ModuleKind,
    /// Normalized identifier, used as the file stem
    pub ident: String,
    /// Package segment appended to the parent's package
    segment: String,
    pub parent: Option<ScopeId>,
    /// `@file:JsModule` marker for `declare module` scopes
    pub js_module: Option<String>,
    pub header: HeaderId,
    imports: IndexMap<String, ScopeImport>,
    declarations: IndexMap<DeclKey, Declaration>,
    artifacts: IndexMap<DeclKey, Artifact>,
}

impl ModuleScope {
    /// True if this scope declares `name` directly, in any kind
    pub fn declares(&self, name: &str) -> bool {
        DeclKind::ALL
            .iter()
            .any(|kind| self.declarations.contains_key(&DeclKey::new(*kind, name)))
    }

    pub fn declarations(&self) -> impl Iterator<Item = (&DeclKey, &Declaration)> {
        self.declarations.iter()
    }

    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        match self.declarations.get(&DeclKey::new(DeclKind::Class, name)) {
            Some(Declaration::Class(decl)) => Some(decl),
            _ => None,
        }
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceDecl> {
        match self.declarations.get(&DeclKey::new(DeclKind::Interface, name)) {
            Some(Declaration::Interface(decl)) => Some(decl),
            _ => None,
        }
    }

    pub fn import(&self, local_name: &str) -> Option<&ScopeImport> {
        self.imports.get(local_name)
    }

    pub fn artifact(&self, key: &DeclKey) -> Option<&Artifact> {
        self.artifacts.get(key)
    }

    pub fn artifact_mut(&mut self, key: &DeclKey) -> Option<&mut Artifact> {
        self.artifacts.get_mut(key)
    }

    pub fn artifacts(&self) -> impl Iterator<Item = (&DeclKey, &Artifact)> {
        self.artifacts.iter()
    }
}

/// Registry of every scope in a run
#[derive(Debug)]
pub struct SymbolIndex {
    config: MappingConfig,
    scopes: Vec<ModuleScope>,
    by_path: HashMap<String, ScopeId>,
    root: ScopeId,
}

impl SymbolIndex {
    /// Create an index holding only the global root scope
    pub fn new(config: MappingConfig, headers: &mut HeaderArena) -> Self {
        let header = headers.new_root("global");
        let global = ModuleScope {
            raw_name: "global".to_string(),
            kind: ModuleKind::Global,
            ident: "global".to_string(),
            segment: String::new(),
            parent: None,
            js_module: None,
            header,
            imports: IndexMap::new(),
            declarations: IndexMap::new(),
            artifacts: IndexMap::new(),
        };
        let mut index = Self {
            config,
            scopes: vec![global],
            by_path: HashMap::new(),
            root: ScopeId(0),
        };
        let path = index.output_path(index.root);
        index.by_path.insert(path, index.root);
        index
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    pub fn root(&self) -> ScopeId {
        self.root
    }

    pub fn scope(&self, id: ScopeId) -> &ModuleScope {
        &self.scopes[id.0]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut ModuleScope {
        &mut self.scopes[id.0]
    }

    /// Every scope id, in registration order
    pub fn scope_ids(&self) -> impl Iterator<Item = ScopeId> {
        (0..self.scopes.len()).map(ScopeId)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Get or create the scope for a module node.
    ///
    /// Global blocks always map to the root. Other scopes are deduplicated by
    /// output path; an ambient module without a parent hangs off the root.
    pub fn register_scope(
        &mut self,
        headers: &mut HeaderArena,
        name: &str,
        kind: ModuleKind,
        parent: Option<ScopeId>,
    ) -> ScopeId {
        if kind == ModuleKind::Global {
            return self.root;
        }
        let parent = parent.unwrap_or(self.root);
        // a namespace inside a module or namespace shares its parent's package
        let segment = if kind == ModuleKind::Namespace && parent != self.root {
            String::new()
        } else {
            package_segment(kind, name, &self.config.strip_module_prefix)
        };
        let ident = normalized_ident(kind, name, &self.config.strip_module_prefix);
        let package = join_package(&self.package_of(parent), &segment);
        let path = self.path_for(&package, &ident);

        if let Some(existing) = self.by_path.get(&path) {
            return *existing;
        }

        let header = headers.new_root(&path);
        let js_module = (kind == ModuleKind::Ambient).then(|| name.to_string());
        self.scopes.push(ModuleScope {
            raw_name: name.to_string(),
            kind,
            ident,
            segment,
            parent: Some(parent),
            js_module,
            header,
            imports: IndexMap::new(),
            declarations: IndexMap::new(),
            artifacts: IndexMap::new(),
        });
        let id = ScopeId(self.scopes.len() - 1);
        self.by_path.insert(path, id);
        id
    }

    /// Record a declaration; the same key overwrites
    pub fn declare(&mut self, scope: ScopeId, key: DeclKey, declaration: Declaration) {
        self.scopes[scope.0].declarations.insert(key, declaration);
    }

    pub fn add_import_binding(&mut self, scope: ScopeId, local_name: &str, import: ScopeImport) {
        self.scopes[scope.0]
            .imports
            .insert(local_name.to_string(), import);
    }

    pub fn store_artifact(&mut self, scope: ScopeId, key: DeclKey, artifact: Artifact) {
        self.scopes[scope.0].artifacts.insert(key, artifact);
    }

    // =========================================================================
    // Naming
    // =========================================================================

    /// Package of a scope, recomputed from the ancestor chain
    pub fn package_of(&self, id: ScopeId) -> String {
        let scope = &self.scopes[id.0];
        match scope.parent {
            None => self.config.root_package.clone(),
            Some(parent) => join_package(&self.package_of(parent), &scope.segment),
        }
    }

    /// Relative output path: package directories, normalized name, extension
    pub fn output_path(&self, id: ScopeId) -> String {
        self.path_for(&self.package_of(id), &self.scopes[id.0].ident)
    }

    fn path_for(&self, package: &str, ident: &str) -> String {
        format!(
            "{}/{}.{}",
            package.replace('.', "/"),
            ident,
            self.config.extension
        )
    }

    /// The `@file:JsModule` marker in effect for a scope
    pub fn effective_js_module(&self, id: ScopeId) -> Option<&str> {
        let mut current = Some(id);
        while let Some(scope_id) = current {
            let scope = &self.scopes[scope_id.0];
            if let Some(module) = &scope.js_module {
                return Some(module);
            }
            current = scope.parent;
        }
        None
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// True if `name` is declared or imported here, or in any ancestor
    pub fn has_key_name(&self, id: ScopeId, name: &str) -> bool {
        let mut current = Some(id);
        while let Some(scope_id) = current {
            let scope = &self.scopes[scope_id.0];
            if scope.declares(name) || scope.imports.contains_key(name) {
                return true;
            }
            current = scope.parent;
        }
        false
    }

    /// The nearest scope (self or ancestor) that declares `name` directly
    pub fn where_key_name(&self, id: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(id);
        while let Some(scope_id) = current {
            let scope = &self.scopes[scope_id.0];
            if scope.declares(name) {
                return Some(scope_id);
            }
            current = scope.parent;
        }
        None
    }

    /// Resolve a name to the scope that declares it, following direct
    /// declarations and named imports up the ancestor chain
    pub fn locate(&self, id: ScopeId, name: &str) -> Option<SymbolLocation> {
        let mut current = Some(id);
        while let Some(scope_id) = current {
            let scope = &self.scopes[scope_id.0];
            if scope.declares(name) {
                return Some(SymbolLocation {
                    scope: scope_id,
                    name: name.to_string(),
                });
            }
            if let Some(ScopeImport::Named { module, name: imported }) = scope.imports.get(name) {
                if let Some(target) = self.resolve_module(module) {
                    if self.scopes[target.0].declares(imported) {
                        return Some(SymbolLocation {
                            scope: target,
                            name: imported.clone(),
                        });
                    }
                }
            }
            current = scope.parent;
        }
        None
    }

    /// Find the registered scope of an ambient module by its source name
    pub fn resolve_module(&self, module: &str) -> Option<ScopeId> {
        let segment = package_segment(ModuleKind::Ambient, module, &self.config.strip_module_prefix);
        let ident = normalized_ident(ModuleKind::Ambient, module, &self.config.strip_module_prefix);
        let package = join_package(&self.package_of(self.root), &segment);
        self.by_path.get(&self.path_for(&package, &ident)).copied()
    }

    /// Package a `Namespace.Name` reference imports from.
    ///
    /// Checks `import * as ns` bindings visible from `id`, then registered
    /// namespaces with that name, and finally derives the package from the
    /// root the same way a registered namespace would get it.
    pub fn namespace_package(&self, id: ScopeId, namespace: &str) -> String {
        let mut current = Some(id);
        while let Some(scope_id) = current {
            let scope = &self.scopes[scope_id.0];
            if let Some(ScopeImport::Namespace { module }) = scope.imports.get(namespace) {
                if let Some(target) = self.resolve_module(module) {
                    return self.package_of(target);
                }
            }
            current = scope.parent;
        }

        let registered = self
            .scopes
            .iter()
            .position(|scope| scope.kind == ModuleKind::Namespace && scope.raw_name == namespace);
        match registered {
            Some(index) => self.package_of(ScopeId(index)),
            None => join_package(
                &self.config.root_package,
                &package_segment(ModuleKind::Namespace, namespace, ""),
            ),
        }
    }

    /// Scopes generated into `package`: a module and its nested namespaces
    pub fn scopes_in_package<'a>(&'a self, package: &'a str) -> impl Iterator<Item = ScopeId> + 'a {
        self.scope_ids().filter(move |id| self.package_of(*id) == package)
    }
}

// =============================================================================
// NAMING RULES
// =============================================================================

fn join_package(parent: &str, segment: &str) -> String {
    if segment.is_empty() {
        parent.to_string()
    } else if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

/// Lowercase identifier-safe package segment
fn sanitize_segment(raw: &str) -> String {
    let mut segment: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if segment.starts_with(|c: char| c.is_ascii_digit()) {
        segment.insert(0, '_');
    }
    segment
}

/// Package segment(s) a module contributes: `node:fs/promises` → `fs.promises`
fn package_segment(kind: ModuleKind, raw: &str, strip_prefix: &str) -> String {
    match kind {
        ModuleKind::Global => String::new(),
        ModuleKind::Ambient => strip_module_prefix(raw, strip_prefix)
            .split('/')
            .filter(|part| !part.is_empty())
            .map(sanitize_segment)
            .collect::<Vec<_>>()
            .join("."),
        ModuleKind::Namespace => sanitize_segment(raw),
    }
}

/// File stem of a module: `async_hooks` → `asyncHooks`, `NodeJS` stays
fn normalized_ident(kind: ModuleKind, raw: &str, strip_prefix: &str) -> String {
    match kind {
        ModuleKind::Global => "global".to_string(),
        ModuleKind::Namespace => raw.to_string(),
        ModuleKind::Ambient => {
            let stripped = strip_module_prefix(raw, strip_prefix);
            let last = stripped.rsplit('/').find(|part| !part.is_empty()).unwrap_or(stripped);
            camel_case(last)
        }
    }
}

fn strip_module_prefix<'a>(raw: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        raw
    } else {
        raw.strip_prefix(prefix).unwrap_or(raw)
    }
}

fn camel_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut upper_next = false;
    for c in raw.chars() {
        if c == '_' || c == '-' || c == '.' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Param, TypeRef};

    fn index() -> (SymbolIndex, HeaderArena) {
        let mut headers = HeaderArena::new();
        let index = SymbolIndex::new(MappingConfig::default(), &mut headers);
        (index, headers)
    }

    fn function(name: &str) -> Declaration {
        Declaration::Functions(vec![FunctionDecl {
            name: Some(name.to_string()),
            params: vec![Param::new("x", TypeRef::implicit_any())],
            return_type: TypeRef::implicit_any(),
            is_async: false,
        }])
    }

    #[test]
    fn test_naming_rules() {
        assert_eq!(camel_case("async_hooks"), "asyncHooks");
        assert_eq!(camel_case("string_decoder"), "stringDecoder");
        assert_eq!(camel_case("events"), "events");
        assert_eq!(package_segment(ModuleKind::Ambient, "node:fs/promises", "node:"), "fs.promises");
        assert_eq!(package_segment(ModuleKind::Namespace, "NodeJS", "node:"), "nodejs");
        assert_eq!(normalized_ident(ModuleKind::Ambient, "node:fs/promises", "node:"), "promises");
        assert_eq!(sanitize_segment("2d-canvas"), "_2d_canvas");
    }

    #[test]
    fn test_global_root_paths() {
        let (index, _) = index();
        let root = index.root();
        assert_eq!(index.package_of(root), "org.node");
        assert_eq!(index.output_path(root), "org/node/global.kt");
        assert_eq!(index.effective_js_module(root), None);
    }

    #[test]
    fn test_register_ambient_and_namespace() {
        let (mut index, mut headers) = index();
        let hooks = index.register_scope(&mut headers, "node:async_hooks", ModuleKind::Ambient, None);
        assert_eq!(index.package_of(hooks), "org.node.async_hooks");
        assert_eq!(index.output_path(hooks), "org/node/async_hooks/asyncHooks.kt");
        assert_eq!(index.effective_js_module(hooks), Some("node:async_hooks"));

        let ns = index.register_scope(&mut headers, "NodeJS", ModuleKind::Namespace, Some(index.root()));
        assert_eq!(index.package_of(ns), "org.node.nodejs");
        assert_eq!(index.output_path(ns), "org/node/nodejs/NodeJS.kt");

        let inner = index.register_scope(&mut headers, "Inner", ModuleKind::Namespace, Some(hooks));
        assert_eq!(index.package_of(inner), "org.node.async_hooks");
        assert_eq!(index.output_path(inner), "org/node/async_hooks/Inner.kt");
        assert_eq!(index.effective_js_module(inner), Some("node:async_hooks"));
    }

    #[test]
    fn test_nested_namespace_shares_parent_package() {
        let (mut index, mut headers) = index();
        let events = index.register_scope(&mut headers, "events", ModuleKind::Ambient, None);
        let emitter = index.register_scope(&mut headers, "EventEmitter", ModuleKind::Namespace, Some(events));
        assert_eq!(index.package_of(emitter), "org.node.events");
        assert_eq!(index.output_path(emitter), "org/node/events/EventEmitter.kt");
        assert_ne!(emitter, events);

        let ns = index.register_scope(&mut headers, "NodeJS", ModuleKind::Namespace, Some(index.root()));
        let timers = index.register_scope(&mut headers, "Timers", ModuleKind::Namespace, Some(ns));
        assert_eq!(index.package_of(timers), "org.node.nodejs");
        assert_eq!(index.output_path(timers), "org/node/nodejs/Timers.kt");

        assert_eq!(index.namespace_package(events, "EventEmitter"), "org.node.events");
    }

    #[test]
    fn test_register_is_deduplicated_by_path() {
        let (mut index, mut headers) = index();
        let a = index.register_scope(&mut headers, "events", ModuleKind::Ambient, None);
        let b = index.register_scope(&mut headers, "node:events", ModuleKind::Ambient, None);
        let global = index.register_scope(&mut headers, "global", ModuleKind::Global, Some(a));
        assert_eq!(a, b);
        assert_eq!(global, index.root());
        assert_eq!(index.len(), 2);
        assert_eq!(index.resolve_module("node:events"), Some(a));
        assert_eq!(index.resolve_module("stream"), None);
    }

    #[test]
    fn test_key_name_lookup_walks_up() {
        let (mut index, mut headers) = index();
        let root = index.root();
        index.declare(root, DeclKey::new(DeclKind::Interface, "AbortSignal"), function("AbortSignal"));
        let events = index.register_scope(&mut headers, "events", ModuleKind::Ambient, None);
        index.declare(events, DeclKey::new(DeclKind::Function, "once"), function("once"));

        assert!(index.has_key_name(events, "AbortSignal"));
        assert!(index.has_key_name(events, "once"));
        assert!(!index.has_key_name(root, "once"));
        assert_eq!(index.where_key_name(events, "AbortSignal"), Some(root));
        assert_eq!(index.where_key_name(events, "once"), Some(events));
        assert_eq!(index.where_key_name(events, "missing"), None);
    }

    #[test]
    fn test_locate_follows_named_imports() {
        let (mut index, mut headers) = index();
        let hooks = index.register_scope(&mut headers, "async_hooks", ModuleKind::Ambient, None);
        index.declare(hooks, DeclKey::new(DeclKind::Class, "AsyncResource"), function("AsyncResource"));
        let events = index.register_scope(&mut headers, "events", ModuleKind::Ambient, None);
        index.add_import_binding(
            events,
            "Resource",
            ScopeImport::Named {
                module: "node:async_hooks".to_string(),
                name: "AsyncResource".to_string(),
            },
        );

        assert!(index.has_key_name(events, "Resource"));
        assert_eq!(index.where_key_name(events, "Resource"), None);
        assert_eq!(
            index.locate(events, "Resource"),
            Some(SymbolLocation {
                scope: hooks,
                name: "AsyncResource".to_string()
            })
        );
    }

    #[test]
    fn test_namespace_package() {
        let (mut index, mut headers) = index();
        let root = index.root();
        let fs = index.register_scope(&mut headers, "fs", ModuleKind::Ambient, None);
        let events = index.register_scope(&mut headers, "events", ModuleKind::Ambient, None);
        index.add_import_binding(
            events,
            "filesystem",
            ScopeImport::Namespace {
                module: "node:fs".to_string(),
            },
        );
        let _ns = index.register_scope(&mut headers, "NodeJS", ModuleKind::Namespace, Some(root));

        assert_eq!(index.namespace_package(events, "filesystem"), index.package_of(fs));
        assert_eq!(index.namespace_package(events, "NodeJS"), "org.node.nodejs");
        assert_eq!(index.namespace_package(events, "Intl"), "org.node.intl");
    }
}
