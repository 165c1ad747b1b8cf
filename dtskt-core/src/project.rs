//! The project: every scope of a run, transformed in ordered phases
//!
//! 1. collect: register all scopes, declarations and import bindings of the
//!    whole forest, so any module can refer to any other
//! 2. emit: produce an artifact per declaration
//! 3. resolve fusions: splice interface members into same-named classes
//! 4. render: one output unit per scope that produced anything

use indexmap::IndexMap;

use crate::ast::{ImportBinding, InterfaceDecl, ModuleNode, SourceFile, Statement};
use crate::config::MappingConfig;
use crate::emit::member::emit_members;
use crate::emit::{Artifact, Emitter};
use crate::header::HeaderArena;
use crate::mapper::TypeMapper;
use crate::output::OutputUnit;
use crate::scope::{DeclKey, DeclKind, Declaration, ScopeId, ScopeImport, SymbolIndex};

pub struct Project {
    index: SymbolIndex,
    headers: HeaderArena,
}

impl Project {
    pub fn new(config: MappingConfig) -> Self {
        let mut headers = HeaderArena::new();
        let index = SymbolIndex::new(config, &mut headers);
        Self { index, headers }
    }

    pub fn index(&self) -> &SymbolIndex {
        &self.index
    }

    /// Run every phase and return the files to write
    pub fn transform(&mut self, files: &[SourceFile]) -> Vec<OutputUnit> {
        self.collect(files);
        self.emit_all();
        self.resolve_fusions();
        self.render()
    }

    // =========================================================================
    // Collect
    // =========================================================================

    /// Register scopes, declarations and imports for every file.
    ///
    /// Declarations are gathered first and then stored, so collecting the
    /// same files again replaces instead of appending.
    pub fn collect(&mut self, files: &[SourceFile]) {
        let mut pending: IndexMap<(ScopeId, DeclKey), Declaration> = IndexMap::new();
        for file in files {
            for module in &file.modules {
                self.collect_module(module, None, &mut pending);
            }
        }
        tracing::debug!(scopes = self.index.len(), declarations = pending.len(), "collected");
        for ((scope, key), declaration) in pending {
            self.index.declare(scope, key, declaration);
        }
    }

    fn collect_module(
        &mut self,
        module: &ModuleNode,
        parent: Option<ScopeId>,
        pending: &mut IndexMap<(ScopeId, DeclKey), Declaration>,
    ) {
        let scope = self
            .index
            .register_scope(&mut self.headers, &module.name, module.kind, parent);

        for statement in &module.body {
            match statement {
                Statement::Function(decl) => {
                    let Some(name) = decl.name.as_deref() else {
                        tracing::debug!("skipping function without a name");
                        continue;
                    };
                    let entry = pending
                        .entry((scope, DeclKey::new(DeclKind::Function, name)))
                        .or_insert_with(|| Declaration::Functions(Vec::new()));
                    if let Declaration::Functions(overloads) = entry {
                        overloads.push(decl.clone());
                    }
                }
                Statement::Class(decl) => {
                    let Some(name) = decl.name.as_deref() else {
                        tracing::debug!("skipping class without a name");
                        continue;
                    };
                    pending.insert((scope, DeclKey::new(DeclKind::Class, name)), Declaration::Class(decl.clone()));
                }
                Statement::Interface(decl) => {
                    let Some(name) = decl.name.as_deref() else {
                        tracing::debug!("skipping interface without a name");
                        continue;
                    };
                    let key = (scope, DeclKey::new(DeclKind::Interface, name));
                    match pending.get_mut(&key) {
                        Some(Declaration::Interface(existing)) => merge_interface(existing, decl),
                        _ => {
                            pending.insert(key, Declaration::Interface(decl.clone()));
                        }
                    }
                }
                Statement::Import(import) => {
                    for binding in &import.bindings {
                        let scope_import = match binding {
                            ImportBinding::Named { name, .. } => ScopeImport::Named {
                                module: import.module.clone(),
                                name: name.clone(),
                            },
                            ImportBinding::Namespace { .. } => ScopeImport::Namespace {
                                module: import.module.clone(),
                            },
                        };
                        self.index
                            .add_import_binding(scope, binding.local_name(), scope_import);
                    }
                }
                Statement::Module(child) => self.collect_module(child, Some(scope), pending),
            }
        }
    }

    // =========================================================================
    // Emit
    // =========================================================================

    /// Emit an artifact for every collected declaration
    pub fn emit_all(&mut self) {
        let scopes: Vec<ScopeId> = self.index.scope_ids().collect();
        for scope in scopes {
            let mut artifacts = Vec::new();
            {
                let mut emitter = Emitter::new(&self.index, &mut self.headers, scope);
                for (key, declaration) in self.index.scope(scope).declarations() {
                    if let Some(artifact) = emitter.emit(key, declaration) {
                        artifacts.push((key.clone(), artifact));
                    }
                }
            }
            for (key, artifact) in artifacts {
                self.index.store_artifact(scope, key, artifact);
            }
        }
    }

    // =========================================================================
    // Fusion
    // =========================================================================

    /// Splice every class-paired interface into its class.
    ///
    /// The class receives the interface's members plus the members of each
    /// interface it extends, found one level deep: through the import that
    /// the extends clause mapped to, or in the same scope.
    pub fn resolve_fusions(&mut self) {
        let mut fused: Vec<(ScopeId, DeclKey, Vec<String>)> = Vec::new();

        for scope in self.index.scope_ids().collect::<Vec<_>>() {
            let pairs: Vec<(String, Vec<String>)> = self
                .index
                .scope(scope)
                .artifacts()
                .filter_map(|(_, artifact)| match artifact {
                    Artifact::Interface(interface) if interface.fused_into_class => Some((
                        interface.name.clone(),
                        interface.extends.iter().map(|ty| ty.base.clone()).collect(),
                    )),
                    _ => None,
                })
                .collect();

            for (name, extends) in pairs {
                let mut members = match self.index.scope(scope).artifact(&DeclKey::new(DeclKind::Interface, &name)) {
                    Some(Artifact::Interface(interface)) => interface.members.clone(),
                    _ => Vec::new(),
                };
                for base in &extends {
                    members.extend(self.extended_members(scope, &name, base));
                }
                fused.push((scope, DeclKey::new(DeclKind::Class, &name), members));
            }
        }

        for (scope, key, members) in fused {
            if let Some(Artifact::Class(class)) = self.index.scope_mut(scope).artifact_mut(&key) {
                class.set_fused(members);
            }
        }
    }

    /// Members of the interface `base` refers to, emitted for class `name`
    fn extended_members(&mut self, scope: ScopeId, name: &str, base: &str) -> Vec<String> {
        let Some((owner, decl)) = self.find_extended_interface(scope, name, base) else {
            tracing::debug!(class = %name, base = %base, "extended interface not found");
            return Vec::new();
        };
        let root = self.index.scope(scope).header;
        let header = self.headers.child(root, &format!("fuse:{}", name));
        let mut mapper = TypeMapper::new(&self.index, &mut self.headers, scope, header).resolving_from(owner);
        emit_members(&mut mapper, &decl.members, name)
    }

    fn find_extended_interface(&self, scope: ScopeId, name: &str, base: &str) -> Option<(ScopeId, InterfaceDecl)> {
        let root = self.index.scope(scope).header;
        if let Some(record) = self.headers.lookup(root, base) {
            return self.index.scopes_in_package(&record.package).find_map(|owner| {
                let decl = self.index.scope(owner).interface(&record.name)?;
                Some((owner, decl.clone()))
            });
        }
        let owner = self.index.where_key_name(scope, base)?;
        if owner == scope && base == name {
            return None;
        }
        let decl = self.index.scope(owner).interface(base)?;
        Some((owner, decl.clone()))
    }

    // =========================================================================
    // Render
    // =========================================================================

    /// One unit per scope with at least one rendered declaration
    pub fn render(&self) -> Vec<OutputUnit> {
        self.index
            .scope_ids()
            .filter_map(|scope| self.render_scope(scope))
            .collect()
    }

    fn render_scope(&self, id: ScopeId) -> Option<OutputUnit> {
        let scope = self.index.scope(id);
        let mut body = Vec::new();
        for kind in DeclKind::ALL {
            for (key, artifact) in scope.artifacts() {
                if key.kind == kind {
                    body.extend(artifact.render());
                }
            }
        }
        if body.is_empty() {
            return None;
        }

        let mut text = String::new();
        if let Some(module) = self.index.effective_js_module(id) {
            text.push_str(&format!("@file:JsModule(\"{}\")\n\n", module));
        }
        text.push_str(&format!("package {}\n\n", self.index.package_of(id)));
        let imports = self.headers.render(scope.header);
        if !imports.is_empty() {
            text.push_str(&imports);
            text.push_str("\n\n");
        }
        text.push_str(&body.join("\n\n"));
        text.push('\n');

        Some(OutputUnit {
            path: self.index.output_path(id),
            text,
        })
    }
}

/// Declaration merging: later blocks add members and supertypes
fn merge_interface(existing: &mut InterfaceDecl, more: &InterfaceDecl) {
    for ty in &more.extends {
        if !existing.extends.contains(ty) {
            existing.extends.push(ty.clone());
        }
    }
    existing.members.extend(more.members.iter().cloned());
}
