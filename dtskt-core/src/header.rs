//! Header registry: the imports a generated file needs
//!
//! Every module scope owns one root header. Each declaration emitter gets its
//! own child header, so the imports a body generator requests stay attributed
//! to it while the root still sees them: existence checks look at a header and
//! all of its descendants, and rendering flattens the whole subtree.

use indexmap::IndexMap;

/// Index of a header in the [`HeaderArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeaderId(usize);

/// One `import package.Name [as Alias]` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub package: String,
    pub name: String,
    pub alias: Option<String>,
}

impl ImportRecord {
    pub fn new(package: &str, name: &str, alias: Option<&str>) -> Self {
        Self {
            package: package.to_string(),
            name: name.to_string(),
            alias: alias.map(str::to_string),
        }
    }

    /// The identifier the import makes visible
    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn render(&self) -> String {
        match &self.alias {
            Some(alias) => format!("import {}.{} as {}", self.package, self.name, alias),
            None => format!("import {}.{}", self.package, self.name),
        }
    }
}

#[derive(Debug, Default)]
struct HeaderScope {
    label: String,
    imports: IndexMap<String, ImportRecord>,
    children: Vec<HeaderId>,
}

/// Owns every header of a run
#[derive(Debug, Default)]
pub struct HeaderArena {
    scopes: Vec<HeaderScope>,
}

impl HeaderArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached root header
    pub fn new_root(&mut self, label: &str) -> HeaderId {
        self.scopes.push(HeaderScope {
            label: label.to_string(),
            ..HeaderScope::default()
        });
        HeaderId(self.scopes.len() - 1)
    }

    /// Get or create the child of `parent` with the given label.
    ///
    /// Labels are unique per parent, so re-running an emitter reuses the
    /// header it filled the first time.
    pub fn child(&mut self, parent: HeaderId, label: &str) -> HeaderId {
        let existing = self.scopes[parent.0]
            .children
            .iter()
            .copied()
            .find(|child| self.scopes[child.0].label == label);
        if let Some(id) = existing {
            return id;
        }
        let id = self.new_root(label);
        self.scopes[parent.0].children.push(id);
        id
    }

    /// Register an import; keyed by alias (or name), last write wins
    pub fn add_import(&mut self, header: HeaderId, package: &str, name: &str, alias: Option<&str>) {
        let record = ImportRecord::new(package, name, alias);
        self.scopes[header.0]
            .imports
            .insert(record.key().to_string(), record);
    }

    /// True if `name` is imported here or in any descendant
    pub fn has_name(&self, header: HeaderId, name: &str) -> bool {
        self.lookup(header, name).is_some()
    }

    /// Find the import record for `name` here or in any descendant
    pub fn lookup(&self, header: HeaderId, name: &str) -> Option<&ImportRecord> {
        let scope = &self.scopes[header.0];
        scope.imports.get(name).or_else(|| {
            scope
                .children
                .iter()
                .find_map(|child| self.lookup(*child, name))
        })
    }

    /// Merge this header with all descendants; descendants win key collisions.
    /// The result is sorted by rendered import line.
    pub fn flatten(&self, header: HeaderId) -> Vec<ImportRecord> {
        let mut merged: IndexMap<String, ImportRecord> = IndexMap::new();
        self.collect_into(header, &mut merged);
        let mut records: Vec<ImportRecord> = merged.into_values().collect();
        records.sort_by_key(|record| record.render());
        records
    }

    fn collect_into(&self, header: HeaderId, merged: &mut IndexMap<String, ImportRecord>) {
        let scope = &self.scopes[header.0];
        for (key, record) in &scope.imports {
            merged.insert(key.clone(), record.clone());
        }
        for child in &scope.children {
            self.collect_into(*child, merged);
        }
    }

    /// Render the import section, one line per flattened record
    pub fn render(&self, header: HeaderId) -> String {
        self.flatten(header)
            .iter()
            .map(ImportRecord::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
