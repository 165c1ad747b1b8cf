//! `open external class` declarations

use crate::ast::{ClassDecl, Member};
use crate::mapper::{TypeContext, TypeMapper};

use super::member::{emit_members, emit_params};
use super::{block, indent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassArtifact {
    pub name: String,
    /// Primary constructor parameter list
    pub primary: String,
    /// Parameter lists of the secondary constructors
    pub secondary: Vec<String>,
    pub base: Option<String>,
    pub static_members: Vec<String>,
    pub members: Vec<String>,
    /// Instance members after fusing a same-named interface
    fused: Option<Vec<String>>,
}

impl ClassArtifact {
    /// Instance members, including fused interface members once resolved
    pub fn instance_members(&self) -> &[String] {
        self.fused.as_deref().unwrap_or(&self.members)
    }

    /// Record the spliced interface members; duplicates of existing
    /// members are dropped
    pub fn set_fused(&mut self, extra: Vec<String>) {
        let mut merged = self.members.clone();
        for member in extra {
            if !merged.contains(&member) {
                merged.push(member);
            }
        }
        self.fused = Some(merged);
    }

    pub fn render(&self) -> String {
        let mut head = format!("open external class {}({})", self.name, self.primary);
        if let Some(base) = &self.base {
            head.push_str(" : ");
            head.push_str(base);
        }

        let mut entries: Vec<String> = Vec::new();
        if !self.static_members.is_empty() {
            entries.push(format!("companion object {}", block(&self.static_members, 2)));
        }
        entries.extend(self.secondary.iter().map(|params| format!("constructor({})", params)));
        entries.extend(self.instance_members().iter().cloned());

        if entries.is_empty() {
            return format!("{} {{}}", head);
        }
        let body = entries
            .iter()
            .map(|entry| indent(entry, 2))
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("{} {{\n{}\n}}", head, body)
    }
}

/// Emit a class; nameless classes produce nothing
pub fn emit_class(mapper: &mut TypeMapper, decl: &ClassDecl) -> Option<ClassArtifact> {
    let Some(name) = decl.name.as_deref() else {
        tracing::debug!("skipping class without a name");
        return None;
    };

    let mut constructors = decl
        .constructors
        .iter()
        .map(|params| emit_params(mapper, params, Some(name)));
    let primary = constructors.next().unwrap_or_default();
    let secondary: Vec<String> = constructors.collect();

    let base = decl
        .extends
        .as_ref()
        .map(|ty| mapper.render(ty, &TypeContext::new().this_name(name)));

    let (statics, instance): (Vec<&Member>, Vec<&Member>) = decl.members.iter().partition(|m| m.is_static());

    Some(ClassArtifact {
        name: name.to_string(),
        primary,
        secondary,
        base,
        static_members: emit_members(mapper, statics, name),
        members: emit_members(mapper, instance, name),
        fused: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{MemberName, MethodMember, Param, PropertyMember, TypeRef};
    use crate::config::MappingConfig;
    use crate::header::HeaderArena;
    use crate::scope::SymbolIndex;

    fn text(s: &str) -> TypeRef {
        TypeRef::Unresolved(s.to_string())
    }

    fn property(name: &str, ty: &str, is_static: bool) -> Member {
        Member::Property(PropertyMember {
            name: MemberName::Identifier(name.to_string()),
            ty: text(ty),
            is_static,
            is_override: false,
            readonly: true,
            optional: false,
        })
    }

    fn emit(decl: &ClassDecl) -> Option<ClassArtifact> {
        let mut headers = HeaderArena::new();
        let index = SymbolIndex::new(MappingConfig::default(), &mut headers);
        let header = index.scope(index.root()).header;
        let mut mapper = TypeMapper::new(&index, &mut headers, index.root(), header);
        emit_class(&mut mapper, decl)
    }

    fn class(name: Option<&str>) -> ClassDecl {
        ClassDecl {
            name: name.map(str::to_string),
            extends: None,
            constructors: Vec::new(),
            members: Vec::new(),
        }
    }

    #[test]
    fn test_nameless_class_is_skipped() {
        assert!(emit(&class(None)).is_none());
    }

    #[test]
    fn test_empty_class() {
        let artifact = emit(&class(Some("Empty"))).unwrap();
        assert_eq!(artifact.render(), "open external class Empty() {}");
    }

    #[test]
    fn test_constructors_statics_and_base() {
        let mut decl = class(Some("AsyncResource"));
        decl.extends = Some(text("Base"));
        decl.constructors = vec![
            vec![Param::new("type", text("string"))],
            vec![Param::new("type", text("string")), Param::new("triggerAsyncId", text("number"))],
        ];
        decl.members = vec![
            property("asyncId", "number", false),
            property("defaultName", "string", true),
            Member::Method(MethodMember {
                name: MemberName::Identifier("bind".to_string()),
                params: vec![Param::new("fn", text("Func"))],
                return_type: text("this"),
                is_static: false,
                is_async: false,
                is_override: false,
                optional: false,
            }),
        ];

        let artifact = emit(&decl).unwrap();
        assert_eq!(artifact.primary, "type: String");
        assert_eq!(artifact.secondary, vec!["type: String, triggerAsyncId: Int"]);
        assert_eq!(
            artifact.render(),
            "open external class AsyncResource(type: String) : JsAny /* Base */ {\n\
             \x20 companion object {\n\
             \x20   val defaultName: String\n\
             \x20 }\n\
             \n\
             \x20 constructor(type: String, triggerAsyncId: Int)\n\
             \n\
             \x20 val asyncId: Int\n\
             \n\
             \x20 fun bind(fn: JsAny /* Func */): AsyncResource /* this */\n\
             }"
        );
    }

    #[test]
    fn test_set_fused_drops_duplicates() {
        let mut decl = class(Some("Foo"));
        decl.members = vec![property("a", "string", false)];
        let mut artifact = emit(&decl).unwrap();
        assert_eq!(artifact.instance_members(), ["val a: String"]);
        artifact.set_fused(vec!["val a: String".to_string(), "fun b(): Unit".to_string()]);
        assert_eq!(artifact.instance_members(), ["val a: String", "fun b(): Unit"]);
        assert_eq!(artifact.members.len(), 1);
    }
}
