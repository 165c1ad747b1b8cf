//! `external interface` declarations

use crate::ast::InterfaceDecl;
use crate::mapper::{MappedType, TypeContext, TypeMapper};

use super::block;
use super::member::emit_members;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceArtifact {
    pub name: String,
    pub extends: Vec<MappedType>,
    pub members: Vec<String>,
    /// A class of the same name exists in the scope; the members are
    /// rendered inside that class instead
    pub fused_into_class: bool,
}

impl InterfaceArtifact {
    pub fn render(&self) -> Option<String> {
        if self.fused_into_class {
            return None;
        }
        let mut head = format!("external interface {}", self.name);
        if !self.extends.is_empty() {
            let supertypes = self
                .extends
                .iter()
                .map(MappedType::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            head.push_str(" : ");
            head.push_str(&supertypes);
        }
        Some(format!("{} {}", head, block(&self.members, 2)))
    }
}

/// Emit an interface; nameless interfaces produce nothing
pub fn emit_interface(mapper: &mut TypeMapper, decl: &InterfaceDecl, fused_into_class: bool) -> Option<InterfaceArtifact> {
    let Some(name) = decl.name.as_deref() else {
        tracing::debug!("skipping interface without a name");
        return None;
    };

    let ctx = TypeContext::new().this_name(name);
    let extends = decl.extends.iter().map(|ty| mapper.map(ty, &ctx)).collect();
    let members = emit_members(mapper, &decl.members, name);

    Some(InterfaceArtifact {
        name: name.to_string(),
        extends,
        members,
        fused_into_class,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Member, MemberName, PropertyMember, TypeRef};
    use crate::config::MappingConfig;
    use crate::header::HeaderArena;
    use crate::scope::SymbolIndex;

    fn emit(decl: &InterfaceDecl, fused: bool) -> Option<InterfaceArtifact> {
        let mut headers = HeaderArena::new();
        let index = SymbolIndex::new(MappingConfig::default(), &mut headers);
        let header = index.scope(index.root()).header;
        let mut mapper = TypeMapper::new(&index, &mut headers, index.root(), header);
        emit_interface(&mut mapper, decl, fused)
    }

    fn decl(name: &str, extends: &[&str], members: Vec<Member>) -> InterfaceDecl {
        InterfaceDecl {
            name: Some(name.to_string()),
            extends: extends.iter().map(|e| TypeRef::Unresolved(e.to_string())).collect(),
            members,
        }
    }

    #[test]
    fn test_empty_interface_with_extends() {
        let artifact = emit(&decl("NodeRequire", &["NodeJS.Require"], Vec::new()), false).unwrap();
        assert_eq!(
            artifact.render().unwrap(),
            "external interface NodeRequire : NodeJS_Require {}"
        );
    }

    #[test]
    fn test_interface_members() {
        let members = vec![Member::Property(PropertyMember {
            name: MemberName::Identifier("signal".to_string()),
            ty: TypeRef::Unresolved("AbortSignal | undefined".to_string()),
            is_static: false,
            is_override: false,
            readonly: false,
            optional: true,
        })];
        let artifact = emit(&decl("Abortable", &[], members), false).unwrap();
        assert_eq!(
            artifact.render().unwrap(),
            "external interface Abortable {\n  var signal: JsAny? /* AbortSignal */\n}"
        );
    }

    #[test]
    fn test_fused_interface_does_not_render() {
        let artifact = emit(&decl("EventEmitter", &[], Vec::new()), true).unwrap();
        assert!(artifact.render().is_none());
    }

    #[test]
    fn test_nameless_interface_is_skipped() {
        let nameless = InterfaceDecl {
            name: None,
            extends: Vec::new(),
            members: Vec::new(),
        };
        assert!(emit(&nameless, false).is_none());
    }
}
