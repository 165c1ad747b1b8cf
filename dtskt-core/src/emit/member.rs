//! Member emission shared by classes and interfaces

use crate::ast::{AccessorMember, Member, MemberName, MethodMember, Param, PropertyMember};
use crate::mapper::{MappedType, TypeContext, TypeMapper};

use super::kotlin_ident;

/// Render a parameter list (without parentheses)
pub fn emit_params(mapper: &mut TypeMapper, params: &[Param], this_name: Option<&str>) -> String {
    params
        .iter()
        .map(|param| {
            let name = kotlin_ident(&param.name);
            if param.rest {
                return format!("vararg {}: JsAny", name);
            }
            let mut ctx = TypeContext::new().alias(&param.name);
            ctx.this_name = this_name;
            format!("{}: {}", name, mapper.map(&param.ty, &ctx))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Emit every supported member, in source order
pub fn emit_members<'m>(
    mapper: &mut TypeMapper,
    members: impl IntoIterator<Item = &'m Member>,
    this_name: &str,
) -> Vec<String> {
    members
        .into_iter()
        .filter_map(|member| emit_member(mapper, member, this_name))
        .collect()
}

/// Emit one member, or `None` if it cannot be expressed
pub fn emit_member(mapper: &mut TypeMapper, member: &Member, this_name: &str) -> Option<String> {
    let name = match member.name() {
        MemberName::Identifier(name) => name,
        MemberName::Computed(text) => {
            tracing::debug!(member = %text, this_name = %this_name, "skipping computed member name");
            return None;
        }
        MemberName::Quoted(text) => {
            tracing::debug!(member = %text, this_name = %this_name, "skipping quoted member name");
            return None;
        }
    };

    match member {
        Member::Method(method) if name == "toString" => {
            tracing::debug!(this_name = %this_name, params = method.params.len(), "skipping toString");
            None
        }
        Member::Method(method) => Some(emit_method(mapper, name, method, this_name)),
        Member::Property(property) => Some(emit_property(mapper, name, property, this_name)),
        Member::Accessor(accessor) => Some(emit_accessor(mapper, name, accessor, this_name)),
    }
}

fn modifiers(is_override: bool) -> &'static str {
    if is_override {
        "override "
    } else {
        ""
    }
}

fn emit_method(mapper: &mut TypeMapper, name: &str, method: &MethodMember, this_name: &str) -> String {
    let params = emit_params(mapper, &method.params, Some(this_name));
    let ctx = TypeContext::new().alias(name).this_name(this_name);
    let mut ret = mapper.map(&method.return_type, &ctx);
    if method.is_async {
        ret = mapper.promise_of(ret);
    }

    if method.optional {
        format!(
            "{}val {}: (({}) -> {})?",
            modifiers(method.is_override),
            kotlin_ident(name),
            params,
            ret.bare()
        )
    } else {
        format!(
            "{}fun {}({}): {}",
            modifiers(method.is_override),
            kotlin_ident(name),
            params,
            ret
        )
    }
}

fn emit_property(mapper: &mut TypeMapper, name: &str, property: &PropertyMember, this_name: &str) -> String {
    let ctx = TypeContext::new().alias(name).this_name(this_name);
    let ty = mapper.map(&property.ty, &ctx);
    format!(
        "{}{} {}: {}",
        modifiers(property.is_override),
        if property.readonly { "val" } else { "var" },
        kotlin_ident(name),
        ty
    )
}

fn emit_accessor(mapper: &mut TypeMapper, name: &str, accessor: &AccessorMember, this_name: &str) -> String {
    let ctx = TypeContext::new().alias(name).this_name(this_name);
    let ty: MappedType = mapper.map(&accessor.ty, &ctx);
    format!(
        "{}{} {}: {}",
        modifiers(accessor.is_override),
        if accessor.has_setter { "var" } else { "val" },
        kotlin_ident(name),
        ty
    )
}
