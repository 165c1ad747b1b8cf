//! Lowering of tree-sitter type nodes
//!
//! Types with a shape the generator understands become [`ResolvedType`];
//! everything else stays raw text and is classified by the mapper's text
//! rules instead.

use tree_sitter::Node;

use super::node_text;
use crate::ast::{ResolvedType, TypeRef, TypeShape};

/// Lower a type annotation position. `None` means no annotation (implicit `any`).
pub fn type_ref(node: Option<Node>, source: &str) -> TypeRef {
    let Some(node) = node else {
        return TypeRef::implicit_any();
    };
    let node = unwrap_annotation(node);
    match lower(node, source) {
        Some(resolved) => TypeRef::Resolved(resolved),
        None => TypeRef::Unresolved(node_text(node, source).to_string()),
    }
}

/// `: T` → `T`
fn unwrap_annotation(node: Node) -> Node {
    match node.kind() {
        "type_annotation" | "opting_type_annotation" | "omitting_type_annotation" => {
            let mut cursor = node.walk();
            let inner = node.named_children(&mut cursor).next();
            inner.unwrap_or(node)
        }
        _ => node,
    }
}

/// Lower a type in a nested position (array element, type argument), where
/// anything without a rule is still a resolved type of shape `Other`
fn lower_nested(node: Node, source: &str) -> ResolvedType {
    lower(node, source).unwrap_or_else(|| ResolvedType::new(node_text(node, source), TypeShape::Other))
}

fn lower(node: Node, source: &str) -> Option<ResolvedType> {
    if node.is_error() || node.is_missing() {
        return None;
    }
    let text = node_text(node, source);
    let shape = match node.kind() {
        "predefined_type" => match text {
            "string" => TypeShape::String,
            "number" => TypeShape::Number,
            "boolean" => TypeShape::Boolean,
            "void" => TypeShape::Void,
            "any" => TypeShape::Any,
            "unknown" => TypeShape::Unknown,
            "object" => TypeShape::Object,
            _ => TypeShape::Other,
        },
        "literal_type" => literal_shape(node),
        "template_literal_type" => TypeShape::StringLiteral,
        "this_type" => TypeShape::This,
        "type_identifier" if text == "undefined" => TypeShape::Undefined,
        "type_identifier" => TypeShape::Reference {
            name: text.to_string(),
            type_arguments: Vec::new(),
        },
        "nested_type_identifier" => TypeShape::Reference {
            name: text.split_whitespace().collect(),
            type_arguments: Vec::new(),
        },
        "generic_type" => {
            let name = node.child_by_field_name("name")?;
            let mut type_arguments = Vec::new();
            if let Some(args) = node.child_by_field_name("type_arguments") {
                let mut cursor = args.walk();
                for arg in args.named_children(&mut cursor) {
                    type_arguments.push(lower_nested(arg, source));
                }
            }
            TypeShape::Reference {
                name: node_text(name, source).split_whitespace().collect(),
                type_arguments,
            }
        }
        "array_type" => {
            let mut cursor = node.walk();
            let element = node.named_children(&mut cursor).next()?;
            TypeShape::Array {
                element: Box::new(lower_nested(element, source)),
            }
        }
        "parenthesized_type" => {
            let mut cursor = node.walk();
            let inner = node.named_children(&mut cursor).next()?;
            return lower(inner, source);
        }
        "union_type" => return lower_union(node, source),
        _ => return None,
    };
    Some(ResolvedType::new(text, shape))
}

fn literal_shape(node: Node) -> TypeShape {
    let mut cursor = node.walk();
    let Some(literal) = node.children(&mut cursor).next() else {
        return TypeShape::Other;
    };
    match literal.kind() {
        "string" => TypeShape::StringLiteral,
        "number" | "unary_expression" => TypeShape::NumberLiteral,
        "true" | "false" => TypeShape::BooleanLiteral,
        "undefined" => TypeShape::Undefined,
        _ => TypeShape::Other,
    }
}

/// `A | B | undefined` → `Nullable(A | B)`; other unions are opaque
fn lower_union(node: Node, source: &str) -> Option<ResolvedType> {
    let mut members = Vec::new();
    collect_union_members(node, &mut members);

    let lowered: Vec<ResolvedType> = members
        .iter()
        .map(|member| lower(*member, source))
        .collect::<Option<_>>()?;

    let text = node_text(node, source);
    let trailing_undefined = lowered
        .last()
        .is_some_and(|last| matches!(last.shape, TypeShape::Undefined));
    if !trailing_undefined || lowered.len() < 2 {
        return Some(ResolvedType::new(text, TypeShape::Other));
    }

    let rest = &members[..members.len() - 1];
    let inner = if rest.len() == 1 {
        lowered[0].clone()
    } else {
        let start = rest[0].start_byte();
        let end = rest[rest.len() - 1].end_byte();
        ResolvedType::new(source.get(start..end).unwrap_or(""), TypeShape::Other)
    };
    Some(ResolvedType::new(
        text,
        TypeShape::Nullable {
            inner: Box::new(inner),
        },
    ))
}

/// Flatten left-nested `union_type` nodes into their members
fn collect_union_members<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "union_type" {
            collect_union_members(child, out);
        } else {
            out.push(child);
        }
    }
}
