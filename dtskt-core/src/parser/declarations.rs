//! Lowering of modules, declarations and members

use tree_sitter::Node;

use super::node_text;
use super::types::type_ref;
use crate::ast::{
    AccessorMember, ClassDecl, FunctionDecl, ImportBinding, ImportDecl, InterfaceDecl, Member,
    MemberName, MethodMember, ModuleKind, ModuleNode, Param, PropertyMember, Statement, TypeRef,
};

/// Lower the top level of a file. Module blocks stay separate; loose
/// declarations are gathered into one synthetic global module.
pub fn lower_program(root: Node, source: &str) -> Vec<ModuleNode> {
    let mut modules = Vec::new();
    let mut global = ModuleNode::global();

    for statement in lower_block(root, source) {
        match statement {
            Statement::Module(module) => modules.push(module),
            other => global.body.push(other),
        }
    }

    if !global.body.is_empty() {
        modules.insert(0, global);
    }
    modules
}

/// Lower every statement inside a `program` or `statement_block`
fn lower_block(block: Node, source: &str) -> Vec<Statement> {
    let mut out = Vec::new();
    let mut cursor = block.walk();
    for child in block.named_children(&mut cursor) {
        lower_statement(child, source, &mut out);
    }
    out
}

fn lower_statement(node: Node, source: &str, out: &mut Vec<Statement>) {
    match node.kind() {
        "export_statement" => {
            if let Some(declaration) = node.child_by_field_name("declaration") {
                lower_statement(declaration, source, out);
            }
        }
        "ambient_declaration" => lower_ambient(node, source, out),
        "module" | "internal_module" => {
            if let Some(module) = lower_module(node, source) {
                out.push(Statement::Module(module));
            }
        }
        "function_signature" | "function_declaration" => out.push(Statement::Function(lower_function(node, source))),
        "class_declaration" | "abstract_class_declaration" => out.push(Statement::Class(lower_class(node, source))),
        "interface_declaration" => out.push(Statement::Interface(lower_interface(node, source))),
        "import_statement" => {
            if let Some(import) = lower_import(node, source) {
                out.push(Statement::Import(import));
            }
        }
        "expression_statement" => {
            // `namespace A {}` sometimes surfaces wrapped in an expression statement
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if child.kind() == "internal_module" {
                    lower_statement(child, source, out);
                }
            }
        }
        kind => tracing::trace!(kind = %kind, "ignoring statement"),
    }
}

/// `declare ...`: unwrap the declaration, or handle `declare global { }`
fn lower_ambient(node: Node, source: &str, out: &mut Vec<Statement>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "statement_block" {
            let mut global = ModuleNode::global();
            global.body = lower_block(child, source);
            out.push(Statement::Module(global));
        } else {
            lower_statement(child, source, out);
        }
    }
}

/// `declare module "x" { }`, `namespace A.B { }`
fn lower_module(node: Node, source: &str) -> Option<ModuleNode> {
    let name_node = node.child_by_field_name("name")?;
    let body = node
        .child_by_field_name("body")
        .map(|body| lower_block(body, source))
        .unwrap_or_default();

    if name_node.kind() == "string" {
        let name = unquote(node_text(name_node, source));
        let mut module = ModuleNode::new(name, ModuleKind::Ambient);
        module.body = body;
        return Some(module);
    }

    // Dotted namespaces nest: A.B { body } → A { B { body } }
    let name = node_text(name_node, source);
    let mut segments: Vec<&str> = name.split('.').map(str::trim).filter(|s| !s.is_empty()).collect();
    let innermost = segments.pop()?;
    let mut module = ModuleNode::new(innermost, ModuleKind::Namespace);
    module.body = body;
    while let Some(segment) = segments.pop() {
        module = ModuleNode::new(segment, ModuleKind::Namespace).with_statement(Statement::Module(module));
    }
    Some(module)
}

fn unquote(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

fn lower_function(node: Node, source: &str) -> FunctionDecl {
    FunctionDecl {
        name: node
            .child_by_field_name("name")
            .map(|name| node_text(name, source).to_string()),
        params: lower_params(node.child_by_field_name("parameters"), source),
        return_type: type_ref(node.child_by_field_name("return_type"), source),
        is_async: Modifiers::of(node).is_async,
    }
}

fn lower_class(node: Node, source: &str) -> ClassDecl {
    let mut class = ClassDecl {
        name: node
            .child_by_field_name("name")
            .map(|name| node_text(name, source).to_string()),
        extends: None,
        constructors: Vec::new(),
        members: Vec::new(),
    };

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "class_heritage" {
            class.extends = lower_class_extends(child, source);
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            let is_constructor = member
                .child_by_field_name("name")
                .is_some_and(|name| node_text(name, source) == "constructor");
            if is_constructor {
                class
                    .constructors
                    .push(lower_params(member.child_by_field_name("parameters"), source));
            } else {
                lower_member(member, source, &mut class.members);
            }
        }
    }
    class
}

/// `extends Base<T>` inside a class heritage; only the first base counts
fn lower_class_extends(heritage: Node, source: &str) -> Option<TypeRef> {
    let mut cursor = heritage.walk();
    let extends = heritage
        .named_children(&mut cursor)
        .find(|child| child.kind() == "extends_clause")?;
    let value = extends.child_by_field_name("value")?;
    let end = extends
        .child_by_field_name("type_arguments")
        .filter(|args| args.start_byte() >= value.end_byte())
        .map(|args| args.end_byte())
        .unwrap_or(value.end_byte());
    let text = source.get(value.start_byte()..end).unwrap_or("");
    let text: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    Some(TypeRef::Unresolved(text))
}

fn lower_interface(node: Node, source: &str) -> InterfaceDecl {
    let mut interface = InterfaceDecl {
        name: node
            .child_by_field_name("name")
            .map(|name| node_text(name, source).to_string()),
        extends: Vec::new(),
        members: Vec::new(),
    };

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "extends_type_clause" {
            let mut inner = child.walk();
            for ty in child.named_children(&mut inner) {
                interface.extends.push(type_ref(Some(ty), source));
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            lower_member(member, source, &mut interface.members);
        }
    }
    interface
}

// =============================================================================
// MEMBERS
// =============================================================================

/// Anonymous keyword tokens that modify a member
#[derive(Debug, Default)]
struct Modifiers {
    is_static: bool,
    is_async: bool,
    is_override: bool,
    readonly: bool,
    optional: bool,
    getter: bool,
    setter: bool,
}

impl Modifiers {
    fn of(node: Node) -> Self {
        let mut modifiers = Modifiers::default();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "override_modifier" => modifiers.is_override = true,
                _ if child.is_named() => {}
                "static" => modifiers.is_static = true,
                "async" => modifiers.is_async = true,
                "readonly" => modifiers.readonly = true,
                "?" => modifiers.optional = true,
                "get" => modifiers.getter = true,
                "set" => modifiers.setter = true,
                _ => {}
            }
        }
        modifiers
    }
}

fn lower_member_name(node: Node, source: &str) -> MemberName {
    let text = node_text(node, source).to_string();
    match node.kind() {
        "property_identifier" | "identifier" => MemberName::Identifier(text),
        "computed_property_name" => MemberName::Computed(text),
        _ => MemberName::Quoted(text),
    }
}

fn lower_member(node: Node, source: &str, members: &mut Vec<Member>) {
    match node.kind() {
        "method_signature" | "method_definition" | "abstract_method_signature" => {
            let Some(name_node) = node.child_by_field_name("name") else {
                return;
            };
            let name = lower_member_name(name_node, source);
            let modifiers = Modifiers::of(node);
            let params = lower_params(node.child_by_field_name("parameters"), source);

            if modifiers.getter {
                let ty = type_ref(node.child_by_field_name("return_type"), source);
                add_accessor(members, name, ty, &modifiers, false);
            } else if modifiers.setter {
                let ty = params
                    .into_iter()
                    .next()
                    .map(|param| param.ty)
                    .unwrap_or_else(TypeRef::implicit_any);
                add_accessor(members, name, ty, &modifiers, true);
            } else {
                members.push(Member::Method(MethodMember {
                    name,
                    params,
                    return_type: type_ref(node.child_by_field_name("return_type"), source),
                    is_static: modifiers.is_static,
                    is_async: modifiers.is_async,
                    is_override: modifiers.is_override,
                    optional: modifiers.optional,
                }));
            }
        }
        "public_field_definition" | "property_signature" => {
            let Some(name_node) = node.child_by_field_name("name") else {
                return;
            };
            let modifiers = Modifiers::of(node);
            members.push(Member::Property(PropertyMember {
                name: lower_member_name(name_node, source),
                ty: type_ref(node.child_by_field_name("type"), source),
                is_static: modifiers.is_static,
                is_override: modifiers.is_override,
                readonly: modifiers.readonly,
                optional: modifiers.optional,
            }));
        }
        kind => tracing::trace!(kind = %kind, "ignoring member"),
    }
}

/// Merge `get`/`set` pairs into one accessor
fn add_accessor(members: &mut Vec<Member>, name: MemberName, ty: TypeRef, modifiers: &Modifiers, setter: bool) {
    let existing = members.iter_mut().find_map(|member| match member {
        Member::Accessor(accessor) if accessor.name == name && accessor.is_static == modifiers.is_static => {
            Some(accessor)
        }
        _ => None,
    });
    match existing {
        Some(accessor) => {
            if setter {
                accessor.has_setter = true;
            } else {
                // the getter's declared type wins over the setter parameter
                accessor.ty = ty;
            }
        }
        None => members.push(Member::Accessor(AccessorMember {
            name,
            ty,
            is_static: modifiers.is_static,
            is_override: modifiers.is_override,
            has_setter: setter,
        })),
    }
}

fn lower_params(node: Option<Node>, source: &str) -> Vec<Param> {
    let Some(node) = node else {
        return Vec::new();
    };
    let mut params = Vec::new();
    let mut cursor = node.walk();
    for param in node.named_children(&mut cursor) {
        if !matches!(param.kind(), "required_parameter" | "optional_parameter") {
            continue;
        }
        let Some(pattern) = param.child_by_field_name("pattern") else {
            continue;
        };
        if pattern.kind() == "this" {
            continue;
        }
        let ty = type_ref(param.child_by_field_name("type"), source);
        let (name, rest) = if pattern.kind() == "rest_pattern" {
            let mut inner = pattern.walk();
            let name = pattern
                .named_children(&mut inner)
                .next()
                .map(|id| node_text(id, source))
                .unwrap_or("args");
            (name, true)
        } else {
            (node_text(pattern, source), false)
        };
        params.push(Param {
            name: name.to_string(),
            ty,
            rest,
            optional: param.kind() == "optional_parameter",
        });
    }
    params
}

// =============================================================================
// IMPORTS
// =============================================================================

/// `import { A, B as C } from "m"`, `import * as ns from "m"`
fn lower_import(node: Node, source: &str) -> Option<ImportDecl> {
    let module = node.child_by_field_name("source")?;
    let mut bindings = Vec::new();

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "import_clause" {
            continue;
        }
        let mut clause_cursor = child.walk();
        for part in child.named_children(&mut clause_cursor) {
            match part.kind() {
                "namespace_import" => {
                    let mut inner = part.walk();
                    if let Some(alias) = part.named_children(&mut inner).next() {
                        bindings.push(ImportBinding::Namespace {
                            alias: node_text(alias, source).to_string(),
                        });
                    };
                }
                "named_imports" => {
                    let mut inner = part.walk();
                    for specifier in part.named_children(&mut inner) {
                        let Some(name) = specifier.child_by_field_name("name") else {
                            continue;
                        };
                        bindings.push(ImportBinding::Named {
                            name: unquote(node_text(name, source)).to_string(),
                            alias: specifier
                                .child_by_field_name("alias")
                                .map(|alias| node_text(alias, source).to_string()),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    Some(ImportDecl {
        module: unquote(node_text(module, source)).to_string(),
        bindings,
    })
}
