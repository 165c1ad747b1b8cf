//! Top-level `external fun` declarations

use crate::ast::FunctionDecl;
use crate::mapper::{TypeContext, TypeMapper};

use super::{kotlin_ident, member::emit_params};

/// All overloads of one top-level function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionArtifact {
    pub name: String,
    /// One `external fun` line per overload, in source order
    pub signatures: Vec<String>,
}

impl FunctionArtifact {
    pub fn render(&self) -> String {
        self.signatures.join("\n\n")
    }
}

pub fn emit_function(mapper: &mut TypeMapper, name: &str, overloads: &[FunctionDecl]) -> FunctionArtifact {
    let signatures = overloads
        .iter()
        .map(|decl| emit_signature(mapper, name, decl))
        .collect();
    FunctionArtifact {
        name: name.to_string(),
        signatures,
    }
}

fn emit_signature(mapper: &mut TypeMapper, name: &str, decl: &FunctionDecl) -> String {
    let params = emit_params(mapper, &decl.params, None);
    let mut ret = mapper.map(&decl.return_type, &TypeContext::new().alias(name));
    if decl.is_async {
        ret = mapper.promise_of(ret);
    }
    format!("external fun {}({}): {}", kotlin_ident(name), params, ret)
}
