//! Type descriptors: one capability set, two signal sources
//!
//! The mapper classifies through [`TypeDescriptor`]. Resolved types answer
//! from their structural shape; raw source text answers through regexes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{ResolvedType, TypeShape};

/// What the type mapper needs to know about a type
pub trait TypeDescriptor: Sized {
    /// Original source text
    fn text(&self) -> &str;
    /// `T` for `T | undefined`
    fn nullable_inner(&self) -> Option<Self>;
    /// Plain identifier this type refers to (`Foo` for `Foo` and `Foo<T>`)
    fn symbol_name(&self) -> Option<&str>;
    /// `(Namespace, Name)` for `Namespace.Name`
    fn qualified_name(&self) -> Option<(&str, &str)>;
    fn is_string(&self) -> bool;
    fn is_boolean(&self) -> bool;
    fn is_number(&self) -> bool;
    fn array_element(&self) -> Option<Self>;
    /// `undefined` or `void`
    fn is_void(&self) -> bool;
    /// `Some(None)` for a bare `Promise`, `Some(Some(T))` for `Promise<T, ...>`
    fn promise_argument(&self) -> Option<Option<Self>>;
    /// `object`, `any` or `unknown`
    fn is_opaque(&self) -> bool;
    fn is_this(&self) -> bool;
}

fn is_array_name(name: &str) -> bool {
    name == "Array" || name == "ReadonlyArray"
}

// =============================================================================
// RESOLVED TYPES
// =============================================================================

impl<'a> TypeDescriptor for &'a ResolvedType {
    fn text(&self) -> &str {
        &self.text
    }

    fn nullable_inner(&self) -> Option<Self> {
        let this: &'a ResolvedType = *self;
        if !this.is_nullable() {
            return None;
        }
        this.non_nullable_type()
    }

    fn symbol_name(&self) -> Option<&str> {
        self.reference_name().filter(|name| !name.contains('.'))
    }

    fn qualified_name(&self) -> Option<(&str, &str)> {
        if !self.type_arguments().is_empty() {
            return None;
        }
        let caps = QUALIFIED_RE.captures(self.reference_name()?)?;
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
    }

    fn is_string(&self) -> bool {
        ResolvedType::is_string(self)
    }

    fn is_boolean(&self) -> bool {
        ResolvedType::is_boolean(self) || self.is_boolean_literal()
    }

    fn is_number(&self) -> bool {
        ResolvedType::is_number(self) || self.is_number_literal()
    }

    fn array_element(&self) -> Option<Self> {
        let this: &'a ResolvedType = *self;
        if this.is_array() {
            return this.array_element_type();
        }
        match this.type_arguments() {
            [element] if this.reference_name().is_some_and(is_array_name) => Some(element),
            _ => None,
        }
    }

    fn is_void(&self) -> bool {
        matches!(self.shape, TypeShape::Undefined | TypeShape::Void)
    }

    fn promise_argument(&self) -> Option<Option<Self>> {
        let this: &'a ResolvedType = *self;
        (this.reference_name()? == "Promise").then(|| this.type_arguments().first())
    }

    fn is_opaque(&self) -> bool {
        matches!(self.shape, TypeShape::Object | TypeShape::Any | TypeShape::Unknown)
    }

    fn is_this(&self) -> bool {
        matches!(self.shape, TypeShape::This)
    }
}

// =============================================================================
// RAW TEXT
// =============================================================================

static IDENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][\w$]*$").unwrap());
static QUALIFIED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_$][\w$]*)\.([A-Za-z_$][\w$]*)$").unwrap()
});
static STRING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)^(?:string|"[^"]*"|'[^']*'|`[^`]*`)$"#).unwrap()
});
static BOOLEAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:boolean|true|false)$").unwrap());
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:number|-?(?:\d[\d_]*(?:\.\d+)?(?:[eE][+-]?\d+)?|0[xX][0-9a-fA-F]+))$").unwrap()
});

/// Raw source text of a type the parser could not resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextType {
    text: String,
}

impl TextType {
    pub fn new(text: &str) -> Self {
        Self {
            text: unwrap_parens(text.trim()).to_string(),
        }
    }

    /// True when the text is one type, not a union, intersection or
    /// function type at the top level
    fn is_single(text: &str) -> bool {
        !has_top_level_arrow(text)
            && split_top_level(text, '|').len() <= 1
            && split_top_level(text, '&').len() <= 1
    }

    /// `(head, args)` for `Head<args>` where `Head` is a plain identifier
    fn generic(&self) -> Option<(&str, &str)> {
        split_generic(&self.text).filter(|(head, _)| IDENT_RE.is_match(head))
    }
}

impl TypeDescriptor for TextType {
    fn text(&self) -> &str {
        &self.text
    }

    fn nullable_inner(&self) -> Option<Self> {
        if has_top_level_arrow(&self.text) {
            return None;
        }
        let members = split_top_level(&self.text, '|');
        match members.split_last() {
            Some((last, rest)) if *last == "undefined" && !rest.is_empty() => {
                Some(TextType::new(&rest.join(" | ")))
            }
            _ => None,
        }
    }

    fn symbol_name(&self) -> Option<&str> {
        if IDENT_RE.is_match(&self.text) {
            return Some(self.text.as_str());
        }
        self.generic().map(|(head, _)| head)
    }

    fn qualified_name(&self) -> Option<(&str, &str)> {
        let caps = QUALIFIED_RE.captures(&self.text)?;
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
    }

    fn is_string(&self) -> bool {
        STRING_RE.is_match(&self.text)
    }

    fn is_boolean(&self) -> bool {
        BOOLEAN_RE.is_match(&self.text)
    }

    fn is_number(&self) -> bool {
        NUMBER_RE.is_match(&self.text)
    }

    fn array_element(&self) -> Option<Self> {
        if let Some(element) = self.text.strip_suffix("[]") {
            return Self::is_single(element).then(|| TextType::new(element));
        }
        let (head, args) = self.generic()?;
        let args = split_top_level(args, ',');
        match args.as_slice() {
            [element] if is_array_name(head) => Some(TextType::new(element)),
            _ => None,
        }
    }

    fn is_void(&self) -> bool {
        self.text == "undefined" || self.text == "void"
    }

    fn promise_argument(&self) -> Option<Option<Self>> {
        if self.text == "Promise" {
            return Some(None);
        }
        let (head, args) = self.generic()?;
        if head != "Promise" {
            return None;
        }
        Some(split_top_level(args, ',').first().map(|first| TextType::new(first)))
    }

    fn is_opaque(&self) -> bool {
        matches!(self.text.as_str(), "object" | "any" | "unknown")
    }

    fn is_this(&self) -> bool {
        self.text == "this"
    }
}

/// Split on `separator` outside of any `<>`, `()`, `[]` or `{}` nesting
pub fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '[' | '{' => depth += 1,
            // `=>` is not a closing bracket
            '>' if text[..i].ends_with('=') => {}
            '>' | ')' | ']' | '}' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    let last = text[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}

/// True if a function-type arrow occurs outside of any nesting
fn has_top_level_arrow(text: &str) -> bool {
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' if text[..i].ends_with('=') => {
                if depth == 0 {
                    return true;
                }
            }
            '>' | ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    false
}

/// `Head<args>` → `(Head, args)`, only when the `>` matching the first `<`
/// ends the text
fn split_generic(text: &str) -> Option<(&str, &str)> {
    let open = text.find('<')?;
    let mut depth = 0i32;
    for (i, c) in text[open..].char_indices() {
        let at = open + i;
        match c {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' if text[..at].ends_with('=') => {}
            '>' | ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return (at + 1 == text.len()).then(|| (text[..open].trim(), &text[open + 1..at]));
                }
            }
            _ => {}
        }
    }
    None
}

/// `(T)` → `T`, only when the parentheses wrap the whole text
fn unwrap_parens(text: &str) -> &str {
    let mut current = text;
    while current.starts_with('(') && current.ends_with(')') {
        let inner = &current[1..current.len() - 1];
        let mut depth = 0i32;
        let balanced = inner.chars().all(|c| {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            depth >= 0
        });
        if !balanced || depth != 0 {
            break;
        }
        current = inner.trim();
    }
    current
}
