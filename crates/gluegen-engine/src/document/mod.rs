//! Document assembly
//!
//! Turns the resolved reflection model into the JSON document handed to the
//! template renderer. Index numbers and discriminator flags end up in
//! generated code, so everything here runs in one fixed order.

mod assembler;

pub use assembler::DocumentAssembler;

use crate::ast::{AstSet, NAMESPACE_SEPARATOR};
use crate::config::{NamingConfig, Separators};
use crate::types::{Signature, TypeNode};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// First index of top-level variables
pub const VARIABLE_INDEX_BASE: u32 = 21;

/// First index of members, per class
pub const MEMBER_INDEX_BASE: u32 = 2;

static NON_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid regex"));

/// Replace every character that cannot appear in a symbol with `_`
pub fn safe_identifier(text: &str) -> String {
    NON_IDENTIFIER.replace_all(text, "_").into_owned()
}

/// Text that reopens and closes a namespace in generated code
///
/// `["a", "b"]` gives `namespace a { namespace b { ` and ` } }`.
pub fn namespace_separators(namespace: &[String]) -> (String, String) {
    let segments = namespace.iter().filter(|segment| !segment.is_empty());
    let open = segments
        .clone()
        .map(|segment| format!("namespace {} {{ ", segment))
        .collect();
    let close = segments.map(|_| " }").collect();
    (open, close)
}

/// Sequential index source
#[derive(Debug, Clone)]
pub struct IndexCounter {
    next: u32,
}

impl IndexCounter {
    /// Counter whose first index is `base`
    pub fn new(base: u32) -> Self {
        Self { next: base }
    }

    /// Take the next index
    pub fn next_index(&mut self) -> u32 {
        let index = self.next;
        self.next += 1;
        index
    }
}

/// `is_<name>` flags seen so far in one run
#[derive(Debug, Clone, Default)]
pub struct Discriminators {
    seen: BTreeSet<String>,
}

impl Discriminators {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to true and every other seen flag to false
    pub fn apply(&mut self, key: &str, entry: &mut Map<String, Value>) {
        self.seen.insert(key.to_string());
        for flag in &self.seen {
            entry.insert(flag.clone(), Value::Bool(flag == key));
        }
    }

    /// Number of distinct flags
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether no flag was emitted yet
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Prints type trees using class names from the AST
pub struct TypeNamer<'a> {
    ast: &'a AstSet,
    naming: &'a NamingConfig,
}

impl<'a> TypeNamer<'a> {
    /// Create a namer
    pub fn new(ast: &'a AstSet, naming: &'a NamingConfig) -> Self {
        Self { ast, naming }
    }

    /// Printable name of a signature: qualified class name or builtin as written
    pub fn root_name(&self, signature: &Signature) -> String {
        match signature {
            Signature::Class(id) => self
                .ast
                .class(id)
                .map(|class| class.qualified_name.clone())
                .unwrap_or_else(|| id.clone()),
            Signature::Builtin(name) => name.clone(),
        }
    }

    /// Source-language name, e.g. `app::Box<int, float>`
    pub fn cpp_name(&self, ty: &TypeNode) -> String {
        self.join(ty, &self.naming.cpp)
    }

    /// Symbol-safe name, e.g. `app__Box__int_float__`
    pub fn unique_name(&self, ty: &TypeNode) -> String {
        safe_identifier(&self.join(ty, &self.naming.unique))
    }

    /// `is_` plus the last name segment of the root
    pub fn discriminator(&self, ty: &TypeNode) -> String {
        let root = self.root_name(ty.signature());
        let last = root.rsplit(NAMESPACE_SEPARATOR).next().unwrap_or(root.as_str());
        format!("is_{}", safe_identifier(last.trim()))
    }

    fn join(&self, ty: &TypeNode, tokens: &Separators) -> String {
        let mut name = self.root_name(ty.signature());
        if let TypeNode::Generic(_, args) = ty {
            name.push_str(&tokens.open);
            let args: Vec<String> = args.iter().map(|arg| self.join(arg, tokens)).collect();
            name.push_str(&args.join(&tokens.separator));
            name.push_str(&tokens.close);
        }
        name
    }
}
