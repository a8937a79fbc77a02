//! Decorator definitions and their resolution against attached arguments
//!
//! The catalog is built once per run from every decorator class. Each
//! attachment on a variable is then matched against the decorator's
//! constructor overloads by comparing literal kinds with declared
//! parameter types.

mod catalog;
mod resolve;

pub use catalog::{normalize_default, AttributeCatalog, AttributeDefinition, Constructor, Parameter};
pub use resolve::{AttributeResolver, OverloadPolicy, ResolvedArgument, ResolvedAttribute};

/// Kind of a literal argument as written at the attachment site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// Quoted text
    String,
    /// Number with an `f` suffix
    Float,
    /// Number with a decimal point
    Double,
    /// `true` or `false`
    Bool,
    /// Anything else
    Integer,
}

impl LiteralKind {
    /// Infer the kind of a literal
    pub fn infer(literal: &str) -> Self {
        let literal = literal.trim();
        if literal.contains('"') || literal.contains('\'') {
            LiteralKind::String
        } else if literal
            .strip_suffix(['f', 'F'])
            .is_some_and(|number| number.parse::<f64>().is_ok())
        {
            LiteralKind::Float
        } else if literal.contains('.') {
            LiteralKind::Double
        } else if literal == "true" || literal == "false" {
            LiteralKind::Bool
        } else {
            LiteralKind::Integer
        }
    }
}

/// Kind of a declared constructor parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// `char*` or `std::string`
    String,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `bool`
    Bool,
    /// Integral types
    Integer,
    /// Any other type, accepts every literal
    Unknown,
}

const QUALIFIERS: &[&str] = &["const", "volatile", "constexpr", "static", "mutable", "&", "&&"];

const INTEGRAL_WORDS: &[&str] = &["int", "unsigned", "signed", "long", "short", "char"];

const INTEGRAL_ALIASES: &[&str] = &[
    "size_t", "ssize_t", "ptrdiff_t", "intptr_t", "uintptr_t", "int8_t", "int16_t", "int32_t",
    "int64_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t",
];

impl ParamKind {
    /// Classify a declared type, ignoring qualifiers and references
    pub fn of_declared(declared: &str) -> Self {
        let spaced = declared.replace('*', " * ").replace('&', " & ");
        let words: Vec<&str> = spaced
            .split_whitespace()
            .filter(|w| !QUALIFIERS.contains(w))
            .collect();
        let normalized = words.join(" ").replace(" *", "*");

        match normalized.as_str() {
            "char*" | "std::string" | "string" => ParamKind::String,
            "float" => ParamKind::Float,
            "double" => ParamKind::Double,
            "bool" => ParamKind::Bool,
            _ if !words.is_empty() && words.iter().all(|w| INTEGRAL_WORDS.contains(w)) => {
                ParamKind::Integer
            }
            other if INTEGRAL_ALIASES.contains(&other.trim_start_matches("std::")) => {
                ParamKind::Integer
            }
            _ => ParamKind::Unknown,
        }
    }

    /// Whether a literal of the given kind can be passed for this parameter
    pub fn accepts(self, literal: LiteralKind) -> bool {
        match (self, literal) {
            (ParamKind::Unknown, _) => true,
            (ParamKind::String, LiteralKind::String) => true,
            (ParamKind::Bool, LiteralKind::Bool) => true,
            (ParamKind::Integer, LiteralKind::Integer) => true,
            (
                ParamKind::Float | ParamKind::Double,
                LiteralKind::Integer | LiteralKind::Float | LiteralKind::Double,
            ) => true,
            _ => false,
        }
    }
}

/// Trim a literal and strip one pair of surrounding quotes, unescaping the body
pub fn normalize_literal(literal: &str) -> String {
    let trimmed = literal.trim();
    match trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(body) => unescape(body),
        None => trimmed.to_string(),
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
