//! Attribute catalog
//!
//! Collects every decorator class with all of its constructor overloads and
//! assigns run-wide ids to constructor parameter names.

use super::{normalize_literal, LiteralKind, ParamKind};
use crate::ast::{split_qualified, DecoratorRecord};
use crate::error::ReflectError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// `name( inner )` or `name<T>( inner )` spanning the whole expression
static CALL_WRAPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^[A-Za-z_][A-Za-z0-9_:]*\s*(?:<[^()]*>)?\s*\((.*)\)$")
        .expect("valid regex")
});

/// First id handed out to a parameter name
const FIRST_PARAMETER_ID: u32 = 1;

/// Normalize a default-value expression into its template text
///
/// An outer cast or constructor call is unwrapped, then the result is
/// trimmed and unquoted.
pub fn normalize_default(expression: &str) -> String {
    let trimmed = expression.trim();
    let inner = CALL_WRAPPER
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|inner| parens_balanced(inner))
        .unwrap_or(trimmed);
    normalize_literal(inner)
}

fn parens_balanced(text: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// One constructor parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Declared type as written
    pub declared_type: String,
    /// Classified declared type
    pub kind: ParamKind,
    /// Normalized default-value template
    pub default: Option<String>,
}

/// One constructor overload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constructor {
    /// Parameters in declaration order
    pub params: Vec<Parameter>,
}

impl Constructor {
    /// Whether the given literal arguments can call this constructor
    ///
    /// Every argument must match its parameter's kind and every parameter
    /// beyond the arguments must have a default.
    pub fn accepts(&self, arguments: &[String]) -> bool {
        if arguments.len() > self.params.len() {
            return false;
        }
        let given_match = arguments
            .iter()
            .zip(&self.params)
            .all(|(arg, param)| param.kind.accepts(LiteralKind::infer(arg)));
        given_match
            && self.params[arguments.len()..]
                .iter()
                .all(|p| p.default.is_some())
    }

    /// Whether the trailing parameters carry defaults
    pub fn has_defaults(&self) -> bool {
        self.params.last().is_some_and(|p| p.default.is_some())
    }
}

/// A decorator class with its overloads
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinition {
    /// Short name used at attachment sites
    pub name: String,
    /// Fully-qualified class name
    pub qualified_name: String,
    /// Overloads in declaration order
    pub constructors: Vec<Constructor>,
    /// Parameter names across all overloads, first-seen order, with their ids
    pub parameter_ids: Vec<(String, u32)>,
}

impl AttributeDefinition {
    /// The overload an attachment with these arguments resolves to
    ///
    /// Among the overloads that accept the arguments, the first one in
    /// declaration order that declares defaults wins. Without such an
    /// overload the first accepting one is used.
    pub fn select(&self, arguments: &[String]) -> Option<&Constructor> {
        let mut accepting = self
            .constructors
            .iter()
            .filter(|ctor| ctor.accepts(arguments));
        let first = accepting.next()?;
        if first.has_defaults() {
            return Some(first);
        }
        accepting.find(|ctor| ctor.has_defaults()).or(Some(first))
    }

    /// Id assigned to a parameter name
    pub fn parameter_id(&self, name: &str) -> Option<u32> {
        self.parameter_ids
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, id)| *id)
    }

    fn from_record(record: &DecoratorRecord) -> Result<Self, ReflectError> {
        let (_, name) = split_qualified(&record.qualified_name);
        let mut constructors = Vec::with_capacity(record.constructors.len().max(1));

        for (position, ctor) in record.constructors.iter().enumerate() {
            let mut seen_default = false;
            let mut params = Vec::with_capacity(ctor.params.len());
            for param in &ctor.params {
                match &param.default_value {
                    Some(_) => seen_default = true,
                    None if seen_default => {
                        return Err(ReflectError::InvalidAttributeDefinition {
                            attribute: name,
                            constructor: position + 1,
                            parameter: param.name.clone(),
                        })
                    }
                    None => {}
                }
                params.push(Parameter {
                    name: param.name.clone(),
                    declared_type: param.declared_type.clone(),
                    kind: ParamKind::of_declared(&param.declared_type),
                    default: param.default_value.as_deref().map(normalize_default),
                });
            }
            constructors.push(Constructor { params });
        }
        if constructors.is_empty() {
            constructors.push(Constructor::default());
        }

        Ok(Self {
            name,
            qualified_name: record.qualified_name.clone(),
            constructors,
            parameter_ids: Vec::new(),
        })
    }
}

/// All decorators of one run, ordered by name
#[derive(Debug, Clone, Default)]
pub struct AttributeCatalog {
    definitions: BTreeMap<String, AttributeDefinition>,
}

impl AttributeCatalog {
    /// Build and validate the catalog
    pub fn build(decorators: &[DecoratorRecord]) -> Result<Self, ReflectError> {
        let mut definitions = BTreeMap::new();
        for record in decorators {
            let definition = AttributeDefinition::from_record(record)?;
            if definitions.contains_key(&definition.name) {
                tracing::debug!(
                    "Ignoring decorator {}, name already taken",
                    definition.qualified_name
                );
                continue;
            }
            definitions.insert(definition.name.clone(), definition);
        }

        let mut next_id = FIRST_PARAMETER_ID;
        for definition in definitions.values_mut() {
            for ctor in &definition.constructors {
                for param in &ctor.params {
                    if definition.parameter_ids.iter().any(|(name, _)| *name == param.name) {
                        continue;
                    }
                    definition.parameter_ids.push((param.name.clone(), next_id));
                    next_id += 1;
                }
            }
        }

        tracing::debug!("Catalogued {} decorator(s)", definitions.len());
        Ok(Self { definitions })
    }

    /// Look up a decorator by short name
    pub fn get(&self, name: &str) -> Option<&AttributeDefinition> {
        self.definitions.get(name)
    }

    /// Decorators sorted by name
    pub fn iter(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.definitions.values()
    }

    /// Number of decorators
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether there are no decorators
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
