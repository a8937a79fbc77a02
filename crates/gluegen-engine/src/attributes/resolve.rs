//! Attribute resolution
//!
//! Matches each attachment of a variable against its decorator's overloads
//! and fills in omitted parameters from their default templates. Decorators
//! that are not attached but can be called without arguments contribute
//! their defaults implicitly.

use super::catalog::{AttributeCatalog, AttributeDefinition, Constructor};
use super::normalize_literal;
use crate::error::{Diagnostics, ReflectError};
use crate::template;
use crate::variables::SharedVariable;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What to do when no overload accepts an attachment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverloadPolicy {
    /// Fail the run
    #[default]
    Abort,
    /// Drop the attachment and record a diagnostic
    Skip,
}

/// One resolved constructor argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArgument {
    /// Parameter name
    pub name: String,
    /// Run-wide parameter id
    pub id: u32,
    /// Final value
    pub value: String,
    /// Whether the value came from the parameter default
    pub defaulted: bool,
}

/// A decorator with every parameter bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttribute {
    /// Decorator name
    pub name: String,
    /// Arguments in parameter order
    pub arguments: Vec<ResolvedArgument>,
}

/// Resolves the attachments of variables against an [`AttributeCatalog`]
pub struct AttributeResolver<'a> {
    catalog: &'a AttributeCatalog,
    policy: OverloadPolicy,
}

impl<'a> AttributeResolver<'a> {
    /// Create a resolver
    pub fn new(catalog: &'a AttributeCatalog, policy: OverloadPolicy) -> Self {
        Self { catalog, policy }
    }

    /// Resolve all attributes of one variable
    ///
    /// `entity` names the variable in errors. `fragment` is the variable's
    /// document entry built so far, the context for default templates.
    pub fn resolve(
        &self,
        variable: &SharedVariable,
        entity: &str,
        fragment: &Map<String, Value>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<ResolvedAttribute>, ReflectError> {
        let mut resolved = Vec::new();

        for attached in &variable.attached {
            let Some(definition) = self.catalog.get(&attached.name) else {
                tracing::debug!("{}: '{}' is not a known attribute", entity, attached.name);
                continue;
            };
            match definition.select(&attached.arguments) {
                Some(ctor) => {
                    resolved.push(bind(definition, ctor, &attached.arguments, fragment));
                }
                None => {
                    let err = ReflectError::OverloadResolution {
                        attribute: attached.name.clone(),
                        variable: entity.to_string(),
                        arguments: attached.arguments.join(","),
                    };
                    match self.policy {
                        OverloadPolicy::Abort => return Err(err),
                        OverloadPolicy::Skip => diagnostics.push(err),
                    }
                }
            }
        }

        for definition in self.catalog.iter() {
            if variable.attached.iter().any(|a| a.name == definition.name) {
                continue;
            }
            if let Some(ctor) = definition.select(&[]).filter(|c| !c.params.is_empty()) {
                resolved.push(bind(definition, ctor, &[], fragment));
            }
        }

        Ok(resolved)
    }
}

/// Bind given arguments positionally and render defaults for the rest
fn bind(
    definition: &AttributeDefinition,
    ctor: &Constructor,
    given: &[String],
    fragment: &Map<String, Value>,
) -> ResolvedAttribute {
    let mut context = fragment.clone();
    let mut arguments = Vec::with_capacity(ctor.params.len());

    for (i, param) in ctor.params.iter().enumerate() {
        let (value, defaulted) = match given.get(i) {
            Some(literal) => (normalize_literal(literal), false),
            None => {
                let template = param.default.as_deref().unwrap_or_default();
                (template::render(template, &Value::Object(context.clone())), true)
            }
        };
        context.insert(param.name.clone(), Value::String(value.clone()));
        arguments.push(ResolvedArgument {
            name: param.name.clone(),
            id: definition.parameter_id(&param.name).unwrap_or_default(),
            value,
            defaulted,
        });
    }

    ResolvedAttribute {
        name: definition.name.clone(),
        arguments,
    }
}
