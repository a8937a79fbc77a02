//! Builds the JSON document from the registry and the reflected variables

use super::{
    namespace_separators, Discriminators, IndexCounter, TypeNamer, MEMBER_INDEX_BASE,
    VARIABLE_INDEX_BASE,
};
use crate::ast::{AstSet, NAMESPACE_SEPARATOR};
use crate::attributes::{AttributeCatalog, AttributeResolver, ResolvedAttribute};
use crate::classes::{ClassDefinition, Registry};
use crate::config::GluegenConfig;
use crate::error::{Diagnostics, ReflectError};
use crate::types::TypeNode;
use crate::variables::SharedVariable;
use serde_json::{Map, Value};

/// Assembles one document; holds the per-run discriminator set
pub struct DocumentAssembler<'a> {
    namer: TypeNamer<'a>,
    catalog: &'a AttributeCatalog,
    resolver: AttributeResolver<'a>,
    file_comment: &'a str,
    discriminators: Discriminators,
}

impl<'a> DocumentAssembler<'a> {
    /// Create an assembler for one run
    pub fn new(
        ast: &'a AstSet,
        catalog: &'a AttributeCatalog,
        config: &'a GluegenConfig,
    ) -> Self {
        Self {
            namer: TypeNamer::new(ast, &config.naming),
            catalog,
            resolver: AttributeResolver::new(catalog, config.resolution.overload_mismatch),
            file_comment: &config.output.file_comment,
            discriminators: Discriminators::new(),
        }
    }

    /// Assemble classes first, then top-level variables
    pub fn assemble(
        mut self,
        registry: &Registry,
        variables: &[SharedVariable],
        diagnostics: &mut Diagnostics,
    ) -> Result<Value, ReflectError> {
        let mut type_definitions = Vec::with_capacity(registry.len());
        for definition in registry.iter() {
            type_definitions.push(self.class_entry(definition, diagnostics)?);
        }

        let mut counter = IndexCounter::new(VARIABLE_INDEX_BASE);
        let mut entries = Vec::with_capacity(variables.len());
        for variable in variables {
            let entity = variable.qualified_name();
            let index = counter.next_index();
            entries.push(self.variable_entry(variable, &entity, index, diagnostics)?);
        }

        let mut document = Map::new();
        document.insert("file_comment".into(), Value::String(self.file_comment.to_string()));
        document.insert("type_definitions".into(), Value::Array(type_definitions));
        document.insert("variables".into(), Value::Array(entries));
        document.insert("attribute_definitions".into(), self.attribute_definitions());
        Ok(Value::Object(document))
    }

    fn class_entry(
        &mut self,
        definition: &ClassDefinition,
        diagnostics: &mut Diagnostics,
    ) -> Result<Value, ReflectError> {
        let mut entry = Map::new();
        entry.insert("signature".into(), Value::String(definition.signature.clone()));
        entry.insert("name".into(), Value::String(definition.short_name.clone()));
        namespace_fields(&definition.namespace, &mut entry);
        entry.insert("header".into(), Value::String(definition.header.clone()));
        self.type_fields(&definition.ty, &mut entry);

        let qualified = if definition.namespace.is_empty() {
            definition.short_name.clone()
        } else {
            format!(
                "{}{}{}",
                definition.namespace.join(NAMESPACE_SEPARATOR),
                NAMESPACE_SEPARATOR,
                definition.short_name
            )
        };
        let mut counter = IndexCounter::new(MEMBER_INDEX_BASE);
        let mut members = Vec::with_capacity(definition.elements.len());
        for element in &definition.elements {
            let entity = format!("{}{}{}", qualified, NAMESPACE_SEPARATOR, element.name);
            let index = counter.next_index();
            members.push(self.variable_entry(element, &entity, index, diagnostics)?);
        }
        entry.insert("members".into(), Value::Array(members));
        Ok(Value::Object(entry))
    }

    fn variable_entry(
        &mut self,
        variable: &SharedVariable,
        entity: &str,
        index: u32,
        diagnostics: &mut Diagnostics,
    ) -> Result<Value, ReflectError> {
        let mut entry = Map::new();
        entry.insert("name".into(), Value::String(variable.name.clone()));
        namespace_fields(&variable.namespace, &mut entry);
        entry.insert("index".into(), Value::String(index.to_string()));
        self.type_fields(&variable.ty, &mut entry);

        // Defaults are rendered against the fields above
        let attributes = self.resolver.resolve(variable, entity, &entry, diagnostics)?;
        entry.insert(
            "attached_attributes".into(),
            Value::Array(attributes.iter().map(attribute_entry).collect()),
        );
        Ok(Value::Object(entry))
    }

    fn type_fields(&mut self, ty: &TypeNode, entry: &mut Map<String, Value>) {
        entry.insert("type_name_cpp".into(), Value::String(self.namer.cpp_name(ty)));
        entry.insert("type_name_unique".into(), Value::String(self.namer.unique_name(ty)));
        let kind = if ty.signature().is_class() { "class" } else { "builtin" };
        entry.insert("type_kind".into(), Value::String(kind.to_string()));

        let discriminator = self.namer.discriminator(ty);
        self.discriminators.apply(&discriminator, entry);

        let mut template_types = Vec::with_capacity(ty.args().len());
        for arg in ty.args() {
            let mut nested = Map::new();
            self.type_fields(arg, &mut nested);
            template_types.push(Value::Object(nested));
        }
        entry.insert("template_types".into(), Value::Array(template_types));
    }

    fn attribute_definitions(&self) -> Value {
        let definitions = self
            .catalog
            .iter()
            .map(|definition| {
                let parameters = definition
                    .parameter_ids
                    .iter()
                    .map(|(name, id)| {
                        let mut param = Map::new();
                        param.insert("name".into(), Value::String(name.clone()));
                        param.insert("id".into(), Value::String(id.to_string()));
                        Value::Object(param)
                    })
                    .collect();
                let constructors = definition
                    .constructors
                    .iter()
                    .map(|ctor| {
                        let params = ctor
                            .params
                            .iter()
                            .map(|p| {
                                let mut param = Map::new();
                                param.insert("name".into(), Value::String(p.name.clone()));
                                param.insert("type".into(), Value::String(p.declared_type.clone()));
                                if let Some(default) = &p.default {
                                    param.insert("default".into(), Value::String(default.clone()));
                                }
                                Value::Object(param)
                            })
                            .collect();
                        let mut entry = Map::new();
                        entry.insert("parameters".into(), Value::Array(params));
                        Value::Object(entry)
                    })
                    .collect();

                let mut entry = Map::new();
                entry.insert("name".into(), Value::String(definition.name.clone()));
                entry.insert("parameters".into(), Value::Array(parameters));
                entry.insert("constructors".into(), Value::Array(constructors));
                Value::Object(entry)
            })
            .collect();
        Value::Array(definitions)
    }
}

fn string_list(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

fn namespace_fields(namespace: &[String], entry: &mut Map<String, Value>) {
    let (open, close) = namespace_separators(namespace);
    entry.insert("namespace".into(), string_list(namespace));
    entry.insert("namespace_sep_open".into(), Value::String(open));
    entry.insert("namespace_sep_close".into(), Value::String(close));
}

fn attribute_entry(attribute: &ResolvedAttribute) -> Value {
    let arguments = attribute
        .arguments
        .iter()
        .map(|arg| {
            let mut entry = Map::new();
            entry.insert("name".into(), Value::String(arg.name.clone()));
            entry.insert("id".into(), Value::String(arg.id.to_string()));
            entry.insert("value".into(), Value::String(arg.value.clone()));
            entry.insert("defaulted".into(), Value::Bool(arg.defaulted));
            Value::Object(entry)
        })
        .collect();
    let mut entry = Map::new();
    entry.insert("name".into(), Value::String(attribute.name.clone()));
    entry.insert("arguments".into(), Value::Array(arguments));
    Value::Object(entry)
}
