//! Class Resolution
//!
//! Finds the class definitions behind the types of reflected variables.
//! Every distinct instantiation (keyed by its canonical signature) becomes
//! one [`ClassDefinition`] whose marked members have the instantiation's
//! generic arguments substituted in. Members are resolved in turn, so the
//! registry ends up holding the whole reachable class graph.

use crate::ast::{split_qualified, AstSet, ClassRecord, NAMESPACE_SEPARATOR};
use crate::error::{Diagnostics, ReflectError};
use crate::types::{parse_type, TypeNode};
use crate::variables::{is_marked, parse_attachments, SharedVariable};
use rustc_hash::FxHashMap;
use std::path::Path;

/// File extensions of compiled units, which cannot be included by generated code
const COMPILED_UNIT_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "c++"];

/// One resolved class instantiation
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDefinition {
    /// Canonical signature of the instantiation
    pub signature: String,
    /// Unqualified class name
    pub short_name: String,
    /// Namespace segments, root to leaf
    pub namespace: Vec<String>,
    /// Header that defines the class
    pub header: String,
    /// Type of the instantiation
    pub ty: TypeNode,
    /// Marked members with generic parameters substituted
    pub elements: Vec<SharedVariable>,
}

/// Resolved classes in insertion order, looked up by canonical signature
#[derive(Debug, Clone, Default)]
pub struct Registry {
    definitions: Vec<ClassDefinition>,
    index: FxHashMap<String, usize>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a signature was already resolved
    pub fn contains(&self, signature: &str) -> bool {
        self.index.contains_key(signature)
    }

    /// Look up a definition by canonical signature
    pub fn get(&self, signature: &str) -> Option<&ClassDefinition> {
        self.index.get(signature).map(|&i| &self.definitions[i])
    }

    /// Definitions in the order they were resolved
    pub fn iter(&self) -> impl Iterator<Item = &ClassDefinition> {
        self.definitions.iter()
    }

    /// Number of resolved classes
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether nothing was resolved
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn insert(&mut self, definition: ClassDefinition) {
        self.index
            .insert(definition.signature.clone(), self.definitions.len());
        self.definitions.push(definition);
    }
}

/// Whether a path names a compiled unit rather than a header
pub fn is_compiled_unit(file: &str) -> bool {
    Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            COMPILED_UNIT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Builds the [`Registry`] for a set of reflected variables
pub struct ClassResolver<'a> {
    ast: &'a AstSet,
    registry: Registry,
}

impl<'a> ClassResolver<'a> {
    /// Create a resolver over the classes of one AST set
    pub fn new(ast: &'a AstSet) -> Self {
        Self {
            ast,
            registry: Registry::new(),
        }
    }

    /// Resolve the types of all variables
    ///
    /// Returns the variables that survived resolution. Variables whose class
    /// cannot be found are dropped and reported through `diagnostics`.
    pub fn resolve(
        mut self,
        variables: Vec<SharedVariable>,
        diagnostics: &mut Diagnostics,
    ) -> Result<(Vec<SharedVariable>, Registry), ReflectError> {
        let mut kept = Vec::with_capacity(variables.len());
        for variable in variables {
            match self.missing_class(&variable.ty) {
                Some(signature) => diagnostics.push(ReflectError::UnresolvedType {
                    variable: variable.qualified_name(),
                    signature,
                }),
                None => {
                    self.resolve_type(&variable.ty, diagnostics)?;
                    kept.push(variable);
                }
            }
        }
        tracing::debug!("Resolved {} class instantiation(s)", self.registry.len());
        Ok((kept, self.registry))
    }

    /// First class id in a type tree that has no definition
    fn missing_class(&self, ty: &TypeNode) -> Option<String> {
        let sig = ty.signature();
        if sig.is_class() && self.ast.class(sig.as_str()).is_none() {
            return Some(sig.as_str().to_string());
        }
        ty.args().iter().find_map(|arg| self.missing_class(arg))
    }

    fn resolve_type(
        &mut self,
        ty: &TypeNode,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), ReflectError> {
        if ty.signature().is_class() {
            self.resolve_class(ty, diagnostics)?;
        }
        // Builtin containers have no members to reach their arguments through
        for arg in ty.args() {
            self.resolve_type(arg, diagnostics)?;
        }
        Ok(())
    }

    fn resolve_class(
        &mut self,
        ty: &TypeNode,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), ReflectError> {
        let signature = ty.canonical();
        if self.registry.contains(&signature) {
            return Ok(());
        }
        let Some(record) = self.ast.class(ty.signature().as_str()) else {
            return Ok(());
        };

        let definition = self.instantiate(record, ty, signature, diagnostics)?;
        tracing::debug!("Resolved class {}", definition.signature);
        let member_types: Vec<TypeNode> =
            definition.elements.iter().map(|m| m.ty.clone()).collect();

        // Inserted before its members so cycles stop here
        self.registry.insert(definition);
        for member_ty in &member_types {
            self.resolve_type(member_ty, diagnostics)?;
        }
        Ok(())
    }

    fn instantiate(
        &self,
        record: &ClassRecord,
        ty: &TypeNode,
        signature: String,
        diagnostics: &mut Diagnostics,
    ) -> Result<ClassDefinition, ReflectError> {
        if is_compiled_unit(&record.file) {
            return Err(ReflectError::NonIncludableDefinition {
                class: record.qualified_name.clone(),
                file: record.file.clone(),
            });
        }
        if record.generic_params.len() != ty.args().len() {
            return Err(ReflectError::GenericArity {
                class: record.qualified_name.clone(),
                signature,
                expected: record.generic_params.len(),
                actual: ty.args().len(),
            });
        }
        let bindings: Vec<(String, TypeNode)> = record
            .generic_params
            .iter()
            .cloned()
            .zip(ty.args().iter().cloned())
            .collect();

        let (namespace, short_name) = split_qualified(&record.qualified_name);
        let mut elements = Vec::new();
        for member in record.members.iter().filter(|m| is_marked(m)) {
            let entity = format!(
                "{}{}{}",
                record.qualified_name, NAMESPACE_SEPARATOR, member.name
            );
            let declared = parse_type(&member.type_tokens).map_err(|source| ReflectError::Parse {
                entity: entity.clone(),
                source,
            })?;
            let element = SharedVariable {
                name: member.name.clone(),
                namespace: namespace.clone(),
                ty: declared.substitute(&bindings),
                attached: parse_attachments(&member.initializer),
            };
            if let Some(missing) = self.missing_class(&element.ty) {
                diagnostics.push(ReflectError::UnresolvedType {
                    variable: entity,
                    signature: missing,
                });
                continue;
            }
            elements.push(element);
        }

        Ok(ClassDefinition {
            signature,
            short_name,
            namespace,
            header: record.file.clone(),
            ty: ty.clone(),
            elements,
        })
    }
}
