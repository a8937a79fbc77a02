//! Input records of the reflection pipeline
//!
//! These are the declarations the AST loader hands over: reflected classes,
//! decorator classes and namespace-scoped source files. Each compound is
//! classified exactly once when it is ingested, everything downstream
//! pattern-matches on [`Compound`] instead of re-inspecting base classes.

pub mod doxygen;

use crate::types::TypeToken;
use rustc_hash::FxHashMap;

/// Separator between namespace segments
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Whether a member declares data or behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Variable or field
    Variable,
    /// Function, constructor, typedef and everything else
    Function,
}

/// A declaration inside a class or namespace
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecord {
    /// Stable id of the declaration (used to drop duplicates)
    pub id: String,
    /// Unqualified name
    pub name: String,
    /// Variable or function-like
    pub kind: MemberKind,
    /// Declared type as a token stream
    pub type_tokens: Vec<TypeToken>,
    /// Declared type as plain text
    pub type_text: String,
    /// Initializer text as written, including a leading `=`
    pub initializer: String,
}

impl MemberRecord {
    /// A variable member
    pub fn variable(
        id: impl Into<String>,
        name: impl Into<String>,
        type_tokens: Vec<TypeToken>,
        initializer: impl Into<String>,
    ) -> Self {
        let type_text = tokens_to_text(&type_tokens);
        Self {
            id: id.into(),
            name: name.into(),
            kind: MemberKind::Variable,
            type_tokens,
            type_text,
            initializer: initializer.into(),
        }
    }
}

fn tokens_to_text(tokens: &[TypeToken]) -> String {
    tokens
        .iter()
        .map(|t| match t {
            TypeToken::Class(s) | TypeToken::Builtin(s) | TypeToken::Delimiter(s) => s.as_str(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A class or struct that may be reflected
#[derive(Debug, Clone, PartialEq)]
pub struct ClassRecord {
    /// Canonical identifier used by type references
    pub id: String,
    /// Fully-qualified name, e.g. `inexor::rendering::Screen`
    pub qualified_name: String,
    /// File the class is defined in
    pub file: String,
    /// Declared generic parameter names in order
    pub generic_params: Vec<String>,
    /// Members in declaration order
    pub members: Vec<MemberRecord>,
}

/// One constructor parameter of a decorator class
#[derive(Debug, Clone, PartialEq)]
pub struct ParamRecord {
    /// Parameter name
    pub name: String,
    /// Declared type text
    pub declared_type: String,
    /// Default value expression as written
    pub default_value: Option<String>,
}

/// One constructor of a decorator class
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstructorRecord {
    /// Parameters in declaration order
    pub params: Vec<ParamRecord>,
}

/// A decorator class (derives from the decorator base class)
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratorRecord {
    /// Fully-qualified name
    pub qualified_name: String,
    /// Constructors in declaration order
    pub constructors: Vec<ConstructorRecord>,
}

/// A namespace or file scope holding top-level declarations
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFileRecord {
    /// Compound name (namespace name or file name)
    pub name: String,
    /// Namespace segments, root to leaf
    pub namespace: Vec<String>,
    /// Members in declaration order
    pub members: Vec<MemberRecord>,
}

/// A classified compound
#[derive(Debug, Clone, PartialEq)]
pub enum Compound {
    /// Class whose marked members can be reflected
    ReflectedClass(ClassRecord),
    /// Decorator class definition
    DecoratorClass(DecoratorRecord),
    /// Namespace or file scope
    SourceFile(SourceFileRecord),
}

/// All input of one run
#[derive(Debug, Clone, Default)]
pub struct AstSet {
    classes: FxHashMap<String, ClassRecord>,
    decorators: Vec<DecoratorRecord>,
    source_files: Vec<SourceFileRecord>,
}

impl AstSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect classified compounds, keeping their order
    pub fn from_compounds(compounds: impl IntoIterator<Item = Compound>) -> Self {
        let mut set = Self::new();
        for compound in compounds {
            set.insert(compound);
        }
        set
    }

    /// Add one compound
    pub fn insert(&mut self, compound: Compound) {
        match compound {
            Compound::ReflectedClass(class) => {
                self.classes.insert(class.id.clone(), class);
            }
            Compound::DecoratorClass(decorator) => self.decorators.push(decorator),
            Compound::SourceFile(file) => self.source_files.push(file),
        }
    }

    /// Look up a class by canonical identifier
    pub fn class(&self, id: &str) -> Option<&ClassRecord> {
        self.classes.get(id)
    }

    /// Class definitions keyed by canonical identifier
    pub fn classes(&self) -> &FxHashMap<String, ClassRecord> {
        &self.classes
    }

    /// Decorator class definitions in ingestion order
    pub fn decorators(&self) -> &[DecoratorRecord] {
        &self.decorators
    }

    /// Namespace and file scopes in ingestion order
    pub fn source_files(&self) -> &[SourceFileRecord] {
        &self.source_files
    }
}

/// Split `a::b::C` into (`[a, b]`, `C`)
pub fn split_qualified(name: &str) -> (Vec<String>, String) {
    let mut segments: Vec<String> = name
        .split(NAMESPACE_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let short = segments.pop().unwrap_or_default();
    (segments, short)
}
