//! Type trees for reflected declarations
//!
//! Declared types arrive as flat token streams where references to classes
//! and builtin names are interleaved with bracket delimiters, e.g. the
//! declaration `Map<Key, Box<Value>>` becomes
//!
//! ```text
//! Map  <  Key  ,  Box  <  Value  >>
//! ```
//!
//! A single delimiter token may close several levels at once and continue
//! with the next sibling of an outer level (`>>,`), so the parser keeps an
//! explicit stack of open parents instead of counting brackets.

use std::fmt;
use thiserror::Error;

/// One token of a declared type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeToken {
    /// Reference to a class by its canonical identifier
    Class(String),
    /// A builtin (or otherwise unlinked) type name as written
    Builtin(String),
    /// `<`, `,` or a run of `>` optionally followed by `,`
    Delimiter(String),
}

/// Canonical identity of a type tree node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Signature {
    /// Class identifier that can be looked up in the class index
    Class(String),
    /// Builtin primitive or unlinked name
    Builtin(String),
}

impl Signature {
    /// The identifier without its kind
    pub fn as_str(&self) -> &str {
        match self {
            Signature::Class(id) | Signature::Builtin(id) => id,
        }
    }

    /// Whether this refers to a class
    pub fn is_class(&self) -> bool {
        matches!(self, Signature::Class(_))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of a parsed type tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeNode {
    /// A type without generic arguments
    Leaf(Signature),
    /// A generic instantiation with its arguments in source order
    Generic(Signature, Vec<TypeNode>),
}

impl TypeNode {
    /// Leaf node for a builtin name
    pub fn builtin(name: impl Into<String>) -> Self {
        TypeNode::Leaf(Signature::Builtin(name.into()))
    }

    /// Leaf node for a class identifier
    pub fn class(id: impl Into<String>) -> Self {
        TypeNode::Leaf(Signature::Class(id.into()))
    }

    /// Root signature of this node
    pub fn signature(&self) -> &Signature {
        match self {
            TypeNode::Leaf(sig) | TypeNode::Generic(sig, _) => sig,
        }
    }

    /// Generic arguments (empty for leaves)
    pub fn args(&self) -> &[TypeNode] {
        match self {
            TypeNode::Leaf(_) => &[],
            TypeNode::Generic(_, args) => args,
        }
    }

    /// Canonical string `sig<arg1,arg2,...>`, the deduplication key of a type shape
    ///
    /// The signature kind is not part of the key. Class identifiers are
    /// Doxygen refids (`classapp_1_1Box`), which never spell a builtin name,
    /// so `Class("int")` and `Builtin("int")` sharing the key `int` does not
    /// happen for loaded input.
    pub fn canonical(&self) -> String {
        let mut buf = String::new();
        self.write_canonical(&mut buf);
        buf
    }

    fn write_canonical(&self, buf: &mut String) {
        buf.push_str(self.signature().as_str());
        if let TypeNode::Generic(_, args) = self {
            buf.push('<');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    buf.push(',');
                }
                arg.write_canonical(buf);
            }
            buf.push('>');
        }
    }

    /// Replace builtin leaves named like a generic parameter with the bound type
    pub fn substitute(&self, bindings: &[(String, TypeNode)]) -> TypeNode {
        match self {
            TypeNode::Leaf(Signature::Builtin(name)) => bindings
                .iter()
                .find(|(param, _)| param == name)
                .map(|(_, bound)| bound.clone())
                .unwrap_or_else(|| self.clone()),
            TypeNode::Leaf(_) => self.clone(),
            TypeNode::Generic(sig, args) => TypeNode::Generic(
                sig.clone(),
                args.iter().map(|arg| arg.substitute(bindings)).collect(),
            ),
        }
    }

    /// Serialize back into the flat token form the parser accepts
    pub fn to_tokens(&self) -> Vec<TypeToken> {
        let mut tokens = Vec::new();
        self.push_tokens(&mut tokens);
        tokens
    }

    fn push_tokens(&self, tokens: &mut Vec<TypeToken>) {
        tokens.push(match self.signature() {
            Signature::Class(id) => TypeToken::Class(id.clone()),
            Signature::Builtin(name) => TypeToken::Builtin(name.clone()),
        });
        if let TypeNode::Generic(_, args) = self {
            tokens.push(TypeToken::Delimiter("<".to_string()));
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    // Merge into a preceding closing run, as `>>,`
                    match tokens.last_mut() {
                        Some(TypeToken::Delimiter(d)) if d.ends_with('>') => d.push(','),
                        _ => tokens.push(TypeToken::Delimiter(",".to_string())),
                    }
                }
                arg.push_tokens(tokens);
            }
            match tokens.last_mut() {
                Some(TypeToken::Delimiter(d)) if d.ends_with('>') => d.push('>'),
                _ => tokens.push(TypeToken::Delimiter(">".to_string())),
            }
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Malformed type token sequences
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// No tokens at all
    #[error("empty type")]
    Empty,

    /// A `>` without a matching `<`
    #[error("unbalanced '>' in token {position}")]
    UnbalancedClose {
        /// Token position
        position: usize,
    },

    /// Input ended with generic brackets still open
    #[error("{open} generic bracket(s) left open")]
    UnclosedGeneric {
        /// Number of open levels
        open: usize,
    },

    /// A delimiter (or end of input) where a type reference is required
    #[error("expected a type at token {position}")]
    ExpectedType {
        /// Token position
        position: usize,
    },

    /// A type reference directly following another one
    #[error("expected a delimiter at token {position}")]
    ExpectedDelimiter {
        /// Token position
        position: usize,
    },

    /// A second top-level type after the root was complete
    #[error("trailing type after the root at token {position}")]
    TrailingType {
        /// Token position
        position: usize,
    },

    /// A delimiter token with characters other than `<`, `>`, `,`
    #[error("unknown delimiter '{delimiter}'")]
    UnknownDelimiter {
        /// The offending token
        delimiter: String,
    },
}

/// Node under construction: signature plus arena indices of its children
struct PendingNode {
    signature: Signature,
    children: Vec<usize>,
    generic: bool,
}

/// Parse a flat token stream into a type tree
pub fn parse_type(tokens: &[TypeToken]) -> Result<TypeNode, ParseError> {
    TypeTreeParser::default().parse(tokens)
}

/// Parser state: node arena, open-parent stack and the last created node
#[derive(Default)]
struct TypeTreeParser {
    arena: Vec<PendingNode>,
    parents: Vec<usize>,
    root: Option<usize>,
    last: Option<usize>,
    expect_type: bool,
}

impl TypeTreeParser {
    fn parse(mut self, tokens: &[TypeToken]) -> Result<TypeNode, ParseError> {
        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }
        self.expect_type = true;

        for (position, token) in tokens.iter().enumerate() {
            match token {
                TypeToken::Class(id) => self.reference(Signature::Class(id.clone()), position)?,
                TypeToken::Builtin(name) => {
                    self.reference(Signature::Builtin(name.clone()), position)?
                }
                TypeToken::Delimiter(delim) => self.delimiter(delim, position)?,
            }
        }

        if !self.parents.is_empty() {
            return Err(ParseError::UnclosedGeneric {
                open: self.parents.len(),
            });
        }
        if self.expect_type {
            return Err(ParseError::ExpectedType {
                position: tokens.len(),
            });
        }
        let root = self.root.ok_or(ParseError::Empty)?;
        Ok(self.build(root))
    }

    fn reference(&mut self, signature: Signature, position: usize) -> Result<(), ParseError> {
        if !self.expect_type {
            return Err(ParseError::ExpectedDelimiter { position });
        }
        let index = self.arena.len();
        self.arena.push(PendingNode {
            signature,
            children: Vec::new(),
            generic: false,
        });
        match self.parents.last() {
            Some(&parent) => self.arena[parent].children.push(index),
            None if self.root.is_none() => self.root = Some(index),
            None => return Err(ParseError::TrailingType { position }),
        }
        self.last = Some(index);
        self.expect_type = false;
        Ok(())
    }

    fn delimiter(&mut self, delim: &str, position: usize) -> Result<(), ParseError> {
        if self.expect_type {
            return Err(ParseError::ExpectedType { position });
        }
        let delim = delim.trim();
        match delim {
            "<" => {
                // The node just created becomes the parent of what follows
                let node = self.last.ok_or(ParseError::ExpectedType { position })?;
                self.arena[node].generic = true;
                self.parents.push(node);
                self.expect_type = true;
            }
            "," => {
                if self.parents.is_empty() {
                    return Err(ParseError::TrailingType { position });
                }
                self.expect_type = true;
            }
            _ if delim.starts_with('>') => {
                self.last = None;
                let mut chars = delim.chars().filter(|c| !c.is_whitespace()).peekable();
                while let Some(c) = chars.next() {
                    match c {
                        '>' => {
                            if self.parents.pop().is_none() {
                                return Err(ParseError::UnbalancedClose { position });
                            }
                        }
                        ',' => {
                            // Sibling of the parent now on top of the stack
                            if self.parents.is_empty() || chars.peek().is_some() {
                                return Err(ParseError::UnknownDelimiter {
                                    delimiter: delim.to_string(),
                                });
                            }
                            self.expect_type = true;
                        }
                        _ => {
                            return Err(ParseError::UnknownDelimiter {
                                delimiter: delim.to_string(),
                            })
                        }
                    }
                }
            }
            _ => {
                return Err(ParseError::UnknownDelimiter {
                    delimiter: delim.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Build the owned tree bottom-up from the arena
    fn build(&self, index: usize) -> TypeNode {
        let node = &self.arena[index];
        if node.generic {
            TypeNode::Generic(
                node.signature.clone(),
                node.children.iter().map(|&child| self.build(child)).collect(),
            )
        } else {
            TypeNode::Leaf(node.signature.clone())
        }
    }
}
