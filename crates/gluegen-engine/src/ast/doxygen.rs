//! Doxygen XML loading
//!
//! Reads the XML output of Doxygen and turns every `compounddef` into a
//! classified [`Compound`]. Only the handful of elements the reflection
//! pipeline needs are looked at:
//!
//! ```text
//! doxygen
//!   compounddef[kind=class|struct|namespace|file, id]
//!     compoundname
//!     basecompoundref
//!     templateparamlist/param/(type|declname)
//!     location[file]
//!     sectiondef
//!       memberdef[kind, id]
//!         type (text + ref[refid])
//!         name
//!         initializer
//!         param/(type|declname|defval)
//! ```

use super::{
    split_qualified, AstSet, ClassRecord, Compound, ConstructorRecord, DecoratorRecord,
    MemberKind, MemberRecord, ParamRecord, SourceFileRecord,
};
use crate::error::ReflectError;
use crate::types::TypeToken;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::{Path, PathBuf};

/// Base class that turns a class into a decorator definition
pub const DECORATOR_BASE_CLASS: &str = "SharedAttribute";

/// Doxygen files that never contain compounds
const SKIPPED_FILES: &[&str] = &["index.xml", "Doxyfile.xml"];

/// Type qualifiers and keywords that carry no identity
const TYPE_QUALIFIERS: &[&str] = &[
    "const",
    "volatile",
    "static",
    "mutable",
    "constexpr",
    "inline",
    "extern",
    "typename",
];

// ============================================================================
// XML tree
// ============================================================================

/// Element of a parsed XML document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Tag name
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Child elements and text in document order
    pub children: Vec<XmlContent>,
}

/// Mixed content of an element
#[derive(Debug, Clone, PartialEq)]
pub enum XmlContent {
    /// Nested element
    Element(XmlElement),
    /// Character data
    Text(String),
}

impl XmlElement {
    fn from_start(e: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
        let attributes = e
            .attributes()
            .filter_map(|a| {
                a.ok().map(|attr| {
                    let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                    let val = attr
                        .unescape_value()
                        .map(|v| v.to_string())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string());
                    (key, val)
                })
            })
            .collect();
        Self {
            name,
            attributes,
            children: Vec::new(),
        }
    }

    /// Attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child element with the given tag
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// All child elements with the given tag
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    /// All child elements
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlContent::Element(e) => Some(e),
            XmlContent::Text(_) => None,
        })
    }

    /// Concatenated text of this element and all descendants
    pub fn text(&self) -> String {
        let mut buf = String::new();
        self.collect_text(&mut buf);
        buf.trim().to_string()
    }

    fn collect_text(&self, buf: &mut String) {
        for content in &self.children {
            match content {
                XmlContent::Text(t) => buf.push_str(t),
                XmlContent::Element(e) => e.collect_text(buf),
            }
        }
    }

    /// Text of a child element, empty when absent
    pub fn child_text(&self, name: &str) -> String {
        self.child(name).map(XmlElement::text).unwrap_or_default()
    }
}

/// Parse an XML string into its root element
pub fn parse_xml(xml: &str) -> Result<XmlElement, String> {
    let mut reader = Reader::from_str(xml);

    // Open elements, innermost last
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(XmlElement::from_start(e)),
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "closing tag without an open element".to_string())?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlContent::Element(element)),
                    None => root = Some(element),
                }
            }
            Ok(Event::Empty(ref e)) => {
                let element = XmlElement::from_start(e);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlContent::Element(element)),
                    None => root = Some(element),
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| format!("bad text at {}: {}", reader.buffer_position(), err))?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlContent::Text(text.to_string()));
                }
            }
            Ok(Event::CData(ref e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).to_string();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlContent::Text(text));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    err
                ))
            }
        }
    }

    if !stack.is_empty() {
        return Err(format!("unclosed element '{}'", stack[stack.len() - 1].name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

// ============================================================================
// Loading
// ============================================================================

/// Load every Doxygen XML file of a directory, in sorted path order
pub fn load_directory(dir: &Path) -> Result<AstSet, ReflectError> {
    let pattern = Path::new(&glob::Pattern::escape(&dir.to_string_lossy())).join("*.xml");
    let entries = glob::glob(&pattern.to_string_lossy()).map_err(|e| ReflectError::Load {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut paths: Vec<PathBuf> = entries.filter_map(Result::ok).collect();
    paths.sort();

    let mut set = AstSet::new();
    for path in paths {
        let skipped = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| SKIPPED_FILES.contains(&n))
            .unwrap_or(false);
        if skipped {
            continue;
        }
        for compound in load_file(&path)? {
            set.insert(compound);
        }
    }
    tracing::info!(
        "Loaded {} reflected classes, {} attribute classes, {} scopes from {}",
        set.classes().len(),
        set.decorators().len(),
        set.source_files().len(),
        dir.display()
    );
    Ok(set)
}

/// Load the compounds of one XML file
pub fn load_file(path: &Path) -> Result<Vec<Compound>, ReflectError> {
    let content = std::fs::read_to_string(path).map_err(|e| ReflectError::Load {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_document(&content).map_err(|message| ReflectError::Load {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse the compounds of one Doxygen XML document
pub fn parse_document(xml: &str) -> Result<Vec<Compound>, String> {
    let root = parse_xml(xml)?;
    if root.name != "doxygen" {
        tracing::debug!("Skipping XML document with root '{}'", root.name);
        return Ok(Vec::new());
    }
    Ok(root.children("compounddef").filter_map(classify).collect())
}

/// Decide once what a compound is
fn classify(def: &XmlElement) -> Option<Compound> {
    let kind = def.attr("kind").unwrap_or_default();
    let name = def.child_text("compoundname");
    match kind {
        "class" | "struct" if derives_decorator_base(def) => {
            tracing::debug!("Attribute class found: {}", name);
            Some(Compound::DecoratorClass(decorator_record(def, name)))
        }
        "class" | "struct" => Some(Compound::ReflectedClass(class_record(def, name))),
        "namespace" => {
            let (mut namespace, short) = split_qualified(&name);
            namespace.push(short);
            Some(Compound::SourceFile(SourceFileRecord {
                name,
                namespace,
                members: members(def).collect(),
            }))
        }
        "file" => Some(Compound::SourceFile(SourceFileRecord {
            name,
            namespace: Vec::new(),
            members: members(def).collect(),
        })),
        _ => None,
    }
}

fn derives_decorator_base(def: &XmlElement) -> bool {
    def.children("basecompoundref").any(|base| {
        let (_, short) = split_qualified(&base.text());
        short == DECORATOR_BASE_CLASS
    })
}

fn class_record(def: &XmlElement, qualified_name: String) -> ClassRecord {
    let generic_params = def
        .child("templateparamlist")
        .map(|list| list.children("param").filter_map(generic_param_name).collect())
        .unwrap_or_default();
    ClassRecord {
        id: def.attr("id").unwrap_or_default().to_string(),
        qualified_name,
        file: def
            .child("location")
            .and_then(|l| l.attr("file"))
            .unwrap_or_default()
            .to_string(),
        generic_params,
        members: members(def).collect(),
    }
}

/// `typename T` or `<declname>T</declname>` to `T`
fn generic_param_name(param: &XmlElement) -> Option<String> {
    let declname = param.child_text("declname");
    if !declname.is_empty() {
        return Some(declname);
    }
    let text = param.child_text("type");
    let name = text
        .strip_prefix("typename")
        .or_else(|| text.strip_prefix("class"))
        .unwrap_or(&text)
        .trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn decorator_record(def: &XmlElement, qualified_name: String) -> DecoratorRecord {
    let (_, short) = split_qualified(&qualified_name);
    let constructors = member_defs(def)
        .filter(|m| m.attr("kind") == Some("function") && m.child_text("name") == short)
        .map(|m| ConstructorRecord {
            params: m
                .children("param")
                .map(|p| {
                    let default_value = p.child_text("defval");
                    ParamRecord {
                        name: p.child_text("declname"),
                        declared_type: p.child_text("type"),
                        default_value: (!default_value.is_empty()).then_some(default_value),
                    }
                })
                .collect(),
        })
        .collect();
    DecoratorRecord {
        qualified_name,
        constructors,
    }
}

fn member_defs(def: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    def.children("sectiondef")
        .flat_map(|section| section.children("memberdef"))
}

fn members(def: &XmlElement) -> impl Iterator<Item = MemberRecord> + '_ {
    member_defs(def).map(member_record)
}

fn member_record(def: &XmlElement) -> MemberRecord {
    let kind = match def.attr("kind") {
        Some("variable") => MemberKind::Variable,
        _ => MemberKind::Function,
    };
    let (type_tokens, type_text) = match def.child("type") {
        Some(ty) => (tokenize_type(ty), ty.text()),
        None => (Vec::new(), String::new()),
    };
    MemberRecord {
        id: def.attr("id").unwrap_or_default().to_string(),
        name: def.child_text("name"),
        kind,
        type_tokens,
        type_text,
        initializer: def.child_text("initializer"),
    }
}

// ============================================================================
// Type tokenization
// ============================================================================

/// Turn the mixed content of a `type` element into type tokens
pub fn tokenize_type(ty: &XmlElement) -> Vec<TypeToken> {
    let mut lexer = TypeLexer::default();
    lexer.element(ty);
    lexer.finish()
}

#[derive(Default)]
struct TypeLexer {
    tokens: Vec<TypeToken>,
    words: Vec<String>,
}

impl TypeLexer {
    fn element(&mut self, element: &XmlElement) {
        for content in &element.children {
            match content {
                XmlContent::Text(text) => self.text(text),
                XmlContent::Element(e) if e.name == "ref" => match e.attr("refid") {
                    Some(refid) => self.reference(refid),
                    None => self.text(&e.text()),
                },
                XmlContent::Element(e) => self.element(e),
            }
        }
    }

    fn reference(&mut self, refid: &str) {
        // `inexor::` written in front of a linked name only qualifies it
        while self.words.last().is_some_and(|w| w.ends_with("::")) {
            self.words.pop();
        }
        self.flush_words();
        self.tokens.push(TypeToken::Class(refid.to_string()));
    }

    fn text(&mut self, text: &str) {
        let mut word = String::new();
        for c in text.chars() {
            if c.is_alphanumeric() || c == '_' || c == ':' {
                word.push(c);
                continue;
            }
            self.end_word(&mut word);
            match c {
                '<' => {
                    self.flush_words();
                    self.tokens.push(TypeToken::Delimiter("<".to_string()));
                }
                '>' | ',' => {
                    self.flush_words();
                    self.closing(c);
                }
                _ => {}
            }
        }
        self.end_word(&mut word);
    }

    /// Extend a `>` run (`>>`, `>>,`) or start a new delimiter
    fn closing(&mut self, c: char) {
        if let Some(TypeToken::Delimiter(d)) = self.tokens.last_mut() {
            if d.starts_with('>') && !d.ends_with(',') {
                d.push(c);
                return;
            }
        }
        self.tokens.push(TypeToken::Delimiter(c.to_string()));
    }

    fn end_word(&mut self, word: &mut String) {
        if word.is_empty() {
            return;
        }
        let w = std::mem::take(word);
        if !TYPE_QUALIFIERS.contains(&w.as_str()) {
            self.words.push(w);
        }
    }

    fn flush_words(&mut self) {
        if !self.words.is_empty() {
            self.tokens.push(TypeToken::Builtin(self.words.join(" ")));
            self.words.clear();
        }
    }

    fn finish(mut self) -> Vec<TypeToken> {
        self.flush_words();
        self.tokens
    }
}
