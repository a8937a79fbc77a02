//! Reflected variable discovery
//!
//! A declaration takes part in reflection when its type or initializer
//! mentions [`REFLECTION_MARKER`]. Decorators are attached in the
//! initializer, separated by `|`:
//!
//! ```text
//! int maxfps = 200 | SharedVar() | Range(0, 1000) | Persistent();
//! ```

use crate::ast::{MemberKind, MemberRecord, SourceFileRecord};
use crate::error::ReflectError;
use crate::types::{parse_type, TypeNode};
use rustc_hash::FxHashSet;
use serde::Serialize;

/// Sentinel that flags a declaration for reflection
pub const REFLECTION_MARKER: &str = "SharedVar";

/// A decorator instance as written at the attachment site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachedAttribute {
    /// Decorator name
    pub name: String,
    /// Arguments exactly as written
    pub arguments: Vec<String>,
}

/// A reflected declaration
#[derive(Debug, Clone, PartialEq)]
pub struct SharedVariable {
    /// Unqualified name
    pub name: String,
    /// Namespace segments, root to leaf
    pub namespace: Vec<String>,
    /// Declared type
    pub ty: TypeNode,
    /// Decorators attached at the declaration
    pub attached: Vec<AttachedAttribute>,
}

impl SharedVariable {
    /// Build a variable from a marked member record
    pub fn from_member(member: &MemberRecord, namespace: &[String]) -> Result<Self, ReflectError> {
        let ty = parse_type(&member.type_tokens).map_err(|source| ReflectError::Parse {
            entity: qualified(namespace, &member.name),
            source,
        })?;
        Ok(Self {
            name: member.name.clone(),
            namespace: namespace.to_vec(),
            ty,
            attached: parse_attachments(&member.initializer),
        })
    }

    /// `ns::name` for diagnostics
    pub fn qualified_name(&self) -> String {
        qualified(&self.namespace, &self.name)
    }
}

fn qualified(namespace: &[String], name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", namespace.join("::"), name)
    }
}

/// Whether a member is flagged for reflection
pub fn is_marked(member: &MemberRecord) -> bool {
    member.kind == MemberKind::Variable
        && (member.type_text.contains(REFLECTION_MARKER)
            || member.initializer.contains(REFLECTION_MARKER))
}

/// Find every marked top-level variable, in scope order
///
/// Doxygen lists namespace members both in the namespace and in the file
/// compound, so declarations are deduplicated by member id.
pub fn discover_variables(files: &[SourceFileRecord]) -> Result<Vec<SharedVariable>, ReflectError> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut variables = Vec::new();
    for file in files {
        for member in file.members.iter().filter(|m| is_marked(m)) {
            if !member.id.is_empty() && !seen.insert(member.id.as_str()) {
                continue;
            }
            let variable = SharedVariable::from_member(member, &file.namespace)?;
            tracing::debug!("Found reflected variable {}", variable.qualified_name());
            variables.push(variable);
        }
    }
    Ok(variables)
}

/// Split an initializer into its attached decorators
pub fn parse_attachments(initializer: &str) -> Vec<AttachedAttribute> {
    let body = initializer.trim();
    let body = body.strip_prefix('=').unwrap_or(body);
    split_top_level(body, '|')
        .into_iter()
        .filter_map(|segment| parse_call(segment.trim()))
        .filter(|attached| attached.name != REFLECTION_MARKER)
        .collect()
}

/// `Name(a, b)` into a name and raw arguments
fn parse_call(segment: &str) -> Option<AttachedAttribute> {
    let open = segment.find('(')?;
    if !segment.ends_with(')') {
        return None;
    }
    let name = segment[..open].trim();
    let valid_name = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == ':');
    if !valid_name {
        return None;
    }
    let inner = &segment[open + 1..segment.len() - 1];
    let arguments = if inner.trim().is_empty() {
        Vec::new()
    } else {
        split_top_level(inner, ',')
            .into_iter()
            .map(str::to_string)
            .collect()
    };
    let (_, short) = crate::ast::split_qualified(name);
    Some(AttachedAttribute {
        name: short,
        arguments,
    })
}

/// Split on `sep` outside of quotes and brackets
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth = depth.saturating_sub(1),
            _ if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeToken;

    fn member(name: &str, ty: &str, init: &str) -> MemberRecord {
        MemberRecord::variable(
            format!("var_{}", name),
            name,
            vec![TypeToken::Builtin(ty.to_string())],
            init,
        )
    }

    #[test]
    fn test_parse_attachments() {
        let attached = parse_attachments("= 200 | SharedVar() | Range(0, 1000) | Persistent()");
        assert_eq!(
            attached,
            vec![
                AttachedAttribute {
                    name: "Range".into(),
                    arguments: vec!["0".into(), " 1000".into()],
                },
                AttachedAttribute {
                    name: "Persistent".into(),
                    arguments: vec![],
                },
            ]
        );
    }

    #[test]
    fn test_parse_attachments_respects_quotes() {
        let attached = parse_attachments(r#"= "a|b" | Help("x, \"y\" | z") | SharedVar()"#);
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].name, "Help");
        assert_eq!(attached[0].arguments, vec![r#""x, \"y\" | z""#.to_string()]);
    }

    #[test]
    fn test_marker_in_type_or_initializer() {
        assert!(is_marked(&member("a", "int", "= 1 | SharedVar()")));
        assert!(is_marked(&member("b", "SharedVar<int>", "")));
        assert!(!is_marked(&member("c", "int", "= 1")));

        let mut func = member("d", "int", "= SharedVar()");
        func.kind = MemberKind::Function;
        assert!(!is_marked(&func));
    }

    #[test]
    fn test_discover_deduplicates_by_member_id() {
        let score = member("score", "int", "= 0 | SharedVar()");
        let files = vec![
            SourceFileRecord {
                name: "app".into(),
                namespace: vec!["app".into()],
                members: vec![score.clone(), member("plain", "int", "= 3")],
            },
            SourceFileRecord {
                name: "main.hpp".into(),
                namespace: vec![],
                members: vec![score],
            },
        ];
        let vars = discover_variables(&files).unwrap();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].qualified_name(), "app::score");
        assert!(vars[0].attached.is_empty());
    }

    #[test]
    fn test_malformed_type_names_the_variable() {
        let mut bad = member("bad", "int", "= SharedVar()");
        bad.type_tokens.push(TypeToken::Delimiter("<".into()));
        let files = vec![SourceFileRecord {
            name: "app".into(),
            namespace: vec!["app".into()],
            members: vec![bad],
        }];
        match discover_variables(&files) {
            Err(ReflectError::Parse { entity, .. }) => assert_eq!(entity, "app::bad"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
