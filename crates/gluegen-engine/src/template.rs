//! `{{key}}` placeholder rendering for default-value templates
//!
//! Placeholders name a dotted path into a JSON object, in double or triple
//! braces. Nothing is HTML-escaped, so both forms render the same. Strings
//! render as they are, booleans and numbers through their display form,
//! lists of strings joined with `::`. Missing keys render as nothing.

use crate::ast::NAMESPACE_SEPARATOR;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

/// Triple braces are tried first so `{{{name}}}` does not leave a stray pair
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    let path = r"\s*([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)\s*";
    Regex::new(&format!(r"\{{\{{\{{{path}\}}\}}\}}|\{{\{{{path}\}}\}}"))
        .expect("valid regex")
});

/// Substitute every placeholder in `template` with its value in `context`
pub fn render(template: &str, context: &Value) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let path = caps.get(1).or_else(|| caps.get(2));
            path.and_then(|path| lookup(context, path.as_str()))
                .map(display)
                .unwrap_or_default()
        })
        .into_owned()
}

fn lookup<'v>(context: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(context, |value, key| match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(display)
            .collect::<Vec<_>>()
            .join(NAMESPACE_SEPARATOR),
        Value::Object(_) | Value::Null => String::new(),
    }
}
