//! JavaScript/TypeScript edits.
//!
//! New properties are inserted before the closing brace of the deepest object that
//! already exists on the key's path, following the layout of that object.

use std::path::Path;

use swc_common::Spanned;
use swc_ecma_ast::{Expr, ObjectLit, Prop, PropOrSpread};

use super::{key_parts, line_indent, quoted};
use crate::core::parsers::{
    ecma::{extract_prop_name, parse_module_source, unwrap_ts_expr},
    script::find_exported_object,
};

/// Spell a property name: bare when it is an identifier, quoted otherwise.
pub fn encode_key(segment: &str) -> String {
    if is_identifier(segment) {
        segment.to_string()
    } else {
        quoted(segment)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

pub fn insert(content: &str, path: &Path, key: &str, value: &str) -> Option<String> {
    let parsed = parse_module_source(content, path).ok()?;
    let mut object = find_exported_object(&parsed.module)?;

    let parts = key_parts(key);
    let mut depth = 0;
    while depth + 1 < parts.len() {
        let Some(child) = child_object(object, parts[depth]) else {
            break;
        };
        object = child;
        depth += 1;
    }
    let property = nested_property(&parts[depth..], value);

    let (start, length) = parsed.range(object.span);
    let close = (start + length).checked_sub(1)?;
    if content.as_bytes().get(close) != Some(&b'}') {
        return None;
    }
    let head = content.get(..close)?.trim_end();
    let multiline = content.get(start..close)?.contains('\n');

    let mut updated = String::with_capacity(content.len() + property.len() + 16);
    updated.push_str(head);
    if !head.ends_with('{') && !head.ends_with(',') {
        updated.push(',');
    }
    if multiline {
        let closing_indent = line_indent(content, close);
        let property_indent = object
            .props
            .first()
            .map(|prop| line_indent(content, parsed.range(prop.span()).0))
            .filter(|indent| indent.len() > closing_indent.len())
            .unwrap_or_else(|| format!("{}  ", closing_indent));
        updated.push('\n');
        updated.push_str(&property_indent);
        updated.push_str(&property);
        updated.push_str(",\n");
        updated.push_str(&closing_indent);
    } else {
        updated.push(' ');
        updated.push_str(&property);
        updated.push(' ');
    }
    updated.push_str(&content[close..]);
    Some(updated)
}

fn child_object<'a>(object: &'a ObjectLit, name: &str) -> Option<&'a ObjectLit> {
    object.props.iter().rev().find_map(|prop| {
        let PropOrSpread::Prop(prop) = prop else {
            return None;
        };
        let Prop::KeyValue(kv) = &**prop else {
            return None;
        };
        if extract_prop_name(&kv.key).as_deref() != Some(name) {
            return None;
        }
        match unwrap_ts_expr(&kv.value) {
            Expr::Object(nested) => Some(nested),
            _ => None,
        }
    })
}

/// `a: { b: "value" }` for the parts `[a, b]`.
fn nested_property(parts: &[&str], value: &str) -> String {
    match parts {
        [] => quoted(value),
        [last] => format!("{}: {}", encode_key(last), quoted(value)),
        [first, rest @ ..] => format!("{}: {{ {} }}", encode_key(first), nested_property(rest, value)),
    }
}
