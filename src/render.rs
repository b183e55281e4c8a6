//! Rendering of a [`BuildConfiguration`] as a `tailwind.config.js` module.

use crate::config::{BuildConfiguration, Plugin};
use serde_json::Value;
use std::fmt::Write;

const INDENT: &str = "    ";
const TYPE_ANNOTATION: &str = "/** @type {import('tailwindcss').Config} */";

/// Render the configuration as a CommonJS module
pub fn render_js_module(config: &BuildConfiguration) -> String {
    let mut out = String::new();
    out.push_str(TYPE_ANNOTATION);
    out.push('\n');
    out.push_str("module.exports = {\n");

    // content
    push_indent(&mut out, 1);
    out.push_str("content: ");
    if config.content.is_empty() {
        out.push_str("[]");
    } else {
        out.push_str("[\n");
        for pattern in &config.content {
            push_indent(&mut out, 2);
            push_string(&mut out, pattern);
            out.push_str(",\n");
        }
        push_indent(&mut out, 1);
        out.push(']');
    }
    out.push_str(",\n");

    // theme
    push_indent(&mut out, 1);
    out.push_str("theme: {\n");
    push_indent(&mut out, 2);
    out.push_str("extend: ");
    push_object(&mut out, config.theme.extend.iter(), 2);
    out.push_str(",\n");
    for (key, value) in &config.theme.overrides {
        push_indent(&mut out, 2);
        push_key(&mut out, key);
        out.push_str(": ");
        push_value(&mut out, value, 2);
        out.push_str(",\n");
    }
    push_indent(&mut out, 1);
    out.push_str("},\n");

    // plugins
    push_indent(&mut out, 1);
    out.push_str("plugins: ");
    if config.plugins.is_empty() {
        out.push_str("[]");
    } else {
        out.push_str("[\n");
        for plugin in &config.plugins {
            push_indent(&mut out, 2);
            push_plugin(&mut out, plugin, 2);
            out.push_str(",\n");
        }
        push_indent(&mut out, 1);
        out.push(']');
    }
    out.push_str(",\n");

    out.push_str("}\n");
    out
}

fn push_plugin(out: &mut String, plugin: &Plugin, level: usize) {
    out.push_str("require(");
    push_string(out, plugin.module());
    out.push(')');
    if let Plugin::Configured { options, .. } = plugin {
        out.push('(');
        push_value(out, options, level);
        out.push(')');
    }
}

fn push_value(out: &mut String, value: &Value, level: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => push_string(out, s),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for item in items {
                push_indent(out, level + 1);
                push_value(out, item, level + 1);
                out.push_str(",\n");
            }
            push_indent(out, level);
            out.push(']');
        }
        Value::Object(map) => push_object(out, map.iter(), level),
    }
}

fn push_object<'a, I>(out: &mut String, entries: I, level: usize)
where
    I: ExactSizeIterator<Item = (&'a String, &'a Value)>,
{
    if entries.len() == 0 {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    for (key, value) in entries {
        push_indent(out, level + 1);
        push_key(out, key);
        out.push_str(": ");
        push_value(out, value, level + 1);
        out.push_str(",\n");
    }
    push_indent(out, level);
    out.push('}');
}

fn push_key(out: &mut String, key: &str) {
    if is_identifier(key) {
        out.push_str(key);
    } else {
        push_string(out, key);
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn push_string(out: &mut String, s: &str) {
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}
