//! Render a parsed tree back into Lisp text.
//!
//! The output reads back as the same tree (modulo spans):
//! symbols come from the session's table, strings are re-escaped,
//! floats always carry a decimal point.

use std::fmt::Write;

use super::{Node, Tree};
use crate::session::Session;

/// Render a single node.
pub fn render_node(session: &Session, node: &Node) -> String {
    let mut out = String::new();
    write_node(session, node, &mut out);
    out
}

/// Render every top-level form, one per line.
pub fn render_tree(session: &Session, tree: &Tree) -> String {
    let mut out = String::new();
    for form in tree.forms {
        write_node(session, form, &mut out);
        out.push('\n');
    }
    out
}

fn write_node(session: &Session, node: &Node, out: &mut String) {
    match node {
        Node::List { items, .. } => {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_node(session, item, out);
            }
            out.push(')');
        }
        Node::Quote { quoted, .. } => {
            out.push('\'');
            write_node(session, quoted, out);
        }
        Node::Symbol { symbol, .. } => match session.resolve(*symbol) {
            Some(name) => out.push_str(&name),
            None => out.push_str("<unknown symbol>"),
        },
        // Writing to a String cannot fail.
        Node::Integer { value, .. } => {
            _ = write!(out, "{value}");
        }
        Node::Float { value, .. } => write_float(*value, out),
        Node::String { value, .. } => {
            out.push('"');
            for ch in String::from_utf8_lossy(value).chars() {
                match ch {
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    '\n' => out.push_str("\\n"),
                    '\t' => out.push_str("\\t"),
                    ch => out.push(ch),
                }
            }
            out.push('"');
        }
        Node::Error { .. } => out.push_str("#<error>"),
    }
}

/// Positional notation with a decimal point: the reader has no exponent syntax.
fn write_float(value: f64, out: &mut String) {
    let start = out.len();
    _ = write!(out, "{value}");
    if value.is_finite() && !out[start..].contains('.') {
        out.push_str(".0");
    }
}
