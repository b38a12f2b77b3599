//! Syntax-tree nodes.
//!
//! Every node, child list, and string payload lives in an `Arena`,
//! so the whole tree is `Copy` data borrowed from it.

use crate::data::Symbol;
use crate::reader::token::Span;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    /// A parenthesized group. The span covers both parentheses.
    List {
        span: Span,
        items: &'a [&'a Node<'a>],
    },
    /// `'x`, shorthand for `(quote x)`.
    Quote { span: Span, quoted: &'a Node<'a> },
    Symbol { span: Span, symbol: Symbol },
    Integer { span: Span, value: i64 },
    Float { span: Span, value: f64 },
    /// String contents, escapes resolved.
    String { span: Span, value: &'a [u8] },
    /// Stand-in for input that could not be read as anything;
    /// a diagnostic has been reported for it.
    Error { span: Span },
}

impl<'a> Node<'a> {
    pub fn span(&self) -> Span {
        match *self {
            Node::List { span, .. }
            | Node::Quote { span, .. }
            | Node::Symbol { span, .. }
            | Node::Integer { span, .. }
            | Node::Float { span, .. }
            | Node::String { span, .. }
            | Node::Error { span } => span,
        }
    }

    /// Child nodes, in order. Empty for leaves.
    pub fn children(&'a self) -> &'a [&'a Node<'a>] {
        match self {
            Node::List { items, .. } => items,
            Node::Quote { quoted, .. } => core::slice::from_ref(quoted),
            _ => &[],
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Node::Error { .. })
    }
}

/// The top-level forms of one source, in order.
///
/// Valid for as long as the arena it was parsed into.
#[derive(Debug, Clone, Copy)]
pub struct Tree<'a> {
    pub forms: &'a [&'a Node<'a>],
}

impl<'a> Tree<'a> {
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Depth-first, pre-order walk over every node.
    pub fn walk(&self) -> impl Iterator<Item = &'a Node<'a>> {
        let mut stack: Vec<&'a Node<'a>> = self.forms.iter().rev().copied().collect();
        core::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children().iter().rev().copied());
            Some(node)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Arena;
    use pretty_assertions::assert_eq;

    #[test]
    fn walk_is_preorder() {
        let arena = Arena::new(1024).unwrap();
        let one = &*arena
            .alloc(Node::Integer {
                span: Span::new(1, 2),
                value: 1,
            })
            .unwrap();
        let two = &*arena
            .alloc(Node::Float {
                span: Span::new(4, 7),
                value: 2.5,
            })
            .unwrap();
        let quoted = &*arena
            .alloc(Node::Quote {
                span: Span::new(3, 7),
                quoted: two,
            })
            .unwrap();
        let items = arena.alloc_slice_copy(&[one, quoted]).unwrap();
        let list = &*arena
            .alloc(Node::List {
                span: Span::new(0, 8),
                items,
            })
            .unwrap();
        let forms = arena.alloc_slice_copy(&[list]).unwrap();
        let tree = Tree { forms };

        let spans: Vec<Span> = tree.walk().map(|n| n.span()).collect();
        assert_eq!(
            spans,
            vec![
                Span::new(0, 8),
                Span::new(1, 2),
                Span::new(3, 7),
                Span::new(4, 7)
            ]
        );
        assert_eq!(list.children().len(), 2);
        assert_eq!(quoted.children().len(), 1);
        assert!(one.children().is_empty());
    }
}
