//! Recursive-descent parsing from tokens to an arena-allocated tree.
//!
//! Tokens come from a `TokenStream`, one bounded batch at a time;
//! the parser never holds more than `Config::token_batch` tokens.
//! Every node it builds goes into the caller's arena.

use crate::config::MAX_DEPTH_CEILING;
use crate::data::{Arena, Node, Tree};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::reader::buffer::BoundedBuffer;
use crate::reader::lexer::{Lexer, TokenStream};
use crate::reader::token::{Span, Token, TokenKind};
use crate::reader::{ReadErr, ReadResult};
use crate::session::Session;

/// Parse every top-level form in `source`.
///
/// Diagnostics from lexing and from literal conversion are reported to `session`
/// whether or not the parse succeeds.
pub fn parse<'a>(session: &Session, arena: &'a Arena, source: &[u8]) -> ReadResult<Tree<'a>> {
    let lexer = Lexer::new(source)?;
    let mut storage = vec![Token::default(); session.config().token_batch.max(1) as usize];
    let mut parser = Parser {
        stream: TokenStream::new(lexer, BoundedBuffer::new(&mut storage)),
        source,
        arena,
        session,
        diags: Diagnostics::default(),
    };

    let result = parser.parse_body();
    session.report(parser.diags);
    if let Ok(tree) = &result {
        tracing::debug!(
            forms = tree.len(),
            arena_used = arena.offset(),
            "parsed body"
        );
    }
    result
}

struct Parser<'s, 'b, 'a, 'x> {
    stream: TokenStream<'s, 'b>,
    source: &'s [u8],
    arena: &'a Arena,
    session: &'x Session,
    diags: Diagnostics,
}

impl<'s, 'b, 'a, 'x> Parser<'s, 'b, 'a, 'x> {
    fn next(&mut self) -> Token {
        match self.stream.next_token(&mut self.diags) {
            Some(token) => token,
            // Only reachable if asked again after end-of-input; keep answering it.
            None => {
                let end = self.source.len() as u32;
                Token::new(TokenKind::Eof, Span::new(end, end))
            }
        }
    }

    fn parse_body(&mut self) -> ReadResult<Tree<'a>> {
        let mut forms = Vec::new();
        loop {
            let token = self.next();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::RParen => return Err(ReadErr::Unbalanced { at: token.span }),
                _ => forms.push(self.parse_form(token, 0)?),
            }
        }
        if forms.is_empty() {
            return Err(ReadErr::Empty);
        }
        let forms: &'a [&'a Node<'a>] = self.arena.alloc_slice_copy(&forms)?;
        Ok(Tree { forms })
    }

    /// Parse the expression that starts with `token`.
    fn parse_form(&mut self, token: Token, depth: usize) -> ReadResult<&'a Node<'a>> {
        let limit = self.session.config().max_depth.min(MAX_DEPTH_CEILING);
        if depth > limit {
            return Err(ReadErr::TooDeep {
                at: token.span,
                limit,
            });
        }

        let span = token.span;
        let node = match token.kind {
            TokenKind::LParen => {
                let mut items = Vec::new();
                let close = loop {
                    let next = self.next();
                    match next.kind {
                        TokenKind::RParen => break next,
                        TokenKind::Eof => return Err(ReadErr::Unclosed { open: span }),
                        _ => items.push(self.parse_form(next, depth + 1)?),
                    }
                };
                Node::List {
                    span: span.to(close.span),
                    items: self.arena.alloc_slice_copy(&items)?,
                }
            }
            TokenKind::Quote => {
                let next = self.next();
                let quoted = self.parse_form(next, depth + 1)?;
                Node::Quote {
                    span: span.to(quoted.span()),
                    quoted,
                }
            }
            TokenKind::RParen => return Err(ReadErr::Unbalanced { at: span }),
            TokenKind::Eof => return Err(ReadErr::UnexpectedEof { at: span }),
            TokenKind::Atom => self.symbol(token),
            TokenKind::Integer => self.integer(token),
            TokenKind::Float => self.float(token),
            TokenKind::String => Node::String {
                span,
                value: self.arena.alloc_slice_copy(&unescape(self.lexeme(token)))?,
            },
            // The lexer has already reported it.
            TokenKind::Error => Node::Error { span },
        };
        let node: &'a Node<'a> = self.arena.alloc(node)?;
        Ok(node)
    }

    fn lexeme(&self, token: Token) -> &'s [u8] {
        token.lexeme(self.source)
    }

    fn symbol(&mut self, token: Token) -> Node<'a> {
        match std::str::from_utf8(self.lexeme(token)) {
            Ok(name) => Node::Symbol {
                span: token.span,
                symbol: self.session.intern(name),
            },
            Err(_) => self.error(token.span, "symbol is not valid UTF-8"),
        }
    }

    fn integer(&mut self, token: Token) -> Node<'a> {
        // The lexer only hands out ASCII digits with an optional sign.
        let text = String::from_utf8_lossy(self.lexeme(token));
        match text.parse::<i64>() {
            Ok(value) => Node::Integer {
                span: token.span,
                value,
            },
            Err(_) => self.error(token.span, "integer literal out of range"),
        }
    }

    fn float(&mut self, token: Token) -> Node<'a> {
        let text = String::from_utf8_lossy(self.lexeme(token));
        match text.parse::<f64>() {
            Ok(value) => Node::Float {
                span: token.span,
                value,
            },
            Err(_) => self.error(token.span, "invalid float literal"),
        }
    }

    fn error(&mut self, span: Span, message: &str) -> Node<'a> {
        self.diags.push(Diagnostic::error(span, message));
        Node::Error { span }
    }
}

/// String contents without their quotes, escapes resolved.
///
/// `\n` and `\t` are newline and tab; a backslash before anything else stands for
/// that byte.
fn unescape(lexeme: &[u8]) -> Vec<u8> {
    let inner = &lexeme[1..lexeme.len() - 1];
    let mut out = Vec::with_capacity(inner.len());
    let mut bytes = inner.iter();
    while let Some(&b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match bytes.next() {
            Some(b'n') => out.push(b'\n'),
            Some(b't') => out.push(b'\t'),
            Some(&other) => out.push(other),
            // The lexer never ends a string on a lone backslash.
            None => out.push(b'\\'),
        }
    }
    out
}
