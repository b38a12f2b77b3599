//! Resumable tokenizer.
//!
//! A `Lexer` holds nothing but a borrow of the source and a scan position.
//! Each `scan` call fills whatever room the caller's buffer has, then returns;
//! the next call picks up where the last one stopped.
//! That keeps memory flat no matter how large the source is:
//! the caller drains a batch, re-windows the buffer, and asks for more.
//!
//! Lexical errors never stop the scan. A bad byte or malformed literal becomes an
//! `Error` token, with a diagnostic alongside, and scanning carries on after it.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::reader::buffer::BoundedBuffer;
use crate::reader::token::{Span, Token, TokenKind};
use crate::reader::{ReadErr, ReadResult};

/// Where a lexer is in its life.
///
/// Transitions only run forward: `Scanning` → `EmittedEof` → `Exhausted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Input remains, or the end-of-input token has not been written yet.
    Scanning,
    /// The end-of-input token went out on the last call that produced anything.
    EmittedEof,
    /// Nothing more will ever be produced.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct Lexer<'s> {
    src: &'s [u8],
    pos: u32,
    phase: Phase,
}

impl<'s> Lexer<'s> {
    /// Start scanning `src` from the beginning.
    ///
    /// Offsets are 32-bit, so sources of 4GiB or more are refused.
    pub fn new(src: &'s [u8]) -> ReadResult<Self> {
        if u32::try_from(src.len()).is_err() {
            return Err(ReadErr::SourceTooLarge { len: src.len() });
        }
        Ok(Lexer {
            src,
            pos: 0,
            phase: Phase::Scanning,
        })
    }

    pub fn source(&self) -> &'s [u8] {
        self.src
    }

    /// Offset of the next unscanned byte.
    pub fn position(&self) -> u32 {
        self.pos
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn len(&self) -> u32 {
        // Checked in `new`.
        self.src.len() as u32
    }

    /// Scan tokens into the free slots of `out`, and return how many were written.
    ///
    /// Stops when `out` is full, or after writing the end-of-input token.
    /// The call after the one that wrote end-of-input returns 0, as does every call
    /// after that.
    pub fn scan(&mut self, out: &mut BoundedBuffer<'_, Token>, diags: &mut Diagnostics) -> u32 {
        match self.phase {
            Phase::Exhausted => return 0,
            Phase::EmittedEof => {
                self.phase = Phase::Exhausted;
                return 0;
            }
            Phase::Scanning => (),
        }

        let mut written = 0;
        while !out.is_full() {
            if self.pos == self.len() {
                let eof = Token::new(TokenKind::Eof, Span::new(self.pos, self.pos));
                if out.push(eof).is_ok() {
                    written += 1;
                    self.phase = Phase::EmittedEof;
                }
                break;
            }
            if let Some(token) = self.next_token(diags) {
                if out.push(token).is_err() {
                    // Unreachable: fullness was checked before lexing.
                    break;
                }
                written += 1;
            }
        }
        tracing::trace!(written, pos = self.pos, phase = ?self.phase, "scanned token batch");
        written
    }

    /// Lex one token at the current position.
    ///
    /// Returns `None` if only whitespace or a comment was consumed.
    /// Always advances the position by at least one byte.
    fn next_token(&mut self, diags: &mut Diagnostics) -> Option<Token> {
        let start = self.pos as usize;
        let input = &self.src[start..];

        if let Some(kind) = match input[0] {
            b'(' => Some(TokenKind::LParen),
            b')' => Some(TokenKind::RParen),
            b'\'' => Some(TokenKind::Quote),
            _ => None,
        } {
            return Some(self.take(kind, 1));
        }

        if let Some(m) = matchers::space()
            .find(input)
            .or_else(|| matchers::comment().find(input))
        {
            self.advance(m.end());
            return None;
        }

        if input[0] == b'"' {
            let body = matchers::string().find(input).map_or(1, |m| m.end());
            if input.get(body) == Some(&b'"') {
                return Some(self.take(TokenKind::String, body + 1));
            }
            let token = self.take(TokenKind::Error, input.len());
            diags.push(Diagnostic::error(token.span, "unterminated string literal"));
            return Some(token);
        }

        if let Some(m) = matchers::number().find(input) {
            let number = m.as_bytes();
            // Symbol bytes glued onto a number make the whole run malformed.
            if let Some(tail) = matchers::symbol().find(&input[number.len()..]) {
                let token = self.take(TokenKind::Error, number.len() + tail.end());
                diags.push(Diagnostic::error(token.span, "malformed numeric literal"));
                return Some(token);
            }
            let kind = if number.contains(&b'.') {
                TokenKind::Float
            } else {
                TokenKind::Integer
            };
            return Some(self.take(kind, number.len()));
        }

        if let Some(m) = matchers::symbol().find(input) {
            return Some(self.take(TokenKind::Atom, m.end()));
        }

        if let Some(m) = matchers::dots().find(input) {
            let token = self.take(TokenKind::Error, m.end());
            let message = if m.end() > 1 {
                "malformed numeric literal"
            } else {
                "unexpected `.`"
            };
            diags.push(Diagnostic::error(token.span, message));
            return Some(token);
        }

        let byte = input[0];
        let token = self.take(TokenKind::Error, 1);
        diags.push(Diagnostic::error(
            token.span,
            format!("unexpected byte {:#04x} ({:?})", byte, char::from(byte)),
        ));
        Some(token)
    }

    /// Consume `len` bytes as a token of `kind`.
    fn take(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.pos;
        self.advance(len);
        Token::new(kind, Span::new(start, self.pos))
    }

    fn advance(&mut self, len: usize) {
        debug_assert!(len > 0, "lexer must always make progress");
        // len is bounded by the remaining input, which fits in u32.
        self.pos += len as u32;
    }
}

/// Pull-based access to a lexer's tokens, one at a time, through a bounded buffer.
///
/// The buffer is only refilled once the caller has drained it.
pub struct TokenStream<'s, 'b> {
    lexer: Lexer<'s>,
    buffer: BoundedBuffer<'b, Token>,
}

impl<'s, 'b> TokenStream<'s, 'b> {
    pub fn new(lexer: Lexer<'s>, mut buffer: BoundedBuffer<'b, Token>) -> Self {
        buffer.reset();
        TokenStream { lexer, buffer }
    }

    pub fn lexer(&self) -> &Lexer<'s> {
        &self.lexer
    }

    /// The next token, without consuming it.
    pub fn peek(&mut self, diags: &mut Diagnostics) -> Option<Token> {
        if self.buffer.is_empty() {
            self.buffer.reset();
            self.lexer.scan(&mut self.buffer, diags);
        }
        self.buffer.active().first().copied()
    }

    /// Consume the next token.
    ///
    /// `None` once the end-of-input token has been handed out.
    pub fn next_token(&mut self, diags: &mut Diagnostics) -> Option<Token> {
        self.peek(diags)?;
        self.buffer.pop_front()
    }
}

mod matchers {
    use regex::bytes::Regex;
    use std::sync::OnceLock;

    pub(super) fn space() -> &'static Regex {
        static SPACE: OnceLock<Regex> = OnceLock::new();
        SPACE.get_or_init(|| {
            Regex::new(r"\A[[:space:]]+").expect("could not compile regex for empty space")
        })
    }

    pub(super) fn comment() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"(?-u)\A;[^\n]*").expect("could not compile regex for comment")
        })
    }

    pub(super) fn string() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            // Quote, then any run of escaped bytes or bytes other than quote/backslash.
            // The closing quote is checked by the caller, so an unterminated
            // string still matches.
            Regex::new(r#"(?s-u)\A"(?:[^"\\]|\\.)*"#).expect("could not compile regex for string")
        })
    }

    pub(super) fn number() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"\A[+-]?[0-9]+(?:\.[0-9]+)?").expect("could not compile regex for number")
        })
    }

    pub(super) fn symbol() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"(?-u)\A[A-Za-z0-9!$%&*/:<=>?^_~+\-\x80-\xFF]+")
                .expect("could not compile regex for symbol")
        })
    }

    pub(super) fn dots() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| Regex::new(r"\A\.[.0-9]*").expect("could not compile regex for dots"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use pretty_assertions::assert_eq;

    /// Scan all of `input` in batches of `capacity`, returning per-call counts too.
    fn scan_all(input: &[u8], capacity: usize) -> (Vec<Token>, Vec<u32>, Diagnostics) {
        let mut lexer = Lexer::new(input).unwrap();
        let mut storage = vec![Token::default(); capacity];
        let mut diags = Diagnostics::default();
        let mut tokens = Vec::new();
        let mut counts = Vec::new();
        loop {
            let mut out = BoundedBuffer::new(&mut storage);
            let n = lexer.scan(&mut out, &mut diags);
            counts.push(n);
            if n == 0 {
                break;
            }
            tokens.extend_from_slice(out.active());
        }
        (tokens, counts, diags)
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    fn lexemes<'s>(input: &'s [u8], tokens: &[Token]) -> Vec<&'s str> {
        tokens
            .iter()
            .map(|t| std::str::from_utf8(t.lexeme(input)).unwrap())
            .collect()
    }

    #[test]
    fn hello_world_in_one_call() {
        let input = b"(hello world)\n123.43";
        let (tokens, counts, diags) = scan_all(input, 10);

        assert_eq!(counts, vec![6, 0]);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::LParen,
                TokenKind::Atom,
                TokenKind::Atom,
                TokenKind::RParen,
                TokenKind::Float,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            lexemes(input, &tokens),
            vec!["(", "hello", "world", ")", "123.43", ""]
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn hello_world_in_pairs() {
        let input = b"(hello world)\n123.43";
        let (tokens, counts, _) = scan_all(input, 2);
        let (single, _, _) = scan_all(input, 10);

        assert_eq!(counts, vec![2, 2, 2, 0]);
        assert_eq!(tokens, single);
    }

    #[test]
    fn phases_after_eof() {
        let input = b"x";
        let mut lexer = Lexer::new(input).unwrap();
        let mut storage = [Token::default(); 4];
        let mut diags = Diagnostics::default();

        let mut out = BoundedBuffer::new(&mut storage);
        assert_eq!(lexer.scan(&mut out, &mut diags), 2);
        assert_eq!(lexer.phase(), Phase::EmittedEof);
        out.reset();
        assert_eq!(lexer.scan(&mut out, &mut diags), 0);
        assert_eq!(lexer.phase(), Phase::Exhausted);
        assert_eq!(lexer.scan(&mut out, &mut diags), 0);
        assert_eq!(lexer.phase(), Phase::Exhausted);
        assert_eq!(lexer.position(), 1);
    }

    #[test]
    fn empty_source_is_just_eof() {
        let (tokens, counts, _) = scan_all(b"", 3);
        assert_eq!(counts, vec![1, 0]);
        assert_eq!(tokens, vec![Token::new(TokenKind::Eof, Span::new(0, 0))]);
    }

    #[test]
    fn full_buffer_changes_nothing() {
        let mut lexer = Lexer::new(b"(a)").unwrap();
        let mut storage = [Token::default(); 1];
        let mut diags = Diagnostics::default();
        let mut out = BoundedBuffer::new(&mut storage);

        assert_eq!(lexer.scan(&mut out, &mut diags), 1);
        assert_eq!(lexer.scan(&mut out, &mut diags), 0);
        assert_eq!(lexer.position(), 1);
        assert_eq!(lexer.phase(), Phase::Scanning);
    }

    #[test]
    fn scan_appends_after_a_part_consumed_window() {
        let input = b"(a b c d e)";
        let mut lexer = Lexer::new(input).unwrap();
        let mut storage = [Token::default(); 5];
        let mut diags = Diagnostics::default();
        let mut out = BoundedBuffer::new(&mut storage);

        assert_eq!(lexer.scan(&mut out, &mut diags), 5);
        assert_eq!(out.consume(3), 3);
        assert!(out.is_full());
        assert_eq!(lexer.scan(&mut out, &mut diags), 0);
        assert_eq!((out.begin(), out.end()), (3, 5));

        // Only the slots past `end` are written; `begin` stays where the consumer left it.
        let mut storage = [Token::default(); 8];
        let mut out = BoundedBuffer::new(&mut storage);
        for _ in 0..3 {
            out.push(Token::default()).unwrap();
        }
        assert_eq!(out.consume(2), 2);
        let room = out.capacity() - out.end();
        let written = lexer.scan(&mut out, &mut diags);
        assert!(written <= room);
        assert_eq!(written, 3);
        assert_eq!(out.begin(), 2);
        assert_eq!(out.end(), 6);
        assert_eq!(
            kinds(&out.active()[1..]),
            vec![TokenKind::Atom, TokenKind::RParen, TokenKind::Eof]
        );
        assert_eq!(lexemes(input, &out.active()[1..2]), vec!["e"]);
        assert_eq!(lexer.phase(), Phase::EmittedEof);
        assert!(diags.is_empty());
    }

    #[test]
    fn eof_waits_for_room() {
        // Trailing trivia is consumed, but end-of-input needs its own slot.
        let mut lexer = Lexer::new(b"a ; done").unwrap();
        let mut storage = [Token::default(); 1];
        let mut diags = Diagnostics::default();

        let mut out = BoundedBuffer::new(&mut storage);
        assert_eq!(lexer.scan(&mut out, &mut diags), 1);
        assert_eq!(out.active()[0].kind, TokenKind::Atom);
        out.reset();
        assert_eq!(lexer.scan(&mut out, &mut diags), 1);
        assert_eq!(out.active()[0].kind, TokenKind::Eof);
        assert_eq!(lexer.phase(), Phase::EmittedEof);
    }

    #[test]
    fn malformed_float() {
        let input = b"12.3.4";
        let (tokens, _, diags) = scan_all(input, 8);

        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Float, TokenKind::Error, TokenKind::Eof]
        );
        assert_eq!(lexemes(input, &tokens), vec!["12.3", ".4", ""]);
        assert_eq!(diags.len(), 1);
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.span, Span::new(4, 6));
    }

    #[test]
    fn trailing_dot() {
        let input = b"(12.)";
        let (tokens, _, diags) = scan_all(input, 8);
        assert_eq!(lexemes(input, &tokens), vec!["(", "12", ".", ")", ""]);
        assert_eq!(tokens[2].kind, TokenKind::Error);
        assert!(diags.has_errors());
    }

    #[test]
    fn numbers_and_signs() {
        let input = b"-6 +7 -3.25 - -x 24601 1+";
        let (tokens, _, diags) = scan_all(input, 16);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Integer,
                TokenKind::Integer,
                TokenKind::Float,
                TokenKind::Atom,
                TokenKind::Atom,
                TokenKind::Integer,
                TokenKind::Error,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            lexemes(input, &tokens),
            vec!["-6", "+7", "-3.25", "-", "-x", "24601", "1+", ""]
        );
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn symbols() {
        let input = "tree->list operator<> Queryable? IMPORTANT! λx a1".as_bytes();
        let (tokens, _, diags) = scan_all(input, 16);
        assert_eq!(
            lexemes(input, &tokens),
            vec!["tree->list", "operator<>", "Queryable?", "IMPORTANT!", "λx", "a1", ""]
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn strings_and_quotes() {
        let input = br#"'("hi" "say \"hi\"" "back\\slash")"#;
        let (tokens, _, diags) = scan_all(input, 16);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Quote,
                TokenKind::LParen,
                TokenKind::String,
                TokenKind::String,
                TokenKind::String,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
        assert_eq!(lexemes(input, &tokens)[3], r#""say \"hi\"""#);
        assert!(diags.is_empty());
    }

    #[test]
    fn multi_line_string() {
        let input = b"\"and \nkeep\" going";
        let (tokens, _, _) = scan_all(input, 4);
        assert_eq!(lexemes(input, &tokens), vec!["\"and \nkeep\"", "going", ""]);
    }

    #[test]
    fn unterminated_string() {
        for input in [&b"(a \"hello"[..], b"\"hello\\\"", b"\"trailing\\"] {
            let (tokens, _, diags) = scan_all(input, 8);
            let last = tokens[tokens.len() - 2];
            assert_eq!(last.kind, TokenKind::Error, "input {:?}", input);
            assert_eq!(last.span.end as usize, input.len());
            assert_eq!(diags.len(), 1);
        }
    }

    #[test]
    fn unknown_bytes_do_not_stall() {
        let input = b"#(a,b)\x01";
        let (tokens, _, diags) = scan_all(input, 3);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Error,
                TokenKind::LParen,
                TokenKind::Atom,
                TokenKind::Error,
                TokenKind::Atom,
                TokenKind::RParen,
                TokenKind::Error,
                TokenKind::Eof,
            ]
        );
        assert_eq!(diags.len(), 3);
    }

    #[test]
    fn comments_are_skipped() {
        let input = b"; leading\n(a ; inner\n b) ;; trailing";
        let (tokens, _, _) = scan_all(input, 8);
        assert_eq!(lexemes(input, &tokens), vec!["(", "a", "b", ")", ""]);
    }

    #[test]
    fn token_stream_pulls_in_batches() {
        let input = b"(a b c d e)";
        let mut storage = [Token::default(); 2];
        let mut diags = Diagnostics::default();
        let mut stream =
            TokenStream::new(Lexer::new(input).unwrap(), BoundedBuffer::new(&mut storage));

        assert_eq!(stream.peek(&mut diags).map(|t| t.kind), Some(TokenKind::LParen));
        // Only the first batch has been scanned.
        assert_eq!(stream.lexer().position(), 2);

        let mut got = Vec::new();
        while let Some(token) = stream.next_token(&mut diags) {
            got.push(token.kind);
        }
        assert_eq!(got.len(), 8);
        assert_eq!(got.last(), Some(&TokenKind::Eof));
        assert_eq!(stream.next_token(&mut diags), None);
    }
}
