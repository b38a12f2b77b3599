//! Lisp tokens.
//!
//! A token is a kind plus the span of source bytes it came from.
//! Tokens never copy text out of the source: `lexeme` re-slices it on demand,
//! so the source has to outlive every token read from it.

/// Byte range in the source, half-open: `[start, end)`.
///
/// Byte offsets are the only location the reader tracks;
/// `LineIndex` turns them into lines and columns for people.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Span { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The smallest span covering both.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn range(&self) -> core::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

/// The kinds of token the lexer produces.
///
/// To add a kind: add the variant, then its entries in `TokenKind::ALL` and
/// `TOKEN_NAMES`, in the same position.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TokenKind {
    LParen,
    RParen,
    Quote,
    Atom,
    Integer,
    Float,
    String,
    #[default]
    Eof,
    Error,
}

/// Printable names, indexed by `TokenKind` tag.
pub const TOKEN_NAMES: [&str; TokenKind::COUNT] = [
    "left paren",
    "right paren",
    "quote",
    "atom",
    "integer literal",
    "float literal",
    "string literal",
    "end of input",
    "error",
];

impl TokenKind {
    pub const COUNT: usize = 9;

    /// Every kind, in tag order.
    pub const ALL: [TokenKind; TokenKind::COUNT] = [
        TokenKind::LParen,
        TokenKind::RParen,
        TokenKind::Quote,
        TokenKind::Atom,
        TokenKind::Integer,
        TokenKind::Float,
        TokenKind::String,
        TokenKind::Eof,
        TokenKind::Error,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<TokenKind> {
        TokenKind::ALL.get(tag as usize).copied()
    }

    pub fn name(self) -> &'static str {
        TOKEN_NAMES[self as usize]
    }
}

/// Name for a raw kind tag, which may have come from somewhere untrustworthy.
pub fn kind_name(tag: u8) -> &'static str {
    TokenKind::from_tag(tag).map_or("<unknown>", TokenKind::name)
}

impl core::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }

    /// Where the token starts.
    pub fn location(&self) -> u32 {
        self.span.start
    }

    /// The source bytes this token was read from.
    pub fn lexeme<'s>(&self, src: &'s [u8]) -> &'s [u8] {
        &src[self.span.range()]
    }
}
