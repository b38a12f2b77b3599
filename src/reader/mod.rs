//! Support for reading Lisp expressions from source bytes.
//!
//! Reading happens in two layers:
//! - `lexer` turns bytes into tokens, a bounded batch at a time.
//! - `parse` pulls those batches and builds a tree in an `Arena`.

use crate::data::{Arena, ArenaError, Tree};
use crate::diagnostics::Diagnostic;
use crate::session::Session;
use token::Span;

pub mod buffer;
pub mod lexer;
pub mod location;
pub mod parse;
pub mod token;

/// Parse the source as a list of Lisp expressions (i.e. a body).
///
/// Lexical problems are reported to the session's diagnostics and don't stop the
/// read; structural ones come back as the error.
pub fn parse_body<'a>(session: &Session, arena: &'a Arena, input: &[u8]) -> ReadResult<Tree<'a>> {
    parse::parse(session, arena, input)
}

/// Error type if a read does not complete.
///
/// A reader may experience a true parsing error, e.g. "())", that no additional input can fix.
/// This is distinct from a reader that gets an unexpected end-of-input, e.g. "(()":
/// it may be that more input will fix the issue.
///
/// If input is coming in interactively, this is a useful distinction;
/// in the first case, we'd want to indicate an error to the user,
/// while in the latter we'd like to prompt the user for more input.
/// `is_incomplete` tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadErr {
    #[error("right paren without matching left paren")]
    Unbalanced { at: Span },
    #[error("end of input inside a list")]
    Unclosed { open: Span },
    #[error("end of input where an expression was expected")]
    UnexpectedEof { at: Span },
    #[error("no expressions in input")]
    Empty,
    #[error("lists nested deeper than {limit}")]
    TooDeep { at: Span, limit: usize },
    #[error("source of {len} bytes is too large to read")]
    SourceTooLarge { len: usize },
    #[error(transparent)]
    Arena(#[from] ArenaError),
}

impl ReadErr {
    /// Whether more input might turn this into a successful read.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, ReadErr::Unclosed { .. } | ReadErr::UnexpectedEof { .. })
    }

    /// Where in the source the problem is, if anywhere in particular.
    pub fn span(&self) -> Option<Span> {
        match *self {
            ReadErr::Unbalanced { at }
            | ReadErr::UnexpectedEof { at }
            | ReadErr::TooDeep { at, .. } => Some(at),
            ReadErr::Unclosed { open } => Some(open),
            ReadErr::Empty | ReadErr::SourceTooLarge { .. } | ReadErr::Arena(_) => None,
        }
    }

    /// This error as a diagnostic, for printing alongside the others.
    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.span().unwrap_or_default(), self.to_string())
    }
}

/// The main result type for this module:
/// a T (token, expression, etc), or an error.
pub type ReadResult<T> = Result<T, ReadErr>;
