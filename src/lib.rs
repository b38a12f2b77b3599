//! Front end for a small Lisp: a streaming tokenizer and the arena its trees live in.
//!
//! ```
//! use lispfront::{config::Config, data::Arena, reader, session::Session};
//!
//! let session = Session::new(Config::default());
//! let arena = Arena::new(session.config().arena_capacity).unwrap();
//! let tree = reader::parse_body(&session, &arena, b"(hello world)\n123.43").unwrap();
//! assert_eq!(tree.len(), 2);
//! ```

pub mod config;
pub mod data;
pub mod diagnostics;
pub mod reader;
pub mod session;
