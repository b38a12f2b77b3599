//! Syntax-tree data types and their allocator.
//!
//! The reader builds trees out of fixed-size, `Copy` nodes:
//! - Lists and quotes hold references to other nodes.
//! - Integers and floats are stored inline.
//! - Symbols are interned in the session's symbol table; nodes hold the handle.
//! - String contents are copied into the arena, escapes resolved.
//!
//! All of it is bump-allocated from one `Arena`, sized up front.
//! There is no per-node free and no garbage collection:
//! a tree lives exactly as long as its arena, and goes away with it.

mod arena;
mod render;
mod tree;

pub use arena::{Arena, ArenaError};
pub use render::{render_node, render_tree};
pub use tree::{Node, Tree};

/// Handle to an interned symbol name.
pub type Symbol = string_interner::DefaultSymbol;
