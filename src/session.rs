//! The compilation session: state shared by everything working on one compilation.
//!
//! A `Session` is a reference-counted handle. Each holder `acquire`s its own
//! handle and `release`s it when done; the shared state lives until the last
//! holder lets go.
//!
//! It carries:
//! - the `Config`,
//! - every diagnostic reported so far,
//! - the symbol table, which maps symbol names to `Symbol` handles.
//!
//! Sessions are single-threaded: the handle is an `Rc`, and the state behind it
//! sits in `RefCell`s.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::Config;
use crate::data::Symbol;
use crate::diagnostics::Diagnostics;

struct Shared {
    config: Config,
    diagnostics: RefCell<Diagnostics>,
    symbols: RefCell<string_interner::DefaultStringInterner>,
}

pub struct Session {
    shared: Rc<Shared>,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("holders", &self.holders())
            .field("config", self.config())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(config: Config) -> Self {
        Session {
            shared: Rc::new(Shared {
                config,
                diagnostics: RefCell::default(),
                symbols: RefCell::default(),
            }),
        }
    }

    /// Get another handle on the same session.
    pub fn acquire(&self) -> Session {
        let session = Session {
            shared: Rc::clone(&self.shared),
        };
        tracing::trace!(holders = session.holders(), "acquired session");
        session
    }

    /// Give up this handle.
    pub fn release(self) {
        tracing::trace!(holders = self.holders() - 1, "released session");
    }

    /// Number of live handles on this session.
    pub fn holders(&self) -> usize {
        Rc::strong_count(&self.shared)
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Add diagnostics to the session's record.
    pub fn report(&self, mut diagnostics: Diagnostics) {
        self.shared.diagnostics.borrow_mut().append(&mut diagnostics);
    }

    /// Take every diagnostic reported so far, leaving none behind.
    pub fn take_diagnostics(&self) -> Diagnostics {
        self.shared.diagnostics.take()
    }

    pub fn has_errors(&self) -> bool {
        self.shared.diagnostics.borrow().has_errors()
    }

    /// The handle for `name`, adding it to the symbol table if it's new.
    pub fn intern(&self, name: &str) -> Symbol {
        self.shared.symbols.borrow_mut().get_or_intern(name)
    }

    /// The name behind a symbol handle.
    pub fn resolve(&self, symbol: Symbol) -> Option<String> {
        self.shared
            .symbols
            .borrow()
            .resolve(symbol)
            .map(str::to_owned)
    }

    pub fn symbol_count(&self) -> usize {
        self.shared.symbols.borrow().len()
    }
}
