//! Read a Lisp body from stdin and show what the front end made of it:
//! - Lisp on stdout, i.e. a mirror of the input
//! - Debug on stderr - the tree nodes, then any diagnostics as `line:column: severity: message`.
//!
//! The debug format is given by the defaults of the `derive(Debug)` macro in Rust.
//! Set `RUST_LOG=trace` to watch token batches and arena allocations go by.
//!
//! ```ignore
//! <input.lisp lisp_to_debug
//! ```

use std::io::Read;
use std::process::ExitCode;

use lispfront::config::Config;
use lispfront::data::{render_node, Arena};
use lispfront::diagnostics::Diagnostic;
use lispfront::reader::location::LineIndex;
use lispfront::reader::parse_body;
use lispfront::session::Session;
use tracing_subscriber::EnvFilter;

/// Log filter from `RUST_LOG` directives, or `info` if they are missing or unparseable.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    match directives.map(EnvFilter::try_new) {
        Some(Ok(filter)) => filter,
        _ => EnvFilter::new("info"),
    }
}

fn main() -> ExitCode {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let mut input = Vec::new();
    if let Err(e) = std::io::stdin().lock().read_to_end(&mut input) {
        eprintln!("error: could not read input: {e}");
        return ExitCode::FAILURE;
    }
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let arena = match Arena::new(config.arena_capacity) {
        Ok(arena) => arena,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let session = Session::new(config);
    let lines = LineIndex::new(&input);
    let print = |diag: &Diagnostic| {
        let at = lines.line_column(diag.span.start);
        eprintln!("{at}: {}: {}", diag.severity, diag.message);
    };

    let result = parse_body(&session, &arena, &input);
    let status = match &result {
        Ok(tree) => {
            for form in tree.forms {
                println!("{}", render_node(&session, form));
                eprintln!("{:?}", form);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            print(&e.diagnostic());
            ExitCode::FAILURE
        }
    };
    for diag in &session.take_diagnostics() {
        print(diag);
    }
    arena.release();
    status
}
