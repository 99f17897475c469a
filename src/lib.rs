//! Composable shell completion for command-line applications
//!
//! Applications bind a deferred [`action::Action`] to every flag and
//! positional argument of their command tree. At completion time the shell
//! calls back into the binary, the traversal engine finds the action for the
//! word under the cursor and a shell adapter formats the candidates.
//!
//! # Modules
//!
//! - `action`: lazily evaluated candidate producers and their combinators
//! - `cache`: on-disk memoization of action results
//! - `candidate`: candidate records and the metadata traveling with them
//! - `cli`: hidden entry points called by the registration snippets
//! - `config`: configuration management
//! - `error`: error types and handling
//! - `lexer`: shell word splitting and escaping
//! - `logging`: append-only session log
//! - `shell`: registration snippets and reply formats per shell
//! - `style`: display styles
//! - `traverse`: command tree and lenient command-line traversal
//!
//! # Example
//!
//! ```no_run
//! use compline::{Action, Command, Completer, Config, Flag};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let root = Command::new("tool")
//!         .flag(Flag::new("format", "output format").value(Action::values(["json", "text"])))
//!         .positional(Action::files([".txt"]));
//!
//!     let config = Arc::new(Config::load("tool").unwrap_or_default());
//!     let completer = Completer::new(root, config).expect("valid command tree");
//!     let reply = completer.invoke(std::env::args()).await;
//!     print!("{}", reply.output);
//! }
//! ```

pub mod action;
pub mod cache;
pub mod candidate;
pub mod cli;
pub mod config;
pub mod error;
pub mod lexer;
pub mod logging;
pub mod shell;
pub mod style;
pub mod traverse;

// Re-export commonly used types
pub use action::{Action, Context, Outcome};
pub use candidate::{Candidate, Meta};
pub use cli::{Completer, Reply};
pub use config::Config;
pub use error::{CompletionError, Result};
pub use shell::Shell;
pub use traverse::{Command, Flag};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
