//! Invocation layer
//!
//! The registration snippets call back into the host binary through hidden
//! subcommands:
//!
//! - `_completion <shell> <state> <words...>`: complete the last word, or
//!   print the resolved command state when `<state>` is `state`
//! - `snippet <shell>`: print the registration script
//! - `clear-cache`: remove cached results of the binary
//!
//! [`Completer::invoke`] maps raw arguments to a [`Reply`] without touching
//! stdout, so the whole round trip can be exercised in tests.

pub mod demo;

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::action::Context;
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::Result;
use crate::lexer::ShellLexer;
use crate::shell::{self, Shell};
use crate::traverse::{self, Command};

/// State token asking for the resolved command instead of candidates
pub const STATE_QUERY: &str = "state";

/// Hidden entry points of a host binary
#[derive(Parser, Debug)]
#[command(
    name = "compline",
    version,
    about = "Shell completion for command-line applications",
    long_about = "Shell completion for command-line applications.

Source the output of `snippet <shell>` in your shell to register completion."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands reached from the registration snippets
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Complete a command line
    #[command(name = "_completion", hide = true)]
    Completion {
        /// Shell requesting the completion
        #[arg(value_name = "SHELL")]
        shell: String,

        /// `state` to print the resolved command state, anything else to complete
        #[arg(value_name = "STATE")]
        state: String,

        /// Words of the command line up to the cursor, starting with the program name
        #[arg(
            value_name = "WORDS",
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        words: Vec<String>,
    },

    /// Print the registration script for a shell
    Snippet {
        /// Shell (bash, elvish, export, fish, ion, nushell, oil, powershell, tcsh, xonsh, zsh)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Remove cached completion results
    ClearCache,
}

/// Text to print and the process exit code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub output: String,
    pub code: i32,
}

impl Reply {
    fn success(output: String) -> Self {
        Self { output, code: 0 }
    }

    fn failure(output: String) -> Self {
        Self { output, code: 1 }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Completion entry point of a host binary
pub struct Completer {
    root: Command,
    config: Arc<Config>,
}

impl Completer {
    /// Create a completer for a validated command tree
    ///
    /// # Returns
    /// * `Result<Self>` - The completer, or the structural error of the tree
    pub fn new(root: Command, config: Arc<Config>) -> Result<Self> {
        root.validate()?;
        Ok(Self { root, config })
    }

    /// Create a completer from a clap definition
    pub fn from_clap(cmd: &clap::Command, config: Arc<Config>) -> Result<Self> {
        Self::new(Command::from_clap(cmd), config)
    }

    pub fn root(&self) -> &Command {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle raw process arguments, the first one being the binary itself
    pub async fn invoke<I, T>(&self, args: I) -> Reply
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let parsed = match CliArgs::try_parse_from(args) {
            Ok(parsed) => parsed,
            Err(err) if !err.use_stderr() => return Reply::success(err.to_string()),
            Err(err) => return Reply::failure(err.to_string()),
        };

        match self.run(parsed.command).await {
            Ok(output) => Reply::success(output),
            Err(err) => {
                warn!("{err}");
                Reply::failure(format!("Error: {err}"))
            }
        }
    }

    /// Execute a parsed subcommand
    pub async fn run(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Completion {
                shell,
                state,
                words,
            } => self.complete(&shell, &state, &words).await,
            Commands::Snippet { shell } => Ok(Shell::parse(&shell)?.snippet(&self.root)),
            Commands::ClearCache => {
                let store = CacheStore::new(&self.config);
                store.clear()?;
                info!(dir = %store.dir().display(), "cache cleared");
                Ok(String::new())
            }
        }
    }

    /// Complete the last of `words`, the first word being the program name
    pub async fn complete(&self, shell: &str, state: &str, words: &[String]) -> Result<String> {
        let shell = Shell::parse(shell)?;
        let words = prepare_words(words);
        info!(%shell, state, ?words, "completion requested");

        if state == STATE_QUERY {
            let resolution = traverse::resolve(&self.root, &words)?;
            return Ok(resolution.state);
        }

        let (value, args) = match words.split_last() {
            Some((value, args)) => (value.clone(), args.to_vec()),
            None => (String::new(), Vec::new()),
        };
        let ctx = Context::new(Arc::clone(&self.config))
            .with_args(args)
            .with_value(value);
        let outcome = traverse::complete(&self.root, &ctx).await;
        debug!(
            candidates = outcome.candidates.len(),
            messages = !outcome.meta.messages.is_empty(),
            "completion evaluated"
        );
        Ok(shell::value(shell, &ctx.value, outcome, &self.config))
    }
}

/// Drop the program name and unquote a quoted current word
fn prepare_words(words: &[String]) -> Vec<String> {
    let mut words: Vec<String> = words.iter().skip(1).cloned().collect();
    match words.last_mut() {
        Some(current) if current.starts_with(['"', '\'']) => {
            let tokens = ShellLexer::tokenize_for_completion(current);
            if let [token] = tokens.as_slice() {
                *current = token.value.clone();
            }
        }
        Some(_) => {}
        None => words.push(String::new()),
    }
    words
}

/// Shell named in raw process arguments, empty when there is none
pub fn requested_shell(args: &[String]) -> &str {
    match args {
        [_, sub, shell, ..] if sub == "_completion" || sub == "snippet" => shell,
        _ => "",
    }
}
