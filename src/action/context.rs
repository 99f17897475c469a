//! Evaluation context
//!
//! A [`Context`] is the read-only snapshot one evaluation sees. Combinators
//! never mutate the context they receive; they derive a modified copy for the
//! action they delegate to.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::time::Instant;

use crate::config::Config;

/// Read-only input of one evaluation
#[derive(Debug, Clone)]
pub struct Context {
    /// Word being completed
    pub value: String,
    /// Positional arguments resolved before the current word
    pub args: Vec<String>,
    /// Segments already typed inside a multi-part value
    pub parts: Vec<String>,
    /// Working directory
    pub dir: PathBuf,
    /// Environment snapshot
    pub env: Arc<HashMap<String, String>>,
    /// Point in time after which results are discarded
    pub deadline: Option<Instant>,
    /// Process configuration
    pub config: Arc<Config>,
}

impl Context {
    /// Create a context from the current process state
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            value: String::new(),
            args: Vec::new(),
            parts: Vec::new(),
            dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env: Arc::new(std::env::vars().collect()),
            deadline: None,
            config,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Look up a variable in the environment snapshot
    pub fn getenv(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// Resolve a path against the working directory, expanding a leading `~`
    pub fn abs(&self, path: &str) -> PathBuf {
        if path == "~" {
            return home_dir(self);
        }
        if let Some(rest) = path.strip_prefix("~/") {
            return home_dir(self).join(rest);
        }

        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.dir.join(path)
        }
    }

    /// Tighten the deadline, keeping the earlier of the existing and the new one
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Whether the deadline of an enclosing timeout has passed
    pub fn expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

fn home_dir(ctx: &Context) -> PathBuf {
    ctx.getenv("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("/"))
}
