//! Action engine
//!
//! An [`Action`] is a deferred computation that produces completion
//! candidates for a [`Context`]. Producers (static values, files, callbacks,
//! external commands) are leaves; combinators (batch, cache, filter, split,
//! timeout, ...) wrap other actions and hold their parameters explicitly, so
//! an action tree can be inspected without evaluating it.
//!
//! # Architecture
//!
//! - **Context**: read-only input of one evaluation
//! - **Action**: tagged variants, one per producer or combinator
//! - **Outcome**: candidates plus the [`Meta`] accumulator
//! - **evaluate**: the async interpreter walking an action tree
//!
//! # Examples
//!
//! ```no_run
//! use compline::action::{Action, Context};
//! use compline::Config;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn demo() {
//! let action = Action::batch(vec![
//!     Action::values_described([("start", "start the service")]),
//!     Action::callback(|_ctx| Action::values(["stop", "restart"])),
//! ])
//! .timeout(Duration::from_secs(1))
//! .usage("service command");
//!
//! let ctx = Context::new(Arc::new(Config::default()));
//! let outcome = action.invoke(&ctx).await;
//! assert_eq!(outcome.candidates.len(), 3);
//! # }
//! ```

mod builtin;
mod context;
mod evaluate;
mod parts;

pub use context::Context;

use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use crate::candidate::{Candidate, Meta};
use crate::traverse::Command;

/// Deferred computation returning another action
pub type CallbackFn = Arc<dyn Fn(&Context) -> Action + Send + Sync>;
/// Derives the cache key from a context
pub type KeyFn = Arc<dyn Fn(&Context) -> String + Send + Sync>;
/// Derives a style from a value
pub type StyleFn = Arc<dyn Fn(&str, &Context) -> String + Send + Sync>;
/// Maps the standard output of an external command to an action
pub type OutputFn = Arc<dyn Fn(&str) -> Action + Send + Sync>;

/// Result of evaluating an action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub candidates: Vec<Candidate>,
    pub meta: Meta,
}

impl Outcome {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            meta: Meta::default(),
        }
    }

    /// No candidates, a single message
    pub fn message(message: impl fmt::Display) -> Self {
        let mut outcome = Self::default();
        outcome.meta.messages.add(message.to_string());
        outcome
    }

    /// Candidate values in order
    pub fn values(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.value.as_str()).collect()
    }

    fn map_values(mut self, f: impl Fn(&str) -> String) -> Self {
        for candidate in &mut self.candidates {
            candidate.value = f(&candidate.value);
        }
        self
    }
}

/// Metadata attachment that leaves values untouched
#[derive(Clone)]
pub enum Modifier {
    /// Fixed style for every candidate
    Style(String),
    /// Style computed per value
    StyleF(StyleFn),
    /// Usage text, applied when the inner action set none
    Usage(String),
    /// Characters suppressing the trailing space
    NoSpace(Vec<char>),
    /// Grouping label
    Tag(String),
}

/// Composable completion producer
#[derive(Clone)]
pub enum Action {
    /// Static candidates
    Values(Vec<Candidate>),
    /// No candidates, only a message
    Message(String),
    /// Files and directories below the working directory
    Files { suffixes: Vec<String> },
    /// Directories below the working directory
    Directories,
    /// Deferred computation
    Callback(CallbackFn),
    /// Candidates derived from the output of an external command
    Exec {
        program: String,
        args: Vec<String>,
        map: OutputFn,
    },
    /// Segment-wise completion driven by a callback seeing the typed parts
    MultiPartsFn {
        separator: String,
        callback: CallbackFn,
    },
    /// Nested command line completed against a command tree
    Command(Arc<Command>),
    /// All actions, concatenated in order, first value wins
    Batch(Vec<Action>),
    /// Memoized on disk
    Cache {
        inner: Box<Action>,
        ttl: Duration,
        key: Option<KeyFn>,
        site: String,
    },
    /// Keep only the listed values
    Filter { inner: Box<Action>, values: Vec<String> },
    /// Drop the listed values
    Retain { inner: Box<Action>, values: Vec<String> },
    /// Drop leading positional arguments
    Shift { inner: Box<Action>, n: usize },
    /// Complete the values of the inner action one segment at a time
    MultiParts { inner: Box<Action>, separator: String },
    /// Fixed literal in front of every value
    Prefix { inner: Box<Action>, prefix: String },
    /// Fixed literal behind every value
    Suffix { inner: Box<Action>, suffix: String },
    /// Complete the word under the cursor of a shell-quoted line
    Split { inner: Box<Action> },
    /// Bounded evaluation
    Timeout { inner: Box<Action>, duration: Duration },
    /// Evaluate in another working directory
    Chdir { inner: Box<Action>, dir: String },
    /// Separator-delimited list of distinct values
    UniqueList { inner: Box<Action>, separator: String },
    /// Metadata attachment
    Modify { inner: Box<Action>, modifier: Modifier },
}

impl Action {
    /// Values without description
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Action::Values(values.into_iter().map(Candidate::new).collect())
    }

    /// Values with description
    pub fn values_described<I, S, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, D)>,
        S: Into<String>,
        D: Into<String>,
    {
        Action::Values(
            pairs
                .into_iter()
                .map(|(value, description)| Candidate::new(value).with_description(description))
                .collect(),
        )
    }

    /// Values with style
    pub fn styled_values<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        Action::Values(
            pairs
                .into_iter()
                .map(|(value, style)| Candidate::new(value).with_style(style))
                .collect(),
        )
    }

    /// Values with description and style
    pub fn styled_values_described<I, S, D, T>(triples: I) -> Self
    where
        I: IntoIterator<Item = (S, D, T)>,
        S: Into<String>,
        D: Into<String>,
        T: Into<String>,
    {
        Action::Values(
            triples
                .into_iter()
                .map(|(value, description, style)| {
                    Candidate::new(value)
                        .with_description(description)
                        .with_style(style)
                })
                .collect(),
        )
    }

    pub fn message(message: impl fmt::Display) -> Self {
        Action::Message(message.to_string())
    }

    /// Files, optionally restricted to the given suffixes (directories are always offered)
    pub fn files<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Action::Files {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn directories() -> Self {
        Action::Directories
    }

    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&Context) -> Action + Send + Sync + 'static,
    {
        Action::Callback(Arc::new(f))
    }

    /// Run an external command in the working directory and map its output
    pub fn exec<I, S, F>(program: impl Into<String>, args: I, map: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&str) -> Action + Send + Sync + 'static,
    {
        Action::Exec {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            map: Arc::new(map),
        }
    }

    /// Segment-wise completion; the callback sees the typed segments in `Context::parts`
    pub fn multi_parts_fn<F>(separator: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Context) -> Action + Send + Sync + 'static,
    {
        Action::MultiPartsFn {
            separator: separator.into(),
            callback: Arc::new(f),
        }
    }

    /// Complete the context's args and value as a command line of `root`
    pub fn command(root: Command) -> Self {
        Action::Command(Arc::new(root))
    }

    pub fn batch(actions: Vec<Action>) -> Self {
        Action::Batch(actions)
    }

    /// Memoize results on disk for `ttl`, keyed by the call site
    #[track_caller]
    pub fn cache(self, ttl: Duration) -> Self {
        self.cache_at(ttl, None, Location::caller())
    }

    /// Memoize results on disk for `ttl`, keyed by the call site and `key`
    #[track_caller]
    pub fn cache_with<F>(self, ttl: Duration, key: F) -> Self
    where
        F: Fn(&Context) -> String + Send + Sync + 'static,
    {
        self.cache_at(ttl, Some(Arc::new(key)), Location::caller())
    }

    fn cache_at(self, ttl: Duration, key: Option<KeyFn>, site: &Location<'_>) -> Self {
        Action::Cache {
            inner: Box::new(self),
            ttl,
            key,
            site: format!("{}:{}:{}", site.file(), site.line(), site.column()),
        }
    }

    pub fn filter<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Action::Filter {
            inner: Box::new(self),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn retain<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Action::Retain {
            inner: Box::new(self),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn shift(self, n: usize) -> Self {
        Action::Shift {
            inner: Box::new(self),
            n,
        }
    }

    pub fn multi_parts(self, separator: impl Into<String>) -> Self {
        Action::MultiParts {
            inner: Box::new(self),
            separator: separator.into(),
        }
    }

    pub fn prefix(self, prefix: impl Into<String>) -> Self {
        Action::Prefix {
            inner: Box::new(self),
            prefix: prefix.into(),
        }
    }

    pub fn suffix(self, suffix: impl Into<String>) -> Self {
        Action::Suffix {
            inner: Box::new(self),
            suffix: suffix.into(),
        }
    }

    pub fn split(self) -> Self {
        Action::Split {
            inner: Box::new(self),
        }
    }

    pub fn timeout(self, duration: Duration) -> Self {
        Action::Timeout {
            inner: Box::new(self),
            duration,
        }
    }

    pub fn chdir(self, dir: impl Into<String>) -> Self {
        Action::Chdir {
            inner: Box::new(self),
            dir: dir.into(),
        }
    }

    pub fn unique_list(self, separator: impl Into<String>) -> Self {
        Action::UniqueList {
            inner: Box::new(self),
            separator: separator.into(),
        }
    }

    pub fn style(self, style: impl Into<String>) -> Self {
        self.modify(Modifier::Style(style.into()))
    }

    pub fn style_f<F>(self, f: F) -> Self
    where
        F: Fn(&str, &Context) -> String + Send + Sync + 'static,
    {
        self.modify(Modifier::StyleF(Arc::new(f)))
    }

    pub fn usage(self, usage: impl Into<String>) -> Self {
        self.modify(Modifier::Usage(usage.into()))
    }

    pub fn nospace(self, chars: &[char]) -> Self {
        self.modify(Modifier::NoSpace(chars.to_vec()))
    }

    pub fn tag(self, tag: impl Into<String>) -> Self {
        self.modify(Modifier::Tag(tag.into()))
    }

    fn modify(self, modifier: Modifier) -> Self {
        Action::Modify {
            inner: Box::new(self),
            modifier,
        }
    }

    /// Innermost action below metadata modifiers
    pub fn base(&self) -> &Action {
        match self {
            Action::Modify { inner, .. } => inner.base(),
            other => other,
        }
    }

    /// Candidates known without evaluation
    ///
    /// Looks through metadata modifiers; every other variant needs a context
    /// and returns `None`.
    pub fn static_values(&self) -> Option<&[Candidate]> {
        match self.base() {
            Action::Values(candidates) => Some(candidates),
            _ => None,
        }
    }

    /// Usage text attached without evaluation, if any
    pub fn static_usage(&self) -> Option<&str> {
        match self {
            Action::Modify {
                modifier: Modifier::Usage(usage),
                ..
            } => Some(usage),
            Action::Modify { inner, .. } => inner.static_usage(),
            _ => None,
        }
    }

    /// Name of the outermost variant
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Values(_) => "values",
            Action::Message(_) => "message",
            Action::Files { .. } => "files",
            Action::Directories => "directories",
            Action::Callback(_) => "callback",
            Action::Exec { .. } => "exec",
            Action::MultiPartsFn { .. } => "multi_parts_fn",
            Action::Command(_) => "command",
            Action::Batch(_) => "batch",
            Action::Cache { .. } => "cache",
            Action::Filter { .. } => "filter",
            Action::Retain { .. } => "retain",
            Action::Shift { .. } => "shift",
            Action::MultiParts { .. } => "multi_parts",
            Action::Prefix { .. } => "prefix",
            Action::Suffix { .. } => "suffix",
            Action::Split { .. } => "split",
            Action::Timeout { .. } => "timeout",
            Action::Chdir { .. } => "chdir",
            Action::UniqueList { .. } => "unique_list",
            Action::Modify { .. } => "modify",
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Values(candidates) => f.debug_tuple("Values").field(candidates).finish(),
            Action::Message(message) => f.debug_tuple("Message").field(message).finish(),
            Action::Batch(actions) => f.debug_tuple("Batch").field(actions).finish(),
            Action::Files { suffixes } => f.debug_struct("Files").field("suffixes", suffixes).finish(),
            Action::Exec { program, args, .. } => f
                .debug_struct("Exec")
                .field("program", program)
                .field("args", args)
                .finish(),
            Action::Command(root) => f.debug_tuple("Command").field(&root.name).finish(),
            Action::Cache { inner, ttl, site, .. } => f
                .debug_struct("Cache")
                .field("inner", inner)
                .field("ttl", ttl)
                .field("site", site)
                .finish(),
            other => write!(f, "{}", other.kind()),
        }
    }
}

impl Default for Action {
    fn default() -> Self {
        Action::Values(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_values_look_through_modifiers() {
        let action = Action::values(["a", "b"]).usage("letters").tag("letters");
        let values = action.static_values().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(action.static_usage(), Some("letters"));
    }

    #[test]
    fn test_static_values_need_evaluation() {
        assert!(Action::callback(|_| Action::default()).static_values().is_none());
        assert!(Action::values(["a"]).timeout(Duration::from_secs(1)).static_values().is_none());
    }

    #[test]
    fn test_cache_records_call_site() {
        let action = Action::values(["a"]).cache(Duration::from_secs(1));
        match action {
            Action::Cache { site, .. } => assert!(site.contains("action")),
            other => panic!("Expected Cache, got {other:?}"),
        }
    }

    #[test]
    fn test_constructors() {
        let action = Action::styled_values_described([("a", "first", "red")]);
        let values = action.static_values().unwrap();
        assert_eq!(values[0].description, "first");
        assert_eq!(values[0].style, "red");
        assert_eq!(Action::directories().kind(), "directories");
        assert_eq!(Action::directories().usage("dirs").base().kind(), "directories");
    }
}
