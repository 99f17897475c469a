use std::{fmt, io};

/// Crate-wide `Result` type using [`CompletionError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, CompletionError>;

/// Top-level error type for compline operations.
///
/// Only structural and invocation problems ever leave the crate as hard
/// errors. Evaluation failures are folded into messages by the action engine.
#[derive(Debug)]
pub enum CompletionError {
    /// The declared command/flag tree is self-inconsistent.
    Structural(StructuralError),

    /// No adapter exists for the requested shell.
    UnknownShell { name: String, expected: Vec<String> },

    /// An action failed while producing candidates.
    Evaluation(EvaluationError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// JSON encoding or decoding errors.
    Json(serde_json::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Problems in the declared command tree, reported at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// A value-taking flag has no action bound to it.
    MissingAction { command: String, flag: String },

    /// Two flags of one command share a form.
    DuplicateFlag { command: String, form: String },

    /// Two children of one command share a name or alias.
    DuplicateCommand { parent: String, name: String },

    /// A binding refers to a subcommand path that does not exist.
    UnknownPath(String),

    /// A binding refers to a flag that does not exist.
    UnknownFlag { command: String, flag: String },
}

/// Failures while evaluating an action.
#[derive(Debug)]
pub enum EvaluationError {
    /// Deadline exceeded.
    Timeout,

    /// External command could not be run or exited unsuccessfully.
    Exec { program: String, reason: String },

    /// Cache entry could not be read or written.
    Cache(String),

    /// Directory change target does not exist.
    NoSuchDirectory(String),

    /// A blocking callback panicked or was cancelled.
    Callback(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Unreadable { path: String, reason: String },

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::Structural(e) => write!(f, "Invalid command tree: {e}"),
            CompletionError::UnknownShell { name, expected } => write!(
                f,
                "expected one of '{}' [was: {name}]",
                expected.join("', '")
            ),
            CompletionError::Evaluation(e) => write!(f, "{e}"),
            CompletionError::Config(e) => write!(f, "Configuration error: {e}"),
            CompletionError::Io(e) => write!(f, "I/O error: {e}"),
            CompletionError::Json(e) => write!(f, "JSON error: {e}"),
            CompletionError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralError::MissingAction { command, flag } => {
                write!(f, "flag '{flag}' of '{command}' takes a value but has no action")
            }
            StructuralError::DuplicateFlag { command, form } => {
                write!(f, "flag form '{form}' declared twice on '{command}'")
            }
            StructuralError::DuplicateCommand { parent, name } => {
                write!(f, "subcommand '{name}' declared twice on '{parent}'")
            }
            StructuralError::UnknownPath(path) => write!(f, "unknown subcommand path: {path}"),
            StructuralError::UnknownFlag { command, flag } => {
                write!(f, "unknown flag '{flag}' on '{command}'")
            }
        }
    }
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::Timeout => write!(f, "timeout exceeded"),
            EvaluationError::Exec { program, reason } => write!(f, "{program}: {reason}"),
            EvaluationError::Cache(msg) => write!(f, "cache: {msg}"),
            EvaluationError::NoSuchDirectory(dir) => write!(f, "no such directory: {dir}"),
            EvaluationError::Callback(msg) => write!(f, "callback failed: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Unreadable { path, reason } => {
                write!(f, "Cannot read config file {path}: {reason}")
            }
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for CompletionError {}
impl std::error::Error for StructuralError {}
impl std::error::Error for EvaluationError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to CompletionError ========================= */

impl From<io::Error> for CompletionError {
    fn from(err: io::Error) -> Self {
        CompletionError::Io(err)
    }
}

impl From<serde_json::Error> for CompletionError {
    fn from(err: serde_json::Error) -> Self {
        CompletionError::Json(err)
    }
}

impl From<StructuralError> for CompletionError {
    fn from(err: StructuralError) -> Self {
        CompletionError::Structural(err)
    }
}

impl From<EvaluationError> for CompletionError {
    fn from(err: EvaluationError) -> Self {
        CompletionError::Evaluation(err)
    }
}

impl From<ConfigError> for CompletionError {
    fn from(err: ConfigError) -> Self {
        CompletionError::Config(err)
    }
}

impl From<String> for CompletionError {
    fn from(msg: String) -> Self {
        CompletionError::Generic(msg)
    }
}

impl From<&str> for CompletionError {
    fn from(msg: &str) -> Self {
        CompletionError::Generic(msg.to_owned())
    }
}
