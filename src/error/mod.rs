//! Error handling for compline.
//!
//! The taxonomy is deliberately small:
//! - structural errors in the declared command tree (fatal, at registration time)
//! - unknown shell names at the snippet/render entry points
//! - evaluation failures, which the action engine turns into messages and
//!   never propagates to the shell

pub mod kinds;

pub use kinds::{
    CompletionError, ConfigError, EvaluationError, Result, StructuralError,
};
