//! Tcsh adapter, also used for `csh`
//!
//! Tcsh has neither descriptions nor no-space control: the reply is a list
//! of escaped values, one per line.

use crate::candidate::{Candidate, Meta};
use crate::lexer;
use crate::traverse::Command;

pub(super) fn snippet(root: &Command) -> String {
    let name = &root.name;
    format!(
        "complete \"{name}\" 'p@*@`echo \"$COMMAND_LINE'\"''\"'\" | xargs {name} _completion tcsh _`@@';\n"
    )
}

pub(super) fn render(_word: &str, _meta: &Meta, candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("{}\n", lexer::escape(&c.value)))
        .collect()
}
