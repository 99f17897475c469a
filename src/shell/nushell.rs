//! Nushell adapter
//!
//! Registered as an external completer closure. The reply is a JSON array of
//! records.

use serde::Serialize;

use super::function_name;
use crate::candidate::{Candidate, Meta};
use crate::traverse::Command;

#[derive(Debug, Serialize)]
struct Record<'a> {
    value: String,
    display: &'a str,
    description: &'a str,
    style: &'a str,
}

pub(super) fn snippet(root: &Command) -> String {
    let name = &root.name;
    let func = function_name(name);
    format!(
        r#"let {func}_completer = {{|spans|
    {name} _completion nushell _ ...$spans | from json
}}

let previous_completer = $env.config.completions.external.completer
$env.config.completions.external.enable = true
$env.config.completions.external.completer = {{|spans|
    if ($spans.0 == '{name}') {{
        do ${func}_completer $spans
    }} else if ($previous_completer != null) {{
        do $previous_completer $spans
    }}
}}
"#
    )
}

fn quote(value: &str) -> String {
    let special = value
        .chars()
        .any(|c| c.is_whitespace() || "'\"`$()[]{}|;#".contains(c));
    if special {
        format!("`{}`", value.replace('`', "'"))
    } else {
        value.to_string()
    }
}

pub(super) fn render(_word: &str, meta: &Meta, candidates: &[Candidate]) -> String {
    let records: Vec<Record<'_>> = candidates
        .iter()
        .map(|c| {
            let mut value = quote(&c.value);
            if !meta.nospace.matches(&c.value) {
                value.push(' ');
            }
            Record {
                value,
                display: &c.display,
                description: &c.description,
                style: &c.style,
            }
        })
        .collect();
    serde_json::to_string(&records).unwrap_or_else(|_| "[]".to_string())
}
