//! Elvish adapter
//!
//! Elvish shows messages and usage through `edit:notify`, so they travel in
//! the reply instead of being integrated as candidates.

use serde::Serialize;

use crate::candidate::{Candidate, Meta};
use crate::style;
use crate::traverse::Command;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Reply<'a> {
    usage: &'a str,
    messages: Vec<&'a str>,
    description_style: String,
    candidates: Vec<ElvishCandidate<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ElvishCandidate<'a> {
    value: &'a str,
    display: &'a str,
    description: &'a str,
    code_suffix: &'static str,
    style: &'a str,
}

pub(super) fn snippet(root: &Command) -> String {
    let name = &root.name;
    format!(
        r#"set edit:completion:arg-completer[{name}] = {{|@arg|
    {name} _completion elvish _ (all $arg) | from-json | each {{|completion|
        put $completion[Messages] | all (one) | each {{|m|
            edit:notify (styled 'error: ' red)$m
        }}
        if (not-eq $completion[Usage] '') {{
            edit:notify (styled 'usage: ' $completion[DescriptionStyle])$completion[Usage]
        }}
        put $completion[Candidates] | all (one) | peach {{|c|
            if (eq $c[Description] '') {{
                edit:complex-candidate $c[Value] &display=(styled $c[Display] $c[Style]) &code-suffix=$c[CodeSuffix]
            }} else {{
                edit:complex-candidate $c[Value] &display=(styled $c[Display] $c[Style])(styled ' ('$c[Description]')' $completion[DescriptionStyle]) &code-suffix=$c[CodeSuffix]
            }}
        }}
    }}
}}
"#
    )
}

pub(super) fn render(_word: &str, meta: &Meta, candidates: &[Candidate]) -> String {
    let reply = Reply {
        usage: &meta.usage,
        messages: meta.messages.iter().map(String::as_str).collect(),
        description_style: style::gray(),
        candidates: candidates
            .iter()
            .map(|c| ElvishCandidate {
                value: &c.value,
                display: &c.display,
                description: &c.description,
                code_suffix: if meta.nospace.matches(&c.value) { "" } else { " " },
                style: &c.style,
            })
            .collect(),
    };
    serde_json::to_string(&reply).unwrap_or_else(|_| "{}".to_string())
}
