//! PowerShell adapter
//!
//! The reply is a JSON array of completion results.

use serde::Serialize;

use super::function_name;
use crate::candidate::{Candidate, Meta};
use crate::traverse::Command;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CompletionResult {
    completion_text: String,
    list_item_text: String,
    tool_tip: String,
}

pub(super) fn snippet(root: &Command) -> String {
    let name = &root.name;
    let func = function_name(name);
    format!(
        r#"using namespace System.Management.Automation
using namespace System.Management.Automation.Language

Function _{func}_completer {{
    param($wordToComplete, $commandAst, $cursorPosition)
    $elements = @($commandAst.CommandElements | Where-Object {{ $_.Extent.StartOffset -lt $cursorPosition }} | ForEach-Object {{ $_.ToString() }})
    if ($wordToComplete -eq "") {{
        $elements += '""'
    }}
    $completions = @(& {name} _completion powershell _ @elements | ConvertFrom-Json)
    $completions | ForEach-Object {{
        [CompletionResult]::new($_.CompletionText, $_.ListItemText, [CompletionResultType]::ParameterValue, $_.ToolTip)
    }}
}}

Register-ArgumentCompleter -Native -CommandName '{name}' -ScriptBlock (Get-Item "Function:_{func}_completer").ScriptBlock
"#
    )
}

/// Quote values PowerShell would otherwise split or interpret
fn quote(value: &str) -> String {
    let special = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || "'\"`$(){}@#;,|&<>".contains(c));
    if special {
        format!("'{}'", value.replace('\'', "''"))
    } else {
        value.to_string()
    }
}

pub(super) fn render(_word: &str, meta: &Meta, candidates: &[Candidate]) -> String {
    let results: Vec<CompletionResult> = candidates
        .iter()
        .map(|c| {
            let mut completion_text = quote(&c.value);
            if !meta.nospace.matches(&c.value) {
                completion_text.push(' ');
            }
            CompletionResult {
                completion_text,
                list_item_text: c.display.clone(),
                tool_tip: if c.description.is_empty() {
                    " ".to_string()
                } else {
                    c.description.clone()
                },
            }
        })
        .collect();
    serde_json::to_string(&results).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::tests::sample;

    #[test]
    fn test_snippet() {
        let snippet = snippet(&sample());
        assert!(snippet.contains("Register-ArgumentCompleter -Native -CommandName 'example'"));
        assert!(snippet.contains("& example _completion powershell _ @elements"));
    }

    #[test]
    fn test_render() {
        let mut meta = Meta::default();
        meta.nospace.add(&['/']);
        let reply = render(
            "",
            &meta,
            &[
                Candidate::new("dir/"),
                Candidate::new("it's here").with_description("spaced"),
            ],
        );
        let json: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(json[0]["CompletionText"], "dir/");
        assert_eq!(json[0]["ToolTip"], " ");
        assert_eq!(json[1]["CompletionText"], "'it''s here' ");
        assert_eq!(json[1]["ListItemText"], "it's here");
        assert_eq!(json[1]["ToolTip"], "spaced");
    }
}
