//! Xonsh adapter

use serde::Serialize;

use super::function_name;
use crate::candidate::{Candidate, Meta};
use crate::traverse::Command;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct RichCompletion<'a> {
    value: String,
    display: &'a str,
    description: &'a str,
    style: &'a str,
}

pub(super) fn snippet(root: &Command) -> String {
    let name = &root.name;
    let func = function_name(name);
    format!(
        r#"from xonsh.completers.completer import add_one_completer
from xonsh.completers.tools import contextual_command_completer, RichCompletion
import json
import subprocess


@contextual_command_completer
def _{func}_completer(context):
    """compline completer for {name}"""
    if not context.completing_command('{name}'):
        return None
    args = [arg.value for arg in context.args]
    output, _ = subprocess.Popen(
        ['{name}', '_completion', 'xonsh', '_', *args, context.prefix],
        stdout=subprocess.PIPE,
    ).communicate()
    try:
        result = {{
            RichCompletion(
                c["Value"],
                display=c["Display"],
                description=c["Description"],
                prefix_len=len(context.raw_prefix),
                append_closing_quote=False,
                style=c["Style"],
            )
            for c in json.loads(output)
        }}
    except ValueError:
        result = set()
    if not result:
        result = {{RichCompletion(context.prefix, display=context.prefix, prefix_len=len(context.raw_prefix), append_closing_quote=False)}}
    return result


add_one_completer('{name}', _{func}_completer, 'start')
"#
    )
}

fn quote(value: &str) -> String {
    if value.chars().any(|c| c.is_whitespace() || "'\"$`\\".contains(c)) {
        format!("'{}'", value.replace('\\', r"\\").replace('\'', r"\'"))
    } else {
        value.to_string()
    }
}

pub(super) fn render(_word: &str, meta: &Meta, candidates: &[Candidate]) -> String {
    let completions: Vec<RichCompletion<'_>> = candidates
        .iter()
        .map(|c| {
            let mut value = quote(&c.value);
            if !meta.nospace.matches(&c.value) {
                value.push(' ');
            }
            RichCompletion {
                value,
                display: &c.display,
                description: &c.description,
                style: &c.style,
            }
        })
        .collect();
    serde_json::to_string(&completions).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::tests::sample;

    #[test]
    fn test_snippet() {
        let snippet = snippet(&sample());
        assert!(snippet.contains("def _example_completer(context):"));
        assert!(snippet.contains("add_one_completer('example', _example_completer, 'start')"));
    }

    #[test]
    fn test_render() {
        let mut meta = Meta::default();
        meta.nospace.add(&['*']);
        let reply = render("", &meta, &[Candidate::new("it's")]);
        let json: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(json[0]["Value"], r"'it\'s'");
        assert_eq!(json[0]["Display"], "it's");
    }
}
