//! Fish adapter
//!
//! Every flag becomes a `complete` entry guarded by `_<name>_state`, so it is
//! only offered in the command state declaring or inheriting it. Remaining
//! words are completed from the callback, which prints one
//! `value<TAB>description` line per candidate.

use std::fmt::Write;

use super::{CommandState, command_states, function_name};
use crate::action::Action;
use crate::candidate::{Candidate, Meta};
use crate::traverse::{Command, Flag};

pub(super) fn snippet(root: &Command) -> String {
    let name = &root.name;
    let func = function_name(name);

    let mut entries = String::new();
    for state in command_states(root) {
        let _ = write!(entries, "{}", state_entries(&state, name, &func));
    }

    format!(
        r#"function _{func}_compline
  set -l line (commandline -cp)
  if string match -q -r ' $' -- "$line"
    set line "$line''"
  end
  echo "$line"
end

function _{func}_state
  set -l state (_{func}_compline | xargs {name} _completion fish state)
  test "$state" = "$argv[1]"
end

function _{func}_callback
  _{func}_compline | xargs {name} _completion fish _
end

complete -e -c {name}
{entries}"#
    )
}

fn state_entries(state: &CommandState<'_>, name: &str, func: &str) -> String {
    let condition = format!("-n '_{func}_state {}'", state.state);
    let mut entries = String::new();
    for flag in &state.flags {
        let _ = writeln!(entries, "complete -c {name} -f {condition}{}", flag_entry(flag, func));
    }
    let _ = writeln!(
        entries,
        "complete -c {name} -f {condition} -a '(_{func}_callback)'"
    );
    entries
}

fn flag_entry(flag: &Flag, func: &str) -> String {
    let mut entry = String::new();
    if !flag.long.is_empty() {
        let _ = write!(entry, " -l {}", flag.long);
    }
    if let Some(short) = flag.short {
        let _ = write!(entry, " -s {short}");
    }
    if !flag.description.is_empty() {
        let _ = write!(entry, " -d {}", single_quote(&flag.description));
    }
    if flag.takes_value {
        if !flag.optional_value {
            entry.push_str(" -r");
        }
        let values = match &flag.action {
            Some(action) => value_entry(action, func),
            None => format!("(_{func}_callback)"),
        };
        let _ = write!(entry, " -a {}", single_quote(&values));
    }
    entry
}

fn value_entry(action: &Action, func: &str) -> String {
    if let Some(values) = action.static_values() {
        let lines: Vec<String> = values
            .iter()
            .map(|c| {
                if c.description.is_empty() {
                    double_quote(&c.value)
                } else {
                    double_quote(&format!("{}\\t{}", c.value, c.description))
                }
            })
            .collect();
        return format!("(printf '%b\\n' {})", lines.join(" "));
    }
    match action.base() {
        Action::Directories => "(__fish_complete_directories)".to_string(),
        Action::Files { suffixes } if suffixes.is_empty() => "(__fish_complete_path)".to_string(),
        _ => format!("(_{func}_callback)"),
    }
}

fn single_quote(text: &str) -> String {
    format!(
        "'{}'",
        text.replace('\\', r"\\").replace('\'', r"\'").replace('\n', " ")
    )
}

fn double_quote(text: &str) -> String {
    let mut quoted = String::from("\"");
    for ch in text.chars() {
        if matches!(ch, '"' | '$') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

pub(super) fn render(_word: &str, _meta: &Meta, candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| {
            let description = c.description.replace(['\t', '\n'], " ");
            if description.is_empty() {
                c.value.clone()
            } else {
                format!("{}\t{description}", c.value)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::tests::sample;

    #[test]
    fn test_snippet_entries() {
        let snippet = snippet(&sample());
        assert!(snippet.contains("complete -e -c example"));
        assert!(snippet.contains(
            "complete -c example -f -n '_example_state _example' -l verbose -s v -d 'verbose output'\n"
        ));
        assert!(snippet.contains(
            r#"-l format -s f -d 'output format' -r -a '(printf \'%b\\n\' "json\\tmachine readable" "text\\tplain")'"#
        ));
        assert!(snippet.contains(
            "-n '_example_state _example__sub_cmd' -l dir -d 'target directory' -r -a '(__fish_complete_directories)'"
        ));
        assert!(snippet.contains("-n '_example_state _example__sub_cmd' -l verbose -s v"));
        assert!(snippet.contains(
            "complete -c example -f -n '_example_state _example__sub_cmd' -a '(_example_callback)'"
        ));
    }

    #[test]
    fn test_render() {
        let reply = render(
            "",
            &Meta::default(),
            &[
                Candidate::new("one").with_description("first\nline"),
                Candidate::new("two words"),
            ],
        );
        assert_eq!(reply, "one\tfirst line\ntwo words");
    }
}
