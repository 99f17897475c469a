//! Bash adapter
//!
//! The snippet asks the binary for the state of the command line, then
//! completes flag names and static flag values from per-command tables.
//! Everything else goes through `_<name>_callback`, which reads the reply:
//! the first line holds the no-space characters, every further line is one
//! `COMPREPLY` entry.

use std::fmt::Write;

use super::{CommandState, command_states, function_name};
use crate::action::Action;
use crate::candidate::{Candidate, Meta};
use crate::lexer;
use crate::traverse::Command;

pub(super) fn snippet(root: &Command) -> String {
    let name = &root.name;
    let func = function_name(name);

    let mut cases = String::new();
    for state in command_states(root) {
        let _ = write!(cases, "{}", state_case(&state, &func));
    }

    format!(
        r#"#!/bin/bash
_{func}_callback() {{
  local compline="${{COMP_LINE:0:${{COMP_POINT}}}}"
  local -a lines
  mapfile -t lines < <(echo "$compline" | sed -e "s/ \$/ ''/" | xargs {name} _completion bash _)
  local nospace="${{lines[0]}}"
  COMPREPLY=("${{lines[@]:1}}")
  if [[ -n $nospace && ${{#COMPREPLY[@]}} -eq 1 ]]; then
    local last="${{COMPREPLY[0]: -1}}"
    if [[ $nospace == *"*"* || $nospace == *"$last"* ]]; then
      compopt -o nospace
    fi
  fi
}}

_{func}_completions() {{
  local compline="${{COMP_LINE:0:${{COMP_POINT}}}}"
  local cur="${{COMP_WORDS[COMP_CWORD]}}"
  local prev="${{COMP_WORDS[COMP_CWORD-1]}}"
  local state
  state=$(echo "$compline" | sed -e "s/ \$/ ''/" | xargs {name} _completion bash state)
  local IFS=$'\n'

  case $state in
{cases}  esac

  [[ ${{#COMPREPLY[@]}} -eq 1 && $COMPREPLY == */ ]] && compopt -o nospace
}}

complete -F _{func}_completions {name}
"#
    )
}

fn state_case(state: &CommandState<'_>, func: &str) -> String {
    let forms: Vec<String> = state.flags.iter().flat_map(|f| f.forms()).collect();

    let mut value_cases = String::new();
    for flag in state.flags.iter().filter(|f| f.takes_value && !f.optional_value) {
        let Some(action) = &flag.action else {
            continue;
        };
        let _ = write!(
            value_cases,
            "          {})\n            {}\n            ;;\n\n",
            flag.forms().join(" | "),
            value_reply(action, func)
        );
    }

    format!(
        r#"    '{id}' )
      if [[ $cur == -* ]]; then
        COMPREPLY=($(compgen -W $'{forms}' -- "$cur"))
      else
        case $prev in
{value_cases}          *)
            _{func}_callback
            ;;
        esac
      fi
      ;;

"#,
        id = state.state,
        forms = ansi_c_quote(&forms.join("\n")),
    )
}

/// Shell code completing a flag value, static where the action allows it
fn value_reply(action: &Action, func: &str) -> String {
    if let Some(values) = action.static_values() {
        let words: Vec<&str> = values.iter().map(|c| c.value.as_str()).collect();
        return format!(
            r#"COMPREPLY=($(compgen -W $'{}' -- "$cur"))"#,
            ansi_c_quote(&words.join("\n"))
        );
    }
    match action.base() {
        Action::Directories => r#"COMPREPLY=($(compgen -S / -d -- "$cur"))"#.to_string(),
        Action::Files { suffixes } if suffixes.is_empty() => {
            r#"COMPREPLY=($(compgen -f -- "$cur"))"#.to_string()
        }
        _ => format!("_{func}_callback"),
    }
}

/// Escape text for use inside `$'...'`
fn ansi_c_quote(text: &str) -> String {
    text.replace('\\', r"\\")
        .replace('\'', r"\'")
        .replace('\n', r"\n")
}

pub(super) fn render(_word: &str, meta: &Meta, candidates: &[Candidate]) -> String {
    let mut lines = vec![meta.nospace.chars()];
    match candidates {
        [single] => lines.push(lexer::escape(&single.value)),
        _ => lines.extend(candidates.iter().map(|c| {
            if c.description.is_empty() {
                c.display.clone()
            } else {
                format!("{} ({})", c.display, c.description.replace('\n', " "))
            }
        })),
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::tests::sample;

    #[test]
    fn test_snippet_tables() {
        let snippet = snippet(&sample());
        assert!(snippet.contains("complete -F _example_completions example"));
        assert!(snippet.contains("    '_example' )"));
        assert!(snippet.contains("    '_example__sub_cmd' )"));
        assert!(snippet.contains(r"$'--verbose\n-v\n--format\n-f\n--file\n--user\n-u'"));
        assert!(snippet.contains("--format | -f)"));
        assert!(snippet.contains(r"$'--dir\n--verbose\n-v'"));
        assert!(snippet.contains(r#"COMPREPLY=($(compgen -W $'json\ntext' -- "$cur"))"#));
        assert!(snippet.contains(r#"COMPREPLY=($(compgen -S / -d -- "$cur"))"#));
    }

    #[test]
    fn test_snippet_dynamic_values_use_callback() {
        let snippet = snippet(&sample());
        let user_case = snippet
            .split("--user | -u)")
            .nth(1)
            .unwrap();
        assert!(user_case.trim_start().starts_with("_example_callback"));
    }

    #[test]
    fn test_render_single_is_escaped() {
        let reply = render("", &Meta::default(), &[Candidate::new("a b")]);
        assert_eq!(reply, "\na\\ b");
    }

    #[test]
    fn test_render_multiple_shows_descriptions() {
        let mut meta = Meta::default();
        meta.nospace.add(&['/']);
        let reply = render(
            "",
            &meta,
            &[Candidate::new("one").with_description("first"), Candidate::new("two")],
        );
        assert_eq!(reply, "/\none (first)\ntwo");
    }
}
