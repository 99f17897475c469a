//! Zsh adapter
//!
//! Flags are declared through `_arguments` per command state; positionals
//! and dynamic values go through `_<name>_callback`. The reply holds the
//! no-space characters on its first line, an optional message or usage on
//! the second and one `value<TAB>display<TAB>description` line per
//! candidate.

use std::fmt::Write;

use super::{CommandState, command_states, function_name};
use crate::action::Action;
use crate::candidate::{Candidate, Meta};
use crate::lexer;
use crate::traverse::{Command, Flag};

pub(super) fn snippet(root: &Command) -> String {
    let name = &root.name;
    let func = function_name(name);

    let mut cases = String::new();
    for state in command_states(root) {
        let _ = write!(cases, "{}", state_case(&state, &func));
    }

    format!(
        r#"#compdef {name}
function _{func}_compline {{
  if [[ "$LBUFFER" == *" " ]]; then
    echo "${{LBUFFER}}''"
  else
    echo "$LBUFFER"
  fi
}}

function _{func}_callback {{
  local -a lines values displays bare bare_displays
  lines=("${{(@f)$(_{func}_compline | xargs {name} _completion zsh _)}}")
  local nospace="${{lines[1]}}" header="${{lines[2]}}" line
  for line in "${{(@)lines[3,-1]}}"; do
    local -a fields=("${{(@ps:\t:)line}}")
    local shown="${{fields[2]}}"
    [[ -n "${{fields[3]}}" ]] && shown="${{fields[2]}} -- ${{fields[3]}}"
    if [[ "$nospace" == *"*"* || ( -n "$nospace" && "$nospace" == *"${{fields[1][-1]}}"* ) ]]; then
      bare+=("${{fields[1]}}")
      bare_displays+=("$shown")
    else
      values+=("${{fields[1]}}")
      displays+=("$shown")
    fi
  done
  [[ -n "$header" ]] && _message -r "$header"
  compadd -Q -S '' -l -d bare_displays -a bare
  compadd -Q -l -d displays -a values
}}

function _{func}_completions {{
  local state
  state=$(_{func}_compline | xargs {name} _completion zsh state)

  case $state in
{cases}    *)
      _{func}_callback
      ;;
  esac
}}

compdef _{func}_completions {name}
"#
    )
}

fn state_case(state: &CommandState<'_>, func: &str) -> String {
    let mut specs: Vec<String> = state.flags.iter().map(|flag| flag_spec(flag, func)).collect();
    specs.push(format!("'*: :_{func}_callback'"));
    format!(
        "    '{}')\n      _arguments -s \\\n        {}\n      ;;\n",
        state.state,
        specs.join(" \\\n        ")
    )
}

/// `_arguments` specification of one flag
fn flag_spec(flag: &Flag, func: &str) -> String {
    let mut forms = Vec::new();
    if let Some(short) = flag.short {
        forms.push(format!("-{short}"));
    }
    if !flag.long.is_empty() {
        let suffix = match (flag.takes_value, flag.optional_value) {
            (true, true) => "=-",
            (true, false) => "=",
            _ => "",
        };
        forms.push(format!("--{}{suffix}", flag.long));
    }

    let exclusion = if flag.repeatable {
        "'*'".to_string()
    } else {
        let names: Vec<String> = flag.forms();
        format!("'({})'", names.join(" "))
    };
    let forms = match forms.as_slice() {
        [single] => single.clone(),
        _ => format!("{{{}}}", forms.join(",")),
    };

    let mut rest = format!("[{}]", spec_escape(&flag.description));
    if flag.takes_value {
        let colon = if flag.optional_value { "::" } else { ":" };
        let action = flag
            .action
            .as_ref()
            .map_or_else(|| format!("_{func}_callback"), |a| value_spec(a, func));
        let _ = write!(rest, "{colon} :{action}");
    }
    format!("{exclusion}{forms}{}", single_quote(&rest))
}

fn value_spec(action: &Action, func: &str) -> String {
    if let Some(values) = action.static_values() {
        let words: Vec<String> = values
            .iter()
            .map(|c| spec_escape(&lexer::escape(&c.value)))
            .collect();
        return format!("({})", words.join(" "));
    }
    match action.base() {
        Action::Directories => "_files -/".to_string(),
        Action::Files { suffixes } if suffixes.is_empty() => "_files".to_string(),
        _ => format!("_{func}_callback"),
    }
}

/// Escape the characters `_arguments` treats specially
fn spec_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '[' | ']' | ':') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.replace('\n', " ")
}

fn single_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

pub(super) fn render(_word: &str, meta: &Meta, candidates: &[Candidate]) -> String {
    let mut header: Vec<&str> = meta.messages.iter().map(String::as_str).collect();
    if header.is_empty() && !meta.usage.is_empty() {
        header.push(&meta.usage);
    }

    let mut lines = vec![meta.nospace.chars(), header.join("; ").replace('\n', " ")];
    lines.extend(candidates.iter().map(|c| {
        format!(
            "{}\t{}\t{}",
            lexer::escape(&c.value),
            c.display.replace(['\t', '\n'], " "),
            c.description.replace(['\t', '\n'], " ")
        )
    }));
    lines.join("\n")
}
