//! Oil adapter
//!
//! Oil understands bash's `complete -F`, the hook only forwards the line to
//! the callback and reads back escaped values.

use super::function_name;
use crate::candidate::{Candidate, Meta};
use crate::lexer;
use crate::traverse::Command;

pub(super) fn snippet(root: &Command) -> String {
    let name = &root.name;
    let func = function_name(name);
    format!(
        r#"_{func}_completion() {{
  local compline="${{COMP_LINE:0:${{COMP_POINT}}}}"
  local IFS=$'\n'
  COMPREPLY=($(echo "$compline" | sed -e "s/ \$/ ''/" | xargs {name} _completion oil _))
  [[ ${{#COMPREPLY[@]}} -eq 1 && $COMPREPLY == */ ]] && compopt -o nospace
}}

complete -F _{func}_completion {name}
"#
    )
}

pub(super) fn render(_word: &str, _meta: &Meta, candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| lexer::escape(&c.value))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::tests::sample;

    #[test]
    fn test_snippet() {
        let snippet = snippet(&sample());
        assert!(snippet.contains("complete -F _example_completion example"));
    }

    #[test]
    fn test_render() {
        let reply = render("", &Meta::default(), &[Candidate::new("a b"), Candidate::new("c")]);
        assert_eq!(reply, "a\\ b\nc");
    }
}
