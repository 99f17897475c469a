//! Ion adapter

use super::function_name;
use crate::candidate::{Candidate, Meta};
use crate::traverse::Command;

pub(super) fn snippet(root: &Command) -> String {
    let name = &root.name;
    let func = function_name(name);
    format!(
        r#"fn _{func}_completer args:[str]
  let line = @join(args ' ')
  echo "$line" | xargs {name} _completion ion _
end
"#
    )
}

/// One value per line, with a trailing space where the shell should add one
pub(super) fn render(_word: &str, meta: &Meta, candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| {
            if meta.nospace.matches(&c.value) {
                c.value.clone()
            } else {
                format!("{} ", c.value)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let mut meta = Meta::default();
        meta.nospace.add(&['/']);
        let reply = render("", &meta, &[Candidate::new("dir/"), Candidate::new("file")]);
        assert_eq!(reply, "dir/\nfile ");
    }
}
