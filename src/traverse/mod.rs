//! Lenient traversal engine
//!
//! Walks a [`Command`] tree against the words typed before the cursor. The
//! walk never rejects incomplete input: a value flag at the end is left
//! pending, unknown tokens become positional arguments and stop descent.
//!
//! # Architecture
//!
//! - **tree**: `Command` / `Flag` records and their validation
//! - **import**: conversion of a `clap::Command` definition
//! - **complete**: resolution of the word under the cursor

mod complete;
mod import;
mod tree;

pub use complete::{Resolution, complete, resolve};
pub use tree::{Command, Flag, state_id};

use tracing::debug;

use crate::error::StructuralError;

/// Result of walking the typed words
#[derive(Debug, Clone)]
pub struct Traversal<'a> {
    /// Commands from the root to the resolved subcommand
    pub path: Vec<&'a Command>,
    /// Positional arguments of the resolved subcommand
    pub args: Vec<String>,
    /// Flags seen so far, in order
    pub used: Vec<&'a Flag>,
    /// Value flag still waiting for its value
    pub pending: Option<&'a Flag>,
    /// A `--` was seen, everything after it is positional
    pub dash: bool,
}

impl<'a> Traversal<'a> {
    fn new(root: &'a Command) -> Self {
        Self {
            path: vec![root],
            args: Vec::new(),
            used: Vec::new(),
            pending: None,
            dash: false,
        }
    }

    /// Resolved subcommand
    pub fn command(&self) -> &'a Command {
        self.path[self.path.len() - 1]
    }

    /// Flags in effect: the command's own and persistent flags of its ancestors
    pub fn active_flags(&self) -> Vec<&'a Flag> {
        let mut flags: Vec<&'a Flag> = self.command().flags.iter().collect();
        for ancestor in self.path[..self.path.len() - 1].iter().rev() {
            flags.extend(ancestor.flags.iter().filter(|f| f.persistent));
        }
        flags
    }

    fn find_long(&self, name: &str) -> Option<&'a Flag> {
        self.active_flags()
            .into_iter()
            .find(|f| !f.long.is_empty() && f.long == name)
    }

    fn find_short(&self, short: char) -> Option<&'a Flag> {
        self.active_flags()
            .into_iter()
            .find(|f| f.short == Some(short))
    }

    /// Whether the flag was already given
    pub fn is_used(&self, flag: &Flag) -> bool {
        self.used.iter().any(|f| std::ptr::eq(*f, flag))
    }

    /// State identifier of the resolved subcommand
    pub fn state_id(&self) -> String {
        state_id(self.path.iter().copied())
    }

    fn use_flag(&mut self, flag: &'a Flag) -> Result<(), StructuralError> {
        if flag.takes_value && flag.action.is_none() {
            return Err(StructuralError::MissingAction {
                command: self.command().name.clone(),
                flag: flag.name(),
            });
        }
        self.used.push(flag);
        Ok(())
    }
}

/// Walk `args` (the words before the cursor) from `root`
///
/// # Errors
/// Only a value flag without a bound action is an error.
pub fn traverse_lenient<'a>(
    root: &'a Command,
    args: &[String],
) -> Result<Traversal<'a>, StructuralError> {
    let mut traversal = Traversal::new(root);

    for token in args {
        if let Some(flag) = traversal.pending.take() {
            debug!(flag = %flag.name(), value = %token, "flag value");
            continue;
        }

        if traversal.dash {
            traversal.args.push(token.clone());
            continue;
        }

        if token == "--" {
            traversal.dash = true;
            continue;
        }

        if let Some(long) = token.strip_prefix("--") {
            let (name, inline) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (long, None),
            };
            match traversal.find_long(name) {
                Some(flag) => {
                    traversal.use_flag(flag)?;
                    if flag.takes_value && !flag.optional_value && inline.is_none() {
                        traversal.pending = Some(flag);
                    }
                }
                None => {
                    debug!(token = %token, "unknown long flag kept as argument");
                    traversal.args.push(token.clone());
                }
            }
            continue;
        }

        if token.len() > 1 && token.starts_with('-') {
            if !resolve_cluster(&mut traversal, token)? {
                debug!(token = %token, "unknown short flag kept as argument");
                traversal.args.push(token.clone());
            }
            continue;
        }

        if traversal.args.is_empty() {
            if let Some(child) = traversal.command().find_child(token) {
                debug!(command = %child.name, "descending");
                traversal.path.push(child);
                continue;
            }
        }
        traversal.args.push(token.clone());
    }

    Ok(traversal)
}

/// Resolve a short flag cluster letter by letter
///
/// Returns false, consuming nothing, when a letter is unknown.
fn resolve_cluster<'a>(
    traversal: &mut Traversal<'a>,
    token: &str,
) -> Result<bool, StructuralError> {
    let letters = &token[1..];
    let mut resolved = Vec::new();
    for (idx, letter) in letters.char_indices() {
        let Some(flag) = traversal.find_short(letter) else {
            return Ok(false);
        };
        resolved.push(flag);
        if flag.takes_value {
            let inline = &letters[idx + letter.len_utf8()..];
            for flag in resolved {
                traversal.use_flag(flag)?;
            }
            if inline.is_empty() && !flag.optional_value {
                traversal.pending = Some(flag);
            }
            return Ok(true);
        }
    }

    for flag in resolved {
        traversal.use_flag(flag)?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    fn tree() -> Command {
        Command::new("test")
            .flag(Flag::new("optarg", "optarg flag").short('o').optional_value(Action::values(["x"])))
            .flag(Flag::new("string", "string flag").short('s').value(Action::values(["s"])))
            .flag(Flag::new("bool", "bool flag").short('b'))
            .flag(Flag::new("int", "int flag").short('i').value(Action::default()))
            .flag(Flag::new("intslice", "intslice flag").repeatable().value(Action::default()))
            .flag(Flag::new("persistent", "persistent flag").short('p').persistent())
            .subcommand(
                Command::new("sub")
                    .flag(Flag::new("substring", "string flag").short('s').value(Action::default()))
                    .flag(Flag::new("subbool", "bool flag").short('b')),
            )
    }

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn walk<'a>(root: &'a Command, words: &[&str]) -> Traversal<'a> {
        traverse_lenient(root, &args(words)).unwrap()
    }

    #[test]
    fn test_lenient_inputs() {
        let root = tree();
        let cases: &[&[&str]] = &[
            &[],
            &[""],
            &["--stri"],
            &["--string"],
            &["--string", ""],
            &["-s"],
            &["-s", ""],
            &["-bs"],
            &["-bs", ""],
            &["--int", ""],
            &["--intslice", ""],
            &["--intslice", "1,"],
        ];
        for words in cases {
            assert!(traverse_lenient(&root, &args(words)).is_ok(), "{words:?}");
        }
    }

    #[test]
    fn test_short_cluster_leaves_value_pending() {
        let root = tree();
        let traversal = walk(&root, &["-bs"]);
        let used: Vec<String> = traversal.used.iter().map(|f| f.name()).collect();
        assert_eq!(used, vec!["--bool", "--string"]);
        assert_eq!(traversal.pending.map(|f| f.name()), Some("--string".to_string()));
        assert!(traversal.args.is_empty());
    }

    #[test]
    fn test_incomplete_long_flag_stays_at_root() {
        let root = tree();
        let traversal = walk(&root, &["--stri"]);
        assert_eq!(traversal.command().name, "test");
        assert_eq!(traversal.args, vec!["--stri"]);
        assert!(traversal.pending.is_none());
    }

    #[test]
    fn test_values_are_consumed() {
        let root = tree();
        let traversal = walk(&root, &["--string", "sub", "pos"]);
        assert_eq!(traversal.command().name, "test");
        assert_eq!(traversal.args, vec!["pos"]);

        let traversal = walk(&root, &["--string=sub", "sub"]);
        assert_eq!(traversal.command().name, "sub");

        let traversal = walk(&root, &["-svalue", "sub"]);
        assert_eq!(traversal.command().name, "sub");
        assert!(traversal.pending.is_none());
    }

    #[test]
    fn test_optional_value_is_not_pending() {
        let root = tree();
        let traversal = walk(&root, &["--optarg", "sub"]);
        assert!(traversal.pending.is_none());
        assert_eq!(traversal.command().name, "sub");
    }

    #[test]
    fn test_descent_and_persistent_flags() {
        let root = tree();
        let traversal = walk(&root, &["sub", "-p", "-s"]);
        assert_eq!(traversal.state_id(), "_test__sub");
        assert_eq!(traversal.pending.map(|f| f.long.as_str()), Some("substring"));
        assert!(traversal.used.iter().any(|f| f.long == "persistent"));

        let names: Vec<&str> = traversal.active_flags().iter().map(|f| f.long.as_str()).collect();
        assert_eq!(names, vec!["substring", "subbool", "persistent"]);
    }

    #[test]
    fn test_positional_stops_descent() {
        let root = tree();
        let traversal = walk(&root, &["pos", "sub"]);
        assert_eq!(traversal.command().name, "test");
        assert_eq!(traversal.args, vec!["pos", "sub"]);
    }

    #[test]
    fn test_dash() {
        let root = tree();
        let traversal = walk(&root, &["--", "-b", "sub"]);
        assert!(traversal.dash);
        assert_eq!(traversal.args, vec!["-b", "sub"]);
        assert!(traversal.used.is_empty());
    }

    #[test]
    fn test_unknown_short_cluster_is_positional() {
        let root = tree();
        let traversal = walk(&root, &["-bz"]);
        assert!(traversal.used.is_empty());
        assert_eq!(traversal.args, vec!["-bz"]);
    }

    #[test]
    fn test_value_flag_without_action_is_an_error() {
        let mut flag = Flag::new("file", "");
        flag.takes_value = true;
        let root = Command::new("root").flag(flag);
        assert!(matches!(
            traverse_lenient(&root, &args(&["--file"])),
            Err(StructuralError::MissingAction { .. })
        ));
    }
}
