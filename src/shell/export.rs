//! Plain JSON export
//!
//! For integrations that render completions themselves. The snippet is the
//! command tree, the reply carries candidates together with their metadata.

use serde::Serialize;

use crate::candidate::{Candidate, Meta};
use crate::traverse::{Command, Flag};

#[derive(Debug, Serialize)]
struct ExportCommand<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "no_aliases")]
    aliases: &'a [String],
    description: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    hidden: bool,
    flags: Vec<ExportFlag<'a>>,
    commands: Vec<ExportCommand<'a>>,
}

#[derive(Debug, Serialize)]
struct ExportFlag<'a> {
    longhand: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    shorthand: Option<char>,
    usage: &'a str,
    takes_value: bool,
    optional_value: bool,
    repeatable: bool,
    persistent: bool,
    hidden: bool,
}

#[derive(Debug, Serialize)]
struct ExportReply<'a> {
    version: &'static str,
    messages: Vec<&'a str>,
    nospace: String,
    usage: &'a str,
    values: &'a [Candidate],
}

impl<'a> From<&'a Flag> for ExportFlag<'a> {
    fn from(flag: &'a Flag) -> Self {
        Self {
            longhand: &flag.long,
            shorthand: flag.short,
            usage: &flag.description,
            takes_value: flag.takes_value,
            optional_value: flag.optional_value,
            repeatable: flag.repeatable,
            persistent: flag.persistent,
            hidden: flag.hidden,
        }
    }
}

impl<'a> From<&'a Command> for ExportCommand<'a> {
    fn from(command: &'a Command) -> Self {
        Self {
            name: &command.name,
            aliases: &command.aliases,
            description: &command.description,
            hidden: command.hidden,
            flags: command.flags.iter().map(ExportFlag::from).collect(),
            commands: command.children.iter().map(ExportCommand::from).collect(),
        }
    }
}

fn no_aliases(aliases: &&[String]) -> bool {
    aliases.is_empty()
}

pub(super) fn snippet(root: &Command) -> String {
    serde_json::to_string_pretty(&ExportCommand::from(root)).unwrap_or_default()
}

pub(super) fn render(_word: &str, meta: &Meta, candidates: &[Candidate]) -> String {
    let reply = ExportReply {
        version: crate::VERSION,
        messages: meta.messages.iter().map(String::as_str).collect(),
        nospace: meta.nospace.chars(),
        usage: &meta.usage,
        values: candidates,
    };
    serde_json::to_string(&reply).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::tests::sample;

    #[test]
    fn test_snippet_is_the_tree() {
        let json: serde_json::Value = serde_json::from_str(&snippet(&sample())).unwrap();
        assert_eq!(json["name"], "example");
        assert_eq!(json["flags"][0]["longhand"], "verbose");
        assert_eq!(json["flags"][0]["shorthand"], "v");
        assert_eq!(json["flags"][0]["persistent"], true);
        assert_eq!(json["commands"][0]["name"], "sub-cmd");
        assert_eq!(json["commands"][0]["aliases"][0], "s");
        assert!(json.get("hidden").is_none());
    }

    #[test]
    fn test_render() {
        let mut meta = Meta::default();
        meta.messages.add("partial");
        meta.nospace.add(&['/']);
        meta.usage = "a path".to_string();

        let reply = render("", &meta, &[Candidate::new("dir/").with_tag("files")]);
        let json: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["messages"][0], "partial");
        assert_eq!(json["nospace"], "/");
        assert_eq!(json["usage"], "a path");
        assert_eq!(json["values"][0]["value"], "dir/");
        assert_eq!(json["values"][0]["tag"], "files");
    }
}
