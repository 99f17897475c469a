//! Demo command tree served by the `compline` binary
//!
//! Every producer and combinator of the action engine is bound to a flag or
//! positional here, so completion can be tried interactively after
//! `source <(compline snippet bash)`.

use std::time::Duration;

use crate::action::{Action, Context};
use crate::style;
use crate::traverse::{Command, Flag};

pub fn root() -> Command {
    Command::new("compline")
        .about("completion demo")
        .flag(Flag::new("verbose", "verbose output").short('v').repeatable().persistent())
        .flag(
            Flag::new("color", "colorize output").optional_value(Action::styled_values([
                ("always", style::GREEN),
                ("auto", style::BLUE),
                ("never", style::RED),
            ])),
        )
        .subcommand(action_command())
        .subcommand(modifier_command())
        .subcommand(multiparts_command())
        .subcommand(
            Command::new("internal")
                .about("not offered as subcommand")
                .hidden(),
        )
}

fn action_command() -> Command {
    Command::new("action")
        .about("producer examples")
        .flag(Flag::new("values", "static values").value(Action::values_described([
            ("start", "start the service"),
            ("stop", "stop the service"),
        ])))
        .flag(Flag::new("styled", "styled values").value(Action::styled_values_described([
            ("ok", "everything fine", style::GREEN),
            ("warn", "needs attention", style::of(&[style::YELLOW, style::BOLD]).as_str()),
            ("fail", "broken", style::RED),
        ])))
        .flag(Flag::new("files", "rust and toml files").short('f').value(Action::files([".rs", ".toml"])))
        .flag(Flag::new("directories", "directories").short('d').value(Action::directories()))
        .flag(Flag::new("message", "message example").value(Action::message("example message")))
        .flag(Flag::new("exec", "local git branches").value(Action::exec(
            "git",
            ["branch", "--format=%(refname:short)"],
            lines,
        )))
        .flag(Flag::new("callback", "values derived from the arguments").value(Action::callback(
            |ctx: &Context| {
                Action::values(ctx.args.iter().map(|arg| format!("arg:{arg}")))
                    .usage("echoes the positional arguments")
            },
        )))
        .flag(Flag::new("env", "environment variables").value(Action::callback(environment)))
        .positional(Action::values(["positional1", "p1", "positional1 with space"]))
        .positional_any(Action::files(Vec::<String>::new()))
}

fn modifier_command() -> Command {
    Command::new("modifier")
        .alias("mod")
        .about("combinator examples")
        .flag(Flag::new("batch", "batched actions").value(Action::batch(vec![
            Action::values_described([("a", "first batch")]),
            Action::values_described([("b", "second batch"), ("a", "duplicate")]),
            Action::callback(|_| Action::values(["c"])),
        ])))
        .flag(Flag::new("cache", "cached timestamp").value(
            Action::callback(|_| Action::values([chrono::Local::now().format("%H:%M:%S").to_string()]))
                .cache(Duration::from_secs(10)),
        ))
        .flag(Flag::new("cache-key", "timestamp cached per argument list").value(
            Action::callback(|ctx| {
                Action::values([format!("{}@{}", ctx.args.join(","), chrono::Local::now().format("%H:%M:%S"))])
            })
            .cache_with(Duration::from_secs(10), |ctx| ctx.args.join(" ")),
        ))
        .flag(Flag::new("filter", "only one and three").value(
            Action::values(["one", "two", "three"]).filter(["one", "three"]),
        ))
        .flag(Flag::new("retain", "everything but two").value(
            Action::values(["one", "two", "three"]).retain(["two"]),
        ))
        .flag(Flag::new("shift", "arguments without the first").value(
            Action::callback(|ctx| Action::values(ctx.args.clone())).shift(1),
        ))
        .flag(Flag::new("timeout", "slow action bounded to one second").value(
            Action::callback(|_| {
                std::thread::sleep(Duration::from_secs(3));
                Action::values(["too late"])
            })
            .timeout(Duration::from_secs(1)),
        ))
        .flag(Flag::new("usage", "custom usage").value(
            Action::values(["x", "y"]).usage("pick a letter"),
        ))
        .flag(Flag::new("multiparts", "path-like values").value(
            Action::values([
                "dir/subdir1/fileA",
                "dir/subdir1/fileB",
                "dir/subdir2/fileC",
                "dir/fileD",
            ])
            .multi_parts("/"),
        ))
        .flag(Flag::new("prefix", "file urls").value(
            Action::files(Vec::<String>::new()).prefix("file://"),
        ))
        .flag(Flag::new("suffix", "sizes").value(
            Action::values(["1", "10", "100"]).suffix("MB"),
        ))
        .flag(Flag::new("split", "quoted nested command line").value(
            Action::command(nested()).split(),
        ))
        .flag(Flag::new("chdir", "files in the temporary directory").value(
            Action::files(Vec::<String>::new()).chdir(std::env::temp_dir().display().to_string()),
        ))
        .flag(Flag::new("unique-list", "comma separated distinct values").value(
            Action::values(["alpha", "beta", "gamma"]).unique_list(","),
        ))
        .flag(Flag::new("style", "styled by value").value(
            Action::values(["info", "warning", "error"]).style_f(|value, _| {
                match value {
                    "warning" => style::YELLOW.to_string(),
                    "error" => style::RED.to_string(),
                    _ => style::DEFAULT.to_string(),
                }
            }),
        ))
        .flag(Flag::new("nospace", "no space after a trailing comma").value(
            Action::values(["a,", "b,", "c"]).nospace(&[',']),
        ))
}

fn multiparts_command() -> Command {
    Command::new("multiparts")
        .about("segment-wise completion")
        .flag(Flag::new("user", "user:group pair").short('u').value(
            Action::multi_parts_fn(":", |ctx| match ctx.parts.len() {
                0 => Action::values_described([("root", "superuser"), ("nobody", "unprivileged")])
                    .suffix(":")
                    .nospace(&[':']),
                1 => Action::values(["wheel", "users", "nogroup"]),
                _ => Action::default(),
            }),
        ))
        .flag(Flag::new("env", "KEY=VALUE pair").short('e').value(
            Action::multi_parts_fn("=", |ctx| match ctx.parts.len() {
                0 => Action::callback(environment).suffix("=").nospace(&['=']),
                _ => Action::message("any value"),
            }),
        ))
}

/// Command line completed inside the quoted `--split` value
fn nested() -> Command {
    Command::new("nested")
        .flag(Flag::new("bool", "bool flag").short('b'))
        .flag(Flag::new("string", "string flag").short('s').value(Action::values(["one", "two"])))
        .positional(Action::values(["pos1", "positional1"]))
        .positional(Action::files(Vec::<String>::new()))
}

fn lines(stdout: &str) -> Action {
    Action::values(stdout.lines().map(str::trim).filter(|line| !line.is_empty()))
}

fn environment(ctx: &Context) -> Action {
    let mut names: Vec<(&String, &String)> = ctx.env.iter().collect();
    names.sort();
    Action::values_described(names.into_iter().map(|(name, value)| (name.clone(), value.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::traverse;
    use std::collections::HashMap;
    use std::sync::Arc;

    async fn complete(words: &[&str]) -> Vec<String> {
        let (value, args) = words.split_last().unwrap();
        let ctx = Context::new(Arc::new(Config::default()))
            .with_env(HashMap::from([("HOME".to_string(), "/home/user".to_string())]))
            .with_args(args.iter().copied())
            .with_value(*value);
        traverse::complete(&root(), &ctx)
            .await
            .candidates
            .into_iter()
            .map(|c| c.value)
            .collect()
    }

    #[test]
    fn test_tree_validates() {
        assert!(root().validate().is_ok());
    }

    #[tokio::test]
    async fn test_subcommands() {
        let values = complete(&[""]).await;
        assert_eq!(values, vec!["action", "modifier", "mod", "multiparts"]);
    }

    #[tokio::test]
    async fn test_batch() {
        let values = complete(&["modifier", "--batch", ""]).await;
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_multiparts() {
        let values = complete(&["mod", "--multiparts", "dir/"]).await;
        assert_eq!(values, vec!["dir/subdir1/", "dir/subdir2/", "dir/fileD"]);
    }

    #[tokio::test]
    async fn test_user_group() {
        let values = complete(&["multiparts", "-u", "root:"]).await;
        assert_eq!(values, vec!["root:wheel", "root:users", "root:nogroup"]);
    }

    #[tokio::test]
    async fn test_env_pair() {
        let values = complete(&["multiparts", "--env", ""]).await;
        assert_eq!(values, vec!["HOME="]);
    }

    #[tokio::test]
    async fn test_split() {
        let values = complete(&["modifier", "--split", "pos1 --s"]).await;
        let matching: Vec<&String> = values
            .iter()
            .filter(|value| value.starts_with("pos1 --s"))
            .collect();
        assert_eq!(matching, vec!["pos1 --string "]);
    }
}
