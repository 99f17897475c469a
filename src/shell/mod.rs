//! Shell adapters
//!
//! Every supported shell has a registration snippet, sourced once, and a
//! reply format understood by that snippet. Replies of all shells go through
//! the same pipeline ([`value`]) before the adapter formats them.
//!
//! # Supported shells
//!
//! - **bash**, **fish**, **zsh**: static flag and subcommand tables per
//!   command, dynamic values through the callback
//! - **elvish**, **export**, **nushell**, **powershell**, **xonsh**: JSON replies
//! - **ion**, **oil**, **tcsh** (also `csh`): plain value lists

mod bash;
mod elvish;
mod export;
mod fish;
mod ion;
mod nushell;
mod oil;
mod powershell;
mod tcsh;
mod xonsh;
mod zsh;

use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::process::Stdio;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::action::Outcome;
use crate::candidate::{self, Candidate, Meta};
use crate::config::Config;
use crate::error::{CompletionError, Result};
use crate::style::Styles;
use crate::traverse::{Command, Flag, state_id};

/// Supported shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shell {
    Bash,
    Elvish,
    Export,
    Fish,
    Ion,
    Nushell,
    Oil,
    Powershell,
    Tcsh,
    Xonsh,
    Zsh,
}

impl Shell {
    /// All shells, sorted by name
    pub const ALL: [Shell; 11] = [
        Shell::Bash,
        Shell::Elvish,
        Shell::Export,
        Shell::Fish,
        Shell::Ion,
        Shell::Nushell,
        Shell::Oil,
        Shell::Powershell,
        Shell::Tcsh,
        Shell::Xonsh,
        Shell::Zsh,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Elvish => "elvish",
            Shell::Export => "export",
            Shell::Fish => "fish",
            Shell::Ion => "ion",
            Shell::Nushell => "nushell",
            Shell::Oil => "oil",
            Shell::Powershell => "powershell",
            Shell::Tcsh => "tcsh",
            Shell::Xonsh => "xonsh",
            Shell::Zsh => "zsh",
        }
    }

    /// Parse a shell name, `csh` selects tcsh
    pub fn parse(name: &str) -> Result<Shell> {
        if name == "csh" {
            return Ok(Shell::Tcsh);
        }
        Shell::ALL
            .into_iter()
            .find(|shell| shell.name() == name)
            .ok_or_else(|| CompletionError::UnknownShell {
                name: name.to_string(),
                expected: Shell::ALL.iter().map(|s| s.name().to_string()).collect(),
            })
    }

    /// Shells able to show messages next to the candidates
    fn shows_messages(self) -> bool {
        matches!(self, Shell::Elvish | Shell::Export | Shell::Zsh)
    }

    /// Registration script for `root`
    pub fn snippet(self, root: &Command) -> String {
        match self {
            Shell::Bash => bash::snippet(root),
            Shell::Elvish => elvish::snippet(root),
            Shell::Export => export::snippet(root),
            Shell::Fish => fish::snippet(root),
            Shell::Ion => ion::snippet(root),
            Shell::Nushell => nushell::snippet(root),
            Shell::Oil => oil::snippet(root),
            Shell::Powershell => powershell::snippet(root),
            Shell::Tcsh => tcsh::snippet(root),
            Shell::Xonsh => xonsh::snippet(root),
            Shell::Zsh => zsh::snippet(root),
        }
    }

    /// Format prepared candidates in the shell's reply format
    pub fn render(self, word: &str, meta: &Meta, candidates: &[Candidate]) -> String {
        match self {
            Shell::Bash => bash::render(word, meta, candidates),
            Shell::Elvish => elvish::render(word, meta, candidates),
            Shell::Export => export::render(word, meta, candidates),
            Shell::Fish => fish::render(word, meta, candidates),
            Shell::Ion => ion::render(word, meta, candidates),
            Shell::Nushell => nushell::render(word, meta, candidates),
            Shell::Oil => oil::render(word, meta, candidates),
            Shell::Powershell => powershell::render(word, meta, candidates),
            Shell::Tcsh => tcsh::render(word, meta, candidates),
            Shell::Xonsh => xonsh::render(word, meta, candidates),
            Shell::Zsh => zsh::render(word, meta, candidates),
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shell {
    type Err = CompletionError;

    fn from_str(s: &str) -> Result<Self> {
        Shell::parse(s)
    }
}

/// Prepare an outcome for `shell` and format the reply
///
/// Decolors when color is disabled, keeps candidates matching the current
/// word, encodes messages as candidates for shells that cannot show them,
/// sorts by display and finally hands the reply to the post-processor when
/// experimental features are enabled.
pub fn value(shell: Shell, word: &str, outcome: Outcome, config: &Config) -> String {
    let Outcome {
        candidates,
        mut meta,
    } = outcome;
    let styles = Styles::for_color(config.color);

    let candidates = if config.color {
        candidates
    } else {
        candidate::decolor(candidates)
    };
    let mut filtered = candidate::filter_prefix(candidates, word);
    if !shell.shows_messages() {
        filtered = meta.messages.integrate(filtered, word, &styles.error);
    }
    if !meta.messages.is_empty() && shell != Shell::Export {
        meta.nospace.add(&['*']);
    }
    candidate::sort_by_display(&mut filtered);
    debug!(%shell, count = filtered.len(), "rendering reply");

    let reply = shell.render(word, &meta, &filtered);
    if config.experimental.enabled {
        post_process(reply, &config.experimental.post_processor)
    } else {
        reply
    }
}

/// Pipe the reply through an executable found on PATH, keeping it unchanged
/// when the executable is missing or fails
fn post_process(reply: String, name: &str) -> String {
    let Ok(program) = which::which(name) else {
        debug!(name, "post-processor not found");
        return reply;
    };
    match pipe_through(&program, &reply) {
        Ok(processed) => processed,
        Err(err) => {
            warn!(program = %program.display(), "post-processor failed: {err}");
            reply
        }
    }
}

fn pipe_through(program: &Path, input: &str) -> io::Result<String> {
    let mut child = std::process::Command::new(program)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;
    // stdin is written concurrently with draining stdout
    let writer = child.stdin.take().map(|mut stdin| {
        let input = input.to_string();
        std::thread::spawn(move || stdin.write_all(input.as_bytes()))
    });
    let output = child.wait_with_output()?;
    if let Some(writer) = writer {
        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) if err.kind() == io::ErrorKind::BrokenPipe => {}
            Ok(Err(err)) => return Err(err),
            Err(_) => return Err(io::Error::other("stdin writer panicked")),
        }
    }
    if !output.status.success() {
        return Err(io::Error::other(format!("exited with {}", output.status)));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Shell-safe function name derived from a command name
fn function_name(name: &str) -> String {
    name.replace(['-', '.', ' '], "_")
}

/// One command of the tree as seen by a static snippet
struct CommandState<'c> {
    /// State identifier, see [`crate::traverse::state_id`]
    state: String,
    /// Visible flags in effect: own flags and persistent flags of ancestors
    flags: Vec<&'c Flag>,
}

/// Walk the tree depth-first
fn command_states(root: &Command) -> Vec<CommandState<'_>> {
    fn walk<'c>(
        command: &'c Command,
        path: &mut Vec<&'c Command>,
        out: &mut Vec<CommandState<'c>>,
    ) {
        path.push(command);
        let mut flags: Vec<&'c Flag> = command.flags.iter().collect();
        for ancestor in path[..path.len() - 1].iter().rev() {
            flags.extend(ancestor.flags.iter().filter(|f| f.persistent));
        }
        flags.retain(|f| !f.hidden);
        out.push(CommandState {
            state: state_id(path.iter().copied()),
            flags,
        });
        for child in &command.children {
            walk(child, path, out);
        }
        path.pop();
    }

    let mut out = Vec::new();
    walk(root, &mut Vec::new(), &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    pub(super) fn sample() -> Command {
        Command::new("example")
            .flag(Flag::new("verbose", "verbose output").short('v').persistent())
            .flag(Flag::new("format", "output format").short('f').value(
                Action::values_described([("json", "machine readable"), ("text", "plain")]),
            ))
            .flag(Flag::new("file", "input file").value(Action::files([".txt"])))
            .flag(Flag::new("user", "user name").short('u').value(Action::callback(|_| {
                Action::values(["root"])
            })))
            .subcommand(
                Command::new("sub-cmd")
                    .alias("s")
                    .about("a subcommand")
                    .flag(Flag::new("dir", "target directory").value(Action::directories())),
            )
    }

    fn config(color: bool) -> Config {
        let mut config = Config::default();
        config.color = color;
        config
    }

    #[test]
    fn test_parse() {
        assert_eq!(Shell::parse("bash").unwrap(), Shell::Bash);
        assert_eq!(Shell::parse("csh").unwrap(), Shell::Tcsh);
        assert_eq!("zsh".parse::<Shell>().unwrap(), Shell::Zsh);

        let err = Shell::parse("cmd").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected one of 'bash', 'elvish', 'export', 'fish', 'ion', 'nushell', 'oil', 'powershell', 'tcsh', 'xonsh', 'zsh' [was: cmd]"
        );
    }

    #[test]
    fn test_every_shell_has_a_snippet() {
        let root = sample();
        for shell in Shell::ALL {
            let snippet = shell.snippet(&root);
            assert!(snippet.contains("example"), "{shell}");
        }
    }

    #[test]
    fn test_value_filters_and_sorts() {
        let outcome = Outcome::new(vec![
            Candidate::new("beta"),
            Candidate::new("gamma"),
            Candidate::new("bar"),
        ]);
        let reply = value(Shell::Tcsh, "b", outcome, &config(true));
        assert_eq!(reply, "bar\nbeta\n");
    }

    #[test]
    fn test_value_integrates_messages() {
        let reply = value(Shell::Tcsh, "", Outcome::message("no network"), &config(true));
        assert_eq!(reply, "ERR\n_\n");

        let reply = value(Shell::Elvish, "", Outcome::message("no network"), &config(true));
        assert!(reply.contains("no network"));
        assert!(!reply.contains("\"ERR\""));
    }

    #[test]
    fn test_value_messages_disable_space() {
        let reply = value(Shell::Bash, "", Outcome::message("oops"), &config(true));
        assert!(reply.starts_with('*'));

        let reply = value(Shell::Export, "", Outcome::message("oops"), &config(true));
        let json: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(json["nospace"], "");
    }

    #[test]
    fn test_value_decolors() {
        let outcome = Outcome::new(vec![Candidate::new("a").with_style("red")]);
        let reply = value(Shell::Export, "", outcome, &config(false));
        let json: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(json["values"][0]["style"], "");
    }

    #[test]
    fn test_post_processor_missing_keeps_reply() {
        let mut config = config(true);
        config.experimental.enabled = true;
        config.experimental.post_processor = "definitely-not-a-post-processor".to_string();
        let reply = value(Shell::Tcsh, "", Outcome::new(vec![Candidate::new("a")]), &config);
        assert_eq!(reply, "a\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_post_processor_pipes_reply() {
        let mut config = config(true);
        config.experimental.enabled = true;
        config.experimental.post_processor = "cat".to_string();
        let reply = value(Shell::Tcsh, "", Outcome::new(vec![Candidate::new("a")]), &config);
        assert_eq!(reply, "a\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_post_processor_handles_large_replies() {
        let mut config = config(true);
        config.experimental.enabled = true;
        config.experimental.post_processor = "cat".to_string();
        let candidates: Vec<Candidate> = (0..20_000)
            .map(|i| Candidate::new(format!("candidate-{i:05}")))
            .collect();

        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let reply = value(Shell::Tcsh, "", Outcome::new(candidates), &config);
            let _ = tx.send(reply);
        });
        let reply = rx
            .recv_timeout(std::time::Duration::from_secs(30))
            .expect("post-processor finished");
        assert_eq!(reply.lines().count(), 20_000);
        assert!(reply.starts_with("candidate-00000\ncandidate-00001\n"));
    }

    #[test]
    fn test_command_states() {
        let root = sample();
        let states = command_states(&root);
        let ids: Vec<&str> = states.iter().map(|s| s.state.as_str()).collect();
        assert_eq!(ids, vec!["_example", "_example__sub_cmd"]);

        let inherited: Vec<&str> = states[1].flags.iter().map(|f| f.long.as_str()).collect();
        assert_eq!(inherited, vec!["dir", "verbose"]);
    }
}
