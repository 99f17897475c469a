//! Conversion of a `clap` command definition into a completion tree
//!
//! Value flags get a default action derived from their possible values or
//! value hint, everything else can be bound afterwards with
//! [`Command::flag_completion`] and [`Command::positional_completion`].

use clap::{Arg, ArgAction, ValueHint};

use super::{Command, Flag};
use crate::action::Action;

impl Command {
    /// Import names, flags, positionals and subcommands of a clap command
    ///
    /// The definition is built first so generated help flags and inferred
    /// value hints are visible. Global flags are imported once, as persistent
    /// flags of the command declaring them.
    pub fn from_clap(cmd: &clap::Command) -> Self {
        let mut built = cmd.clone();
        built.build();
        import_command(&built, &[])
    }
}

fn import_command(cmd: &clap::Command, inherited: &[&str]) -> Command {
    let mut command = Command::new(cmd.get_name());
    command.description = cmd.get_about().map(|s| s.to_string()).unwrap_or_default();
    command.aliases = cmd.get_all_aliases().map(str::to_string).collect();
    command.hidden = cmd.is_hide_set();

    for arg in cmd.get_arguments() {
        if inherited.contains(&arg.get_id().as_str()) {
            continue;
        }
        if arg.is_positional() {
            let action = default_action(arg);
            if is_multiple(arg) {
                command.positional_any = Some(action);
            } else {
                command.positional.push(action);
            }
        } else if let Some(flag) = import_flag(arg) {
            command.flags.push(flag);
        }
    }

    let mut globals = inherited.to_vec();
    globals.extend(
        cmd.get_arguments()
            .filter(|arg| arg.is_global_set())
            .map(|arg| arg.get_id().as_str()),
    );
    command.children = cmd
        .get_subcommands()
        .map(|sub| import_command(sub, &globals))
        .collect();
    command
}

fn import_flag(arg: &Arg) -> Option<Flag> {
    if arg.get_long().is_none() && arg.get_short().is_none() {
        return None;
    }

    let mut flag = Flag::new(
        arg.get_long().unwrap_or_default(),
        arg.get_help().map(|s| s.to_string()).unwrap_or_default(),
    );
    flag.short = arg.get_short();
    flag.persistent = arg.is_global_set();
    flag.hidden = arg.is_hide_set();
    flag.repeatable = matches!(arg.get_action(), ArgAction::Append | ArgAction::Count);

    if arg.get_action().takes_values() {
        flag.takes_value = true;
        flag.optional_value = arg
            .get_num_args()
            .is_some_and(|range| range.min_values() == 0);
        flag.action = Some(default_action(arg));
    }
    Some(flag)
}

fn is_multiple(arg: &Arg) -> bool {
    matches!(arg.get_action(), ArgAction::Append)
        || arg
            .get_num_args()
            .is_some_and(|range| range.max_values() > 1)
}

fn default_action(arg: &Arg) -> Action {
    let possible: Vec<(String, String)> = arg
        .get_possible_values()
        .into_iter()
        .filter(|value| !value.is_hide_set())
        .map(|value| {
            let help = value.get_help().map(|s| s.to_string()).unwrap_or_default();
            (value.get_name().to_string(), help)
        })
        .collect();
    if !possible.is_empty() {
        return Action::values_described(possible);
    }

    match arg.get_value_hint() {
        ValueHint::FilePath | ValueHint::AnyPath => Action::files(Vec::<String>::new()),
        ValueHint::DirPath => Action::directories(),
        _ => Action::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Parser, Subcommand};

    #[allow(dead_code)]
    #[derive(Parser)]
    #[command(name = "tool", about = "a tool")]
    struct Cli {
        /// Output format
        #[arg(short, long, value_parser = ["json", "text"])]
        format: Option<String>,

        /// Verbose output
        #[arg(short, long, action = ArgAction::Count, global = true)]
        verbose: u8,

        /// Input file
        #[arg(long, value_hint = ValueHint::FilePath)]
        input: Option<std::path::PathBuf>,

        #[command(subcommand)]
        command: Option<Sub>,
    }

    #[allow(dead_code)]
    #[derive(Subcommand)]
    enum Sub {
        /// Copy things
        #[command(alias = "cp")]
        Copy {
            /// Target directory
            #[arg(value_hint = ValueHint::DirPath)]
            target: std::path::PathBuf,
            /// Extra paths
            rest: Vec<String>,
        },
    }

    fn imported() -> Command {
        use clap::CommandFactory;
        Command::from_clap(&Cli::command())
    }

    #[test]
    fn test_import_flags() {
        let root = imported();
        assert_eq!(root.name, "tool");
        assert_eq!(root.description, "a tool");

        let format = root.flags.iter().find(|f| f.long == "format").unwrap();
        assert_eq!(format.short, Some('f'));
        assert!(format.takes_value);
        let values = format.action.as_ref().unwrap().static_values().unwrap();
        let names: Vec<&str> = values.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(names, vec!["json", "text"]);

        let verbose = root.flags.iter().find(|f| f.long == "verbose").unwrap();
        assert!(!verbose.takes_value);
        assert!(verbose.repeatable);
        assert!(verbose.persistent);

        let input = root.flags.iter().find(|f| f.long == "input").unwrap();
        assert_eq!(input.action.as_ref().unwrap().kind(), "files");

        assert!(root.flags.iter().any(|f| f.long == "help"));
    }

    #[test]
    fn test_import_subcommands() {
        let root = imported();
        let copy = root.find_child("cp").unwrap();
        assert_eq!(copy.name, "copy");
        assert_eq!(copy.description, "Copy things");
        assert_eq!(copy.positional.len(), 1);
        assert_eq!(copy.positional[0].kind(), "directories");
        assert!(copy.positional_any.is_some());
        assert!(!copy.flags.iter().any(|f| f.long == "verbose"));
    }

    #[test]
    fn test_imported_tree_validates() {
        assert!(imported().validate().is_ok());
    }
}
