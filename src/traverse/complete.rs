//! Resolution of the word under the cursor
//!
//! After the words before the cursor are walked, the current word decides
//! what is offered: the value of a pending flag, the value behind
//! `--flag=`, flag names, or the positional action of the resolved
//! subcommand batched with its subcommand names.

use tracing::{debug, warn};

use super::{Command, Flag, Traversal, traverse_lenient};
use crate::action::{Action, Context, Outcome};
use crate::candidate::Candidate;
use crate::error::StructuralError;
use crate::style;

pub const FLAGS_TAG: &str = "flags";
pub const COMMANDS_TAG: &str = "commands";

/// Action for the current word together with the context it runs in
#[derive(Debug, Clone)]
pub struct Resolution {
    pub action: Action,
    /// Positional arguments of the resolved subcommand
    pub args: Vec<String>,
    /// Current word
    pub value: String,
    /// Identifier of the resolved subcommand
    pub state: String,
}

/// Resolve the action completing the last of `words`
///
/// An empty `words` completes an empty word at the root.
pub fn resolve(root: &Command, words: &[String]) -> Result<Resolution, StructuralError> {
    let (value, prior) = match words.split_last() {
        Some((last, prior)) => (last.clone(), prior),
        None => (String::new(), &[][..]),
    };

    let traversal = traverse_lenient(root, prior)?;
    let action = current_action(&traversal, &value);
    debug!(
        state = %traversal.state_id(),
        action = action.kind(),
        args = ?traversal.args,
        "resolved current word"
    );

    Ok(Resolution {
        action,
        state: traversal.state_id(),
        args: traversal.args,
        value,
    })
}

/// Complete `ctx.args` followed by `ctx.value` as a command line of `root`
pub async fn complete(root: &Command, ctx: &Context) -> Outcome {
    let mut words = ctx.args.clone();
    words.push(ctx.value.clone());

    match resolve(root, &words) {
        Ok(resolution) => {
            let inner = ctx
                .clone()
                .with_args(resolution.args)
                .with_value(resolution.value);
            resolution.action.invoke(&inner).await
        }
        Err(err) => {
            warn!("{err}");
            Outcome::message(err)
        }
    }
}

fn current_action(traversal: &Traversal<'_>, value: &str) -> Action {
    if let Some(flag) = traversal.pending {
        return flag_value_action(flag);
    }

    if !traversal.dash {
        if let Some((name, _)) = value.strip_prefix("--").and_then(|l| l.split_once('=')) {
            return match traversal.find_long(name) {
                Some(flag) => flag_value_action(flag).prefix(format!("--{name}=")),
                None => Action::default(),
            };
        }
        if value.starts_with('-') {
            return flag_action(traversal, value);
        }
    }

    positional_action(traversal)
}

/// Completion of a flag's value, described by the flag's usage
fn flag_value_action(flag: &Flag) -> Action {
    let action = match &flag.action {
        Some(action) if flag.takes_value => action.clone(),
        _ => Action::styled_values([("true", style::GREEN), ("false", style::RED)]),
    };
    action.usage(flag.description.clone())
}

fn flag_action(traversal: &Traversal<'_>, value: &str) -> Action {
    if value.len() > 1 && !value.starts_with("--") {
        if let Some(action) = cluster_action(traversal, value) {
            return action;
        }
    }

    let candidates = traversal
        .active_flags()
        .into_iter()
        .filter(|flag| !flag.hidden && (flag.repeatable || !traversal.is_used(flag)))
        .flat_map(|flag| {
            flag.forms()
                .into_iter()
                .map(move |form| flag_candidate(flag, form))
        })
        .collect();
    Action::Values(candidates).tag(FLAGS_TAG)
}

fn flag_candidate(flag: &Flag, form: String) -> Candidate {
    let style = if flag.takes_value {
        style::BLUE
    } else {
        style::DEFAULT
    };
    Candidate::new(form)
        .with_description(flag.description.clone())
        .with_style(style)
}

/// Completion inside a short flag cluster such as `-bv`
///
/// `None` when a letter is unknown.
fn cluster_action(traversal: &Traversal<'_>, value: &str) -> Option<Action> {
    let letters = &value[1..];
    let mut typed = Vec::new();
    for (idx, letter) in letters.char_indices() {
        let flag = traversal.find_short(letter)?;
        if flag.takes_value {
            let end = idx + letter.len_utf8() + 1;
            if end == value.len() {
                return Some(Action::values([value]).tag(FLAGS_TAG));
            }
            return Some(flag_value_action(flag).prefix(&value[..end]));
        }
        typed.push(flag);
    }

    let candidates = traversal
        .active_flags()
        .into_iter()
        .filter(|flag| !flag.hidden && flag.short.is_some())
        .filter(|flag| {
            flag.repeatable
                || !(traversal.is_used(flag) || typed.iter().any(|t| std::ptr::eq(*t, *flag)))
        })
        .filter_map(|flag| {
            let short = flag.short?;
            Some(flag_candidate(flag, format!("{value}{short}")))
        })
        .collect();
    Some(Action::Values(candidates).tag(FLAGS_TAG).nospace(&['*']))
}

fn positional_action(traversal: &Traversal<'_>) -> Action {
    let command = traversal.command();
    let index = traversal.args.len();
    let positional = command
        .positional
        .get(index)
        .or(command.positional_any.as_ref())
        .cloned()
        .unwrap_or_default();

    if !traversal.args.is_empty() || traversal.dash || command.children.is_empty() {
        return positional;
    }

    let subcommands = command
        .visible_children()
        .flat_map(|child| {
            std::iter::once(&child.name)
                .chain(child.aliases.iter())
                .map(move |name| Candidate::new(name.clone()).with_description(child.description.clone()))
        })
        .collect();
    Action::batch(vec![positional, Action::Values(subcommands).tag(COMMANDS_TAG)])
}
