//! Command and flag records
//!
//! The tree is built once, validated when the completer is created and only
//! read afterwards.

use std::collections::HashSet;

use crate::action::Action;
use crate::error::StructuralError;

/// Declared flag
#[derive(Debug, Clone, Default)]
pub struct Flag {
    /// Long name without dashes, empty for short-only flags
    pub long: String,
    pub short: Option<char>,
    pub description: String,
    pub takes_value: bool,
    /// Value only accepted inline (`--flag=value`)
    pub optional_value: bool,
    pub repeatable: bool,
    /// Inherited by all descendants
    pub persistent: bool,
    pub hidden: bool,
    /// Completes the flag's value
    pub action: Option<Action>,
}

impl Flag {
    /// Boolean flag
    pub fn new(long: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            long: long.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Boolean flag with only a short form
    pub fn short_only(short: char, description: impl Into<String>) -> Self {
        Self::new("", description).short(short)
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Value-taking flag completed by `action`
    pub fn value(mut self, action: Action) -> Self {
        self.takes_value = true;
        self.action = Some(action);
        self
    }

    /// Value-taking flag whose value may be omitted
    pub fn optional_value(mut self, action: Action) -> Self {
        self.optional_value = true;
        self.value(action)
    }

    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// All spellings, long form first
    pub fn forms(&self) -> Vec<String> {
        let mut forms = Vec::with_capacity(2);
        if !self.long.is_empty() {
            forms.push(format!("--{}", self.long));
        }
        if let Some(short) = self.short {
            forms.push(format!("-{short}"));
        }
        forms
    }

    /// Display name used in errors and logs
    pub fn name(&self) -> String {
        self.forms().into_iter().next().unwrap_or_default()
    }

    /// Whether `name` is the long name or the short letter
    pub fn is_named(&self, name: &str) -> bool {
        (!self.long.is_empty() && self.long == name)
            || self.short.is_some_and(|s| name.chars().eq(std::iter::once(s)))
    }
}

/// Declared command
#[derive(Debug, Clone, Default)]
pub struct Command {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub hidden: bool,
    pub flags: Vec<Flag>,
    pub children: Vec<Command>,
    /// Actions for the positional arguments by index
    pub positional: Vec<Action>,
    /// Action for every positional beyond `positional`
    pub positional_any: Option<Action>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn subcommand(mut self, child: Command) -> Self {
        self.children.push(child);
        self
    }

    pub fn positional(mut self, action: Action) -> Self {
        self.positional.push(action);
        self
    }

    pub fn positional_any(mut self, action: Action) -> Self {
        self.positional_any = Some(action);
        self
    }

    /// Whether `token` is the name or an alias of this command
    pub fn answers_to(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|a| a == token)
    }

    pub fn find_child(&self, token: &str) -> Option<&Command> {
        self.children.iter().find(|c| c.answers_to(token))
    }

    /// Children offered as completions
    pub fn visible_children(&self) -> impl Iterator<Item = &Command> {
        self.children.iter().filter(|c| !c.hidden)
    }

    /// Check the whole tree for declaration mistakes
    pub fn validate(&self) -> Result<(), StructuralError> {
        self.validate_with(&[])
    }

    fn validate_with(&self, inherited: &[&Flag]) -> Result<(), StructuralError> {
        let mut forms = HashSet::new();
        for flag in inherited.iter().copied().chain(self.flags.iter()) {
            for form in flag.forms() {
                if !forms.insert(form.clone()) {
                    return Err(StructuralError::DuplicateFlag {
                        command: self.name.clone(),
                        form,
                    });
                }
            }
        }

        for flag in &self.flags {
            if flag.takes_value && flag.action.is_none() {
                return Err(StructuralError::MissingAction {
                    command: self.name.clone(),
                    flag: flag.name(),
                });
            }
        }

        let mut names = HashSet::new();
        for child in &self.children {
            for name in std::iter::once(&child.name).chain(child.aliases.iter()) {
                if !names.insert(name.as_str()) {
                    return Err(StructuralError::DuplicateCommand {
                        parent: self.name.clone(),
                        name: name.clone(),
                    });
                }
            }
        }

        let mut persistent: Vec<&Flag> = inherited.to_vec();
        persistent.extend(self.flags.iter().filter(|f| f.persistent));
        for child in &self.children {
            child.validate_with(&persistent)?;
        }
        Ok(())
    }

    fn descendant_mut(&mut self, path: &[&str]) -> Result<&mut Command, StructuralError> {
        let mut current = self;
        for (depth, segment) in path.iter().enumerate() {
            current = current
                .children
                .iter_mut()
                .find(|c| c.answers_to(segment))
                .ok_or_else(|| StructuralError::UnknownPath(path[..=depth].join(" ")))?;
        }
        Ok(current)
    }

    /// Bind the completion of a flag on the subcommand at `path`
    ///
    /// `flag` is the long name or the short letter.
    pub fn flag_completion(
        &mut self,
        path: &[&str],
        flag: &str,
        action: Action,
    ) -> Result<(), StructuralError> {
        let command = self.descendant_mut(path)?;
        let name = command.name.clone();
        let target = command
            .flags
            .iter_mut()
            .find(|f| f.is_named(flag))
            .ok_or_else(|| StructuralError::UnknownFlag {
                command: name,
                flag: flag.to_string(),
            })?;
        target.action = Some(action);
        Ok(())
    }

    /// Bind the completion of the positional argument `index` on the subcommand at `path`
    pub fn positional_completion(
        &mut self,
        path: &[&str],
        index: usize,
        action: Action,
    ) -> Result<(), StructuralError> {
        let command = self.descendant_mut(path)?;
        if command.positional.len() <= index {
            command.positional.resize_with(index + 1, Action::default);
        }
        command.positional[index] = action;
        Ok(())
    }

    /// Bind the completion of all further positionals on the subcommand at `path`
    pub fn positional_any_completion(
        &mut self,
        path: &[&str],
        action: Action,
    ) -> Result<(), StructuralError> {
        self.descendant_mut(path)?.positional_any = Some(action);
        Ok(())
    }
}

/// Identifier of a resolved command: `_root__child__grandchild`
pub fn state_id<'c>(path: impl IntoIterator<Item = &'c Command>) -> String {
    let names: Vec<String> = path
        .into_iter()
        .map(|c| c.name.replace(['-', '.', ' '], "_"))
        .collect();
    format!("_{}", names.join("__"))
}
