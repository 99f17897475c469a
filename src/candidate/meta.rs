//! Side-channel state accumulated during one evaluation

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Candidate;

/// Ordered, deduplicated list of messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Messages(Vec<String>);

impl Messages {
    /// Add a message unless it is already present
    pub fn add(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.0.contains(&message) {
            self.0.push(message);
        }
    }

    /// Append all messages of another list
    pub fn merge(&mut self, other: &Messages) {
        for message in &other.0 {
            self.add(message.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    /// Encode messages as reserved candidates for shells that cannot show them inline
    ///
    /// Every message becomes an `ERR` entry. When that leaves a single entry a
    /// `_` placeholder is added so the shell lists instead of inserting it.
    pub fn integrate(
        &self,
        mut candidates: Vec<Candidate>,
        prefix: &str,
        error_style: &str,
    ) -> Vec<Candidate> {
        if self.is_empty() {
            return candidates;
        }

        for message in &self.0 {
            candidates.push(
                Candidate::new(format!("{prefix}ERR"))
                    .with_display("ERR")
                    .with_description(message.clone())
                    .with_style(error_style),
            );
        }

        if candidates.len() == 1 {
            candidates.push(Candidate::new(format!("{prefix}_")).with_display("_"));
        }
        candidates
    }
}

/// Characters that suppress the trailing space when a value ends with them
///
/// `*` matches every value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoSpace(BTreeSet<char>);

impl NoSpace {
    pub fn add(&mut self, chars: &[char]) {
        self.0.extend(chars.iter().copied());
    }

    pub fn merge(&mut self, other: &NoSpace) {
        self.0.extend(other.0.iter().copied());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether inserting `value` should leave the cursor right after it
    pub fn matches(&self, value: &str) -> bool {
        if self.0.contains(&'*') {
            return true;
        }
        value.chars().last().is_some_and(|c| self.0.contains(&c))
    }

    pub fn chars(&self) -> String {
        self.0.iter().collect()
    }
}

/// Metadata collected alongside candidates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub messages: Messages,
    #[serde(default)]
    pub nospace: NoSpace,
    #[serde(default)]
    pub usage: String,
}

impl Meta {
    /// Merge the metadata of a sibling evaluation
    ///
    /// Messages are appended, no-space sets unioned and the first non-empty
    /// usage is kept.
    pub fn merge(&mut self, other: &Meta) {
        self.messages.merge(&other.messages);
        self.nospace.merge(&other.nospace);
        if self.usage.is_empty() {
            self.usage = other.usage.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_deduplicate() {
        let mut messages = Messages::default();
        messages.add("a");
        messages.add("b");
        messages.add("a");
        assert_eq!(messages.iter().cloned().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_integrate_single_message() {
        let mut messages = Messages::default();
        messages.add("no values");

        let integrated = messages.integrate(Vec::new(), "pre", "red");
        assert_eq!(integrated.len(), 2);
        assert_eq!(integrated[0].value, "preERR");
        assert_eq!(integrated[0].display, "ERR");
        assert_eq!(integrated[0].description, "no values");
        assert_eq!(integrated[1].value, "pre_");
    }

    #[test]
    fn test_integrate_without_messages() {
        let candidates = vec![Candidate::new("a")];
        let integrated = Messages::default().integrate(candidates.clone(), "", "");
        assert_eq!(integrated, candidates);
    }

    #[test]
    fn test_nospace_matching() {
        let mut nospace = NoSpace::default();
        assert!(!nospace.matches("dir/"));

        nospace.add(&['/']);
        assert!(nospace.matches("dir/"));
        assert!(!nospace.matches("file"));
        assert!(!nospace.matches(""));

        nospace.add(&['*']);
        assert!(nospace.matches("file"));
    }

    #[test]
    fn test_meta_merge_keeps_first_usage() {
        let mut first = Meta {
            usage: "first".to_string(),
            ..Meta::default()
        };
        let mut second = Meta {
            usage: "second".to_string(),
            ..Meta::default()
        };
        second.messages.add("oops");
        second.nospace.add(&['/']);

        first.merge(&second);
        assert_eq!(first.usage, "first");
        assert!(!first.messages.is_empty());
        assert_eq!(first.nospace.chars(), "/");
    }
}
