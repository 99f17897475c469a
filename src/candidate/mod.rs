//! Candidate model
//!
//! A [`Candidate`] is one offered completion. Candidates are produced by
//! actions, travel together with a [`Meta`] accumulator and are only ordered
//! when an adapter renders them.

mod meta;

pub use meta::{Messages, Meta, NoSpace};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One offered completion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Literal insertion text
    pub value: String,
    /// Shown text
    pub display: String,
    #[serde(default)]
    pub description: String,
    /// Style tokens, see [`crate::style`]
    #[serde(default)]
    pub style: String,
    /// Grouping label such as `files` or `flags`
    #[serde(default)]
    pub tag: String,
}

impl Candidate {
    /// Create a candidate whose display equals its value
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            display: value.clone(),
            value,
            ..Self::default()
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Whether the shown text differs from the inserted text
    pub fn has_display(&self) -> bool {
        self.display != self.value
    }
}

/// Remove later duplicates by value, keeping the first occurrence
pub fn dedup_by_value(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.value.clone()))
        .collect()
}

/// Keep candidates whose value starts with the given prefix
pub fn filter_prefix(candidates: Vec<Candidate>, prefix: &str) -> Vec<Candidate> {
    if prefix.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|c| c.value.starts_with(prefix))
        .collect()
}

/// Sort candidates by their shown text
pub fn sort_by_display(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| a.display.cmp(&b.display).then_with(|| a.value.cmp(&b.value)));
}

/// Clear all styles
pub fn decolor(candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates
        .into_iter()
        .map(|c| Candidate {
            style: String::new(),
            ..c
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_defaults_to_value() {
        let candidate = Candidate::new("alpha");
        assert_eq!(candidate.display, "alpha");
        assert!(!candidate.has_display());
        assert!(candidate.with_display("a").has_display());
    }

    #[test]
    fn test_dedup_keeps_first() {
        let candidates = vec![
            Candidate::new("B").with_description("first"),
            Candidate::new("A"),
            Candidate::new("B").with_description("second"),
        ];
        let deduped = dedup_by_value(candidates);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].description, "first");
        assert_eq!(deduped[1].value, "A");
    }

    #[test]
    fn test_filter_prefix() {
        let candidates = vec![Candidate::new("find"), Candidate::new("findOne"), Candidate::new("drop")];
        let filtered = filter_prefix(candidates.clone(), "fi");
        assert_eq!(filtered.len(), 2);
        assert_eq!(filter_prefix(candidates, "").len(), 3);
    }

    #[test]
    fn test_sort_by_display() {
        let mut candidates = vec![
            Candidate::new("b"),
            Candidate::new("z").with_display("a"),
            Candidate::new("c"),
        ];
        sort_by_display(&mut candidates);
        let values: Vec<_> = candidates.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["z", "b", "c"]);
    }

    #[test]
    fn test_decolor() {
        let candidates = decolor(vec![Candidate::new("a").with_style("red")]);
        assert!(candidates[0].style.is_empty());
    }
}
