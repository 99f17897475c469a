//! Helpers for combinators that look inside the typed word: multi-part
//! values, literal prefixes, separator lists and shell-quoted lines.

use std::collections::HashSet;

use super::{Action, Context, Outcome};
use crate::candidate;
use crate::lexer::{self, ShellLexer};

/// Characters that suppress the trailing space after a separator
pub(super) fn nospace_chars(separator: &str) -> Vec<char> {
    match separator.chars().last() {
        Some(last) => vec![last],
        None => vec!['*'],
    }
}

/// Typed text up to and including the last separator
fn head_of<'v>(value: &'v str, separator: &str) -> &'v str {
    if separator.is_empty() {
        return value;
    }
    match value.rfind(separator) {
        Some(idx) => &value[..idx + separator.len()],
        None => "",
    }
}

/// Split the word into the completed head and a context for the tail segment
///
/// An empty separator treats every typed character as a segment.
pub(super) fn split_parts(ctx: &Context, separator: &str) -> (String, Context) {
    let head = head_of(&ctx.value, separator).to_string();
    let tail = ctx.value[head.len()..].to_string();

    let parts: Vec<String> = if separator.is_empty() {
        head.chars().map(String::from).collect()
    } else {
        head.split(separator)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    };

    let mut segment = ctx.clone().with_value(tail);
    segment.parts = parts;
    (head, segment)
}

/// Cut full values down to the segment following the typed head
pub(super) fn next_segments(outcome: Outcome, value: &str, separator: &str) -> Outcome {
    if separator.is_empty() {
        return outcome;
    }
    let head = head_of(value, separator);

    let mut candidates = Vec::new();
    for mut candidate in outcome.candidates {
        let Some(rest) = candidate.value.strip_prefix(head) else {
            continue;
        };
        match rest.find(separator) {
            Some(idx) => {
                let segment = rest[..idx + separator.len()].to_string();
                candidate.value = format!("{head}{segment}");
                candidate.display = segment;
                candidate.description.clear();
            }
            None => candidate.display = rest.to_string(),
        }
        candidates.push(candidate);
    }

    let mut result = Outcome {
        candidates: candidate::dedup_by_value(candidates),
        meta: outcome.meta,
    };
    result.meta.nospace.add(&nospace_chars(separator));
    result
}

/// Remainder of the word after a literal, or empty when the word is still
/// typing the literal itself
pub(super) fn strip_literal<'v>(value: &'v str, literal: &str) -> Option<&'v str> {
    if let Some(rest) = value.strip_prefix(literal) {
        Some(rest)
    } else if literal.starts_with(value) {
        Some("")
    } else {
        None
    }
}

/// Complete one more entry of a separator-delimited list, skipping entries
/// already present
pub(super) async fn unique_list(inner: &Action, separator: &str, ctx: &Context) -> Outcome {
    let (head, segment) = split_parts(ctx, separator);
    let present: HashSet<&str> = segment.parts.iter().map(String::as_str).collect();

    let mut outcome = inner.invoke(&segment).await;
    outcome
        .candidates
        .retain(|c| !present.contains(c.value.as_str()));
    let mut outcome = outcome.map_values(|v| format!("{head}{v}"));
    outcome.meta.nospace.add(&['*']);
    outcome
}

/// Complete the cursor word of a shell-quoted line
pub(super) async fn split(inner: &Action, ctx: &Context) -> Outcome {
    let mut tokens = ShellLexer::tokenize_for_completion(&ctx.value);
    let Some(current) = tokens.pop() else {
        return Outcome::default();
    };
    let raw_prefix = &ctx.value[..current.span.start];
    let args: Vec<String> = tokens.into_iter().map(|t| t.value).collect();

    let inner_ctx = ctx.clone().with_args(args).with_value(current.value);
    let mut outcome = inner.invoke(&inner_ctx).await;

    for candidate in &mut outcome.candidates {
        let keep_open = outcome.meta.nospace.matches(&candidate.value);
        candidate.value = match current.open_quote {
            Some(quote) => {
                let closing = if keep_open {
                    String::new()
                } else {
                    format!("{quote} ")
                };
                format!(
                    "{raw_prefix}{quote}{}{closing}",
                    lexer::escape_quoted(&candidate.value, quote)
                )
            }
            None => {
                let trailing = if keep_open { "" } else { " " };
                format!("{raw_prefix}{}{trailing}", lexer::escape(&candidate.value))
            }
        };
    }
    outcome.meta.nospace.add(&['*']);
    outcome
}
