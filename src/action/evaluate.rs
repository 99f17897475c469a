//! Action interpreter
//!
//! Walks an action tree depth-first. Batch branches run concurrently, every
//! other step is sequential. Failures never escape: they become an outcome
//! carrying a message and no candidates.

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{Action, CallbackFn, Context, KeyFn, Modifier, Outcome, builtin, parts};
use crate::cache::CacheStore;
use crate::candidate;
use crate::error::EvaluationError;
use crate::traverse;

impl Action {
    /// Evaluate the action
    ///
    /// # Arguments
    /// * `ctx` - Evaluation context
    ///
    /// # Returns
    /// * `Outcome` - Candidates and metadata; failures are reported as messages
    pub fn invoke<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Outcome> {
        async move {
            match self {
                Action::Values(candidates) => Outcome::new(candidates.clone()),
                Action::Message(message) => Outcome::message(message),
                Action::Files { suffixes } => builtin::files(ctx, suffixes, false).await,
                Action::Directories => builtin::files(ctx, &[], true).await,
                Action::Callback(callback) => run_callback(callback, ctx).await,
                Action::Exec { program, args, map } => {
                    match builtin::exec(program, args, ctx).await {
                        Ok(stdout) => map(&stdout).invoke(ctx).await,
                        Err(err) => {
                            warn!("{err}");
                            Outcome::message(err)
                        }
                    }
                }
                Action::MultiPartsFn {
                    separator,
                    callback,
                } => {
                    let (head, segment_ctx) = parts::split_parts(ctx, separator);
                    let mut outcome = run_callback(callback, &segment_ctx).await;
                    outcome = outcome.map_values(|v| format!("{head}{v}"));
                    outcome.meta.nospace.add(&parts::nospace_chars(separator));
                    outcome
                }
                Action::Command(root) => traverse::complete(root, ctx).await,
                Action::Batch(actions) => batch(actions, ctx).await,
                Action::Cache {
                    inner,
                    ttl,
                    key,
                    site,
                } => cached(inner, *ttl, key.as_ref(), site, ctx).await,
                Action::Filter { inner, values } => {
                    let allowed: HashSet<&str> = values.iter().map(String::as_str).collect();
                    let mut outcome = inner.invoke(ctx).await;
                    outcome
                        .candidates
                        .retain(|c| allowed.contains(c.value.as_str()));
                    outcome
                }
                Action::Retain { inner, values } => {
                    let excluded: HashSet<&str> = values.iter().map(String::as_str).collect();
                    let mut outcome = inner.invoke(ctx).await;
                    outcome
                        .candidates
                        .retain(|c| !excluded.contains(c.value.as_str()));
                    outcome
                }
                Action::Shift { inner, n } => {
                    let mut shifted = ctx.clone();
                    shifted.args = ctx.args.get(*n..).unwrap_or_default().to_vec();
                    inner.invoke(&shifted).await
                }
                Action::MultiParts { inner, separator } => {
                    let outcome = inner.invoke(ctx).await;
                    parts::next_segments(outcome, &ctx.value, separator)
                }
                Action::Prefix { inner, prefix } => {
                    let Some(rest) = parts::strip_literal(&ctx.value, prefix) else {
                        return Outcome::default();
                    };
                    let stripped = ctx.clone().with_value(rest);
                    inner
                        .invoke(&stripped)
                        .await
                        .map_values(|v| format!("{prefix}{v}"))
                }
                Action::Suffix { inner, suffix } => inner
                    .invoke(ctx)
                    .await
                    .map_values(|v| format!("{v}{suffix}")),
                Action::Split { inner } => parts::split(inner, ctx).await,
                Action::Timeout { inner, duration } => timeout(inner, *duration, ctx).await,
                Action::Chdir { inner, dir } => {
                    let target = ctx.abs(dir);
                    let is_dir = tokio::fs::metadata(&target)
                        .await
                        .is_ok_and(|metadata| metadata.is_dir());
                    if !is_dir {
                        return Outcome::message(EvaluationError::NoSuchDirectory(
                            target.display().to_string(),
                        ));
                    }
                    inner.invoke(&ctx.clone().with_dir(target)).await
                }
                Action::UniqueList { inner, separator } => {
                    parts::unique_list(inner, separator, ctx).await
                }
                Action::Modify { inner, modifier } => {
                    let outcome = inner.invoke(ctx).await;
                    apply_modifier(outcome, modifier, ctx)
                }
            }
        }
        .boxed()
    }
}

/// Run a callback on the blocking pool so a deadline can abandon it
async fn run_callback(callback: &CallbackFn, ctx: &Context) -> Outcome {
    if ctx.expired() {
        return Outcome::message(EvaluationError::Timeout);
    }
    let callback = callback.clone();
    let owned = ctx.clone();
    match tokio::task::spawn_blocking(move || callback(&owned)).await {
        Ok(action) => action.invoke(ctx).await,
        Err(err) => {
            warn!("callback failed: {err}");
            Outcome::message(EvaluationError::Callback(err.to_string()))
        }
    }
}

async fn batch(actions: &[Action], ctx: &Context) -> Outcome {
    let outcomes = join_all(actions.iter().map(|action| action.invoke(ctx))).await;

    let mut merged = Outcome::default();
    for outcome in outcomes {
        merged.candidates.extend(outcome.candidates);
        merged.meta.merge(&outcome.meta);
    }
    merged.candidates = candidate::dedup_by_value(merged.candidates);
    merged
}

async fn cached(
    inner: &Action,
    ttl: Duration,
    key: Option<&KeyFn>,
    site: &str,
    ctx: &Context,
) -> Outcome {
    let key = match key {
        Some(key_fn) => format!("{site}#{}", key_fn(ctx)),
        None => site.to_string(),
    };
    let store = CacheStore::new(&ctx.config);

    match store.load(&key) {
        Ok(Some(outcome)) => {
            debug!(key = %key, "cache hit");
            return outcome;
        }
        Ok(None) => debug!(key = %key, "cache miss"),
        Err(err) => warn!(key = %key, "ignoring unreadable cache entry: {err}"),
    }

    let outcome = inner.invoke(ctx).await;
    if outcome.meta.messages.is_empty() {
        if let Err(err) = store.store(&key, ttl, &outcome) {
            warn!(key = %key, "failed to write cache entry: {err}");
        }
    }
    outcome
}

async fn timeout(inner: &Action, duration: Duration, ctx: &Context) -> Outcome {
    let bounded = ctx.clone().with_deadline(Instant::now() + duration);
    match tokio::time::timeout(duration, inner.invoke(&bounded)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            debug!(?duration, "abandoning evaluation");
            Outcome::message(EvaluationError::Timeout)
        }
    }
}

fn apply_modifier(mut outcome: Outcome, modifier: &Modifier, ctx: &Context) -> Outcome {
    match modifier {
        Modifier::Style(style) => {
            for candidate in &mut outcome.candidates {
                candidate.style = style.clone();
            }
        }
        Modifier::StyleF(style_fn) => {
            for candidate in &mut outcome.candidates {
                candidate.style = style_fn(&candidate.value, ctx);
            }
        }
        Modifier::Usage(usage) => {
            if outcome.meta.usage.is_empty() {
                outcome.meta.usage = usage.clone();
            }
        }
        Modifier::NoSpace(chars) => outcome.meta.nospace.add(chars),
        Modifier::Tag(tag) => {
            for candidate in &mut outcome.candidates {
                candidate.tag = tag.clone();
            }
        }
    }
    outcome
}
