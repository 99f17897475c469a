//! Built-in producers touching the outside world: the filesystem and
//! external commands.

use std::fs;
use std::process::Stdio;
use tracing::debug;

use super::{Context, Outcome};
use crate::candidate::Candidate;
use crate::error::EvaluationError;
use crate::style;

pub(super) const FILES_TAG: &str = "files";

/// List the directory named by the typed word on the blocking pool
///
/// An expired deadline skips the listing altogether.
pub(super) async fn files(ctx: &Context, suffixes: &[String], directories_only: bool) -> Outcome {
    if ctx.expired() {
        return Outcome::message(EvaluationError::Timeout);
    }
    let owned = ctx.clone();
    let suffixes = suffixes.to_vec();
    match tokio::task::spawn_blocking(move || list_files(&owned, &suffixes, directories_only)).await
    {
        Ok(outcome) => outcome,
        Err(err) => Outcome::message(format!("listing failed: {err}")),
    }
}

/// List the directory named by the typed word
///
/// The part of the word up to its last `/` selects the directory and is kept
/// as prefix of every value. Directories end in `/` and suppress the
/// trailing space.
fn list_files(ctx: &Context, suffixes: &[String], directories_only: bool) -> Outcome {
    let (dir_part, file_part) = match ctx.value.rfind('/') {
        Some(idx) => ctx.value.split_at(idx + 1),
        None => ("", ctx.value.as_str()),
    };
    let listed = if dir_part.is_empty() {
        ctx.dir.clone()
    } else {
        ctx.abs(dir_part)
    };

    let entries = match fs::read_dir(&listed) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %listed.display(), "failed to list directory: {err}");
            return Outcome::message(format!("{}: {err}", listed.display()));
        }
    };

    let show_hidden = file_part.starts_with('.');
    let mut candidates = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') && !show_hidden {
            continue;
        }

        let path = entry.path();
        // follows symlinks so a link to a directory completes like one
        let is_dir = path.is_dir();
        if directories_only && !is_dir {
            continue;
        }
        if !is_dir && !suffixes.is_empty() && !suffixes.iter().any(|s| name.ends_with(s.as_str())) {
            continue;
        }

        let value = if is_dir {
            format!("{dir_part}{name}/")
        } else {
            format!("{dir_part}{name}")
        };
        candidates.push(
            Candidate::new(value)
                .with_style(style::for_path(&path))
                .with_tag(FILES_TAG),
        );
    }

    let mut outcome = Outcome::new(candidates);
    outcome.meta.nospace.add(&['/']);
    outcome
}

/// Run an external command in the context's directory, returning its stdout
pub(super) async fn exec(
    program: &str,
    args: &[String],
    ctx: &Context,
) -> Result<String, EvaluationError> {
    let failure = |reason: String| EvaluationError::Exec {
        program: program.to_string(),
        reason,
    };

    if ctx.expired() {
        return Err(EvaluationError::Timeout);
    }
    debug!(program, ?args, "running external command");
    let output = tokio::process::Command::new(program)
        .args(args)
        .current_dir(&ctx.dir)
        .env_clear()
        .envs(ctx.env.iter())
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| failure(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr
            .lines()
            .next()
            .map(str::to_string)
            .unwrap_or_else(|| output.status.to_string());
        return Err(failure(reason));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::sync::Arc;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();
        fs::write(dir.path().join("main.rs"), "").unwrap();
        fs::write(dir.path().join(".hidden"), "").unwrap();
        fs::write(dir.path().join("subdir/inner.txt"), "").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_files_on_blocking_pool() {
        let dir = fixture();
        let outcome = files(&context(dir.path(), "sub"), &[], true).await;
        assert_eq!(outcome.values(), vec!["subdir/"]);
    }

    #[tokio::test]
    async fn test_expired_deadline_skips_listing() {
        let dir = fixture();
        let ctx = context(dir.path(), "").with_deadline(tokio::time::Instant::now());
        let outcome = files(&ctx, &[], false).await;
        assert!(outcome.candidates.is_empty());
        assert_eq!(
            outcome.meta.messages.iter().collect::<Vec<_>>(),
            vec!["timeout exceeded"]
        );
    }

    fn context(dir: &std::path::Path, value: &str) -> Context {
        Context::new(Arc::new(Config::default()))
            .with_dir(dir)
            .with_value(value)
    }

    fn sorted(outcome: &Outcome) -> Vec<&str> {
        let mut values = outcome.values();
        values.sort();
        values
    }

    #[test]
    fn test_files_lists_working_directory() {
        let dir = fixture();
        let outcome = list_files(&context(dir.path(), ""), &[], false);
        assert_eq!(sorted(&outcome), vec!["main.rs", "notes.md", "subdir/"]);
        assert!(outcome.meta.nospace.matches("subdir/"));
        assert!(outcome.candidates.iter().all(|c| c.tag == FILES_TAG));
    }

    #[test]
    fn test_files_keeps_typed_directory() {
        let dir = fixture();
        let outcome = list_files(&context(dir.path(), "subdir/in"), &[], false);
        assert_eq!(outcome.values(), vec!["subdir/inner.txt"]);
    }

    #[test]
    fn test_files_hidden_and_suffixes() {
        let dir = fixture();
        let hidden = list_files(&context(dir.path(), "."), &[], false);
        assert!(hidden.values().contains(&".hidden"));

        let filtered = list_files(&context(dir.path(), ""), &[".rs".to_string()], false);
        assert_eq!(sorted(&filtered), vec!["main.rs", "subdir/"]);
    }

    #[test]
    fn test_directories_only() {
        let dir = fixture();
        let outcome = list_files(&context(dir.path(), ""), &[], true);
        assert_eq!(outcome.values(), vec!["subdir/"]);
    }

    #[test]
    fn test_missing_directory_is_a_message() {
        let dir = fixture();
        let outcome = list_files(&context(dir.path(), "nope/"), &[], false);
        assert!(outcome.candidates.is_empty());
        assert!(!outcome.meta.messages.is_empty());
    }
}
