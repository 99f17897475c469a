//! On-disk result cache
//!
//! Entries live below `<cache_dir>/<binary fingerprint>/` in one JSON file per
//! key, named after the SHA-256 of the key. Files are written to a temporary
//! file and renamed into place, so readers never see a partial entry. When
//! two writers race the last rename wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::action::Outcome;
use crate::candidate::{Candidate, Meta};
use crate::config::Config;
use crate::error::{EvaluationError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    key: String,
    expires_at: DateTime<Utc>,
    candidates: Vec<Candidate>,
    meta: Meta,
}

/// Cache directory of one binary
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.cache_dir.join(binary_fingerprint(&config.binary)),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", hash(key)))
    }

    /// Load a live entry
    ///
    /// # Returns
    /// * `Ok(None)` - No entry, an expired entry or a hash collision
    pub fn load(&self, key: &str) -> Result<Option<Outcome>> {
        let path = self.entry_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let entry: CacheEntry = serde_json::from_str(&content)?;
        if entry.key != key {
            return Ok(None);
        }
        if entry.expires_at <= Utc::now() {
            debug!(key, expired = %entry.expires_at, "cache entry expired");
            return Ok(None);
        }

        Ok(Some(Outcome {
            candidates: entry.candidates,
            meta: entry.meta,
        }))
    }

    /// Store an outcome for `ttl`
    pub fn store(&self, key: &str, ttl: Duration, outcome: &Outcome) -> Result<()> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| EvaluationError::Cache(format!("invalid ttl: {e}")))?;
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let entry = CacheEntry {
            key: key.to_string(),
            expires_at,
            candidates: outcome.candidates.clone(),
            meta: outcome.meta.clone(),
        };

        fs::create_dir_all(&self.dir)?;
        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(serde_json::to_string(&entry)?.as_bytes())?;
        file.persist(self.entry_path(key)).map_err(|e| e.error)?;
        debug!(key, %expires_at, "cache entry written");
        Ok(())
    }

    /// Remove every entry of this binary
    pub fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Identity of the running binary: its executable path, or its name when
/// the path is unknown
fn binary_fingerprint(binary: &str) -> String {
    let identity = std::env::current_exe()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| binary.to_string());
    hash(&identity)
}
