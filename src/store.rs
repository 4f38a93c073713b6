//! Content-addressed JSON storage.
//!
//! Every record lives at `{root}/{hash}.json`. Writes go to a hidden
//! temporary sibling first and are renamed into place, so a run killed
//! mid-write never leaves a truncated record behind.
//!
//! ```text
//! cnn-lite-articles/
//! ├── 0b5c…e1.json
//! ├── 7f3a…9d.json
//! └── …
//! ```

use crate::error::StoreError;
use crate::models::ArticleRecord;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument, warn};

/// What [`ArticleStore::put`] did on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// No record with this hash existed.
    Created,
    /// A record existed and was replaced.
    Overwritten,
    /// A byte-identical record existed; nothing was written.
    Unchanged,
}

/// Directory of article records keyed by content hash.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    root: PathBuf,
}

impl ArticleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the records.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record for `hash`. Rejects anything that is not a
    /// lowercase hex digest.
    pub fn path_for(&self, hash: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_key(hash) {
            return Err(StoreError::InvalidKey(hash.to_string()));
        }
        Ok(self.root.join(format!("{hash}.json")))
    }

    /// Write `record` under `hash`, creating the directory if needed.
    ///
    /// # Arguments
    ///
    /// * `hash` - Content hash; must be lowercase hex.
    /// * `record` - The record to store at `{root}/{hash}.json`.
    ///
    /// # Returns
    ///
    /// Whether the file was created, replaced, or already byte-identical.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidKey`] for a malformed hash, [`StoreError::Io`]
    /// when the directory or file cannot be written.
    #[instrument(level = "debug", skip(self, record))]
    pub async fn put(&self, hash: &str, record: &ArticleRecord) -> Result<PutOutcome, StoreError> {
        let path = self.path_for(hash)?;
        let mut json = serde_json::to_vec_pretty(record).map_err(|source| StoreError::Serialize {
            hash: hash.to_string(),
            source,
        })?;
        json.push(b'\n');

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))?;

        let existed = match fs::read(&path).await {
            Ok(current) if current == json => {
                debug!(path = %path.display(), "Record unchanged; skipping write");
                return Ok(PutOutcome::Unchanged);
            }
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        let tmp = self.root.join(format!(".{hash}.json.tmp"));
        fs::write(&tmp, &json)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::io(&path, e));
        }

        debug!(path = %path.display(), bytes = json.len(), existed, "Wrote record");
        Ok(if existed {
            PutOutcome::Overwritten
        } else {
            PutOutcome::Created
        })
    }

    /// Read the record stored under `hash`, if any.
    pub async fn get(&self, hash: &str) -> Result<Option<ArticleRecord>, StoreError> {
        let path = self.path_for(hash)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { path, source })
    }

    /// Hashes of every record in the store.
    ///
    /// The `hash` field inside each file wins; files without one fall back
    /// to their file stem. Unreadable or foreign files are logged and
    /// ignored. A missing directory is an empty store.
    #[instrument(level = "info", skip(self), fields(root = %self.root.display()))]
    pub async fn existing_hashes(&self) -> Result<HashSet<String>, StoreError> {
        let mut hashes = HashSet::new();
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(hashes),
            Err(e) => return Err(StoreError::io(&self.root, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.root, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_stored_hash(&path).await {
                Ok(Some(hash)) => {
                    hashes.insert(hash);
                }
                Ok(None) => warn!(path = %path.display(), "Stored file has no usable hash; ignoring"),
                Err(e) => warn!(path = %path.display(), error = %e, "Could not read stored record"),
            }
        }

        debug!(count = hashes.len(), "Loaded existing hashes");
        Ok(hashes)
    }
}

#[derive(Deserialize)]
struct StoredHash {
    hash: Option<String>,
}

async fn read_stored_hash(path: &Path) -> Result<Option<String>, StoreError> {
    let bytes = fs::read(path).await.map_err(|e| StoreError::io(path, e))?;
    let stored: StoredHash = serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    let stem = path.file_stem().and_then(|s| s.to_str()).map(str::to_string);
    Ok(stored
        .hash
        .filter(|h| is_valid_key(h))
        .or(stem)
        .filter(|h| is_valid_key(h)))
}

fn is_valid_key(hash: &str) -> bool {
    !hash.is_empty() && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
