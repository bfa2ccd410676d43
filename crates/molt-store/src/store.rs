//! State store backends
//!
//! Every logical operation is a full load → mutate → save transaction so the
//! document on disk is always the source of truth, even if it was edited
//! externally or the agent crashed mid-cycle.

use crate::document::StateDocument;
use chrono::Utc;
use molt_core::{MoltError, Result};
use std::fs::{self, File};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Current time as fractional epoch seconds
pub fn epoch_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Durable record of replied posts, used fingerprints and recent actions
///
/// Implementors supply `load` and `save`; the logical operations are built
/// on top of them.
pub trait StateStore: Send + Sync {
    /// Read the full document
    fn load(&self) -> Result<StateDocument>;

    /// Replace the full document
    fn save(&self, doc: &StateDocument) -> Result<()>;

    /// Read-only copy for the decision engine
    fn snapshot(&self) -> Result<StateDocument> {
        self.load()
    }

    fn has_replied(&self, post_id: &str) -> Result<bool> {
        Ok(self.load()?.has_replied(post_id))
    }

    fn mark_replied(&self, post_id: &str) -> Result<()> {
        let mut doc = self.load()?;
        if doc.insert_replied(post_id) {
            self.save(&doc)?;
        }
        Ok(())
    }

    fn has_advice_fingerprint(&self, fingerprint: &str) -> Result<bool> {
        Ok(self.load()?.has_advice_fingerprint(fingerprint))
    }

    fn add_advice_fingerprint(&self, fingerprint: &str) -> Result<()> {
        let mut doc = self.load()?;
        if doc.insert_advice_fingerprint(fingerprint) {
            self.save(&doc)?;
        }
        Ok(())
    }

    /// Count actions in the hour ending now, pruning older entries
    fn count_actions_in_last_hour(&self) -> Result<usize> {
        self.count_actions_at(epoch_now())
    }

    /// Count actions in the hour ending at `now`, pruning older entries
    fn count_actions_at(&self, now: f64) -> Result<usize> {
        let mut doc = self.load()?;
        let pruned = doc.prune_actions(now);
        if pruned > 0 {
            debug!(pruned, "Pruned expired action timestamps");
            self.save(&doc)?;
        }
        Ok(doc.action_timestamps.len())
    }

    fn record_action_now(&self) -> Result<()> {
        self.record_action_at(epoch_now())
    }

    fn record_action_at(&self, timestamp: f64) -> Result<()> {
        let mut doc = self.load()?;
        doc.push_action(timestamp);
        self.save(&doc)
    }
}

/// JSON file backend
///
/// Writes go to a sibling `.tmp` file which is then renamed over the target,
/// so a crash mid-write leaves the previous document intact. Assumes a single
/// writer; two agents sharing one file is unsupported.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Open the store at `path`, creating an empty document if none exists.
    ///
    /// An existing file is parsed immediately so corruption is reported at
    /// startup instead of mid-cycle.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };
        store.ensure_dir()?;

        if store.path.exists() {
            store.load()?;
        } else {
            info!(path = %store.path.display(), "Creating empty state document");
            store.save(&StateDocument::default())?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<StateDocument> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            // Wholly absent is the only case that may start from empty
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("State document absent, starting empty");
                return Ok(StateDocument::default());
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(MoltError::StoreIntegrity(format!(
                    "{} is not valid UTF-8: {}",
                    self.path.display(),
                    e
                )));
            }
            Err(e) => return Err(MoltError::Io(e)),
        };

        serde_json::from_str(&content).map_err(|e| {
            MoltError::StoreIntegrity(format!(
                "{} could not be parsed: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn save(&self, doc: &StateDocument) -> Result<()> {
        let data = serde_json::to_string_pretty(doc)?;
        let tmp_path = self.temp_path();

        let mut file = File::create(&tmp_path)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// In-memory backend for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    doc: Mutex<StateDocument>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(doc: StateDocument) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<StateDocument> {
        self.doc
            .lock()
            .map(|doc| doc.clone())
            .map_err(|_| MoltError::StoreIntegrity("in-memory state lock poisoned".to_string()))
    }

    fn save(&self, doc: &StateDocument) -> Result<()> {
        let mut guard = self
            .doc
            .lock()
            .map_err(|_| MoltError::StoreIntegrity("in-memory state lock poisoned".to_string()))?;
        *guard = doc.clone();
        Ok(())
    }
}
