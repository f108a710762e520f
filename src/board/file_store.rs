//! One JSON file per board under a root directory.
//!
//! Board files are only ever published whole: a record is written to a
//! sibling temp file, then hard-linked (create) or renamed (replace) into
//! place, so readers see either no board, the old cell set, or the new one.
//!
//! Every operation on a board holds that board's lock for its whole
//! read-check-write sequence. Locks are shared by all stores opened on the
//! same root within a process; separate processes only get the atomic
//! publish, not mutual exclusion.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

use super::store::{BoardId, BoardRecord, BoardStore, StoreError, unix_millis};
use crate::sparselife::LiveSet;

const EXTENSION: &str = "json";
const LOCK_STRIPES: usize = 64;

/// Striped per-board locks for one store root.
#[derive(Debug)]
struct BoardLocks {
    stripes: Vec<Mutex<()>>,
}

impl BoardLocks {
    fn new() -> Self {
        Self {
            stripes: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    fn lock(&self, id: BoardId) -> MutexGuard<'_, ()> {
        let stripe = &self.stripes[(id.raw() % LOCK_STRIPES as u64) as usize];
        // The mutex guards no data, so a poisoned one is still usable.
        stripe.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The lock set for `root`, created on first use.
fn locks_for(root: &Path) -> Arc<BoardLocks> {
    static REGISTRY: OnceLock<Mutex<HashMap<PathBuf, Arc<BoardLocks>>>> = OnceLock::new();
    let mut registry = REGISTRY
        .get_or_init(Mutex::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(
        registry
            .entry(root.to_path_buf())
            .or_insert_with(|| Arc::new(BoardLocks::new())),
    )
}

#[derive(Debug, Clone)]
pub struct FileBoardStore {
    root: PathBuf,
    ttl: Option<Duration>,
    locks: Arc<BoardLocks>,
}

impl FileBoardStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let root = fs::canonicalize(&root)?;
        let locks = locks_for(&root);
        Ok(Self {
            root,
            ttl: None,
            locks,
        })
    }

    /// Boards created from now on expire `ttl` after creation.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn board_path(&self, id: BoardId) -> PathBuf {
        self.root.join(format!("{id}.{EXTENSION}"))
    }

    fn read_record(&self, path: &Path, id: BoardId) -> Result<BoardRecord, StoreError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound(id)),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Read a board, treating an expired one as absent and removing it.
    /// Caller holds the board lock.
    fn read_live_record(&self, id: BoardId) -> Result<BoardRecord, StoreError> {
        let path = self.board_path(id);
        let record = self.read_record(&path, id)?;
        if record.is_expired(unix_millis(SystemTime::now())) {
            remove_if_present(&path)?;
            debug!(board = %id, "dropped expired board");
            return Err(StoreError::NotFound(id));
        }
        Ok(record)
    }

    /// Write `record` to a fresh temp file next to the board file.
    fn write_temp(&self, id: BoardId, record: &BoardRecord) -> Result<PathBuf, StoreError> {
        let tmp = self
            .root
            .join(format!("{id}.{EXTENSION}.tmp-{:016x}", rand::random::<u64>()));
        let result = (|| -> Result<(), StoreError> {
            let mut file = OpenOptions::new().write(true).create_new(true).open(&tmp)?;
            serde_json::to_writer(&mut file, record)?;
            file.flush()?;
            file.sync_all()?;
            Ok(())
        })();
        match result {
            Ok(()) => Ok(tmp),
            Err(err) => {
                let _ = fs::remove_file(&tmp);
                Err(err)
            }
        }
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

impl BoardStore for FileBoardStore {
    fn create_board(&self, id: BoardId) -> Result<(), StoreError> {
        let _guard = self.locks.lock(id);
        match self.read_live_record(id) {
            Ok(_) => return Err(StoreError::AlreadyExists(id)),
            Err(StoreError::NotFound(_)) => {}
            Err(err) => return Err(err),
        }
        let tmp = self.write_temp(id, &BoardRecord::new(self.ttl))?;
        // `hard_link` refuses to overwrite, so another process that created
        // the board first still wins.
        let linked = fs::hard_link(&tmp, self.board_path(id));
        remove_if_present(&tmp)?;
        match linked {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::AlreadyExists(id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn load_live_cells(&self, id: BoardId) -> Result<LiveSet, StoreError> {
        let _guard = self.locks.lock(id);
        Ok(self.read_live_record(id)?.cells)
    }

    fn replace_live_cells(&self, id: BoardId, cells: &LiveSet) -> Result<(), StoreError> {
        let _guard = self.locks.lock(id);
        let mut record = self.read_live_record(id)?;
        record.cells = cells.clone();
        let tmp = self.write_temp(id, &record)?;
        if let Err(err) = fs::rename(&tmp, self.board_path(id)) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }

    fn delete_board(&self, id: BoardId) -> Result<(), StoreError> {
        let _guard = self.locks.lock(id);
        remove_if_present(&self.board_path(id))?;
        Ok(())
    }

    fn contains_board(&self, id: BoardId) -> Result<bool, StoreError> {
        let _guard = self.locks.lock(id);
        match self.read_live_record(id) {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = unix_millis(SystemTime::now());
        let mut purged = 0;
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<BoardId>().ok())
            else {
                continue;
            };

            let _guard = self.locks.lock(id);
            let record = match self.read_record(&path, id) {
                Ok(record) => record,
                Err(StoreError::NotFound(_)) => continue,
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping unreadable board file");
                    continue;
                }
            };
            if record.is_expired(now) {
                remove_if_present(&path)?;
                purged += 1;
            }
        }
        if purged > 0 {
            warn!(purged, root = %self.root.display(), "purged expired boards");
        }
        Ok(purged)
    }
}
