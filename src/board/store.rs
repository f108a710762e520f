//! Board persistence boundary and the in-memory store.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::sparselife::LiveSet;

/// Opaque board identifier, shown as 16 hex digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BoardId(u64);

impl BoardId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn random() -> Self {
        Self(rand::random())
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid board id {0:?}: expected 1-16 hex digits")]
pub struct BoardIdParseError(String);

impl FromStr for BoardId {
    type Err = BoardIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.len() > 16 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(BoardIdParseError(s.to_string()));
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| BoardIdParseError(s.to_string()))
    }
}

impl From<BoardId> for String {
    fn from(id: BoardId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for BoardId {
    type Error = BoardIdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("board {0} not found")]
    NotFound(BoardId),
    #[error("board {0} already exists")]
    AlreadyExists(BoardId),
    #[error("board store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("board record is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("board store lock poisoned")]
    Poisoned,
}

/// Durable storage for boards and their live cells.
///
/// Implementations must keep operations on one board serializable; they may
/// be called concurrently for different boards.
pub trait BoardStore: Send + Sync {
    /// Register a new, empty board.
    fn create_board(&self, id: BoardId) -> Result<(), StoreError>;

    /// Current live cells. Empty if the board has none; `NotFound` if the
    /// board does not exist or has expired.
    fn load_live_cells(&self, id: BoardId) -> Result<LiveSet, StoreError>;

    /// Discard the board's live cells and store `cells` in their place.
    fn replace_live_cells(&self, id: BoardId, cells: &LiveSet) -> Result<(), StoreError>;

    /// Remove the board. Succeeds if it is already gone.
    fn delete_board(&self, id: BoardId) -> Result<(), StoreError>;

    fn contains_board(&self, id: BoardId) -> Result<bool, StoreError>;

    /// Drop every expired board, returning how many were removed.
    fn purge_expired(&self) -> Result<usize, StoreError>;
}

impl<S: BoardStore + ?Sized> BoardStore for Arc<S> {
    fn create_board(&self, id: BoardId) -> Result<(), StoreError> {
        (**self).create_board(id)
    }

    fn load_live_cells(&self, id: BoardId) -> Result<LiveSet, StoreError> {
        (**self).load_live_cells(id)
    }

    fn replace_live_cells(&self, id: BoardId, cells: &LiveSet) -> Result<(), StoreError> {
        (**self).replace_live_cells(id, cells)
    }

    fn delete_board(&self, id: BoardId) -> Result<(), StoreError> {
        (**self).delete_board(id)
    }

    fn contains_board(&self, id: BoardId) -> Result<bool, StoreError> {
        (**self).contains_board(id)
    }

    fn purge_expired(&self) -> Result<usize, StoreError> {
        (**self).purge_expired()
    }
}

pub(crate) fn unix_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis().min(u64::MAX as u128) as u64)
        .unwrap_or(0)
}

/// One stored board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BoardRecord {
    /// Expiry as Unix milliseconds; `None` never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<u64>,
    pub cells: LiveSet,
}

impl BoardRecord {
    pub fn new(ttl: Option<Duration>) -> Self {
        let expires_at_ms = ttl.map(|ttl| {
            let ttl_ms = ttl.as_millis().min(u64::MAX as u128) as u64;
            unix_millis(SystemTime::now()).saturating_add(ttl_ms)
        });
        Self {
            expires_at_ms,
            cells: LiveSet::new(),
        }
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at_ms.is_some_and(|at| now_ms >= at)
    }
}

/// Boards held in a mutex-guarded map. Cheap to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryBoardStore {
    boards: Mutex<HashMap<BoardId, BoardRecord>>,
    ttl: Option<Duration>,
}

impl MemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boards expire `ttl` after creation.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            boards: Mutex::default(),
            ttl: Some(ttl),
        }
    }

    /// Stored boards, including expired ones not yet purged.
    pub fn len(&self) -> Result<usize, StoreError> {
        let boards = self.boards.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(boards.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn with_live_board<T>(
        &self,
        id: BoardId,
        f: impl FnOnce(&mut BoardRecord) -> T,
    ) -> Result<T, StoreError> {
        let mut boards = self.boards.lock().map_err(|_| StoreError::Poisoned)?;
        let now = unix_millis(SystemTime::now());
        if boards.get(&id).is_some_and(|record| record.is_expired(now)) {
            boards.remove(&id);
            debug!(board = %id, "dropped expired board");
            return Err(StoreError::NotFound(id));
        }
        boards.get_mut(&id).map(f).ok_or(StoreError::NotFound(id))
    }
}

impl BoardStore for MemoryBoardStore {
    fn create_board(&self, id: BoardId) -> Result<(), StoreError> {
        let mut boards = self.boards.lock().map_err(|_| StoreError::Poisoned)?;
        let now = unix_millis(SystemTime::now());
        if boards.get(&id).is_some_and(|record| !record.is_expired(now)) {
            return Err(StoreError::AlreadyExists(id));
        }
        boards.insert(id, BoardRecord::new(self.ttl));
        Ok(())
    }

    fn load_live_cells(&self, id: BoardId) -> Result<LiveSet, StoreError> {
        self.with_live_board(id, |record| record.cells.clone())
    }

    fn replace_live_cells(&self, id: BoardId, cells: &LiveSet) -> Result<(), StoreError> {
        self.with_live_board(id, |record| record.cells = cells.clone())
    }

    fn delete_board(&self, id: BoardId) -> Result<(), StoreError> {
        let mut boards = self.boards.lock().map_err(|_| StoreError::Poisoned)?;
        boards.remove(&id);
        Ok(())
    }

    fn contains_board(&self, id: BoardId) -> Result<bool, StoreError> {
        let boards = self.boards.lock().map_err(|_| StoreError::Poisoned)?;
        let now = unix_millis(SystemTime::now());
        Ok(boards.get(&id).is_some_and(|record| !record.is_expired(now)))
    }

    fn purge_expired(&self) -> Result<usize, StoreError> {
        let mut boards = self.boards.lock().map_err(|_| StoreError::Poisoned)?;
        let now = unix_millis(SystemTime::now());
        let before = boards.len();
        boards.retain(|_, record| !record.is_expired(now));
        let purged = before - boards.len();
        if purged > 0 {
            warn!(purged, "purged expired boards");
        }
        Ok(purged)
    }
}
