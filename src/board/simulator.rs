//! Board lifecycle on top of a [`BoardStore`]: seed, advance, and end.
//!
//! `Simulator` holds only its store and an immutable config. Each call loads
//! the board, evolves a local copy, and writes the result back, so one
//! instance can serve many threads at once.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::store::{BoardId, BoardStore, StoreError};
use crate::config::EngineConfig;
use crate::sparselife::{Cell, LiveSet, Outcome, Unsettled, advance, run_until_settled};

#[derive(Debug, Error)]
pub enum SimulationError {
    /// `end` gave up; the board has been deleted anyway.
    #[error("board {board} did not stabilize within {max_generations} generations")]
    GenerationLimit {
        board: BoardId,
        max_generations: u64,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SimulationError {
    /// True when the board id was unknown (or expired) in the store.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StoreError::NotFound(_)))
    }
}

/// Result of a successful `end`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EndReport {
    pub board: BoardId,
    /// Final live cells in row-major order.
    pub cells: Vec<Cell>,
    /// Generations computed during the run.
    pub generations: u64,
    pub outcome: Outcome,
}

pub struct Simulator<S> {
    store: S,
    config: EngineConfig,
}

impl<S: BoardStore> Simulator<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a board holding `points` (duplicates collapse) and return its id.
    pub fn seed<I>(&self, points: I) -> Result<BoardId, SimulationError>
    where
        I: IntoIterator<Item = Cell>,
    {
        let live: LiveSet = points.into_iter().collect();
        let id = BoardId::random();
        self.store.create_board(id)?;
        if let Err(err) = self.store.replace_live_cells(id, &live) {
            // Leave no half-created board behind.
            if let Err(cleanup) = self.store.delete_board(id) {
                warn!(board = %id, %cleanup, "failed to remove partially seeded board");
            }
            return Err(err.into());
        }
        debug!(board = %id, population = live.len(), "seeded board");
        Ok(id)
    }

    /// Current live cells of a board, row-major.
    pub fn live_cells(&self, id: BoardId) -> Result<Vec<Cell>, SimulationError> {
        Ok(self.store.load_live_cells(id)?.to_sorted_vec())
    }

    /// Advance a board by `iterations` generations and store the result.
    ///
    /// Zero iterations only reads the board.
    pub fn transition(
        &self,
        id: BoardId,
        iterations: u64,
    ) -> Result<Vec<Cell>, SimulationError> {
        let live = self.store.load_live_cells(id)?;
        if iterations == 0 {
            return Ok(live.to_sorted_vec());
        }
        let before = live.len();
        let evolution = advance(live, iterations);
        self.store.replace_live_cells(id, &evolution.live)?;
        debug!(
            board = %id,
            requested = iterations,
            computed = evolution.generations,
            before,
            after = evolution.live.len(),
            "advanced board"
        );
        Ok(evolution.live.to_sorted_vec())
    }

    /// Run a board until it dies out or stabilizes, then delete it.
    ///
    /// The board is deleted even when the generation bound runs out; that
    /// case is reported as [`SimulationError::GenerationLimit`].
    pub fn end(&self, id: BoardId) -> Result<EndReport, SimulationError> {
        let live = self.store.load_live_cells(id)?;
        let limits = self.config.stability_limits();
        let result = run_until_settled(live, limits);
        self.store.delete_board(id)?;

        match result {
            Ok(settled) => {
                info!(
                    board = %id,
                    outcome = ?settled.outcome,
                    generations = settled.generations,
                    population = settled.live.len(),
                    "board ended"
                );
                Ok(EndReport {
                    board: id,
                    cells: settled.live.to_sorted_vec(),
                    generations: settled.generations,
                    outcome: settled.outcome,
                })
            }
            Err(Unsettled { live, generations }) => {
                warn!(
                    board = %id,
                    generations,
                    population = live.len(),
                    "board did not stabilize before the generation bound"
                );
                Err(SimulationError::GenerationLimit {
                    board: id,
                    max_generations: limits.max_generations,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{SimulationError, Simulator};
    use crate::board::store::{BoardId, BoardStore, MemoryBoardStore, StoreError};
    use crate::config::EngineConfig;
    use crate::sparselife::{Cell, LiveSet, Outcome};

    /// Memory store whose writes always fail, and optionally its deletes too.
    struct FailingWrites {
        inner: MemoryBoardStore,
        fail_delete: bool,
    }

    fn io_error() -> StoreError {
        StoreError::Io(std::io::Error::other("disk full"))
    }

    impl BoardStore for FailingWrites {
        fn create_board(&self, id: BoardId) -> Result<(), StoreError> {
            self.inner.create_board(id)
        }

        fn load_live_cells(&self, id: BoardId) -> Result<LiveSet, StoreError> {
            self.inner.load_live_cells(id)
        }

        fn replace_live_cells(&self, _id: BoardId, _cells: &LiveSet) -> Result<(), StoreError> {
            Err(io_error())
        }

        fn delete_board(&self, id: BoardId) -> Result<(), StoreError> {
            if self.fail_delete {
                return Err(io_error());
            }
            self.inner.delete_board(id)
        }

        fn contains_board(&self, id: BoardId) -> Result<bool, StoreError> {
            self.inner.contains_board(id)
        }

        fn purge_expired(&self) -> Result<usize, StoreError> {
            self.inner.purge_expired()
        }
    }

    fn cells(coords: &[(i64, i64)]) -> Vec<Cell> {
        coords.iter().copied().map(Cell::from).collect()
    }

    #[test]
    fn seed_creates_exactly_one_board() {
        let store = Arc::new(MemoryBoardStore::new());
        let sim = Simulator::new(store.clone(), EngineConfig::new(10, 2));
        let id = sim.seed(cells(&[(0, 0)])).unwrap();
        assert!(store.contains_board(id).unwrap());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn failed_seed_write_removes_the_board() {
        let sim = Simulator::new(
            FailingWrites {
                inner: MemoryBoardStore::new(),
                fail_delete: false,
            },
            EngineConfig::new(10, 2),
        );
        let err = sim.seed(cells(&[(0, 0)])).unwrap_err();
        assert!(matches!(err, SimulationError::Store(StoreError::Io(_))));
        assert!(sim.store().inner.is_empty().unwrap());
    }

    #[test]
    fn failed_cleanup_still_reports_the_write_error() {
        let sim = Simulator::new(
            FailingWrites {
                inner: MemoryBoardStore::new(),
                fail_delete: true,
            },
            EngineConfig::new(10, 2),
        );
        let err = sim.seed(cells(&[(0, 0)])).unwrap_err();
        assert!(matches!(err, SimulationError::Store(StoreError::Io(_))));
        assert_eq!(sim.store().inner.len().unwrap(), 1);
    }

    #[test]
    fn unknown_board_is_not_found() {
        let sim = Simulator::new(MemoryBoardStore::new(), EngineConfig::new(10, 2));
        let id = BoardId::from_raw(77);
        assert!(sim.transition(id, 1).unwrap_err().is_not_found());
        assert!(sim.end(id).unwrap_err().is_not_found());
        assert!(sim.live_cells(id).unwrap_err().is_not_found());
    }

    #[test]
    fn end_reports_period_and_generations() {
        let sim = Simulator::new(MemoryBoardStore::new(), EngineConfig::new(100, 2));
        let id = sim.seed(cells(&[(0, 0), (1, 0), (0, 1), (1, 1)])).unwrap();
        let report = sim.end(id).unwrap();
        assert_eq!(report.board, id);
        assert_eq!(report.outcome, Outcome::Stable { period: 1 });
        assert_eq!(report.generations, 3);
        assert_eq!(report.cells.len(), 4);
    }

    #[test]
    fn generation_limit_message_names_the_bound() {
        let sim = Simulator::new(MemoryBoardStore::new(), EngineConfig::new(3, 50));
        let id = sim.seed(cells(&[(1, 0), (1, 1), (1, 2)])).unwrap();
        let err = sim.end(id).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::GenerationLimit {
                max_generations: 3,
                ..
            }
        ));
        assert!(err.to_string().contains("within 3 generations"));
    }

    #[test]
    fn zero_iterations_reads_without_writing() {
        let sim = Simulator::new(MemoryBoardStore::new(), EngineConfig::new(10, 2));
        let id = sim.seed(cells(&[(5, 5), (5, 5), (6, 5)])).unwrap();
        assert_eq!(sim.transition(id, 0).unwrap(), cells(&[(5, 5), (6, 5)]));
        assert_eq!(sim.live_cells(id).unwrap(), cells(&[(5, 5), (6, 5)]));
    }

    #[test]
    fn end_report_serializes_outcome_tag() {
        let sim = Simulator::new(MemoryBoardStore::new(), EngineConfig::new(10, 2));
        let id = sim.seed(cells(&[(0, 0)])).unwrap();
        let report = sim.end(id).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["kind"], "extinct");
        assert_eq!(json["cells"], serde_json::json!([]));
        assert_eq!(json["generations"], 1);
    }
}
