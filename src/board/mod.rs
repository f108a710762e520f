//! Persisted boards and the operations that evolve them.

mod file_store;
mod simulator;
mod store;

pub use file_store::FileBoardStore;
pub use simulator::{EndReport, SimulationError, Simulator};
pub use store::{BoardId, BoardIdParseError, BoardStore, MemoryBoardStore, StoreError};
