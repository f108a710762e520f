//! Conway's Game of Life (B3/S23) on unbounded boards stored as sparse sets
//! of live cells.

pub mod board;
pub mod config;
pub mod sparselife;

pub use board::{BoardId, BoardStore, FileBoardStore, MemoryBoardStore, Simulator};
pub use config::{EngineConfig, Settings};
pub use sparselife::{Cell, LiveSet};
