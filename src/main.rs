#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sparse_life::board::{BoardId, BoardStore, FileBoardStore, Simulator};
use sparse_life::config::{CONFIG_ENV, Settings};
use sparse_life::sparselife::{Cell, LiveSet};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "sparse-life.toml";
const DEFAULT_STORE_DIR: &str = "boards";

#[derive(Parser)]
#[command(name = "sparse-life", version, about = "Sparse Game of Life boards")]
struct Cli {
    /// Settings file.
    #[arg(long, env = CONFIG_ENV, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Board directory; overrides `[store] dir` from the settings file.
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Overrides `max_generations_before_ending`.
    #[arg(long)]
    max_generations: Option<u64>,

    /// Overrides `stable_population_iterations`.
    #[arg(long)]
    stable_iterations: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a board from `x,y` points and print its id.
    Seed {
        #[arg(required = true, allow_hyphen_values = true)]
        points: Vec<Cell>,
    },
    /// Print a board's live cells.
    Show { board: BoardId },
    /// Advance a board by N generations and print the result.
    Transition { board: BoardId, iterations: u64 },
    /// Run a board until it settles, delete it, and print the final state.
    End { board: BoardId },
    /// Delete expired boards.
    Purge,
}

#[derive(Serialize)]
struct BoardView {
    board: BoardId,
    population: usize,
    /// `(min_x, min_y, max_x, max_y)`, absent for an empty board.
    bounds: Option<(i64, i64, i64, i64)>,
    cells: Vec<Cell>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{text}");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_path(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;

    let dir = cli
        .store_dir
        .or(settings.store.dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));
    let mut store = FileBoardStore::open(&dir)
        .with_context(|| format!("opening board store at {}", dir.display()))?;
    if let Some(ttl) = settings.store.ttl() {
        store = store.with_ttl(ttl);
    }
    debug!(root = %store.root().display(), "opened board store");

    let mut engine = settings.engine;
    if let Some(n) = cli.max_generations {
        engine = engine.max_generations(n);
    }
    if let Some(n) = cli.stable_iterations {
        engine = engine.stable_iterations(n);
    }
    let simulator = Simulator::new(store, engine);
    debug!(config = ?simulator.config(), "engine configured");

    match cli.command {
        Command::Seed { points } => {
            let id = simulator.seed(points).context("seeding board")?;
            println!("{id}");
        }
        Command::Show { board } => {
            let cells = simulator.live_cells(board).context("reading board")?;
            let live: LiveSet = cells.iter().copied().collect();
            print_json(&BoardView {
                board,
                population: live.len(),
                bounds: live.bounds(),
                cells,
            })?;
        }
        Command::Transition { board, iterations } => {
            let cells = simulator
                .transition(board, iterations)
                .with_context(|| format!("advancing board {board}"))?;
            print_json(&cells)?;
        }
        Command::End { board } => {
            let report = simulator
                .end(board)
                .with_context(|| format!("ending board {board}"))?;
            print_json(&report)?;
        }
        Command::Purge => {
            let purged = simulator.store().purge_expired().context("purging boards")?;
            println!("{purged}");
        }
    }
    Ok(())
}
