#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use rand::RngCore;
use rand::SeedableRng;
use rayon::prelude::*;
use sparse_life::board::{MemoryBoardStore, SimulationError, Simulator};
use sparse_life::config::EngineConfig;
use sparse_life::sparselife::{Cell, LiveSet, advance};
use std::time::Instant;

const MAX_GENERATIONS: u64 = 5_000;
const STABLE_ITERATIONS: u32 = 20;

fn random_soup(side: i64, density: f64, seed: u64) -> Vec<Cell> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let threshold = (u64::MAX as f64 * density) as u64;
    let mut cells = Vec::new();
    for y in 0..side {
        for x in 0..side {
            if rng.next_u64() <= threshold {
                cells.push(Cell::new(x, y));
            }
        }
    }
    cells
}

fn bench_transition(label: &str, side: i64, density: f64, steps: u64) {
    let soup: LiveSet = random_soup(side, density, 0xBEEF_CAFE).into_iter().collect();
    let start_pop = soup.len();

    let start = Instant::now();
    let evolution = advance(soup, steps);
    let elapsed = start.elapsed();

    let total_ms = elapsed.as_secs_f64() * 1000.0;
    let avg_us = total_ms * 1000.0 / evolution.generations.max(1) as f64;
    println!(
        "{:<28} {:>6} iters  {:>10.1} ms total  {:>10.1} us/step  pop={}->{}",
        label,
        evolution.generations,
        total_ms,
        avg_us,
        start_pop,
        evolution.live.len()
    );
}

/// Many boards ended concurrently through one shared simulator.
fn bench_end_parallel(boards: u64, side: i64, density: f64) {
    let simulator = Simulator::new(
        MemoryBoardStore::new(),
        EngineConfig::new(MAX_GENERATIONS, STABLE_ITERATIONS),
    );

    let ids: Vec<_> = (0..boards)
        .into_par_iter()
        .map(|i| simulator.seed(random_soup(side, density, 0x5EED_0000 + i)))
        .collect::<Result<_, _>>()
        .expect("seeding benchmark boards");

    let start = Instant::now();
    let results: Vec<_> = ids.par_iter().map(|&id| simulator.end(id)).collect();
    let elapsed = start.elapsed();

    let mut settled = 0usize;
    let mut unsettled = 0usize;
    let mut generations = 0u64;
    for result in results {
        match result {
            Ok(report) => {
                settled += 1;
                generations += report.generations;
            }
            Err(SimulationError::GenerationLimit { .. }) => unsettled += 1,
            Err(err) => panic!("end failed: {err}"),
        }
    }

    let total_ms = elapsed.as_secs_f64() * 1000.0;
    println!(
        "{:<28} {:>6} boards {:>10.1} ms total  settled={} unsettled={} avg_gens={:.1} \
         max_gens={} threads={}",
        format!("end {side}x{side} d={density}"),
        boards,
        total_ms,
        settled,
        unsettled,
        generations as f64 / settled.max(1) as f64,
        simulator.config().max_generations_before_ending,
        rayon::current_num_threads()
    );
    assert!(
        matches!(simulator.store().is_empty(), Ok(true)),
        "ended boards must be deleted"
    );
}

fn main() {
    println!("=== Sparse Life Benchmark ===\n");

    bench_transition("soup 32x32 d=0.35", 32, 0.35, 1_000);
    bench_transition("soup 128x128 d=0.35", 128, 0.35, 200);
    bench_transition("soup 256x256 d=0.2", 256, 0.2, 100);

    println!();
    bench_end_parallel(64, 16, 0.4);
    bench_end_parallel(32, 48, 0.35);
}
