use std::collections::HashSet;

use rand::RngCore;
use rand::SeedableRng;
use sparse_life::sparselife::{Cell, LiveSet, advance, next_generation};

fn live(cells: &[(i64, i64)]) -> LiveSet {
    LiveSet::from_coords(cells.iter().copied())
}

fn assert_alive(set: &LiveSet, cells: &[(i64, i64)]) {
    for &(x, y) in cells {
        assert!(set.contains(Cell::new(x, y)), "expected alive at ({x},{y})");
    }
}

fn assert_dead(set: &LiveSet, cells: &[(i64, i64)]) {
    for &(x, y) in cells {
        assert!(!set.contains(Cell::new(x, y)), "expected dead at ({x},{y})");
    }
}

fn step_naive(cells: &HashSet<(i64, i64)>) -> HashSet<(i64, i64)> {
    let mut next = HashSet::new();
    let mut candidates = HashSet::new();
    for &(x, y) in cells {
        for dy in -1..=1 {
            for dx in -1..=1 {
                candidates.insert((x + dx, y + dy));
            }
        }
    }

    for (x, y) in candidates {
        let mut neighbors = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if cells.contains(&(x + dx, y + dy)) {
                    neighbors += 1;
                }
            }
        }
        let alive = cells.contains(&(x, y));
        let next_alive = if alive {
            neighbors == 2 || neighbors == 3
        } else {
            neighbors == 3
        };
        if next_alive {
            next.insert((x, y));
        }
    }

    next
}

fn as_tuples(set: &LiveSet) -> HashSet<(i64, i64)> {
    set.iter().map(<(i64, i64)>::from).collect()
}

#[test]
fn isolated_and_lonely_cells_die() {
    // Zero and one neighbor.
    let next = next_generation(&live(&[(0, 0), (10, 10), (11, 10)]));
    assert!(next.is_empty());
}

#[test]
fn two_or_three_neighbors_survive() {
    // (1,1) has two neighbors in the L, three once the corner is filled.
    let next = next_generation(&live(&[(0, 0), (1, 1), (2, 2)]));
    assert_alive(&next, &[(1, 1)]);
    assert_dead(&next, &[(0, 0), (2, 2)]);

    let next = next_generation(&live(&[(0, 0), (1, 0), (0, 1), (1, 1)]));
    assert_alive(&next, &[(1, 1)]);
}

#[test]
fn overcrowded_cell_dies() {
    // Center of a plus has four neighbors.
    let next = next_generation(&live(&[(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)]));
    assert_dead(&next, &[(0, 0)]);
    assert_alive(&next, &[(1, 0), (-1, 0), (0, 1), (0, -1)]);
}

#[test]
fn exactly_three_neighbors_give_birth() {
    let next = next_generation(&live(&[(0, 0), (2, 0), (1, 2)]));
    assert_alive(&next, &[(1, 1)]);
    assert_eq!(next.len(), 1);

    // Two neighbors are not enough.
    let next = next_generation(&live(&[(0, 0), (2, 0)]));
    assert_dead(&next, &[(1, 1), (1, 0), (1, -1)]);
}

#[test]
fn block_is_stable() {
    let block = [(0, 0), (1, 0), (0, 1), (1, 1)];
    let next = next_generation(&live(&block));
    assert_eq!(next, live(&block));
    assert_dead(&next, &[(2, 0), (2, 1), (-1, 0), (-1, 1)]);
}

#[test]
fn blinker_oscillates() {
    let vertical = live(&[(1, 0), (1, 1), (1, 2)]);
    let horizontal = next_generation(&vertical);
    assert_eq!(horizontal, live(&[(0, 1), (1, 1), (2, 1)]));
    assert_eq!(next_generation(&horizontal), vertical);
}

#[test]
fn glider_moves_diagonally_every_four_steps() {
    let glider = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];
    let evolution = advance(live(&glider), 4);
    let shifted: Vec<(i64, i64)> = glider.iter().map(|&(x, y)| (x + 1, y + 1)).collect();
    assert_eq!(evolution.live, live(&shifted));
    assert_eq!(evolution.generations, 4);
}

#[test]
fn patterns_far_from_origin_behave_the_same() {
    let far = i64::MAX / 2;
    let blinker = live(&[(far, -far), (far + 1, -far), (far + 2, -far)]);
    let next = next_generation(&blinker);
    assert_eq!(
        next,
        live(&[(far + 1, -far - 1), (far + 1, -far), (far + 1, -far + 1)])
    );
}

#[test]
fn advance_is_additive() {
    let r_pentomino = live(&[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)]);
    for (a, b) in [(0, 5), (3, 4), (7, 0), (10, 13)] {
        let split = advance(advance(r_pentomino.clone(), a).live, b).live;
        let whole = advance(r_pentomino.clone(), a + b).live;
        assert_eq!(split, whole, "advance({a}) then advance({b}) diverged");
    }
}

fn run_parity_case(side: i64, density: f64, steps: u64, seed: u64) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let threshold = (u64::MAX as f64 * density) as u64;

    let mut naive = HashSet::new();
    for y in -(side / 2)..=(side / 2) {
        for x in -(side / 2)..=(side / 2) {
            if rng.next_u64() <= threshold {
                naive.insert((x, y));
            }
        }
    }
    let mut sparse = LiveSet::from_coords(naive.iter().copied());

    for step in 0..steps {
        assert_eq!(
            as_tuples(&sparse),
            naive,
            "live-set mismatch at step {step} for density {density} seed {seed}"
        );
        sparse = next_generation(&sparse);
        naive = step_naive(&naive);
    }
}

#[test]
fn parity_sparse_mid_dense() {
    run_parity_case(48, 0.10, 8, 0xA1);
    run_parity_case(48, 0.42, 8, 0xB2);
    run_parity_case(48, 0.83, 5, 0xC3);
}

#[test]
fn parity_multiple_seeds() {
    for seed in [11u64, 22, 33, 44] {
        run_parity_case(36, 0.35, 10, seed);
    }
}
