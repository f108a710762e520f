//! Run a board until it dies out or its population stops changing.
//!
//! Stability is judged on population size alone, sampled at several fixed
//! periods. A still life repeats at period 1 and small oscillators repeat at
//! their own period, so no board snapshots are kept. A pattern that returns
//! to the same size in a different arrangement can be reported as stable.

use serde::Serialize;
use thiserror::Error;

use super::cell_set::LiveSet;
use super::generation::next_generation;

/// Sampling periods, in the order they are checked. The first period to
/// reach the repeat threshold wins.
pub const STABILITY_PERIODS: [u64; 8] = [1, 2, 3, 4, 8, 14, 15, 30];

/// Bounds for [`run_until_settled`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StabilityLimits {
    /// Generations evaluated before giving up.
    pub max_generations: u64,
    /// Consecutive unchanged samples required at one period.
    pub stable_iterations: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PeriodSample {
    period: u64,
    population: Option<usize>,
    repeats: u32,
}

/// Per-period population history for one run.
#[derive(Clone, Debug)]
pub struct PopulationTracker {
    samples: [PeriodSample; STABILITY_PERIODS.len()],
    threshold: u32,
}

impl PopulationTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            samples: STABILITY_PERIODS.map(|period| PeriodSample {
                period,
                population: None,
                repeats: 0,
            }),
            threshold,
        }
    }

    /// Record `population` at zero-based `generation`.
    ///
    /// Returns the period whose sample has now repeated `threshold` times in a
    /// row. Periods that do not divide `generation` are left untouched.
    pub fn observe(&mut self, generation: u64, population: usize) -> Option<u64> {
        for sample in &mut self.samples {
            if generation % sample.period != 0 {
                continue;
            }
            if sample.population == Some(population) {
                sample.repeats = sample.repeats.saturating_add(1);
                if sample.repeats >= self.threshold {
                    return Some(sample.period);
                }
            } else {
                sample.population = Some(population);
                sample.repeats = 0;
            }
        }
        None
    }
}

/// How a settled run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Every cell died.
    Extinct,
    /// Population repeated at `period` often enough to be called stable.
    Stable { period: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settled {
    pub live: LiveSet,
    /// Generations computed before the outcome was decided.
    pub generations: u64,
    pub outcome: Outcome,
}

/// The generation bound ran out before the board settled.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("population did not settle within {generations} generations")]
pub struct Unsettled {
    /// State after the last evaluated generation.
    pub live: LiveSet,
    pub generations: u64,
}

/// Evolve `live` until it is extinct or stable, or `limits.max_generations`
/// generations have been computed.
///
/// An already-empty set is extinct without computing any generation.
pub fn run_until_settled(live: LiveSet, limits: StabilityLimits) -> Result<Settled, Unsettled> {
    if live.is_empty() {
        return Ok(Settled {
            live,
            generations: 0,
            outcome: Outcome::Extinct,
        });
    }

    let mut live = live;
    let mut tracker = PopulationTracker::new(limits.stable_iterations);
    for generation in 0..limits.max_generations {
        live = next_generation(&live);
        if live.is_empty() {
            return Ok(Settled {
                live,
                generations: generation + 1,
                outcome: Outcome::Extinct,
            });
        }
        if let Some(period) = tracker.observe(generation, live.len()) {
            return Ok(Settled {
                live,
                generations: generation + 1,
                outcome: Outcome::Stable { period },
            });
        }
    }

    Err(Unsettled {
        live,
        generations: limits.max_generations,
    })
}
