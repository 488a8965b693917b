//! Randomized fill trials.
//!
//! A trial keeps throwing uniformly random tower requests at a grid until a
//! try budget runs out or a stop condition is met. A batch repeats that on a
//! freshly reset grid and records the outcome of each trial.
//!
//! The random source is always passed in. Seed it (e.g. `StdRng::seed_from_u64`)
//! for reproducible batches.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoverageError, Result};
use crate::grid::{Grid, Rect};

/// Stop conditions for one fill trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Maximum number of random tower requests.
    pub max_try: usize,
    /// Stop once this many towers are placed.
    pub n_tower: usize,
    /// Stop once at least this many cells are covered.
    pub final_cover: usize,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            max_try: 100,
            n_tower: 10,
            final_cover: 1,
        }
    }
}

impl TrialConfig {
    /// Check the config against the grid it will run on.
    pub fn validate(&self, grid: &Grid) -> Result<()> {
        if self.max_try == 0 {
            return Err(invalid("max_try", "must be > 0".into()));
        }
        if self.n_tower == 0 {
            return Err(invalid("n_tower", "must be > 0".into()));
        }
        if self.final_cover == 0 || self.final_cover > grid.total_cells() {
            return Err(invalid(
                "final_cover",
                format!("must be in 1..={}, got {}", grid.total_cells(), self.final_cover),
            ));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: String) -> CoverageError {
    CoverageError::InvalidParameter { name, reason }
}

/// Draw a uniform random request that always fits inside `grid`.
///
/// The origin is uniform over all cells, then each extent is uniform over
/// what remains toward the far edge.
pub fn random_candidate(rng: &mut impl Rng, grid: &Grid) -> Rect {
    let (x_range, y_range) = (grid.x_range(), grid.y_range());
    let x = rng.gen_range(0..x_range);
    let y = rng.gen_range(0..y_range);
    let size_x = rng.gen_range(1..=x_range - x);
    let size_y = rng.gen_range(1..=y_range - y);
    Rect::new(x, y, size_x, size_y)
}

/// Why a fill trial ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// One tower per cell; nothing more can be placed.
    Saturated,
    TowerLimit,
    CoverageReached,
    OutOfTries,
}

fn stop_reason(grid: &Grid, config: &TrialConfig) -> Option<StopReason> {
    if grid.tower_count() == grid.max_towers() {
        Some(StopReason::Saturated)
    } else if grid.tower_count() == config.n_tower {
        Some(StopReason::TowerLimit)
    } else if config.final_cover <= grid.covered_cells() {
        Some(StopReason::CoverageReached)
    } else {
        None
    }
}

/// Outcome of a single fill trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillOutcome {
    /// Requests drawn, including ones that placed nothing.
    pub tries: usize,
    pub stop: StopReason,
}

/// Fill `grid` with random towers until a stop condition holds.
///
/// Stop conditions are checked before every request, in order: saturation,
/// tower limit, coverage target. When the budget runs out they are checked
/// once more, so `OutOfTries` means none of them holds. The grid is not
/// reset first.
pub fn auto_fill(
    grid: &mut Grid,
    rng: &mut impl Rng,
    config: &TrialConfig,
) -> Result<FillOutcome> {
    config.validate(grid)?;

    let mut tries = 0;
    while tries < config.max_try {
        if let Some(stop) = stop_reason(grid, config) {
            return Ok(FillOutcome { tries, stop });
        }
        let candidate = random_candidate(rng, grid);
        grid.place(&candidate)?;
        tries += 1;
    }

    // The last draw may itself have met a stop condition.
    Ok(FillOutcome {
        tries,
        stop: stop_reason(grid, config).unwrap_or(StopReason::OutOfTries),
    })
}

/// Per-trial records of a batch, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub tries: Vec<usize>,
    pub towers: Vec<usize>,
    pub coverage: Vec<usize>,
    pub stops: Vec<StopReason>,
    /// Coverage target the batch ran with.
    pub final_cover: usize,
}

/// min / mean / max of one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

impl SeriesStats {
    fn of(values: &[usize]) -> Option<Self> {
        let min = *values.iter().min()?;
        let max = *values.iter().max()?;
        let mean = values.iter().sum::<usize>() as f64 / values.len() as f64;
        Some(Self { min, max, mean })
    }
}

/// Aggregate view of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub trials: usize,
    pub tries: SeriesStats,
    pub towers: SeriesStats,
    pub coverage: SeriesStats,
    /// Fraction of trials that reached the coverage target.
    pub target_hit_rate: f64,
}

impl BatchRecord {
    pub fn len(&self) -> usize {
        self.tries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tries.is_empty()
    }

    /// `None` for an empty record.
    pub fn summary(&self) -> Option<BatchSummary> {
        let hits = self
            .coverage
            .iter()
            .filter(|&&c| c >= self.final_cover)
            .count();
        Some(BatchSummary {
            trials: self.len(),
            tries: SeriesStats::of(&self.tries)?,
            towers: SeriesStats::of(&self.towers)?,
            coverage: SeriesStats::of(&self.coverage)?,
            target_hit_rate: hits as f64 / self.len() as f64,
        })
    }
}

/// Run `n_exp` independent fill trials on `grid`, resetting between them.
///
/// The grid is reset before the first trial and is left empty afterwards.
pub fn batch_experiment(
    grid: &mut Grid,
    rng: &mut impl Rng,
    n_exp: usize,
    config: &TrialConfig,
) -> Result<BatchRecord> {
    if n_exp == 0 {
        return Err(invalid("n_exp", "must be > 0".into()));
    }
    config.validate(grid)?;

    let mut record = BatchRecord {
        final_cover: config.final_cover,
        ..Default::default()
    };
    grid.reset();

    for _ in 0..n_exp {
        let outcome = auto_fill(grid, rng, config)?;
        record.tries.push(outcome.tries);
        record.towers.push(grid.tower_count());
        record.coverage.push(grid.covered_cells());
        record.stops.push(outcome.stop);
        grid.reset();
    }

    if let Some(summary) = record.summary() {
        log::info!(
            "batch of {} on {}×{}: mean coverage {:.1}/{} cells, mean towers {:.1}",
            n_exp,
            grid.x_range(),
            grid.y_range(),
            summary.coverage.mean,
            grid.total_cells(),
            summary.towers.mean
        );
    }
    Ok(record)
}
