//! Coverage Headless Trial Harness
//!
//! Validates tower placement logic and runs seeded batch experiments.
//! Runs entirely in-process: no rendering, nothing written to disk.
//!
//! Usage:
//!   cargo run -p coverage-simtest
//!   cargo run -p coverage-simtest -- --verbose
//!   cargo run -p coverage-simtest -- --config scenarios.json --seed 42 --json

use std::path::PathBuf;

use clap::Parser;
use coverage_logic::grid::{Grid, Rect, BLANK};
use coverage_logic::rectangle::find_maximal_blank_rectangle;
use coverage_logic::trial::{auto_fill, batch_experiment, BatchSummary, TrialConfig};
use coverage_logic::validate::validate_grid;
use coverage_logic::CoverageError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

// ── Built-in scenarios ──────────────────────────────────────────────────
const SCENARIOS_JSON: &str = include_str!("../../../data/trial_scenarios.json");

/// One batch experiment to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Scenario {
    name: String,
    x_range: usize,
    y_range: usize,
    seed: u64,
    n_exp: usize,
    trial: TrialConfig,
}

#[derive(Parser, Debug)]
#[command(
    name = "coverage-simtest",
    about = "Headless tower coverage harness: invariant checks and seeded batch experiments"
)]
struct CliArgs {
    /// Print every check and per-scenario statistics, not only failures.
    #[arg(short, long)]
    verbose: bool,
    /// Scenario file (JSON array) to run instead of the built-in set.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override the seed of every scenario.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Emit the final report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Serialize)]
struct ScenarioReport {
    name: String,
    x_range: usize,
    y_range: usize,
    seed: u64,
    summary: Option<BatchSummary>,
}

#[derive(Serialize)]
struct Report {
    passed: usize,
    failed: usize,
    failures: Vec<String>,
    scenarios: Vec<ScenarioReport>,
}

fn main() {
    let args = CliArgs::parse();

    // Library logs go to stderr; RUST_LOG overrides the default level.
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    log::debug!("harness started with {:?}", args);

    let scenarios = match load_scenarios(&args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    if !args.json {
        println!("=== Coverage Trial Harness ===\n");
    }

    let mut results = Vec::new();

    // 1. Placement rules on hand-built grids
    results.extend(validate_placement_rules(&args));

    // 2. Finder against a brute-force oracle
    results.extend(validate_finder(&args));

    // 3. Scenario batches
    let (scenario_results, reports) = run_scenarios(&scenarios, &args);
    results.extend(scenario_results);

    // ── Summary ──
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    if args.json {
        let report = Report {
            passed,
            failed,
            failures: results
                .iter()
                .filter(|r| !r.passed)
                .map(|r| format!("{}: {}", r.name, r.detail))
                .collect(),
            scenarios: reports,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("error: could not serialize report: {}", e);
                std::process::exit(2);
            }
        }
    } else {
        println!();
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || args.verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed, total, failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_scenarios(args: &CliArgs) -> Result<Vec<Scenario>, String> {
    let text = match &args.config {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?,
        None => SCENARIOS_JSON.to_string(),
    };
    let mut scenarios: Vec<Scenario> =
        serde_json::from_str(&text).map_err(|e| format!("scenario parse error: {}", e))?;
    if scenarios.is_empty() {
        return Err("scenario file contains no scenarios".into());
    }
    if let Some(seed) = args.seed {
        for s in &mut scenarios {
            s.seed = seed;
        }
    }
    Ok(scenarios)
}

fn section(args: &CliArgs, title: &str) {
    if !args.json {
        println!("--- {} ---", title);
    }
}

// ── 1. Placement rules ──────────────────────────────────────────────────

fn validate_placement_rules(args: &CliArgs) -> Vec<TestResult> {
    section(args, "Placement Rules");
    let mut results = Vec::new();

    // Dimension validation
    let bad_dims = [(0, 5), (5, 0), (0, 0)];
    let rejected = bad_dims
        .iter()
        .all(|&(w, h)| matches!(Grid::new(w, h), Err(CoverageError::InvalidDimension { .. })));
    results.push(TestResult {
        name: "grid_rejects_zero_dimension".into(),
        passed: rejected,
        detail: format!("{:?} all rejected", bad_dims),
    });

    let Ok(mut grid) = Grid::new(5, 5) else {
        results.push(TestResult {
            name: "grid_new_5x5".into(),
            passed: false,
            detail: "could not build a 5×5 grid".into(),
        });
        return results;
    };

    // Exact placement on a blank grid
    let first = grid.place_tower(0, 0, 3, 3);
    results.push(TestResult {
        name: "place_exact_on_blank".into(),
        passed: first == Ok(Some(Rect::new(0, 0, 3, 3))),
        detail: format!("(0,0) 3×3 → {:?}", first),
    });

    // Trimming around an existing tower
    let trimmed = grid.place_tower(1, 1, 4, 4);
    results.push(TestResult {
        name: "place_trimmed_to_blank".into(),
        passed: trimmed == Ok(Some(Rect::new(1, 3, 4, 2))) && grid.covered_cells() == 17,
        detail: format!(
            "(1,1) 4×4 → {:?}, covered {}",
            trimmed,
            grid.covered_cells()
        ),
    });

    // Collision
    let before = (grid.tower_count(), grid.covered_cells());
    let collided = grid.place_tower(0, 0, 2, 2);
    results.push(TestResult {
        name: "place_collision_noop".into(),
        passed: collided == Ok(None) && (grid.tower_count(), grid.covered_cells()) == before,
        detail: format!("(0,0) 2×2 inside tower 1 → {:?}", collided),
    });

    // Out of bounds
    let oob = grid.place_tower(3, 3, 3, 1);
    results.push(TestResult {
        name: "place_out_of_bounds".into(),
        passed: matches!(oob, Err(CoverageError::OutOfBounds { .. }))
            && (grid.tower_count(), grid.covered_cells()) == before,
        detail: format!("(3,3) 3×1 → {:?}", oob),
    });

    let errs = validate_grid(&grid);
    results.push(TestResult {
        name: "placement_invariants".into(),
        passed: errs.is_empty(),
        detail: if errs.is_empty() {
            format!("{} towers, no violations", grid.tower_count())
        } else {
            format!("{} violations, first: {}", errs.len(), errs[0].message)
        },
    });

    // Full-grid guard
    let full = Grid::new(2, 2).map(|mut g| (g.place_tower(0, 0, 2, 2), g.tower_count()));
    results.push(TestResult {
        name: "place_full_grid_noop".into(),
        passed: matches!(full, Ok((Ok(None), 0))),
        detail: "2×2 grid, 2×2 request ignored".into(),
    });

    // Reset
    grid.reset();
    results.push(TestResult {
        name: "reset_clears_grid".into(),
        passed: grid.tower_count() == 0
            && grid.covered_cells() == 0
            && grid.rows().flatten().all(|&c| c == BLANK),
        detail: "tower count and coverage back to 0".into(),
    });

    results
}

// ── 2. Maximal rectangle finder ─────────────────────────────────────────

fn brute_force_max_area(matrix: &[Vec<u32>]) -> usize {
    let h = matrix.len();
    let w = matrix.first().map_or(0, |r| r.len());
    let mut best = 0;
    for x0 in 0..h {
        for x1 in x0..h {
            for y0 in 0..w {
                for y1 in y0..w {
                    if (x0..=x1).all(|x| (y0..=y1).all(|y| matrix[x][y] == BLANK)) {
                        best = best.max((x1 - x0 + 1) * (y1 - y0 + 1));
                    }
                }
            }
        }
    }
    best
}

fn validate_finder(args: &CliArgs) -> Vec<TestResult> {
    section(args, "Maximal Rectangle Finder");
    let mut results = Vec::new();

    let empty: Vec<Vec<u32>> = Vec::new();
    results.push(TestResult {
        name: "finder_empty_input".into(),
        passed: find_maximal_blank_rectangle(&empty) == Err(CoverageError::EmptyInput),
        detail: "zero rows → EmptyInput".into(),
    });

    let occupied = vec![vec![1u32; 4]; 3];
    results.push(TestResult {
        name: "finder_all_occupied".into(),
        passed: find_maximal_blank_rectangle(&occupied) == Ok(None),
        detail: "3×4 occupied → no rectangle".into(),
    });

    let blank = vec![vec![0u32; 4]; 3];
    let whole = find_maximal_blank_rectangle(&blank);
    results.push(TestResult {
        name: "finder_all_blank".into(),
        passed: matches!(whole, Ok(Some(b)) if (b.xmin, b.xmax, b.ymin, b.ymax) == (0, 2, 0, 3)),
        detail: format!("3×4 blank → {:?}", whole),
    });

    // Random sweep against the oracle
    let mut rng = StdRng::seed_from_u64(args.seed.unwrap_or(85));
    let cases = 1000;
    let mut mismatches = Vec::new();
    for case in 0..cases {
        let h = rng.gen_range(1..=8);
        let w = rng.gen_range(1..=8);
        let density = rng.gen_range(0.0..0.9);
        let matrix: Vec<Vec<u32>> = (0..h)
            .map(|_| (0..w).map(|_| u32::from(rng.gen_bool(density))).collect())
            .collect();
        let expected = brute_force_max_area(&matrix);
        let found = match find_maximal_blank_rectangle(&matrix) {
            Ok(found) => found.map_or(0, |b| b.area()),
            Err(e) => {
                mismatches.push(format!("case {}: {}", case, e));
                continue;
            }
        };
        if found != expected {
            mismatches.push(format!("case {}: found {} expected {}", case, found, expected));
        }
    }
    if args.verbose && !args.json {
        println!("  {} random matrices checked", cases);
    }
    results.push(TestResult {
        name: "finder_matches_oracle".into(),
        passed: mismatches.is_empty(),
        detail: if mismatches.is_empty() {
            format!("{} random matrices up to 8×8 agree", cases)
        } else {
            format!("{} mismatches, first: {}", mismatches.len(), mismatches[0])
        },
    });

    results
}

// ── 3. Scenario batches ─────────────────────────────────────────────────

fn run_scenarios(scenarios: &[Scenario], args: &CliArgs) -> (Vec<TestResult>, Vec<ScenarioReport>) {
    section(args, "Scenario Batches");
    let mut results = Vec::new();
    let mut reports = Vec::new();

    for s in scenarios {
        let mut grid = match Grid::new(s.x_range, s.y_range) {
            Ok(g) => g,
            Err(e) => {
                results.push(TestResult {
                    name: format!("{}_grid", s.name),
                    passed: false,
                    detail: e.to_string(),
                });
                continue;
            }
        };

        // Single trial, checked for invariants before the grid is reset.
        let mut rng = StdRng::seed_from_u64(s.seed);
        match auto_fill(&mut grid, &mut rng, &s.trial) {
            Ok(outcome) => {
                let errs = validate_grid(&grid);
                results.push(TestResult {
                    name: format!("{}_invariants", s.name),
                    passed: errs.is_empty(),
                    detail: if errs.is_empty() {
                        format!(
                            "{} towers, {}/{} cells after {} tries ({:?})",
                            grid.tower_count(),
                            grid.covered_cells(),
                            grid.total_cells(),
                            outcome.tries,
                            outcome.stop
                        )
                    } else {
                        format!("{} violations, first: {}", errs.len(), errs[0].message)
                    },
                });
            }
            Err(e) => {
                results.push(TestResult {
                    name: format!("{}_invariants", s.name),
                    passed: false,
                    detail: e.to_string(),
                });
                continue;
            }
        }

        // Full batch from the same seed.
        let mut rng = StdRng::seed_from_u64(s.seed);
        let record = match batch_experiment(&mut grid, &mut rng, s.n_exp, &s.trial) {
            Ok(r) => r,
            Err(e) => {
                results.push(TestResult {
                    name: format!("{}_batch", s.name),
                    passed: false,
                    detail: e.to_string(),
                });
                continue;
            }
        };

        let within_limits = (0..record.len()).all(|i| {
            record.tries[i] <= s.trial.max_try
                && record.towers[i] <= s.trial.n_tower
                && record.coverage[i] <= grid.total_cells()
        });
        let summary = record.summary();
        results.push(TestResult {
            name: format!("{}_batch", s.name),
            passed: record.len() == s.n_exp && within_limits && grid.covered_cells() == 0,
            detail: match &summary {
                Some(sum) => format!(
                    "{} trials, coverage {:.1} (min {}, max {}), towers {:.1}, hit rate {:.0}%",
                    sum.trials,
                    sum.coverage.mean,
                    sum.coverage.min,
                    sum.coverage.max,
                    sum.towers.mean,
                    sum.target_hit_rate * 100.0
                ),
                None => "no trials recorded".into(),
            },
        });

        if args.verbose && !args.json {
            if let Some(sum) = &summary {
                println!(
                    "  {} ({}×{}, seed {}): mean tries {:.1}, mean coverage {:.1}%",
                    s.name,
                    s.x_range,
                    s.y_range,
                    s.seed,
                    sum.tries.mean,
                    100.0 * sum.coverage.mean / grid.total_cells() as f64
                );
            }
        }

        reports.push(ScenarioReport {
            name: s.name.clone(),
            x_range: s.x_range,
            y_range: s.y_range,
            seed: s.seed,
            summary,
        });
    }

    (results, reports)
}
