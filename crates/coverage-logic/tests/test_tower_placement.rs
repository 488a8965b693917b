//! Integration tests for the placement pipeline.
//!
//! Exercises: Grid → place_tower → maximal rectangle trimming → validation
//! → randomized trials and batches.

use coverage_logic::grid::{Grid, Rect, BLANK};
use coverage_logic::rectangle::{find_maximal_blank_rectangle, Bounds};
use coverage_logic::trial::{auto_fill, batch_experiment, random_candidate, TrialConfig};
use coverage_logic::validate::validate_grid;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Helpers ────────────────────────────────────────────────────────────

/// Largest blank area by trying every rectangle.
fn brute_force_max_area(matrix: &[Vec<u32>]) -> usize {
    let h = matrix.len();
    let w = matrix[0].len();
    let mut best = 0;
    for x0 in 0..h {
        for x1 in x0..h {
            for y0 in 0..w {
                for y1 in y0..w {
                    let blank = (x0..=x1).all(|x| (y0..=y1).all(|y| matrix[x][y] == BLANK));
                    if blank {
                        best = best.max((x1 - x0 + 1) * (y1 - y0 + 1));
                    }
                }
            }
        }
    }
    best
}

fn random_matrix(rng: &mut StdRng, density: f64) -> Vec<Vec<u32>> {
    let h = rng.gen_range(1..=8);
    let w = rng.gen_range(1..=8);
    (0..h)
        .map(|_| {
            (0..w)
                .map(|_| if rng.gen_bool(density) { 1 } else { 0 })
                .collect()
        })
        .collect()
}

fn bounds_are_blank(matrix: &[Vec<u32>], b: &Bounds) -> bool {
    (b.xmin..=b.xmax).all(|x| (b.ymin..=b.ymax).all(|y| matrix[x][y] == BLANK))
}

// ── Finder correctness ─────────────────────────────────────────────────

#[test]
fn finder_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(85);
    for case in 0..500 {
        let density = [0.1, 0.3, 0.5, 0.8][case % 4];
        let matrix = random_matrix(&mut rng, density);
        let expected = brute_force_max_area(&matrix);
        let found = find_maximal_blank_rectangle(&matrix).unwrap();
        match found {
            None => assert_eq!(expected, 0, "case {}: missed a blank area in {:?}", case, matrix),
            Some(b) => {
                assert_eq!(b.area(), expected, "case {}: wrong area for {:?}", case, matrix);
                assert!(b.xmax < matrix.len() && b.ymax < matrix[0].len());
                assert!(bounds_are_blank(&matrix, &b), "case {}: {:?} not blank", case, b);
            }
        }
    }
}

#[test]
fn finder_all_occupied_is_none() {
    for (h, w) in [(1, 1), (3, 7), (8, 8)] {
        let matrix = vec![vec![5u32; w]; h];
        assert_eq!(find_maximal_blank_rectangle(&matrix), Ok(None));
    }
}

#[test]
fn finder_all_blank_is_whole_matrix() {
    for (h, w) in [(1, 1), (2, 6), (8, 3)] {
        let matrix = vec![vec![0u32; w]; h];
        let b = find_maximal_blank_rectangle(&matrix).unwrap().unwrap();
        assert_eq!(
            b,
            Bounds {
                xmin: 0,
                xmax: h - 1,
                ymin: 0,
                ymax: w - 1
            }
        );
        assert_eq!(b.area(), h * w);
    }
}

// ── Placement scenarios ────────────────────────────────────────────────

#[test]
fn overlapping_request_is_trimmed_to_maximal_blank() {
    let mut grid = Grid::new(5, 5).unwrap();
    assert_eq!(
        grid.place_tower(0, 0, 3, 3).unwrap(),
        Some(Rect::new(0, 0, 3, 3))
    );

    let request = Rect::new(1, 1, 4, 4);
    let before = grid.sub_matrix(&request).unwrap();
    let placed = grid.place(&request).unwrap().unwrap();

    assert_eq!(placed.area(), brute_force_max_area(&before));
    assert_eq!(placed, Rect::new(1, 3, 4, 2));
    assert!(validate_grid(&grid).is_empty());
}

#[test]
fn full_grid_request_is_noop() {
    let mut grid = Grid::new(2, 2).unwrap();
    assert_eq!(grid.place_tower(0, 0, 2, 2), Ok(None));
    assert_eq!(grid.tower_count(), 0);

    grid.place_tower(0, 0, 1, 1).unwrap();
    let covered = grid.covered_cells();
    assert_eq!(grid.place_tower(0, 0, 2, 2), Ok(None));
    assert_eq!(grid.tower_count(), 1);
    assert_eq!(grid.covered_cells(), covered);
}

#[test]
fn collision_is_noop() {
    let mut grid = Grid::new(6, 6).unwrap();
    grid.place_tower(0, 0, 3, 6).unwrap();
    grid.place_tower(3, 0, 3, 5).unwrap();
    let (count, covered) = (grid.tower_count(), grid.covered_cells());

    for request in [Rect::new(0, 0, 3, 3), Rect::new(2, 1, 3, 4), Rect::new(5, 4, 1, 1)] {
        assert_eq!(grid.place(&request), Ok(None), "{:?}", request);
    }
    assert_eq!(grid.tower_count(), count);
    assert_eq!(grid.covered_cells(), covered);
}

#[test]
fn rejected_request_leaves_grid_untouched() {
    let mut grid = Grid::new(4, 4).unwrap();
    grid.place_tower(0, 0, 2, 2).unwrap();
    let snapshot = grid.clone();
    assert!(grid.place_tower(3, 3, 2, 1).is_err());
    assert!(grid.place_tower(0, 0, 0, 0).is_err());
    assert_eq!(grid, snapshot);
}

// ── Invariants under random placement ──────────────────────────────────

#[test]
fn random_placements_never_overlap() {
    let mut rng = StdRng::seed_from_u64(233);
    for _ in 0..50 {
        let (w, h) = (rng.gen_range(1..=12), rng.gen_range(1..=12));
        let mut grid = Grid::new(w, h).unwrap();
        for _ in 0..40 {
            let request = random_candidate(&mut rng, &grid);
            let before = grid.sub_matrix(&request).unwrap();
            let count = grid.tower_count();

            match grid.place(&request).unwrap() {
                Some(placed) => {
                    assert_eq!(grid.tower_count(), count + 1);
                    assert_eq!(placed.area(), brute_force_max_area(&before));
                    // Every claimed cell was blank before this tower.
                    let rel = Rect::new(
                        placed.x - request.x,
                        placed.y - request.y,
                        placed.size_x,
                        placed.size_y,
                    );
                    for x in rel.x..rel.x_end() {
                        for y in rel.y..rel.y_end() {
                            assert_eq!(before[x][y], BLANK);
                        }
                    }
                }
                None => assert_eq!(grid.tower_count(), count),
            }

            let errs = validate_grid(&grid);
            assert!(errs.is_empty(), "Invariant violated: {:?}", errs);
        }
    }
}

#[test]
fn reset_restores_empty_state() {
    let mut grid = Grid::new(9, 7).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let config = TrialConfig {
        max_try: 50,
        n_tower: 20,
        final_cover: 63,
    };
    auto_fill(&mut grid, &mut rng, &config).unwrap();
    assert!(grid.tower_count() > 0);

    grid.reset();
    assert_eq!(grid.tower_count(), 0);
    assert_eq!(grid.covered_cells(), 0);
    assert!(grid.rows().flatten().all(|&c| c == BLANK));
}

// ── Batch experiments ──────────────────────────────────────────────────

#[test]
fn batch_records_are_consistent() {
    let mut grid = Grid::new(20, 20).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let config = TrialConfig {
        max_try: 300,
        n_tower: 30,
        final_cover: 360,
    };
    let record = batch_experiment(&mut grid, &mut rng, 25, &config).unwrap();

    assert_eq!(record.len(), 25);
    assert_eq!(record.towers.len(), 25);
    assert_eq!(record.coverage.len(), 25);
    for i in 0..record.len() {
        assert!(record.tries[i] <= config.max_try);
        assert!(record.towers[i] <= config.n_tower);
        assert!(record.towers[i] <= record.tries[i]);
        assert!(record.coverage[i] <= 400);
    }

    let summary = record.summary().unwrap();
    assert_eq!(summary.trials, 25);
    assert!(summary.coverage.min as f64 <= summary.coverage.mean);
    assert!(summary.coverage.mean <= summary.coverage.max as f64);
    assert!((0.0..=1.0).contains(&summary.target_hit_rate));
    assert_eq!(grid.covered_cells(), 0);
}

#[test]
fn different_seeds_produce_variation() {
    let config = TrialConfig {
        max_try: 100,
        n_tower: 10,
        final_cover: 100,
    };
    let mut distinct = std::collections::HashSet::new();
    for seed in 0..20 {
        let mut grid = Grid::new(10, 10).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        auto_fill(&mut grid, &mut rng, &config).unwrap();
        distinct.insert(grid.towers().to_vec());
    }
    assert!(
        distinct.len() >= 2,
        "20 seeds produced only {} distinct layouts",
        distinct.len()
    );
}
