//! Invariant checks over a populated grid.
//!
//! Pure functions that inspect a [`Grid`] and return validation errors.
//! A grid built only through [`Grid::place_tower`] should always come back
//! clean; the harness and integration tests use these to prove it.

use crate::grid::{Grid, BLANK};

/// A grid invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub category: &'static str,
    pub message: String,
}

// ── A. Tower geometry ───────────────────────────────────────────────────

/// Check every tower has positive extent and lies inside the grid.
pub fn check_towers_within_grid(grid: &Grid) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, t) in grid.towers().iter().enumerate() {
        if t.size_x == 0 || t.size_y == 0 {
            errors.push(ValidationError {
                category: "tower_geometry",
                message: format!("Tower #{} has empty extent {}×{}", i + 1, t.size_x, t.size_y),
            });
        }
        if t.x_end() > grid.x_range() || t.y_end() > grid.y_range() {
            errors.push(ValidationError {
                category: "tower_geometry",
                message: format!(
                    "Tower #{} extends outside grid: ({},{})→({},{}) vs {}×{}",
                    i + 1,
                    t.x,
                    t.y,
                    t.x_end(),
                    t.y_end(),
                    grid.x_range(),
                    grid.y_range()
                ),
            });
        }
    }
    errors
}

/// Check no two towers share a cell.
pub fn check_tower_overlaps(grid: &Grid) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let towers = grid.towers();
    for i in 0..towers.len() {
        for j in (i + 1)..towers.len() {
            if towers[i].intersects(&towers[j]) {
                errors.push(ValidationError {
                    category: "tower_overlap",
                    message: format!("Towers #{} and #{} overlap", i + 1, j + 1),
                });
            }
        }
    }
    errors
}

// ── B. Cell labels ──────────────────────────────────────────────────────

/// Check each cell label agrees with the tower list, in both directions.
pub fn check_cell_ownership(grid: &Grid) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let count = grid.tower_count();

    for (x, row) in grid.rows().enumerate() {
        for (y, &label) in row.iter().enumerate() {
            if label == BLANK {
                continue;
            }
            match grid.tower(label) {
                None => errors.push(ValidationError {
                    category: "cell_ownership",
                    message: format!(
                        "Cell ({},{}) labelled {} but only {} towers exist",
                        x, y, label, count
                    ),
                }),
                Some(t) if !t.contains(x, y) => errors.push(ValidationError {
                    category: "cell_ownership",
                    message: format!("Cell ({},{}) labelled {} lies outside that tower", x, y, label),
                }),
                Some(_) => {}
            }
        }
    }

    for (i, t) in grid.towers().iter().enumerate() {
        let label = (i + 1) as u32;
        let unclaimed = (t.x..t.x_end())
            .flat_map(|x| (t.y..t.y_end()).map(move |y| (x, y)))
            .filter(|&(x, y)| grid.cell(x, y) != Some(label))
            .count();
        if unclaimed > 0 {
            errors.push(ValidationError {
                category: "cell_ownership",
                message: format!("Tower #{} has {} cells not labelled as its own", i + 1, unclaimed),
            });
        }
    }
    errors
}

/// Check the cached covered-cell count against a recount.
pub fn check_covered_count(grid: &Grid) -> Vec<ValidationError> {
    let recount = grid.rows().flatten().filter(|&&c| c != BLANK).count();
    let summed: usize = grid.towers().iter().map(|t| t.area()).sum();
    let mut errors = Vec::new();
    if recount != grid.covered_cells() || summed != recount {
        errors.push(ValidationError {
            category: "coverage",
            message: format!(
                "covered_cells()={} but recount={} and tower area sum={}",
                grid.covered_cells(),
                recount,
                summed
            ),
        });
    }
    errors
}

// ── Master validation ───────────────────────────────────────────────────

/// Run all grid validations and return combined results.
pub fn validate_grid(grid: &Grid) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_towers_within_grid(grid));
    all.extend(check_tower_overlaps(grid));
    all.extend(check_cell_ownership(grid));
    all.extend(check_covered_count(grid));
    all
}
