//! Occupancy grid and tower placement.
//!
//! A [`Grid`] is an `x_range × y_range` matrix of cell labels. `0` marks a
//! blank cell; `k ≥ 1` marks a cell claimed by the k-th tower placed. A new
//! tower request is trimmed to the largest blank rectangle inside the
//! requested area, so towers never overlap and never change shape after
//! placement.
//!
//! ```
//! use coverage_logic::grid::{Grid, Rect};
//!
//! let mut grid = Grid::new(5, 5).unwrap();
//! assert_eq!(grid.place_tower(0, 0, 3, 3).unwrap(), Some(Rect::new(0, 0, 3, 3)));
//!
//! // Overlaps tower 1, so it is trimmed to the free part of the request.
//! let trimmed = grid.place_tower(1, 1, 4, 4).unwrap().unwrap();
//! assert_eq!(trimmed, Rect::new(1, 3, 4, 2));
//! assert_eq!(grid.tower_count(), 2);
//! assert_eq!(grid.covered_cells(), 17);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoverageError, Result};
use crate::rectangle::find_maximal_blank_rectangle;

/// Label of an unclaimed cell.
pub const BLANK: u32 = 0;

/// Axis-aligned rectangle of cells `[x, x + size_x) × [y, y + size_y)`.
///
/// Used for tower records, placement requests and placement results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Bottom-left corner (inclusive).
    pub x: usize,
    pub y: usize,
    pub size_x: usize,
    pub size_y: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, size_x: usize, size_y: usize) -> Self {
        Self {
            x,
            y,
            size_x,
            size_y,
        }
    }

    /// Exclusive end on the x axis.
    pub fn x_end(&self) -> usize {
        self.x + self.size_x
    }

    /// Exclusive end on the y axis.
    pub fn y_end(&self) -> usize {
        self.y + self.size_y
    }

    pub fn area(&self) -> usize {
        self.size_x * self.size_y
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x_end() && y >= self.y && y < self.y_end()
    }

    /// True when the two rectangles share at least one cell.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x_end()
            && other.x < self.x_end()
            && self.y < other.y_end()
            && other.y < self.y_end()
    }
}

/// Occupancy matrix plus the ordered list of placed towers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    x_range: usize,
    y_range: usize,
    /// x-major: cell `(x, y)` lives at `x * y_range + y`.
    cells: Vec<u32>,
    /// Tower `k` is `towers[k - 1]`.
    towers: Vec<Rect>,
    covered: usize,
}

impl Grid {
    /// Create an empty grid. Both dimensions must be positive.
    pub fn new(x_range: usize, y_range: usize) -> Result<Self> {
        let total = x_range
            .checked_mul(y_range)
            .filter(|&n| n > 0)
            .ok_or(CoverageError::InvalidDimension { x_range, y_range })?;
        Ok(Self {
            x_range,
            y_range,
            cells: vec![BLANK; total],
            towers: Vec::new(),
            covered: 0,
        })
    }

    pub fn x_range(&self) -> usize {
        self.x_range
    }

    pub fn y_range(&self) -> usize {
        self.y_range
    }

    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    /// Upper bound on towers: one per cell.
    pub fn max_towers(&self) -> usize {
        self.cells.len()
    }

    pub fn tower_count(&self) -> usize {
        self.towers.len()
    }

    /// Number of non-blank cells.
    pub fn covered_cells(&self) -> usize {
        self.covered
    }

    /// Covered fraction of the grid, in `[0, 1]`.
    pub fn coverage_ratio(&self) -> f64 {
        self.covered as f64 / self.cells.len() as f64
    }

    pub fn is_saturated(&self) -> bool {
        self.covered == self.cells.len()
    }

    /// Placed towers in insertion order.
    pub fn towers(&self) -> &[Rect] {
        &self.towers
    }

    /// Tower by its 1-based index.
    pub fn tower(&self, index: u32) -> Option<&Rect> {
        let pos = (index as usize).checked_sub(1)?;
        self.towers.get(pos)
    }

    /// Label of cell `(x, y)`, or `None` outside the grid.
    pub fn cell(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.x_range || y >= self.y_range {
            return None;
        }
        Some(self.cells[x * self.y_range + y])
    }

    /// Rows of the matrix, one per x, each `y_range` long.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        self.cells.chunks(self.y_range)
    }

    /// Copy of the labels under `area`, as rows (x) of columns (y).
    pub fn sub_matrix(&self, area: &Rect) -> Result<Vec<Vec<u32>>> {
        self.check_request(area.x, area.y, area.size_x, area.size_y)?;
        Ok(self.copy_area(area))
    }

    /// Request a tower covering `[x, x + size_x) × [y, y + size_y)`.
    ///
    /// The tower actually placed is the largest blank rectangle inside the
    /// request and is returned. `Ok(None)` means nothing was placed: either
    /// the request spans the whole grid, or every requested cell is taken.
    /// Invalid geometry fails with [`CoverageError::OutOfBounds`] before
    /// anything changes.
    pub fn place_tower(
        &mut self,
        x: usize,
        y: usize,
        size_x: usize,
        size_y: usize,
    ) -> Result<Option<Rect>> {
        self.check_request(x, y, size_x, size_y)?;
        let request = Rect::new(x, y, size_x, size_y);

        // A single tower may not claim the whole grid.
        if size_x == self.x_range && size_y == self.y_range {
            log::trace!("ignoring full-grid request {:?}", request);
            return Ok(None);
        }

        let target = self.copy_area(&request);
        if target.iter().flatten().all(|&c| c != BLANK) {
            log::trace!("request {:?} is fully covered", request);
            return Ok(None);
        }

        let Some(bounds) = find_maximal_blank_rectangle(&target)? else {
            return Ok(None);
        };
        let placed = bounds.offset(x, y);
        let label = u32::try_from(self.towers.len() + 1).map_err(|_| {
            CoverageError::InvalidParameter {
                name: "tower index",
                reason: "tower count exceeds u32::MAX".into(),
            }
        })?;

        for cx in placed.x..placed.x_end() {
            let row = cx * self.y_range;
            self.cells[row + placed.y..row + placed.y_end()].fill(label);
        }
        self.covered += placed.area();
        self.towers.push(placed);

        if placed != request {
            log::debug!(
                "tower {} trimmed from {:?} to {:?}",
                label,
                request,
                placed
            );
        }
        Ok(Some(placed))
    }

    /// Shorthand for [`place_tower`](Self::place_tower) with a [`Rect`] request.
    pub fn place(&mut self, request: &Rect) -> Result<Option<Rect>> {
        self.place_tower(request.x, request.y, request.size_x, request.size_y)
    }

    /// Clear every cell and drop all towers.
    pub fn reset(&mut self) {
        self.cells.fill(BLANK);
        self.towers.clear();
        self.covered = 0;
    }

    /// Assemble a grid from raw parts without any consistency checks.
    #[cfg(test)]
    pub(crate) fn from_parts(
        x_range: usize,
        y_range: usize,
        cells: Vec<u32>,
        towers: Vec<Rect>,
        covered: usize,
    ) -> Self {
        assert_eq!(cells.len(), x_range * y_range);
        Self {
            x_range,
            y_range,
            cells,
            towers,
            covered,
        }
    }

    fn check_request(&self, x: usize, y: usize, size_x: usize, size_y: usize) -> Result<()> {
        let fits = x < self.x_range
            && y < self.y_range
            && size_x > 0
            && size_y > 0
            && size_x <= self.x_range - x
            && size_y <= self.y_range - y;
        if fits {
            Ok(())
        } else {
            Err(CoverageError::OutOfBounds {
                x,
                y,
                size_x,
                size_y,
                x_range: self.x_range,
                y_range: self.y_range,
            })
        }
    }

    fn copy_area(&self, area: &Rect) -> Vec<Vec<u32>> {
        (area.x..area.x_end())
            .map(|cx| {
                let row = cx * self.y_range;
                self.cells[row + area.y..row + area.y_end()].to_vec()
            })
            .collect()
    }
}
