//! Largest all-blank rectangle inside a 2D occupancy matrix.
//!
//! Each row is turned into a histogram of how many blank cells stack up
//! above it (inclusive), then the largest rectangle under that histogram is
//! found with a monotonic stack. The best row wins. Both passes are O(w)
//! per row, so a full search is O(h·w).
//!
//! Rows are indexed by `x` and columns by `y`, matching [`Grid`](crate::grid::Grid)'s
//! sub-matrices, so a result can be shifted straight back into grid space.
//!
//! ```
//! use coverage_logic::rectangle::{find_maximal_blank_rectangle, Bounds};
//!
//! let matrix = vec![
//!     vec![1, 0, 0],
//!     vec![0, 0, 0],
//!     vec![1, 0, 0],
//! ];
//! let best = find_maximal_blank_rectangle(&matrix).unwrap().unwrap();
//! assert_eq!(best, Bounds { xmin: 0, xmax: 2, ymin: 1, ymax: 2 });
//! assert_eq!(best.area(), 6);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoverageError, Result};
use crate::grid::{Rect, BLANK};

/// Inclusive bounds of a rectangle, relative to the searched matrix.
///
/// `xmin <= xmax` and `ymin <= ymax` must hold; [`size`](Self::size),
/// [`area`](Self::area) and [`offset`](Self::offset) rely on it. Bounds
/// returned by the finder always satisfy it; use [`Bounds::new`] to check
/// hand-built ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub xmin: usize,
    pub xmax: usize,
    pub ymin: usize,
    pub ymax: usize,
}

impl Bounds {
    /// `None` unless `xmin <= xmax` and `ymin <= ymax`.
    pub fn new(xmin: usize, xmax: usize, ymin: usize, ymax: usize) -> Option<Self> {
        (xmin <= xmax && ymin <= ymax).then_some(Self {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// Extent as `(rows, columns)`.
    pub fn size(&self) -> (usize, usize) {
        (self.xmax - self.xmin + 1, self.ymax - self.ymin + 1)
    }

    pub fn area(&self) -> usize {
        let (w, h) = self.size();
        w * h
    }

    /// Translate into absolute coordinates of a matrix whose origin sits at `(x, y)`.
    pub fn offset(&self, x: usize, y: usize) -> Rect {
        let (size_x, size_y) = self.size();
        Rect::new(self.xmin + x, self.ymin + y, size_x, size_y)
    }
}

/// Best rectangle found under one histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramRect {
    pub area: usize,
    pub height: usize,
    pub width: usize,
    /// Exclusive end column: the index whose shorter bar closed the rectangle.
    pub end: usize,
}

/// Largest rectangle under a histogram of bar heights.
///
/// Returns `None` when every bar is zero. On equal areas the first
/// rectangle popped off the stack is kept.
pub fn largest_in_histogram(heights: &[usize]) -> Option<HistogramRect> {
    // Indices of bars with non-decreasing heights. An empty stack plays the
    // role of a -1 seed, and index `heights.len()` is a trailing bar of
    // height 0 that flushes whatever is left.
    let mut stack: Vec<usize> = Vec::with_capacity(heights.len() + 1);
    let mut best: Option<HistogramRect> = None;

    for i in 0..=heights.len() {
        let current = heights.get(i).copied().unwrap_or(0);
        while let Some(&top) = stack.last() {
            if current >= heights[top] {
                break;
            }
            stack.pop();
            let height = heights[top];
            let width = match stack.last() {
                Some(&left) => i - left - 1,
                None => i,
            };
            let area = height * width;
            if area > best.map_or(0, |b| b.area) {
                best = Some(HistogramRect {
                    area,
                    height,
                    width,
                    end: i,
                });
            }
        }
        stack.push(i);
    }

    best
}

/// Find the largest axis-aligned rectangle made only of blank (`0`) cells.
///
/// Returns `Ok(None)` when the matrix has no blank cell. Fails with
/// [`CoverageError::EmptyInput`] for a matrix without rows and
/// [`CoverageError::RaggedInput`] when rows differ in width.
///
/// Ties go to the rectangle found first in row order, then stack-pop order.
pub fn find_maximal_blank_rectangle<R: AsRef<[u32]>>(matrix: &[R]) -> Result<Option<Bounds>> {
    let width = matrix
        .first()
        .ok_or(CoverageError::EmptyInput)?
        .as_ref()
        .len();
    if let Some((row, found)) = matrix
        .iter()
        .map(|r| r.as_ref().len())
        .enumerate()
        .find(|&(_, len)| len != width)
    {
        return Err(CoverageError::RaggedInput {
            row,
            expected: width,
            found,
        });
    }

    let mut heights = vec![0usize; width];
    let mut best: Option<(usize, HistogramRect)> = None;

    for (row_idx, row) in matrix.iter().enumerate() {
        for (height, &cell) in heights.iter_mut().zip(row.as_ref()) {
            *height = if cell == BLANK { *height + 1 } else { 0 };
        }

        if let Some(candidate) = largest_in_histogram(&heights) {
            if candidate.area > best.map_or(0, |(_, b)| b.area) {
                best = Some((row_idx, candidate));
            }
        }
    }

    Ok(best.map(|(row, rect)| {
        let ymax = rect.end - 1;
        Bounds {
            xmin: row + 1 - rect.height,
            xmax: row,
            ymin: ymax + 1 - rect.width,
            ymax,
        }
    }))
}
