//! Pure tower coverage logic.
//!
//! Towers are rectangular coverage regions placed on a bounded grid. A
//! requested tower is trimmed to the largest blank rectangle inside the
//! request, so towers never overlap. Everything here is deterministic and
//! free of I/O; randomness is always supplied by the caller.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`error`] | `CoverageError` and the crate `Result` alias |
//! | [`grid`] | Occupancy grid, tower records, placement and reset |
//! | [`rectangle`] | Maximal blank rectangle search (histogram + monotonic stack) |
//! | [`trial`] | Random fill trials, batch experiments, coverage statistics |
//! | [`validate`] | Grid invariant checks (overlap, containment, labels) |

pub mod error;
pub mod grid;
pub mod rectangle;
pub mod trial;
pub mod validate;

pub use error::{CoverageError, Result};
pub use grid::{Grid, Rect};
pub use rectangle::{find_maximal_blank_rectangle, Bounds};
