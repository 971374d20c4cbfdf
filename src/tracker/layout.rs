//! Grid placement of rounds for the progress view.
//!
//! Small pipelines sit in a fixed triangle; larger ones are stacked as a
//! centered pyramid on a doubled-width grid so every round in a row sits
//! between the two rounds above it. Placement depends only on the count.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TRIANGLE_MAX: usize = 4;

/// Top, left, right, bottom-center.
const TRIANGLE_SLOTS: [GridCell; 4] = [
    GridCell { row: 0, col: 1 },
    GridCell { row: 1, col: 0 },
    GridCell { row: 1, col: 2 },
    GridCell { row: 2, col: 1 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutShape {
    Triangle,
    Pyramid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundLayout {
    pub shape: LayoutShape,
    pub rows: usize,
    pub cells: Vec<GridCell>,
}

/// Switch point between the triangle and the pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutPolicy {
    triangle_max: usize,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            triangle_max: DEFAULT_TRIANGLE_MAX,
        }
    }
}

impl LayoutPolicy {
    /// The triangle has four slots, so larger thresholds are clamped.
    pub fn new(triangle_max: usize) -> Self {
        Self {
            triangle_max: triangle_max.min(TRIANGLE_SLOTS.len()),
        }
    }

    pub fn triangle_max(&self) -> usize {
        self.triangle_max
    }

    pub fn layout(&self, round_count: usize) -> RoundLayout {
        if round_count <= self.triangle_max {
            RoundLayout {
                shape: LayoutShape::Triangle,
                rows: 3,
                cells: TRIANGLE_SLOTS[..round_count].to_vec(),
            }
        } else {
            let rows = pyramid_rows(round_count);
            RoundLayout {
                shape: LayoutShape::Pyramid,
                rows,
                cells: pyramid_cells(round_count, rows),
            }
        }
    }
}

/// Positions for `round_count` rounds with the default threshold.
pub fn layout_for(round_count: usize) -> Vec<GridCell> {
    LayoutPolicy::default().layout(round_count).cells
}

/// `ceil(sqrt(2n))`, computed in integers.
fn pyramid_rows(round_count: usize) -> usize {
    let target = 2 * round_count;
    let mut rows = 0;
    while rows * rows < target {
        rows += 1;
    }
    rows
}

fn pyramid_cells(round_count: usize, rows: usize) -> Vec<GridCell> {
    let mut cells = Vec::with_capacity(round_count);
    let mut remaining = round_count;
    let mut row = 0;

    while remaining > 0 && row < rows {
        let in_row = (row + 1).min(remaining);
        let offset = rows - in_row;
        for i in 0..in_row {
            cells.push(GridCell {
                row,
                col: offset + 2 * i,
            });
        }
        remaining -= in_row;
        row += 1;
    }

    cells
}
