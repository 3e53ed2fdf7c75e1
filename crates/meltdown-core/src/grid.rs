//! Static 7×7 rod lattice.
//!
//! Built once at construction and never mutated; the only moving part of
//! the core, the shared control-rod insertion scalar, lives on
//! [`ReactorCore`](crate::core::ReactorCore). Cells are laid out
//! row-major (lattice row outer, column inner), and collision queries
//! walk rods in that order with first-found-wins semantics.

use serde::{Deserialize, Serialize};

/// Half-extent of the square lattice; rows/columns run -3..=3.
const HALF_EXTENT: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RodKind {
    /// Unused cell (the lattice corners).
    Empty,
    Fuel,
    Control,
}

/// One lattice cell: center coordinates in the core's xz plane plus kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rod {
    pub x: f64,
    pub z: f64,
    pub kind: RodKind,
}

#[derive(Debug, Clone)]
pub struct RodGrid {
    rods: Vec<Rod>,
    radius: f64,
}

impl RodGrid {
    /// Build the fixed lattice with the given pitch and rod radius.
    ///
    /// Layout: 9 control rods on the center cross at lattice
    /// (row, col) ∈ {-2, 0, 2}², three empty cells in each corner, fuel
    /// rods everywhere else (28 of them).
    pub fn new(spacing: f64, radius: f64) -> Self {
        let mut rods = Vec::with_capacity(49);
        for row in -HALF_EXTENT..=HALF_EXTENT {
            for col in -HALF_EXTENT..=HALF_EXTENT {
                rods.push(Rod {
                    x: col as f64 * spacing,
                    z: row as f64 * spacing,
                    kind: classify(row, col),
                });
            }
        }
        Self { rods, radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// All cells in collision-precedence order.
    pub fn rods(&self) -> &[Rod] {
        &self.rods
    }

    /// Centers of all cells of one kind, in collision-precedence order.
    pub fn cells_of_kind(&self, kind: RodKind) -> impl Iterator<Item = &Rod> {
        self.rods.iter().filter(move |r| r.kind == kind)
    }

    pub fn count_of_kind(&self, kind: RodKind) -> usize {
        self.cells_of_kind(kind).count()
    }
}

fn classify(row: i32, col: i32) -> RodKind {
    let corner = (row == -3 && (col <= -2 || col >= 2))
        || (row == -2 && (col == -3 || col == 3))
        || (row == 2 && (col == -3 || col == 3))
        || (row == 3 && (col <= -2 || col >= 2));
    if corner {
        RodKind::Empty
    } else if matches!(row, -2 | 0 | 2) && matches!(col, -2 | 0 | 2) {
        RodKind::Control
    } else {
        RodKind::Fuel
    }
}
