//! Movement and line-of-sight facts supplied by the host.

use std::collections::{BTreeMap, BTreeSet};

use crate::state::GridPos;

/// Answers geometric questions the rules need but do not compute.
pub trait SpatialOracle: Send + Sync {
    /// Whether stepping along `path` from `from` is legal terrain-wise.
    fn is_path_legal(&self, from: GridPos, path: &[GridPos]) -> bool;

    /// Terrain cost multiplier for entering `cell`, in percent (100 = normal).
    fn terrain_multiplier(&self, cell: GridPos) -> u32;

    fn has_line_of_sight(&self, from: GridPos, to: GridPos) -> bool;
}

/// Flat grid with optional walls, difficult terrain, and bounds.
#[derive(Clone, Debug, Default)]
pub struct OpenGround {
    walls: BTreeSet<GridPos>,
    difficult: BTreeMap<GridPos, u32>,
    bounds: Option<(GridPos, GridPos)>,
}

impl OpenGround {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wall(mut self, cell: GridPos) -> Self {
        self.walls.insert(cell);
        self
    }

    pub fn with_difficult(mut self, cell: GridPos, percent: u32) -> Self {
        self.difficult.insert(cell, percent);
        self
    }

    /// Inclusive corners of the playable area.
    pub fn with_bounds(mut self, min: GridPos, max: GridPos) -> Self {
        self.bounds = Some((min, max));
        self
    }

    fn is_open(&self, cell: GridPos) -> bool {
        let in_bounds = self.bounds.is_none_or(|(min, max)| {
            (min.x..=max.x).contains(&cell.x) && (min.y..=max.y).contains(&cell.y)
        });
        in_bounds && !self.walls.contains(&cell)
    }
}

impl SpatialOracle for OpenGround {
    fn is_path_legal(&self, from: GridPos, path: &[GridPos]) -> bool {
        let mut at = from;
        for &step in path {
            if at.distance(step) != 1 || !self.is_open(step) {
                return false;
            }
            at = step;
        }
        true
    }

    fn terrain_multiplier(&self, cell: GridPos) -> u32 {
        self.difficult.get(&cell).copied().unwrap_or(100)
    }

    fn has_line_of_sight(&self, from: GridPos, to: GridPos) -> bool {
        let mut at = from;
        while at != to {
            at = at.step_toward(to);
            if at != to && self.walls.contains(&at) {
                return false;
            }
        }
        true
    }
}
