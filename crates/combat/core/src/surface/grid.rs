use std::collections::BTreeMap;

use crate::state::{CombatantId, GridPos};

use super::SurfaceKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceCell {
    pub surface: SurfaceKind,
    /// Rounds left; `None` never expires on its own.
    pub remaining: Option<u32>,
    /// Owner of record, used for concentration-linked removal.
    pub owner: Option<CombatantId>,
    pub concentration: bool,
}

/// What changed in one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellChange {
    Spawned(SurfaceKind),
    Transformed { from: SurfaceKind, to: SurfaceKind },
}

/// Sparse map of surface cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceGrid {
    cells: BTreeMap<GridPos, SurfaceCell>,
}

impl SurfaceGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(&self, pos: GridPos) -> Option<&SurfaceCell> {
        self.cells.get(&pos)
    }

    pub fn kind_at(&self, pos: GridPos) -> Option<SurfaceKind> {
        self.at(pos).map(|cell| cell.surface)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &SurfaceCell)> {
        self.cells.iter().map(|(pos, cell)| (*pos, cell))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Places `cell` at `pos`, combining with whatever was there.
    pub fn place(&mut self, pos: GridPos, cell: SurfaceCell) -> CellChange {
        match self.cells.get_mut(&pos) {
            Some(existing) => {
                let from = existing.surface;
                let to = from.combine(cell.surface);
                *existing = SurfaceCell { surface: to, ..cell };
                CellChange::Transformed { from, to }
            }
            None => {
                self.cells.insert(pos, cell);
                CellChange::Spawned(cell.surface)
            }
        }
    }

    /// Changes the kind in place, keeping lifetime and owner.
    pub fn transform(&mut self, pos: GridPos, to: SurfaceKind) -> Option<SurfaceKind> {
        let cell = self.cells.get_mut(&pos)?;
        let from = cell.surface;
        cell.surface = to;
        Some(from)
    }

    pub fn remove(&mut self, pos: GridPos) -> Option<SurfaceCell> {
        self.cells.remove(&pos)
    }

    /// Removes concentration-linked cells owned by `owner`.
    pub fn remove_concentration_of(&mut self, owner: CombatantId) -> Vec<(GridPos, SurfaceCell)> {
        let doomed: Vec<GridPos> = self
            .cells
            .iter()
            .filter(|(_, cell)| cell.concentration && cell.owner == Some(owner))
            .map(|(pos, _)| *pos)
            .collect();
        doomed
            .into_iter()
            .filter_map(|pos| self.cells.remove(&pos).map(|cell| (pos, cell)))
            .collect()
    }

    /// Ages every timed cell by one round and returns the ones that expired.
    pub fn tick_lifetimes(&mut self) -> Vec<(GridPos, SurfaceCell)> {
        let mut expired = Vec::new();
        for (pos, cell) in self.cells.iter_mut() {
            if let Some(rounds) = cell.remaining.as_mut() {
                *rounds = rounds.saturating_sub(1);
                if *rounds == 0 {
                    expired.push(*pos);
                }
            }
        }
        expired
            .into_iter()
            .filter_map(|pos| self.cells.remove(&pos).map(|cell| (pos, cell)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(surface: SurfaceKind, remaining: Option<u32>) -> SurfaceCell {
        SurfaceCell {
            surface,
            remaining,
            owner: Some(CombatantId(1)),
            concentration: false,
        }
    }

    #[test]
    fn placing_fire_on_water_makes_steam() {
        let mut grid = SurfaceGrid::new();
        let pos = GridPos::new(2, 2);
        grid.place(pos, cell(SurfaceKind::Water, None));
        let change = grid.place(pos, cell(SurfaceKind::Fire, Some(2)));
        assert_eq!(
            change,
            CellChange::Transformed {
                from: SurfaceKind::Water,
                to: SurfaceKind::Steam
            }
        );
        assert_eq!(grid.kind_at(pos), Some(SurfaceKind::Steam));
    }

    #[test]
    fn lifetimes_expire_at_zero() {
        let mut grid = SurfaceGrid::new();
        grid.place(GridPos::new(0, 0), cell(SurfaceKind::Fire, Some(1)));
        grid.place(GridPos::new(1, 0), cell(SurfaceKind::Acid, None));
        let expired = grid.tick_lifetimes();
        assert_eq!(expired.len(), 1);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn concentration_cells_leave_with_their_owner() {
        let mut grid = SurfaceGrid::new();
        let mut linked = cell(SurfaceKind::Grease, None);
        linked.concentration = true;
        grid.place(GridPos::new(0, 0), linked);
        grid.place(GridPos::new(5, 5), cell(SurfaceKind::Fire, None));
        assert_eq!(grid.remove_concentration_of(CombatantId(1)).len(), 1);
        assert_eq!(grid.kind_at(GridPos::new(5, 5)), Some(SurfaceKind::Fire));
    }
}
