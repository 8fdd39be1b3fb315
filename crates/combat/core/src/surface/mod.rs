//! Ground surfaces: hazards, movement costs, and elemental transformations.

mod grid;
mod hazards;
mod kind;

pub use grid::{CellChange, SurfaceCell, SurfaceGrid};
pub use hazards::SurfaceSpawn;
pub use kind::{SurfaceKind, SurfaceSave};
