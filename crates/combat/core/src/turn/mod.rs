//! Initiative order, turn and round boundaries.

mod flow;
mod queue;

pub use queue::{InitiativeEntry, InitiativeOrder, TurnQueue, sort_initiative};
