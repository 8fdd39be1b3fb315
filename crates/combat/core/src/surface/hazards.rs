//! Surface effects on combatants and on other surfaces.

use crate::damage::{DamagePacket, DamageRequest, DamageType};
use crate::engine::{CombatContext, EngineError};
use crate::event::EventKind;
use crate::reaction::DamageOrigin;
use crate::state::{CombatantId, GridPos, StatusId};
use crate::status::StatusApplication;

use super::{CellChange, SurfaceCell, SurfaceKind};

/// Parameters of one surface placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSpawn {
    pub center: GridPos,
    pub kind: SurfaceKind,
    pub radius: u32,
    pub lifetime: Option<u32>,
    pub owner: Option<CombatantId>,
    /// Removed when the owner's concentration ends.
    pub concentration: bool,
}

impl CombatContext<'_, '_> {
    /// Places a surface over every cell within `radius`, then applies its
    /// entry effects to whoever is already standing there.
    pub fn spawn_surface(&mut self, spawn: SurfaceSpawn) -> Result<(), EngineError> {
        let mut touched = Vec::new();
        for position in spawn.center.cells_within(spawn.radius) {
            let change = self.state.surfaces.place(
                position,
                SurfaceCell {
                    surface: spawn.kind,
                    remaining: spawn.lifetime,
                    owner: spawn.owner,
                    concentration: spawn.concentration,
                },
            );
            match change {
                CellChange::Spawned(surface) => self.emit(EventKind::SurfaceSpawned {
                    position,
                    surface,
                    owner: spawn.owner,
                }),
                CellChange::Transformed { from, to } => {
                    self.emit(EventKind::SurfaceTransformed { position, from, to })
                }
            }
            touched.push(position);
        }

        for position in touched {
            if let Some(occupant) = self.state.combatant_at(position) {
                self.enter_surface(occupant, position)?;
            }
        }
        Ok(())
    }

    /// Elemental damage landing on an area changes the surfaces under it.
    pub fn react_surfaces(
        &mut self,
        center: GridPos,
        radius: u32,
        damage_type: DamageType,
    ) {
        for position in center.cells_within(radius) {
            let Some(from) = self.state.surfaces.kind_at(position) else {
                continue;
            };
            if let Some(to) = from.react_to(damage_type) {
                self.state.surfaces.transform(position, to);
                self.emit(EventKind::SurfaceTransformed { position, from, to });
            }
        }
    }

    /// Hazard damage and entry save for `combatant` stepping onto `position`.
    pub fn enter_surface(&mut self, combatant: CombatantId, position: GridPos) -> Result<(), EngineError> {
        let Some(cell) = self.state.surfaces.at(position).copied() else {
            return Ok(());
        };
        self.surface_hazard(combatant, cell)?;

        let present = self.state.combatant(combatant).is_some_and(|c| c.life.is_present());
        if let Some(save) = cell.surface.entry_save()
            && present
        {
            let dc = i32::try_from(save.dc).unwrap_or(i32::MAX);
            if !self.saving_throw(combatant, save.ability, dc, cell.owner)? {
                self.apply_status(
                    StatusApplication::new(StatusId::new(save.status), combatant)
                        .from_source(cell.owner),
                )?;
            }
        }
        Ok(())
    }

    /// Start-of-turn hazard for whoever stands in a damaging surface.
    pub fn surface_turn_start(&mut self, combatant: CombatantId) -> Result<(), EngineError> {
        let Some(position) = self.state.combatant(combatant).map(|c| c.position) else {
            return Ok(());
        };
        if let Some(cell) = self.state.surfaces.at(position).copied() {
            self.surface_hazard(combatant, cell)?;
        }
        Ok(())
    }

    /// Ages surfaces at the round boundary.
    pub fn expire_surfaces(&mut self) {
        for (position, cell) in self.state.surfaces.tick_lifetimes() {
            self.emit(EventKind::SurfaceExpired {
                position,
                surface: cell.surface,
            });
        }
    }

    fn surface_hazard(&mut self, combatant: CombatantId, cell: SurfaceCell) -> Result<(), EngineError> {
        let Some((dice, damage_type)) = cell.surface.hazard() else {
            return Ok(());
        };
        let amount = self.roll_amount(&dice)?;
        self.deal_damage(DamageRequest {
            source: cell.owner,
            target: combatant,
            packet: DamagePacket::single(damage_type, amount),
            critical: false,
            origin: DamageOrigin::Surface,
            spell: false,
        })?;
        Ok(())
    }
}
