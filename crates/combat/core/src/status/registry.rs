//! Storage for live status instances.
//!
//! The registry only stores and indexes. Lifecycle work (functors, events,
//! immunity sweeps) lives on the combat context so there is one removal path.

use std::collections::BTreeMap;

use crate::state::{CombatantId, StatusId, StatusInstanceId};

use super::{StackingPolicy, StatusDefinition, StatusDuration, StatusInstance};

/// What applying a status to a combatant would do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyPlan {
    /// No instance yet; create one.
    Create,
    /// Non-stackable instance exists; reset its duration.
    Refresh(StatusInstanceId),
    /// Stackable instance exists below its cap.
    AddStack(StatusInstanceId),
    /// Stackable instance is already at its cap; only the duration refreshes.
    AtMaxStacks(StatusInstanceId),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusRegistry {
    instances: BTreeMap<StatusInstanceId, StatusInstance>,
    next_id: u64,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: StatusInstanceId) -> Option<&StatusInstance> {
        self.instances.get(&id)
    }

    pub fn get_mut(&mut self, id: StatusInstanceId) -> Option<&mut StatusInstance> {
        self.instances.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusInstance> {
        self.instances.values()
    }

    /// Instances on `target`, oldest first.
    pub fn on(&self, target: CombatantId) -> impl Iterator<Item = &StatusInstance> {
        self.instances.values().filter(move |i| i.target == target)
    }

    pub fn ids_on(&self, target: CombatantId) -> Vec<StatusInstanceId> {
        self.on(target).map(|i| i.id).collect()
    }

    pub fn find(&self, target: CombatantId, status: &StatusId) -> Option<&StatusInstance> {
        self.on(target).find(|i| &i.status == status)
    }

    pub fn has(&self, target: CombatantId, status: &StatusId) -> bool {
        self.find(target, status).is_some()
    }

    /// Instances kept alive by `caster`'s concentration.
    pub fn linked_to(&self, caster: CombatantId) -> Vec<StatusInstanceId> {
        self.instances
            .values()
            .filter(|i| i.linked_caster == Some(caster))
            .map(|i| i.id)
            .collect()
    }

    pub fn plan(&self, definition: &StatusDefinition, target: CombatantId) -> ApplyPlan {
        match self.find(target, &definition.id) {
            None => ApplyPlan::Create,
            Some(existing) => match definition.stacking {
                StackingPolicy::Refresh => ApplyPlan::Refresh(existing.id),
                StackingPolicy::Stack { .. } if existing.stacks < definition.max_stacks() => {
                    ApplyPlan::AddStack(existing.id)
                }
                StackingPolicy::Stack { .. } => ApplyPlan::AtMaxStacks(existing.id),
            },
        }
    }

    /// Stores a new instance and returns its id.
    pub fn insert(
        &mut self,
        definition: &StatusDefinition,
        source: Option<CombatantId>,
        target: CombatantId,
        duration: StatusDuration,
        linked_caster: Option<CombatantId>,
        round: u32,
    ) -> StatusInstanceId {
        let id = StatusInstanceId(self.next_id);
        self.next_id += 1;
        self.instances.insert(
            id,
            StatusInstance {
                id,
                status: definition.id.clone(),
                source,
                target,
                remaining: duration,
                stacks: 1,
                linked_caster,
                applied_round: round,
            },
        );
        id
    }

    /// Resets duration and ownership; optionally adds a stack. Returns the new stack count.
    pub fn refresh(
        &mut self,
        id: StatusInstanceId,
        duration: StatusDuration,
        source: Option<CombatantId>,
        linked_caster: Option<CombatantId>,
        add_stack: bool,
    ) -> Option<u8> {
        let instance = self.instances.get_mut(&id)?;
        instance.remaining = duration;
        instance.source = source;
        instance.linked_caster = linked_caster;
        if add_stack {
            instance.stacks = instance.stacks.saturating_add(1);
        }
        Some(instance.stacks)
    }

    pub fn take(&mut self, id: StatusInstanceId) -> Option<StatusInstance> {
        self.instances.remove(&id)
    }
}
