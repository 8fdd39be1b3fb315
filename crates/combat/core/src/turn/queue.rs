use crate::state::CombatantId;

/// How the turn order is decided at encounter start.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InitiativeOrder {
    /// Use this order verbatim. Must list every combatant exactly once.
    Explicit(Vec<CombatantId>),
    /// d20 + DEX modifier (or the combatant's preset score), highest first.
    #[default]
    Rolled,
}

/// One combatant's initiative result, used for sorting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitiativeEntry {
    pub id: CombatantId,
    pub score: i32,
    pub tiebreaker: i32,
    pub dexterity: i32,
}

/// Highest score first, then tiebreaker, then DEX score, then lowest id.
pub fn sort_initiative(entries: &mut [InitiativeEntry]) {
    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.tiebreaker.cmp(&a.tiebreaker))
            .then(b.dexterity.cmp(&a.dexterity))
            .then(a.id.cmp(&b.id))
    });
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnQueue {
    pub order: Vec<CombatantId>,
    pub index: usize,
    /// 1-based once the encounter has started.
    pub round: u32,
}

impl TurnQueue {
    pub fn new(order: Vec<CombatantId>) -> Self {
        Self {
            order,
            index: 0,
            round: 1,
        }
    }

    pub fn current(&self) -> Option<CombatantId> {
        self.order.get(self.index).copied()
    }

    /// Moves to the next slot for which `can_act` holds.
    ///
    /// Returns the new actor and whether a round boundary was crossed, or
    /// `None` when nobody can act.
    pub fn advance(&mut self, can_act: impl Fn(CombatantId) -> bool) -> Option<(CombatantId, bool)> {
        let len = self.order.len();
        if len == 0 {
            return None;
        }
        let mut wrapped = false;
        for step in 1..=len {
            let next = (self.index + step) % len;
            if next <= self.index {
                wrapped = true;
            }
            if can_act(self.order[next]) {
                self.index = next;
                return Some((self.order[next], wrapped));
            }
        }
        None
    }

    /// Points the queue at the first combatant for which `can_act` holds.
    pub fn reset_to_first(&mut self, can_act: impl Fn(CombatantId) -> bool) -> Option<CombatantId> {
        let index = self.order.iter().position(|id| can_act(*id))?;
        self.index = index;
        Some(self.order[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_break_on_tiebreaker_then_dex_then_id() {
        let mut entries = vec![
            InitiativeEntry { id: CombatantId(3), score: 12, tiebreaker: 5, dexterity: 14 },
            InitiativeEntry { id: CombatantId(1), score: 12, tiebreaker: 5, dexterity: 14 },
            InitiativeEntry { id: CombatantId(2), score: 12, tiebreaker: 5, dexterity: 16 },
            InitiativeEntry { id: CombatantId(4), score: 12, tiebreaker: 9, dexterity: 8 },
            InitiativeEntry { id: CombatantId(5), score: 18, tiebreaker: 0, dexterity: 8 },
        ];
        sort_initiative(&mut entries);
        let ids: Vec<u32> = entries.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, [5, 4, 2, 1, 3]);
    }

    #[test]
    fn advance_skips_and_reports_wrap() {
        let mut queue = TurnQueue::new(vec![CombatantId(1), CombatantId(2), CombatantId(3)]);
        let dead = CombatantId(2);
        assert_eq!(queue.advance(|id| id != dead), Some((CombatantId(3), false)));
        assert_eq!(queue.advance(|id| id != dead), Some((CombatantId(1), true)));
        assert_eq!(queue.advance(|_| false), None);
    }
}
