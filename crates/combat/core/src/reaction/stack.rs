//! LIFO resolution stack with explicit cancellation.
//!
//! A popped item hands its payload to the resolution callback only when it
//! was not cancelled. There is no other way to get the payload out, so a
//! cancelled item can never resolve.

use crate::state::CombatantId;

use super::TriggerKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionItem<P> {
    pub seq: u64,
    pub kind: TriggerKind,
    pub source: Option<CombatantId>,
    pub target: Option<CombatantId>,
    /// Higher resolves first within one batch; declare order breaks ties.
    pub priority: i32,
    payload: P,
    cancelled: bool,
    modified: bool,
}

/// Outcome of resolving a popped item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution<P, R> {
    Resolved(R),
    Cancelled(ResolutionItem<P>),
}

impl<P> ResolutionItem<P> {
    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn modify(&mut self, edit: impl FnOnce(&mut P)) {
        edit(&mut self.payload);
        self.modified = true;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn resolve<R>(self, callback: impl FnOnce(P) -> R) -> Resolution<P, R> {
        if self.cancelled {
            Resolution::Cancelled(self)
        } else {
            Resolution::Resolved(callback(self.payload))
        }
    }
}

/// Item to push, before it gets a sequence number.
#[derive(Clone, Debug)]
pub struct PendingItem<P> {
    pub kind: TriggerKind,
    pub source: Option<CombatantId>,
    pub target: Option<CombatantId>,
    pub priority: i32,
    pub payload: P,
}

impl<P> PendingItem<P> {
    pub fn new(kind: TriggerKind, payload: P) -> Self {
        Self {
            kind,
            source: None,
            target: None,
            priority: 0,
            payload,
        }
    }

    pub fn between(mut self, source: Option<CombatantId>, target: Option<CombatantId>) -> Self {
        self.source = source;
        self.target = target;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[derive(Clone, Debug)]
pub struct ResolutionStack<P> {
    items: Vec<ResolutionItem<P>>,
    next_seq: u64,
}

impl<P> Default for ResolutionStack<P> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<P> ResolutionStack<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: PendingItem<P>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.items.push(ResolutionItem {
            seq,
            kind: item.kind,
            source: item.source,
            target: item.target,
            priority: item.priority,
            payload: item.payload,
            cancelled: false,
            modified: false,
        });
        seq
    }

    /// Pushes several items so they pop by priority, then in declare order.
    ///
    /// Returned sequence numbers follow the input order.
    pub fn push_batch(&mut self, items: Vec<PendingItem<P>>) -> Vec<u64> {
        let base = self.next_seq;
        let mut indexed: Vec<(usize, PendingItem<P>)> = items.into_iter().enumerate().collect();
        // Last pushed pops first: lowest priority and latest declaration go in first.
        indexed.sort_by(|(ia, a), (ib, b)| a.priority.cmp(&b.priority).then(ib.cmp(ia)));

        let count = indexed.len();
        for (declared, item) in indexed {
            self.items.push(ResolutionItem {
                seq: base + declared as u64,
                kind: item.kind,
                source: item.source,
                target: item.target,
                priority: item.priority,
                payload: item.payload,
                cancelled: false,
                modified: false,
            });
        }
        self.next_seq += count as u64;
        (0..count as u64).map(|offset| base + offset).collect()
    }

    pub fn get(&self, seq: u64) -> Option<&ResolutionItem<P>> {
        self.items.iter().find(|item| item.seq == seq)
    }

    pub fn get_mut(&mut self, seq: u64) -> Option<&mut ResolutionItem<P>> {
        self.items.iter_mut().find(|item| item.seq == seq)
    }

    pub fn peek(&self) -> Option<&ResolutionItem<P>> {
        self.items.last()
    }

    pub fn pop(&mut self) -> Option<ResolutionItem<P>> {
        self.items.pop()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::env::{PcgRng, RngOracle, compute_seed};

    #[test]
    fn pops_in_lifo_order() {
        let mut stack = ResolutionStack::new();
        let a = stack.push(PendingItem::new(TriggerKind::TurnStart, 'a'));
        let b = stack.push(PendingItem::new(TriggerKind::TurnStart, 'b'));
        assert_eq!(stack.pop().map(|i| i.seq), Some(b));
        assert_eq!(stack.pop().map(|i| i.seq), Some(a));
        assert!(stack.pop().is_none());
    }

    #[test]
    fn batch_pops_by_priority_then_declare_order() {
        let mut stack = ResolutionStack::new();
        let seqs = stack.push_batch(vec![
            PendingItem::new(TriggerKind::TurnEnd, "low-first").with_priority(0),
            PendingItem::new(TriggerKind::TurnEnd, "high").with_priority(5),
            PendingItem::new(TriggerKind::TurnEnd, "low-second").with_priority(0),
        ]);
        assert_eq!(seqs, vec![0, 1, 2]);

        let order: Vec<&str> = std::iter::from_fn(|| stack.pop())
            .map(|item| *item.payload())
            .collect();
        assert_eq!(order, ["high", "low-first", "low-second"]);
    }

    #[test]
    fn modify_marks_the_item() {
        let mut stack = ResolutionStack::new();
        let seq = stack.push(PendingItem::new(TriggerKind::DamageAboutToApply, 10u32));
        let item = stack.get_mut(seq).unwrap();
        item.modify(|amount| *amount /= 2);
        assert!(item.is_modified());

        let popped = stack.pop().unwrap();
        assert_eq!(popped.resolve(|amount| amount), Resolution::Resolved(5));
    }

    #[test]
    fn cancelled_items_never_run_their_callback() {
        let rng = PcgRng;
        for seed in 0..20u64 {
            let mut stack = ResolutionStack::new();
            let mut cancelled = BTreeSet::new();
            let seqs: Vec<u64> = (0..100u32)
                .map(|n| stack.push(PendingItem::new(TriggerKind::DamageAboutToApply, n)))
                .collect();

            for (index, seq) in seqs.iter().enumerate() {
                if rng.roll_die(compute_seed(seed, index as u64, 1, 0), 2) == 1 {
                    stack.get_mut(*seq).unwrap().cancel();
                    cancelled.insert(*seq);
                }
            }

            let mut side_effects = BTreeSet::new();
            let mut cancelled_seen = BTreeSet::new();
            while let Some(item) = stack.pop() {
                let seq = item.seq;
                match item.resolve(|_| side_effects.insert(seq)) {
                    Resolution::Resolved(_) => {}
                    Resolution::Cancelled(item) => {
                        cancelled_seen.insert(item.seq);
                    }
                }
            }

            let expected: BTreeSet<u64> = seqs
                .iter()
                .copied()
                .filter(|seq| !cancelled.contains(seq))
                .collect();
            assert_eq!(side_effects, expected);
            assert_eq!(cancelled_seen, cancelled);
        }
    }
}
