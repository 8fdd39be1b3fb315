//! Synchronous topic-based delivery plus a bounded replay log.

use std::collections::VecDeque;

use super::{CombatEvent, Topic};

/// Receives published events.
pub trait EventSubscriber {
    fn on_event(&mut self, event: &CombatEvent);
}

impl<F> EventSubscriber for F
where
    F: FnMut(&CombatEvent),
{
    fn on_event(&mut self, event: &CombatEvent) {
        self(event)
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    /// `None` receives every topic.
    topics: Option<Vec<Topic>>,
    subscriber: Box<dyn EventSubscriber>,
}

/// Delivers events in publish order on the calling thread.
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    log: VecDeque<CombatEvent>,
    capacity: usize,
    next_id: u64,
}

impl EventBus {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subscriptions: Vec::new(),
            log: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            next_id: 0,
        }
    }

    pub fn publish(&mut self, event: CombatEvent) {
        let topic = event.topic();
        for subscription in &mut self.subscriptions {
            let wanted = subscription
                .topics
                .as_ref()
                .is_none_or(|topics| topics.contains(&topic));
            if wanted {
                subscription.subscriber.on_event(&event);
            }
        }

        if self.capacity == 0 {
            return;
        }
        if self.log.len() == self.capacity {
            self.log.pop_front();
        }
        self.log.push_back(event);
    }

    /// Subscribes to the given topics.
    pub fn subscribe(
        &mut self,
        topics: &[Topic],
        subscriber: impl EventSubscriber + 'static,
    ) -> SubscriptionId {
        self.add(Some(topics.to_vec()), Box::new(subscriber))
    }

    pub fn subscribe_all(&mut self, subscriber: impl EventSubscriber + 'static) -> SubscriptionId {
        self.add(None, Box::new(subscriber))
    }

    fn add(&mut self, topics: Option<Vec<Topic>>, subscriber: Box<dyn EventSubscriber>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            topics,
            subscriber,
        });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        before != self.subscriptions.len()
    }

    /// Most recent events, oldest first.
    pub fn log(&self) -> impl Iterator<Item = &CombatEvent> {
        self.log.iter()
    }

    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(crate::config::CombatConfig::DEFAULT_EVENT_LOG_CAPACITY)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .field("logged", &self.log.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::event::EventKind;

    fn event(seq: u64, kind: EventKind) -> CombatEvent {
        CombatEvent {
            seq,
            round: 1,
            kind,
        }
    }

    #[test]
    fn subscribers_only_see_their_topics() {
        let mut bus = EventBus::with_capacity(8);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(&[Topic::Turn], move |e: &CombatEvent| sink.borrow_mut().push(e.seq));

        bus.publish(event(0, EventKind::RoundStarted { round: 1 }));
        bus.publish(event(
            1,
            EventKind::DataWarning {
                message: "x".into(),
            },
        ));
        assert_eq!(*seen.borrow(), vec![0]);
    }

    #[test]
    fn log_is_bounded() {
        let mut bus = EventBus::with_capacity(2);
        for seq in 0..5 {
            bus.publish(event(seq, EventKind::RoundStarted { round: 1 }));
        }
        let kept: Vec<u64> = bus.log().map(|e| e.seq).collect();
        assert_eq!(kept, vec![3, 4]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::with_capacity(0);
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = bus.subscribe_all(move |_: &CombatEvent| *sink.borrow_mut() += 1);
        bus.publish(event(0, EventKind::RoundStarted { round: 1 }));
        assert!(bus.unsubscribe(id));
        bus.publish(event(1, EventKind::RoundStarted { round: 2 }));
        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.log_len(), 0);
    }
}
