//! Synchronous topic-based event bus.

use std::fmt;

use outpost_core::Event;

/// Topics used to route events to subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    /// Clock progress.
    Time,
    /// Entities entering the yard.
    Spawns,
    /// Selection changes and their visual feedback.
    Selection,
    /// Turrets moving between slots and the hand, merging and settling.
    Turrets,
    /// Pickups entering, settling in and leaving the backpack.
    Abilities,
    /// Animation requests.
    Tweens,
    /// Player pose changes.
    Player,
    /// Enemy damage and deaths.
    Combat,
    /// Round lifecycle.
    Lifecycle,
}

impl Topic {
    /// Topic an event is published under.
    #[must_use]
    pub fn of(event: &Event) -> Self {
        match event {
            Event::TimeAdvanced { .. } => Self::Time,
            Event::SlotSpawned { .. }
            | Event::TurretSpawned { .. }
            | Event::PickupSpawned { .. }
            | Event::EnemySpawned { .. } => Self::Spawns,
            Event::SlotSelected { .. }
            | Event::SlotDeselected { .. }
            | Event::TurretHighlightChanged { .. }
            | Event::RangePreviewShown { .. }
            | Event::RangePreviewHidden { .. } => Self::Selection,
            Event::TurretTaken { .. }
            | Event::TurretPlaced { .. }
            | Event::TurretSettled { .. }
            | Event::PlacementReleased
            | Event::UpgradeStarted { .. }
            | Event::TurretUpgraded { .. }
            | Event::TurretDestroyed { .. } => Self::Turrets,
            Event::AbilityCollected { .. }
            | Event::AbilityStowed { .. }
            | Event::AbilityActivated { .. } => Self::Abilities,
            Event::TweenRequested { .. } => Self::Tweens,
            Event::PlayerMoved { .. } => Self::Player,
            Event::EnemyDamaged { .. } | Event::EnemyDied { .. } => Self::Combat,
            Event::GameFinished => Self::Lifecycle,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`] that identifies a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u32);

type Handler = Box<dyn FnMut(&Event)>;

struct Subscription {
    id: SubscriptionId,
    topics: Vec<Topic>,
    handler: Handler,
}

impl Subscription {
    fn wants(&self, topic: Topic) -> bool {
        self.topics.is_empty() || self.topics.contains(&topic)
    }
}

/// Event bus that delivers every published event to matching subscribers in
/// subscription order.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_subscription_id: u32,
}

impl EventBus {
    /// Creates a bus without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for the provided topics; an empty slice subscribes
    /// to every topic.
    pub fn subscribe<F>(&mut self, topics: &[Topic], handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id = self.next_subscription_id.wrapping_add(1);
        self.subscriptions.push(Subscription {
            id,
            topics: topics.to_vec(),
            handler: Box::new(handler),
        });
        id
    }

    /// Removes a subscription. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|subscription| subscription.id != id);
        self.subscriptions.len() != before
    }

    /// Number of registered subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether nobody listens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Delivers the event to every subscriber of its topic.
    pub fn publish(&mut self, event: &Event) {
        let topic = Topic::of(event);
        for subscription in &mut self.subscriptions {
            if subscription.wants(topic) {
                (subscription.handler)(event);
            }
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::{PickupId, SlotId};
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn subscribers_only_receive_their_topics() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _ = bus.subscribe(&[Topic::Abilities], move |event| {
            sink.borrow_mut().push(event.clone())
        });

        bus.publish(&Event::SlotSelected {
            slot: SlotId::new(0),
        });
        bus.publish(&Event::AbilityStowed {
            pickup: PickupId::new(1),
        });

        assert_eq!(
            *seen.borrow(),
            vec![Event::AbilityStowed {
                pickup: PickupId::new(1)
            }]
        );
    }

    #[test]
    fn unsubscribed_handlers_stop_receiving() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0_u32));
        let sink = Rc::clone(&count);
        let id = bus.subscribe(&[], move |_| *sink.borrow_mut() += 1);

        bus.publish(&Event::GameFinished);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&Event::GameFinished);

        assert_eq!(*count.borrow(), 1);
        assert!(bus.is_empty());
    }
}
