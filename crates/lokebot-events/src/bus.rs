use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::debug;

/// Listener callbacks receive the triggering event's payload.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

struct Subscription {
    once: bool,
    fired: AtomicBool,
    requirements: Vec<String>,
    listener: Listener,
}

impl Subscription {
    fn ping(&self, bus: &EventBus, payload: &Value) {
        if self.once {
            // A once subscription opens only when every required event has
            // been seen, and at most one ping gets through the flag.
            if bus.requirements_met_named(&self.requirements)
                && !self.fired.swap(true, Ordering::SeqCst)
            {
                (self.listener)(payload);
            }
        } else {
            self.fired.store(true, Ordering::SeqCst);
            (self.listener)(payload);
        }
    }
}

#[derive(Default)]
struct EventEntry {
    emitted: bool,
    subscriptions: Vec<Arc<Subscription>>,
}

/// Notification dispatcher with once-semantics and multi-event AND-gating.
///
/// An instance type: construct one per process (or per test) and share it
/// via `Arc` — there is no ambient global bus.
#[derive(Default)]
pub struct EventBus {
    events: RwLock<HashMap<String, EventEntry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one or more events. The listener is called every time
    /// *any* of the given events triggers.
    pub fn on(&self, events: &[&str], listener: impl Fn(&Value) + Send + Sync + 'static) {
        self.add(events, Arc::new(listener), false);
    }

    /// Subscribe to one or more events with once-semantics: the listener is
    /// called exactly once, the first time *all* the given events have been
    /// triggered. If the requirements are already met when subscribing, it
    /// is called immediately.
    pub fn once(&self, events: &[&str], listener: impl Fn(&Value) + Send + Sync + 'static) {
        let subscription = self.add(events, Arc::new(listener), true);
        // The gate may already be open.
        subscription.ping(self, &Value::Null);
    }

    /// Trigger an event, pinging its subscriptions with `payload`.
    ///
    /// An event nobody subscribed to is still recorded as emitted, so later
    /// once-gates observe it.
    pub fn trigger(&self, event: &str, payload: Value) {
        let to_ping: Vec<Arc<Subscription>> = {
            let mut events = self.events.write().expect("event bus poisoned");
            let entry = events.entry(event.to_string()).or_default();
            entry.emitted = true;
            entry.subscriptions.clone()
        };

        // The lock is released before listeners run, so a listener may
        // itself trigger further events.
        for subscription in to_ping {
            subscription.ping(self, &payload);
        }
    }

    /// Whether every one of the given events has been triggered at least
    /// once.
    pub fn requirements_met(&self, events: &[&str]) -> bool {
        let map = self.events.read().expect("event bus poisoned");
        events
            .iter()
            .all(|name| map.get(*name).is_some_and(|entry| entry.emitted))
    }

    fn requirements_met_named(&self, events: &[String]) -> bool {
        let map = self.events.read().expect("event bus poisoned");
        events
            .iter()
            .all(|name| map.get(name).is_some_and(|entry| entry.emitted))
    }

    fn add(&self, events: &[&str], listener: Listener, once: bool) -> Arc<Subscription> {
        let subscription = Arc::new(Subscription {
            once,
            fired: AtomicBool::new(false),
            requirements: events.iter().map(|e| e.to_string()).collect(),
            listener,
        });

        let mut map = self.events.write().expect("event bus poisoned");
        for event in events {
            map.entry(event.to_string())
                .or_default()
                .subscriptions
                .push(Arc::clone(&subscription));
        }
        debug!(events = ?events, once, "subscription added");

        subscription
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&Value) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let in_listener = Arc::clone(&count);
        (count, move |_: &Value| {
            in_listener.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn on_is_triggered_every_time_in_single_subscription() {
        let bus = EventBus::new();
        let (count, listener) = counter();
        bus.on(&["on-1"], listener);

        bus.trigger("on-1", Value::Null);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        bus.trigger("on-1", Value::Null);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn on_is_triggered_by_any_event_in_multi_subscription() {
        let bus = EventBus::new();
        let (count, listener) = counter();
        bus.on(&["on-multi-1", "on-multi-2"], listener);

        bus.trigger("on-multi-1", Value::Null);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        bus.trigger("on-multi-2", Value::Null);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn once_is_triggered_only_once_in_single_subscription() {
        let bus = EventBus::new();
        let (count, listener) = counter();
        bus.once(&["once-1"], listener);

        bus.trigger("once-1", Value::Null);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        bus.trigger("once-1", Value::Null);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn once_fires_only_after_all_requirements_are_met() {
        let bus = EventBus::new();
        let (count, listener) = counter();
        bus.once(&["once-multi-1", "once-multi-2"], listener);

        bus.trigger("once-multi-1", Value::Null);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        bus.trigger("once-multi-2", Value::Null);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        bus.trigger("once-multi-1", Value::Null);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        bus.trigger("once-multi-2", Value::Null);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn once_fires_immediately_when_requirements_already_met() {
        let bus = EventBus::new();
        bus.trigger("ready", Value::Bool(true));

        let (count, listener) = counter();
        bus.once(&["ready"], listener);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn trigger_without_subscribers_is_recorded_as_emitted() {
        let bus = EventBus::new();
        assert!(!bus.requirements_met(&["phantom"]));
        bus.trigger("phantom", Value::Null);
        assert!(bus.requirements_met(&["phantom"]));
    }

    #[test]
    fn requirements_are_unmet_for_unknown_events() {
        let bus = EventBus::new();
        bus.trigger("known", Value::Null);
        assert!(bus.requirements_met(&["known"]));
        assert!(!bus.requirements_met(&["known", "unknown"]));
    }

    #[test]
    fn payload_reaches_the_listener() {
        let bus = EventBus::new();
        let seen = Arc::new(RwLock::new(Value::Null));
        let in_listener = Arc::clone(&seen);
        bus.on(&["ready"], move |payload| {
            *in_listener.write().unwrap() = payload.clone();
        });

        bus.trigger("ready", Value::String("logged in".into()));
        assert_eq!(*seen.read().unwrap(), Value::String("logged in".into()));
    }

    #[test]
    fn listener_may_trigger_from_within_a_callback() {
        let bus = Arc::new(EventBus::new());
        let (count, listener) = counter();
        bus.on(&["second"], listener);

        let chained = Arc::clone(&bus);
        bus.on(&["first"], move |_| {
            chained.trigger("second", Value::Null);
        });

        bus.trigger("first", Value::Null);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
