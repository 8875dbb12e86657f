//! Instance lifecycle tracker
//!
//! Turns the store's change feed into a stable, throttled, expiring set of
//! detected device instances. Per key the state machine is
//! absent -> active -> stale -> absent: the first change carrying a real
//! measurement activates a key, further changes refresh it silently, and the
//! periodic sweep removes keys whose last update is older than the stale
//! threshold. Subscribers get the full snapshot after any net change
//! (addition or removal), never on refresh, at most once per configured
//! notification gap.

use crate::config::TrackerConfig;
use crate::observer::{ObserverRegistry, Subscription};
use crate::store::AppliedChange;
use nmea_decoder::types::{SensorCategory, Timestamp};
use std::collections::HashMap;
use std::fmt;

/// Display grouping for detected instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InstrumentGroup {
    Navigation,
    Environment,
    Propulsion,
    Electrical,
}

impl InstrumentGroup {
    /// Fixed category -> group table
    pub fn of(category: SensorCategory) -> Self {
        match category {
            SensorCategory::Gps | SensorCategory::Compass | SensorCategory::Navigation => {
                InstrumentGroup::Navigation
            }
            SensorCategory::Wind | SensorCategory::Depth | SensorCategory::Temperature => {
                InstrumentGroup::Environment
            }
            SensorCategory::Speed | SensorCategory::Engine | SensorCategory::Rudder => {
                InstrumentGroup::Propulsion
            }
            SensorCategory::Battery | SensorCategory::Tank => InstrumentGroup::Electrical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentGroup::Navigation => "navigation",
            InstrumentGroup::Environment => "environment",
            InstrumentGroup::Propulsion => "propulsion",
            InstrumentGroup::Electrical => "electrical",
        }
    }
}

impl fmt::Display for InstrumentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display ordering for a category, lower first
fn display_priority(category: SensorCategory) -> u8 {
    match category {
        SensorCategory::Gps => 10,
        SensorCategory::Compass => 20,
        SensorCategory::Speed => 30,
        SensorCategory::Wind => 40,
        SensorCategory::Depth => 50,
        SensorCategory::Temperature => 60,
        SensorCategory::Engine => 70,
        SensorCategory::Battery => 80,
        SensorCategory::Tank => 90,
        SensorCategory::Rudder => 100,
        SensorCategory::Navigation => 110,
    }
}

/// One active device instance, as presented to the widget layer
///
/// Disposable: the tracker can rebuild the whole set at any time by replaying
/// current store state.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedInstance {
    /// Stable identifier, `"<category>-<instance>"`
    pub id: String,
    pub category: SensorCategory,
    pub instance: u8,
    /// Deterministic display title ("Engine 0", "Battery 1")
    pub title: String,
    pub group: InstrumentGroup,
    pub last_seen: Timestamp,
    /// Display ordering, lower first
    pub priority: u8,
}

impl DetectedInstance {
    fn new(category: SensorCategory, instance: u8, last_seen: Timestamp) -> Self {
        Self {
            id: format!("{}-{}", category.as_str(), instance),
            category,
            instance,
            title: format!("{} {}", category.title(), instance),
            group: InstrumentGroup::of(category),
            last_seen,
            priority: display_priority(category),
        }
    }
}

/// The event-driven instance tracker
pub struct InstanceTracker {
    config: TrackerConfig,
    detected: HashMap<(SensorCategory, u8), DetectedInstance>,
    observers: ObserverRegistry<Vec<DetectedInstance>>,
    /// A net change happened since the last notification
    dirty: bool,
    last_notified: Option<Timestamp>,
    last_swept: Option<Timestamp>,
}

impl InstanceTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            detected: HashMap::new(),
            observers: ObserverRegistry::new(),
            dirty: false,
            last_notified: None,
            last_swept: None,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Feed one store change into the tracker
    ///
    /// A key seen on the bus without any measurement yet gets no instance -
    /// this guards against widgets appearing for devices that have not yet
    /// reported a reading.
    pub fn observe(&mut self, change: &AppliedChange, now: Timestamp) {
        let key = (change.category, change.instance);
        match self.detected.get_mut(&key) {
            Some(existing) => {
                // Refresh only; no notification
                existing.last_seen = change.timestamp;
            }
            None => {
                if change.has_measurements {
                    log::debug!("instance detected: {}-{}", change.category, change.instance);
                    self.detected.insert(
                        key,
                        DetectedInstance::new(change.category, change.instance, change.timestamp),
                    );
                    self.dirty = true;
                }
            }
        }
        self.flush(now);
    }

    /// Remove instances whose last update is older than the stale threshold
    ///
    /// Linear scan, idempotent, safe to call at any time regardless of update
    /// traffic.
    pub fn sweep(&mut self, now: Timestamp) {
        let stale_after = self.config.stale_after();
        let before = self.detected.len();
        self.detected.retain(|_, instance| {
            let stale = now - instance.last_seen > stale_after;
            if stale {
                log::debug!("instance expired: {}", instance.id);
            }
            !stale
        });
        if self.detected.len() != before {
            self.dirty = true;
        }
        self.last_swept = Some(now);
        self.flush(now);
    }

    /// Convenience driver: runs the sweep when its interval has elapsed,
    /// otherwise just flushes any pending notification
    pub fn tick(&mut self, now: Timestamp) {
        let due = match self.last_swept {
            None => true,
            Some(last) => now - last >= self.config.sweep_every(),
        };
        if due {
            self.sweep(now);
        } else {
            self.flush(now);
        }
    }

    /// Notify subscribers if a net change is pending and the rate limit
    /// allows it; otherwise the change stays pending for a later call
    fn flush(&mut self, now: Timestamp) {
        if !self.dirty {
            return;
        }
        if let Some(last) = self.last_notified {
            if now - last < self.config.min_notify_gap() {
                return;
            }
        }
        self.dirty = false;
        self.last_notified = Some(now);
        let snapshot = self.snapshot();
        self.observers.dispatch(&snapshot);
    }

    /// Current instance set, sorted for display
    pub fn snapshot(&self) -> Vec<DetectedInstance> {
        let mut instances: Vec<DetectedInstance> = self.detected.values().cloned().collect();
        instances.sort_by_key(|d| (d.priority, d.instance));
        instances
    }

    pub fn contains(&self, category: SensorCategory, instance: u8) -> bool {
        self.detected.contains_key(&(category, instance))
    }

    pub fn len(&self) -> usize {
        self.detected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detected.is_empty()
    }

    /// Register a snapshot subscriber
    pub fn subscribe(
        &mut self,
        callback: impl Fn(&Vec<DetectedInstance>) + 'static,
    ) -> Subscription {
        self.observers.subscribe(callback)
    }

    /// Remove a snapshot subscriber
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.observers.cancel(subscription)
    }

    /// Drop all instances, notifying subscribers of the empty set
    pub fn reset(&mut self, now: Timestamp) {
        if !self.detected.is_empty() {
            self.detected.clear();
            self.dirty = true;
        }
        self.flush(now);
    }
}
