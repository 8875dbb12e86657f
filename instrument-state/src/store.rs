//! Sensor state store
//!
//! Accumulates `SensorUpdate` records into per-instance field state keyed by
//! `(category, instance)`. Each stored field carries its timestamp and, where
//! the field is fed by more than one source, the claim that last won
//! arbitration: an incoming claimed field replaces the stored one only when
//! its declared priority is equal or higher, so the primary reading is never
//! regressed by a lower-priority source. State is refreshed in place and
//! never deleted except on full reset - staleness is the tracker's concern.

use crate::observer::{ObserverRegistry, Subscription};
use nmea_decoder::types::{
    FieldUpdate, FieldValue, SensorCategory, SensorUpdate, SourceClaim, Timestamp,
};
use std::collections::HashMap;

/// One accumulated field with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct StoredField {
    pub value: FieldValue,
    pub timestamp: Timestamp,
    pub claim: Option<SourceClaim>,
}

/// Accumulated state for one `(category, instance)` pair
#[derive(Debug, Clone)]
pub struct SensorInstanceState {
    fields: HashMap<&'static str, StoredField>,
    pub last_seen: Timestamp,
}

impl SensorInstanceState {
    fn new(now: Timestamp) -> Self {
        Self {
            fields: HashMap::new(),
            last_seen: now,
        }
    }

    pub fn field(&self, key: &str) -> Option<&StoredField> {
        self.fields.get(key)
    }

    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key).map(|f| &f.value)
    }

    /// True once at least one genuine measurement has been stored
    pub fn has_measurements(&self) -> bool {
        self.fields.values().any(|f| f.value.is_measurement())
    }

    /// Field keys in sorted order, for stable display and tests
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self.fields.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Apply one field, honoring arbitration; returns false if the incoming
    /// value lost to a higher-priority claim
    fn apply(&mut self, field: &FieldUpdate, timestamp: Timestamp) -> bool {
        if let Some(stored) = self.fields.get(field.key) {
            let held = stored.claim.map(|c| c.priority).unwrap_or(0);
            let incoming = field.claim.map(|c| c.priority).unwrap_or(0);
            if stored.claim.is_some() && incoming < held {
                return false;
            }
        }
        self.fields.insert(
            field.key,
            StoredField {
                value: field.value.clone(),
                timestamp,
                claim: field.claim,
            },
        );
        true
    }
}

/// Outcome of applying one update, consumed by the instance tracker
#[derive(Debug, Clone)]
pub struct AppliedChange {
    pub category: SensorCategory,
    pub instance: u8,
    /// Field keys that were accepted (written or refreshed)
    pub applied: Vec<&'static str>,
    /// Field keys that lost arbitration
    pub rejected: Vec<&'static str>,
    /// Whether the state now holds at least one measurement field
    pub has_measurements: bool,
    pub timestamp: Timestamp,
}

/// The keyed sensor state store
pub struct SensorStore {
    states: HashMap<(SensorCategory, u8), SensorInstanceState>,
    observers: ObserverRegistry<AppliedChange>,
}

impl SensorStore {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            observers: ObserverRegistry::new(),
        }
    }

    /// Apply one update and notify change observers
    pub fn apply(&mut self, update: &SensorUpdate) -> AppliedChange {
        let key = (update.category, update.instance);
        let state = self
            .states
            .entry(key)
            .or_insert_with(|| SensorInstanceState::new(update.timestamp));

        let mut applied = Vec::new();
        let mut rejected = Vec::new();
        for field in &update.fields {
            if state.apply(field, update.timestamp) {
                applied.push(field.key);
            } else {
                log::trace!(
                    "{}-{}: field {} lost arbitration",
                    update.category,
                    update.instance,
                    field.key
                );
                rejected.push(field.key);
            }
        }
        // Last write wins, even for an update whose fields all lost
        state.last_seen = update.timestamp;

        let change = AppliedChange {
            category: update.category,
            instance: update.instance,
            applied,
            rejected,
            has_measurements: state.has_measurements(),
            timestamp: update.timestamp,
        };
        self.observers.dispatch(&change);
        change
    }

    pub fn state(&self, category: SensorCategory, instance: u8) -> Option<&SensorInstanceState> {
        self.states.get(&(category, instance))
    }

    /// Known instances of a category, sorted
    pub fn instances(&self, category: SensorCategory) -> Vec<u8> {
        let mut instances: Vec<u8> = self
            .states
            .keys()
            .filter(|(c, _)| *c == category)
            .map(|(_, i)| *i)
            .collect();
        instances.sort_unstable();
        instances
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Drop all state. The only deletion path; per-instance state is
    /// otherwise refreshed forever and merely goes stale.
    pub fn reset(&mut self) {
        self.states.clear();
    }

    /// Register a change observer
    pub fn subscribe(&mut self, callback: impl Fn(&AppliedChange) + 'static) -> Subscription {
        self.observers.subscribe(callback)
    }

    /// Remove a change observer
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.observers.cancel(subscription)
    }
}

impl Default for SensorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nmea_decoder::types::SourceClaim;

    fn update(
        category: SensorCategory,
        instance: u8,
        fields: &[(&'static str, f64, Option<SourceClaim>)],
    ) -> SensorUpdate {
        let mut u = SensorUpdate::new(category, instance, Utc::now());
        for (key, value, claim) in fields {
            match claim {
                Some(c) => u.push_claimed(key, FieldValue::Float(*value), *c),
                None => u.push(key, FieldValue::Float(*value)),
            }
        }
        u
    }

    const SURFACE: SourceClaim = SourceClaim {
        source: "depth-surface",
        priority: 3,
    };
    const TRANSDUCER: SourceClaim = SourceClaim {
        source: "depth-transducer",
        priority: 2,
    };
    const KEEL: SourceClaim = SourceClaim {
        source: "depth-keel",
        priority: 1,
    };

    #[test]
    fn test_unclaimed_fields_always_replace() {
        let mut store = SensorStore::new();
        store.apply(&update(SensorCategory::Speed, 0, &[("through_water", 5.0, None)]));
        store.apply(&update(SensorCategory::Speed, 0, &[("through_water", 6.0, None)]));
        let state = store.state(SensorCategory::Speed, 0).unwrap();
        assert_eq!(state.value("through_water"), Some(&FieldValue::Float(6.0)));
    }

    #[test]
    fn test_higher_priority_claim_wins_either_order() {
        // Waterline first: keel and transducer readings never touch "depth"
        let mut store = SensorStore::new();
        store.apply(&update(SensorCategory::Depth, 0, &[("depth", 10.0, Some(SURFACE))]));
        store.apply(&update(SensorCategory::Depth, 0, &[("depth", 8.0, Some(TRANSDUCER))]));
        store.apply(&update(SensorCategory::Depth, 0, &[("depth", 7.0, Some(KEEL))]));
        let state = store.state(SensorCategory::Depth, 0).unwrap();
        assert_eq!(state.value("depth"), Some(&FieldValue::Float(10.0)));
        assert_eq!(state.field("depth").unwrap().claim, Some(SURFACE));

        // Reverse order: each higher-priority arrival upgrades the field
        let mut store = SensorStore::new();
        store.apply(&update(SensorCategory::Depth, 0, &[("depth", 7.0, Some(KEEL))]));
        store.apply(&update(SensorCategory::Depth, 0, &[("depth", 8.0, Some(TRANSDUCER))]));
        let state = store.state(SensorCategory::Depth, 0).unwrap();
        assert_eq!(state.value("depth"), Some(&FieldValue::Float(8.0)));
        store.apply(&update(SensorCategory::Depth, 0, &[("depth", 10.0, Some(SURFACE))]));
        let state = store.state(SensorCategory::Depth, 0).unwrap();
        assert_eq!(state.value("depth"), Some(&FieldValue::Float(10.0)));
    }

    #[test]
    fn test_equal_priority_refreshes() {
        let mut store = SensorStore::new();
        store.apply(&update(SensorCategory::Depth, 0, &[("depth", 8.0, Some(TRANSDUCER))]));
        store.apply(&update(SensorCategory::Depth, 0, &[("depth", 8.4, Some(TRANSDUCER))]));
        let state = store.state(SensorCategory::Depth, 0).unwrap();
        assert_eq!(state.value("depth"), Some(&FieldValue::Float(8.4)));
    }

    #[test]
    fn test_rejected_fields_reported() {
        let mut store = SensorStore::new();
        store.apply(&update(SensorCategory::Depth, 0, &[("depth", 10.0, Some(SURFACE))]));
        let change = store.apply(&update(SensorCategory::Depth, 0, &[("depth", 7.0, Some(KEEL))]));
        assert!(change.applied.is_empty());
        assert_eq!(change.rejected, vec!["depth"]);
    }

    #[test]
    fn test_merge_keeps_earlier_fields() {
        let mut store = SensorStore::new();
        store.apply(&update(SensorCategory::Battery, 0, &[("voltage", 12.6, None)]));
        store.apply(&update(SensorCategory::Battery, 0, &[("temperature", 23.5, None)]));
        let state = store.state(SensorCategory::Battery, 0).unwrap();
        assert_eq!(state.value("voltage"), Some(&FieldValue::Float(12.6)));
        assert_eq!(state.value("temperature"), Some(&FieldValue::Float(23.5)));
        assert_eq!(state.keys(), vec!["temperature", "voltage"]);
    }

    #[test]
    fn test_instances_are_separate() {
        let mut store = SensorStore::new();
        store.apply(&update(SensorCategory::Engine, 0, &[("rpm", 1800.0, None)]));
        store.apply(&update(SensorCategory::Engine, 1, &[("rpm", 1750.0, None)]));
        assert_eq!(store.instances(SensorCategory::Engine), vec![0, 1]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_has_measurements() {
        let mut store = SensorStore::new();
        let mut u = SensorUpdate::new(SensorCategory::Tank, 0, Utc::now());
        u.push("fluid_type", FieldValue::Text("fuel".into()));
        let change = store.apply(&u);
        assert!(!change.has_measurements);

        store.apply(&update(SensorCategory::Tank, 0, &[("level", 50.0, None)]));
        assert!(store.state(SensorCategory::Tank, 0).unwrap().has_measurements());
    }

    #[test]
    fn test_observers_see_changes() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen: Rc<RefCell<Vec<(SensorCategory, u8)>>> = Rc::new(RefCell::new(Vec::new()));
        let mut store = SensorStore::new();
        let sink = Rc::clone(&seen);
        let subscription = store.subscribe(move |change| {
            sink.borrow_mut().push((change.category, change.instance));
        });

        store.apply(&update(SensorCategory::Engine, 0, &[("rpm", 1800.0, None)]));
        assert_eq!(*seen.borrow(), vec![(SensorCategory::Engine, 0)]);

        assert!(store.unsubscribe(subscription));
        store.apply(&update(SensorCategory::Engine, 0, &[("rpm", 1900.0, None)]));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_reset() {
        let mut store = SensorStore::new();
        store.apply(&update(SensorCategory::Engine, 0, &[("rpm", 1800.0, None)]));
        store.reset();
        assert!(store.is_empty());
        assert!(store.state(SensorCategory::Engine, 0).is_none());
    }
}
