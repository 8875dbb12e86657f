//! Instrument State Library
//!
//! The stateful application layer on top of the `nmea-decoder` library.
//! Where the decoder turns wire messages into transient `SensorUpdate`
//! records, this crate accumulates them and tracks device lifecycles:
//! - `SensorStore` holds per-instance field state keyed by
//!   `(category, instance)` and enforces multi-source arbitration on claimed
//!   fields
//! - `InstanceTracker` maintains the throttled, expiring set of detected
//!   device instances and notifies subscribers on net change
//! - `ObserverRegistry` is the shared subscription primitive (cancellation
//!   handles, snapshot dispatch, panic isolation)
//! - `Pipeline` wires parse -> map -> store -> tracker for embedders and
//!   end-to-end tests
//!
//! Everything is single-threaded and event-driven; the embedder supplies
//! timestamps and drives the periodic tick, so behavior is fully
//! deterministic under test.
//!
//! # Example Usage
//!
//! ```
//! use instrument_state::{Pipeline, TrackerConfig};
//! use nmea_decoder::DecoderConfig;
//!
//! let mut pipeline = Pipeline::new(DecoderConfig::new(), TrackerConfig::new());
//! pipeline.tracker_mut().subscribe(|instances| {
//!     for instance in instances {
//!         println!("{}: {}", instance.id, instance.title);
//!     }
//! });
//!
//! let now = chrono::Utc::now();
//! pipeline.process_line("$IIRPM,E,0,1800.0,A*6C", now);
//! pipeline.tick(now);
//! ```

// Public modules
pub mod config;
pub mod observer;
pub mod pipeline;
pub mod store;
pub mod tracker;

// Re-export main types for convenience
pub use config::TrackerConfig;
pub use observer::{ObserverRegistry, Subscription};
pub use pipeline::Pipeline;
pub use store::{AppliedChange, SensorInstanceState, SensorStore, StoredField};
pub use tracker::{DetectedInstance, InstanceTracker, InstrumentGroup};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
