//! Marine Telemetry Decoder Library
//!
//! A stateless, reusable library for decoding marine telemetry arriving in
//! two co-existing wire formats: ASCII sentence-based messages and binary
//! frame-based messages from the vessel data bus.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Tokenizes and validates ASCII sentences (sentinel, checksum, fields)
//! - Decodes binary frames for a fixed catalog of PGNs
//! - Maps both into normalized per-device-instance `SensorUpdate` records,
//!   with unit conversion to base units and multi-source arbitration claims
//!
//! The library does NOT:
//! - Accumulate sensor state across messages
//! - Track device instance lifecycles
//! - Execute callbacks
//! - Perform I/O
//!
//! All stateful functionality is in the application layer (instrument-state).
//!
//! # Example Usage
//!
//! ```
//! use nmea_decoder::{DecoderConfig, ParsedSentence, SensorMapper, SentenceParser};
//! use nmea_decoder::stats::DecoderStats;
//!
//! let mapper = SensorMapper::new(DecoderConfig::new());
//! let mut stats = DecoderStats::new();
//!
//! let raw = SentenceParser::parse("$IIRPM,E,0,1800.0,A*6C").unwrap();
//! let parsed = ParsedSentence::from_raw(&raw).unwrap();
//! let updates = mapper
//!     .map_sentence(&raw, &parsed, chrono::Utc::now(), &mut stats)
//!     .unwrap();
//!
//! assert_eq!(updates[0].field("rpm").unwrap().as_f64(), Some(1800.0));
//! ```

// Public modules
pub mod config;
pub mod frame;
pub mod mapper;
pub mod sentence;
pub mod stats;
pub mod types;

// Re-export main types for convenience
pub use config::DecoderConfig;
pub use frame::{DecodedFrame, FrameDecoder};
pub use mapper::SensorMapper;
pub use sentence::{ParsedSentence, SentenceParser};
pub use stats::DecoderStats;
pub use types::{
    BinaryFrame, DecodeError, FieldUpdate, FieldValue, RawSentence, Result, SensorCategory,
    SensorUpdate, SourceClaim, Timestamp,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
