//! Core types for the marine telemetry decoder
//!
//! This module defines the types shared by the sentence parser, the frame
//! decoder and the sensor mapper. The decoder is stateless and only emits
//! `SensorUpdate` records - accumulating them into per-instance state is the
//! job of the application layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used throughout the decoder
pub type Timestamp = DateTime<Utc>;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// One ASCII telemetry sentence after tokenization, before grammar-specific
/// field extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSentence {
    /// Two-character talker identifier (e.g. "GP", "II", "HC")
    pub talker: String,
    /// Sentence type code (e.g. "GGA", "MWV", "XDR")
    pub type_code: String,
    /// Positional data fields, in wire order, untouched
    pub fields: Vec<String>,
    /// The original line as received (checksum included)
    pub raw: String,
}

/// One binary frame from the vessel data bus
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryFrame {
    /// Parameter group number identifying the message layout
    pub pgn: u32,
    /// Bus address of the transmitting node
    pub source: u8,
    /// Payload bytes (fast-packet messages arrive already reassembled)
    pub payload: Vec<u8>,
}

impl BinaryFrame {
    pub fn new(pgn: u32, source: u8, payload: Vec<u8>) -> Self {
        Self {
            pgn,
            source,
            payload,
        }
    }
}

/// Errors that can occur while decoding telemetry
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("sentence does not start with a sentinel character")]
    BadSentinel,

    #[error("sentence has too few fields ({0})")]
    InsufficientFields(usize),

    #[error("checksum mismatch: sentence carries {expected:02X}, computed {computed:02X}")]
    ChecksumMismatch { expected: u8, computed: u8 },

    #[error("no usable fields in {0}")]
    NoUsableFields(String),

    #[error("unsupported sentence type: {0}")]
    UnsupportedSentence(String),

    #[error("unsupported PGN: {0}")]
    UnsupportedPgn(u32),

    #[error("payload too short for PGN {pgn}: {got} bytes")]
    ShortPayload { pgn: u32, got: usize },

    #[error("invalid data in {message}: {reason}")]
    InvalidData { message: String, reason: String },
}

impl DecodeError {
    /// Construct an `InvalidData` error for a named message type
    pub fn invalid(message: impl Into<String>, reason: impl Into<String>) -> Self {
        DecodeError::InvalidData {
            message: message.into(),
            reason: reason.into(),
        }
    }

    /// True for coverage gaps (type/PGN not in the handler tables), which are
    /// counted separately from real failures
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            DecodeError::UnsupportedSentence(_) | DecodeError::UnsupportedPgn(_)
        )
    }
}

/// The sensor categories known to the system
///
/// Together with an instance number this uniquely identifies one physical
/// device (engine 0 vs engine 1, port vs starboard rudder, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorCategory {
    Gps,
    Compass,
    Speed,
    Wind,
    Depth,
    Temperature,
    Engine,
    Battery,
    Tank,
    Rudder,
    Navigation,
}

impl SensorCategory {
    /// Stable lowercase name, used in instance ids and log output
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorCategory::Gps => "gps",
            SensorCategory::Compass => "compass",
            SensorCategory::Speed => "speed",
            SensorCategory::Wind => "wind",
            SensorCategory::Depth => "depth",
            SensorCategory::Temperature => "temperature",
            SensorCategory::Engine => "engine",
            SensorCategory::Battery => "battery",
            SensorCategory::Tank => "tank",
            SensorCategory::Rudder => "rudder",
            SensorCategory::Navigation => "navigation",
        }
    }

    /// Human-readable name, used for detected-instance titles
    pub fn title(&self) -> &'static str {
        match self {
            SensorCategory::Gps => "GPS",
            SensorCategory::Compass => "Compass",
            SensorCategory::Speed => "Speed",
            SensorCategory::Wind => "Wind",
            SensorCategory::Depth => "Depth",
            SensorCategory::Temperature => "Temperature",
            SensorCategory::Engine => "Engine",
            SensorCategory::Battery => "Battery",
            SensorCategory::Tank => "Tank",
            SensorCategory::Rudder => "Rudder",
            SensorCategory::Navigation => "Navigation",
        }
    }
}

impl fmt::Display for SensorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field value carried by a sensor update
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Floating-point measurement, already converted to the base unit
    Float(f64),
    /// Integer measurement or count
    Integer(i64),
    /// Textual metadata (waypoint names, fluid types, ...)
    Text(String),
    /// Boolean state
    Flag(bool),
}

impl FieldValue {
    /// Convert to f64 where the value is numeric
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::Flag(v) => Some(if *v { 1.0 } else { 0.0 }),
            FieldValue::Text(_) => None,
        }
    }

    /// True for values that count as real measurements
    ///
    /// Textual metadata does not qualify: an instance that has only reported
    /// a waypoint name or a fluid type has not produced a reading yet.
    pub fn is_measurement(&self) -> bool {
        matches!(self, FieldValue::Float(_) | FieldValue::Integer(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{:.3}", v),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Text(v) => f.write_str(v),
            FieldValue::Flag(v) => write!(f, "{}", v),
        }
    }
}

/// Arbitration claim attached to a field fed by more than one message type
///
/// The store lets a claimed field be overwritten only by a claim of equal or
/// higher priority, so a lower-priority source can never regress the primary
/// reading once a better source has been heard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceClaim {
    /// Which message family produced the value
    pub source: &'static str,
    /// Declared priority, higher wins
    pub priority: u8,
}

/// One field carried by a sensor update
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub key: &'static str,
    pub value: FieldValue,
    /// Present only for fields subject to multi-source arbitration
    pub claim: Option<SourceClaim>,
}

/// A normalized update for one device instance, produced by the mapper
///
/// One wire message may yield several updates (a water-speed-and-heading
/// sentence produces both a Speed and a Compass update). Updates are
/// transient: constructed, applied to the store, discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorUpdate {
    pub category: SensorCategory,
    pub instance: u8,
    pub fields: Vec<FieldUpdate>,
    pub timestamp: Timestamp,
}

impl SensorUpdate {
    pub fn new(category: SensorCategory, instance: u8, timestamp: Timestamp) -> Self {
        Self {
            category,
            instance,
            fields: Vec::new(),
            timestamp,
        }
    }

    /// Add an unclaimed field
    pub fn push(&mut self, key: &'static str, value: FieldValue) {
        self.fields.push(FieldUpdate {
            key,
            value,
            claim: None,
        });
    }

    /// Add a field subject to multi-source arbitration
    pub fn push_claimed(&mut self, key: &'static str, value: FieldValue, claim: SourceClaim) {
        self.fields.push(FieldUpdate {
            key,
            value,
            claim: Some(claim),
        });
    }

    /// Look up a field by key
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// True if the update carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True if at least one field is a genuine measurement
    pub fn has_measurements(&self) -> bool {
        self.fields.iter().any(|f| f.value.is_measurement())
    }
}
