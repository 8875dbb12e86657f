//! Aggregate decoding counters
//!
//! Parse failures are statistical, not transactional: nothing is surfaced to
//! the consumer per message, but operators can read these counters to spot
//! protocol coverage gaps or a noisy talker.

use crate::types::DecodeError;
use serde::Serialize;
use std::collections::HashMap;

/// Per-message-type counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeCounters {
    pub seen: u64,
    pub failed: u64,
}

/// Aggregate decoder statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct DecoderStats {
    /// ASCII sentences handed to the parser
    pub sentences_seen: u64,
    /// Sentences dropped (format, field or mapping failure)
    pub sentences_failed: u64,
    /// Binary frames handed to the frame decoder
    pub frames_seen: u64,
    /// Frames dropped (short payload, decode or mapping failure)
    pub frames_failed: u64,
    /// Messages whose type/PGN is not in the handler tables
    pub unsupported: u64,
    /// Generic-transducer tuples whose identifier matched no known mnemonic
    pub unrecognized_mnemonics: u64,
    /// Sensor updates successfully emitted
    pub updates_emitted: u64,
    /// Seen/failed breakdown per sentence type or PGN
    per_type: HashMap<String, TypeCounters>,
}

impl DecoderStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an incoming sentence of the given type
    pub fn record_sentence(&mut self, type_code: &str) {
        self.sentences_seen += 1;
        self.per_type.entry(type_code.to_string()).or_default().seen += 1;
    }

    /// Record a sentence that was dropped
    pub fn record_sentence_failure(&mut self, type_code: &str, err: &DecodeError) {
        self.sentences_failed += 1;
        if err.is_unsupported() {
            self.unsupported += 1;
        }
        self.per_type
            .entry(type_code.to_string())
            .or_default()
            .failed += 1;
    }

    /// Record an incoming frame with the given PGN
    pub fn record_frame(&mut self, pgn: u32) {
        self.frames_seen += 1;
        self.per_type.entry(pgn.to_string()).or_default().seen += 1;
    }

    /// Record a frame that was dropped
    pub fn record_frame_failure(&mut self, pgn: u32, err: &DecodeError) {
        self.frames_failed += 1;
        if err.is_unsupported() {
            self.unsupported += 1;
        }
        self.per_type.entry(pgn.to_string()).or_default().failed += 1;
    }

    /// Record a skipped transducer tuple
    pub fn record_unrecognized_mnemonic(&mut self) {
        self.unrecognized_mnemonics += 1;
    }

    /// Record emitted updates
    pub fn record_updates(&mut self, count: usize) {
        self.updates_emitted += count as u64;
    }

    /// Counters for a single sentence type or PGN
    pub fn for_type(&self, label: &str) -> TypeCounters {
        self.per_type.get(label).copied().unwrap_or_default()
    }

    /// Per-type breakdown, sorted by label for stable display
    pub fn breakdown(&self) -> Vec<(&str, TypeCounters)> {
        let mut rows: Vec<(&str, TypeCounters)> = self
            .per_type
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        rows.sort_by_key(|(label, _)| *label);
        rows
    }
}
