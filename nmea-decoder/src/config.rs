//! Decoder configuration
//!
//! The decoder itself is stateless; the configuration carries the few static
//! tables an installation needs - most importantly the talker-to-instance
//! table used when redundant sensors share one sentence grammar.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for the sentence/frame decoding pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Talker identifier -> device instance, for sentence types broadcast by
    /// logically distinct redundant sensors (e.g. two heading sensors, one
    /// talking as "HC" and one as "II")
    #[serde(default)]
    pub talker_instances: HashMap<String, u8>,

    /// Optional: only map these sentence types
    #[serde(default)]
    pub sentence_filter: Option<Vec<String>>,

    /// Optional: only decode these PGNs
    #[serde(default)]
    pub pgn_filter: Option<Vec<u32>>,

    /// Upper bound on transducer 4-tuples read from one sentence
    #[serde(default = "default_max_tuples")]
    pub max_transducer_tuples: usize,
}

fn default_max_tuples() -> usize {
    8
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            talker_instances: HashMap::new(),
            sentence_filter: None,
            pgn_filter: None,
            max_transducer_tuples: default_max_tuples(),
        }
    }
}

impl DecoderConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: assign a device instance to a talker identifier
    pub fn with_talker_instance(mut self, talker: impl Into<String>, instance: u8) -> Self {
        self.talker_instances.insert(talker.into(), instance);
        self
    }

    /// Builder method: restrict mapping to the given sentence types
    pub fn with_sentence_filter(mut self, types: Vec<String>) -> Self {
        self.sentence_filter = Some(types);
        self
    }

    /// Builder method: restrict decoding to the given PGNs
    pub fn with_pgn_filter(mut self, pgns: Vec<u32>) -> Self {
        self.pgn_filter = Some(pgns);
        self
    }

    /// Instance assigned to a talker, defaulting to 0
    pub fn talker_instance(&self, talker: &str) -> u8 {
        self.talker_instances.get(talker).copied().unwrap_or(0)
    }

    /// Check whether a sentence type should be processed
    pub fn should_process_sentence(&self, type_code: &str) -> bool {
        match &self.sentence_filter {
            Some(types) => types.iter().any(|t| t == type_code),
            None => true,
        }
    }

    /// Check whether a PGN should be processed
    pub fn should_process_pgn(&self, pgn: u32) -> bool {
        match &self.pgn_filter {
            Some(pgns) => pgns.contains(&pgn),
            None => true,
        }
    }
}
