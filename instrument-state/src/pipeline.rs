//! Decoder-to-tracker wiring
//!
//! Convenience assembly of the full processing path: parse/decode -> map ->
//! store -> tracker. The transport layer feeds one message at a time; every
//! failure is absorbed into the statistics and logged, never surfaced to the
//! caller per message. The embedder drives time explicitly (`now` parameters
//! and `tick`), so there are no hidden clocks or timers.

use crate::config::TrackerConfig;
use crate::store::SensorStore;
use crate::tracker::InstanceTracker;
use nmea_decoder::stats::DecoderStats;
use nmea_decoder::types::{BinaryFrame, SensorUpdate, Timestamp};
use nmea_decoder::{DecoderConfig, FrameDecoder, ParsedSentence, SensorMapper, SentenceParser};

/// Label under which unparseable lines are counted
const MALFORMED: &str = "invalid";

/// The assembled processing pipeline
pub struct Pipeline {
    mapper: SensorMapper,
    store: SensorStore,
    tracker: InstanceTracker,
    stats: DecoderStats,
}

impl Pipeline {
    pub fn new(decoder_config: DecoderConfig, tracker_config: TrackerConfig) -> Self {
        Self {
            mapper: SensorMapper::new(decoder_config),
            store: SensorStore::new(),
            tracker: InstanceTracker::new(tracker_config),
            stats: DecoderStats::new(),
        }
    }

    /// Process one ASCII line; returns the number of updates applied
    pub fn process_line(&mut self, line: &str, now: Timestamp) -> usize {
        let raw = match SentenceParser::parse(line) {
            Ok(raw) => raw,
            Err(e) => {
                log::debug!("dropping malformed line: {}", e);
                self.stats.record_sentence(MALFORMED);
                self.stats.record_sentence_failure(MALFORMED, &e);
                return 0;
            }
        };
        self.stats.record_sentence(&raw.type_code);

        let mapped = ParsedSentence::from_raw(&raw)
            .and_then(|parsed| self.mapper.map_sentence(&raw, &parsed, now, &mut self.stats));
        match mapped {
            Ok(updates) => self.apply_updates(updates, now),
            Err(e) => {
                log::debug!("dropping sentence {}: {}", raw.type_code, e);
                self.stats.record_sentence_failure(&raw.type_code, &e);
                0
            }
        }
    }

    /// Process one binary frame; returns the number of updates applied
    pub fn process_frame(&mut self, frame: &BinaryFrame, now: Timestamp) -> usize {
        self.stats.record_frame(frame.pgn);
        let mapped = FrameDecoder::decode(frame)
            .and_then(|decoded| self.mapper.map_frame(frame, &decoded, now));
        match mapped {
            Ok(updates) => self.apply_updates(updates, now),
            Err(e) => {
                log::debug!("dropping frame PGN {}: {}", frame.pgn, e);
                self.stats.record_frame_failure(frame.pgn, &e);
                0
            }
        }
    }

    fn apply_updates(&mut self, updates: Vec<SensorUpdate>, now: Timestamp) -> usize {
        let count = updates.len();
        for update in &updates {
            let change = self.store.apply(update);
            self.tracker.observe(&change, now);
        }
        self.stats.record_updates(count);
        count
    }

    /// Drive the tracker's periodic work; call from the embedder's timer
    pub fn tick(&mut self, now: Timestamp) {
        self.tracker.tick(now);
    }

    /// Full reset: store state, tracked instances; counters survive
    pub fn reset(&mut self, now: Timestamp) {
        self.store.reset();
        self.tracker.reset(now);
    }

    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    pub fn store(&self) -> &SensorStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SensorStore {
        &mut self.store
    }

    pub fn tracker(&self) -> &InstanceTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut InstanceTracker {
        &mut self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use nmea_decoder::SensorCategory;

    fn base() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(
            DecoderConfig::new(),
            TrackerConfig::new().with_min_notify_gap_ms(0),
        )
    }

    #[test]
    fn test_line_flows_to_store_and_tracker() {
        let mut p = pipeline();
        let applied = p.process_line("$IIRPM,E,0,1800.0,A*6C", base());
        assert_eq!(applied, 1);

        let state = p.store().state(SensorCategory::Engine, 0).unwrap();
        assert_eq!(state.value("rpm").unwrap().as_f64(), Some(1800.0));
        assert!(p.tracker().contains(SensorCategory::Engine, 0));
        assert_eq!(p.stats().updates_emitted, 1);
    }

    #[test]
    fn test_malformed_line_counted_not_fatal() {
        let mut p = pipeline();
        assert_eq!(p.process_line("garbage", base()), 0);
        assert_eq!(p.stats().sentences_seen, 1);
        assert_eq!(p.stats().sentences_failed, 1);
        assert!(p.store().is_empty());
    }

    #[test]
    fn test_frame_failure_counts_once() {
        let mut p = pipeline();
        let frame = BinaryFrame::new(127488, 0x23, vec![0x01, 0x20]);
        assert_eq!(p.process_frame(&frame, base()), 0);
        assert_eq!(p.stats().frames_seen, 1);
        assert_eq!(p.stats().frames_failed, 1);
        assert!(p.store().is_empty());
    }

    #[test]
    fn test_reset_clears_state_keeps_counters() {
        let mut p = pipeline();
        p.process_line("$IIRPM,E,0,1800.0,A*6C", base());
        p.reset(base());
        assert!(p.store().is_empty());
        assert!(p.tracker().is_empty());
        assert_eq!(p.stats().sentences_seen, 1);
    }
}
